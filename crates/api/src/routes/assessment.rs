use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};
use linguaflow_services::assessment::{
    AssessmentError, AssessmentResult, SessionSummary, Submission,
};
use linguaflow_services::catalog::CourseSuggestion;
use linguaflow_services::questions::{Question, QuestionKind};

#[derive(Debug, Deserialize, Validate)]
pub struct StartAssessmentRequest {
    pub language_id: String,
    pub program_id: Option<String>,
    #[validate(range(min = 1, max = 10))]
    pub question_count: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub number: u32,
    pub kind: QuestionKind,
    pub prompt: String,
    pub reference_text: Option<String>,
    pub difficulty: Option<String>,
}

impl From<Question> for QuestionResponse {
    fn from(q: Question) -> Self {
        Self {
            number: q.number,
            kind: q.kind,
            prompt: q.prompt,
            reference_text: q.reference_text,
            difficulty: q.difficulty,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StartAssessmentResponse {
    pub assessment_id: String,
    pub question_count: usize,
    pub first_question: QuestionResponse,
}

pub async fn start(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<StartAssessmentRequest>,
) -> Result<Json<StartAssessmentResponse>, ApiError> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let language_id = ObjectId::parse_str(&body.language_id)
        .map_err(|_| ApiError::BadRequest("Invalid language_id".to_string()))?;
    let program_id = body
        .program_id
        .as_ref()
        .map(ObjectId::parse_str)
        .transpose()
        .map_err(|_| ApiError::BadRequest("Invalid program_id".to_string()))?;

    let session = state
        .assessments
        .start(
            auth.user_id,
            language_id,
            program_id,
            body.question_count.map(|c| c as usize),
        )
        .await?;

    let first_question = session.questions[0].question.clone();
    Ok(Json(StartAssessmentResponse {
        assessment_id: session.assessment_id.to_string(),
        question_count: session.questions.len(),
        first_question: first_question.into(),
    }))
}

#[derive(Debug, Serialize)]
pub struct SessionSummaryResponse {
    pub assessment_id: String,
    pub language_id: String,
    pub language_code: String,
    pub question_count: usize,
    pub answered_count: usize,
    pub is_completed: bool,
    pub started_at: String,
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<SessionSummaryResponse>>, ApiError> {
    let summaries = state.assessments.list_for_user(auth.user_id).await?;
    Ok(Json(summaries.into_iter().map(to_summary_response).collect()))
}

pub async fn current_question(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(assessment_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let aid = parse_assessment_id(&assessment_id)?;

    match state.assessments.current_question(auth.user_id, aid).await {
        Ok(question) => Ok(Json(serde_json::json!({
            "completed": false,
            "question": QuestionResponse::from(question),
        }))),
        Err(AssessmentError::AlreadyCompleted) => {
            Ok(Json(serde_json::json!({ "completed": true })))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn submit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(assessment_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let aid = parse_assessment_id(&assessment_id)?;

    let mut question_number: Option<u32> = None;
    let mut is_skipped = false;
    let mut audio: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "question_number" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                question_number = Some(text.trim().parse().map_err(|_| {
                    ApiError::BadRequest("question_number must be a positive integer".to_string())
                })?);
            }
            "is_skipped" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                is_skipped = text.trim().parse().map_err(|_| {
                    ApiError::BadRequest("is_skipped must be true or false".to_string())
                })?;
            }
            "audio_file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                audio = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let question_number = question_number
        .ok_or_else(|| ApiError::BadRequest("Missing question_number".to_string()))?;

    let submission = if is_skipped {
        Submission::Skip
    } else {
        let audio = audio
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Missing audio_file".to_string()))?;
        Submission::Audio(audio)
    };

    let outcome = state
        .assessments
        .submit(auth.user_id, aid, question_number, submission)
        .await?;

    Ok(Json(serde_json::json!({
        "is_completed": outcome.is_completed,
        "next_question_number": outcome.next_question_number,
    })))
}

#[derive(Debug, Serialize)]
pub struct SkillScoresResponse {
    pub accuracy: f64,
    pub pronunciation: f64,
    pub fluency: f64,
    pub grammar: f64,
}

#[derive(Debug, Serialize)]
pub struct AssessmentResultResponse {
    pub assessment_id: String,
    pub language_id: String,
    pub determined_level: String,
    pub level_confidence: f64,
    pub overall_score: f64,
    pub skill_scores: SkillScoresResponse,
    pub answered_count: usize,
    pub skipped_count: usize,
    pub detailed_feedback: String,
    pub key_strengths: Vec<String>,
    pub improvement_areas: Vec<String>,
    pub recommended_courses: Vec<CourseSuggestion>,
    pub created_at: String,
}

pub async fn complete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(assessment_id): Path<String>,
) -> Result<Json<AssessmentResultResponse>, ApiError> {
    let aid = parse_assessment_id(&assessment_id)?;
    let result = state.assessments.complete(auth.user_id, aid).await?;
    Ok(Json(to_result_response(result)))
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub language_id: String,
}

pub async fn accept(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<DecisionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let language_id = ObjectId::parse_str(&body.language_id)
        .map_err(|_| ApiError::BadRequest("Invalid language_id".to_string()))?;

    let result = state.assessments.accept(auth.user_id, language_id).await?;

    Ok(Json(serde_json::json!({
        "promoted": true,
        "language_id": body.language_id,
        "level": result.determined_level.as_str(),
        "confidence": result.level_confidence,
    })))
}

pub async fn reject(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<DecisionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let language_id = ObjectId::parse_str(&body.language_id)
        .map_err(|_| ApiError::BadRequest("Invalid language_id".to_string()))?;

    state.assessments.reject(auth.user_id, language_id).await?;

    Ok(Json(serde_json::json!({ "rejected": true })))
}

fn parse_assessment_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid assessment id".to_string()))
}

fn to_summary_response(s: SessionSummary) -> SessionSummaryResponse {
    SessionSummaryResponse {
        assessment_id: s.assessment_id.to_string(),
        language_id: s.language_id.to_hex(),
        language_code: s.language_code,
        question_count: s.question_count,
        answered_count: s.answered_count,
        is_completed: s.is_completed,
        started_at: s.started_at.to_rfc3339(),
    }
}

fn to_result_response(r: AssessmentResult) -> AssessmentResultResponse {
    AssessmentResultResponse {
        assessment_id: r.assessment_id.to_string(),
        language_id: r.language_id.to_hex(),
        determined_level: r.determined_level.as_str().to_string(),
        level_confidence: r.level_confidence,
        overall_score: r.overall_score,
        skill_scores: SkillScoresResponse {
            accuracy: r.skill_scores.accuracy,
            pronunciation: r.skill_scores.pronunciation,
            fluency: r.skill_scores.fluency,
            grammar: r.skill_scores.grammar,
        },
        answered_count: r.answered_count,
        skipped_count: r.skipped_count,
        detailed_feedback: r.detailed_feedback,
        key_strengths: r.key_strengths,
        improvement_areas: r.improvement_areas,
        recommended_courses: r.recommended_courses,
        created_at: r.created_at.to_rfc3339(),
    }
}
