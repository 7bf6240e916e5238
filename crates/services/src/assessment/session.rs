use std::fmt;

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::CourseSuggestion;
use crate::questions::Question;
use crate::speech::Evaluation;

/// Bumped on any breaking change to the cached record layout. A decoded
/// record with a different version fails loudly instead of silently
/// dropping fields across deployments.
pub const SESSION_SCHEMA_VERSION: u32 = 1;
pub const RESULT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unsupported schema version {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Ephemeral record of one in-progress assessment attempt. Lives in the
/// ephemeral store under `assessment:<id>`, bounded by the session TTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentSession {
    pub schema_version: u32,
    pub assessment_id: Uuid,
    pub user_id: ObjectId,
    pub language_id: ObjectId,
    pub language_code: String,
    pub program_id: Option<ObjectId>,
    pub questions: Vec<SessionQuestion>,
    /// Advances by exactly 1 per accepted submission; terminal at
    /// `questions.len()`.
    pub current_index: usize,
    pub started_at: DateTime<Utc>,
}

impl AssessmentSession {
    pub fn is_completed(&self) -> bool {
        self.current_index >= self.questions.len()
    }

    /// 1-based number of the question a submission must carry next.
    pub fn expected_question_number(&self) -> u32 {
        self.current_index as u32 + 1
    }

    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let session: Self = serde_json::from_slice(bytes)?;
        if session.schema_version != SESSION_SCHEMA_VERSION {
            return Err(CodecError::VersionMismatch {
                found: session.schema_version,
                expected: SESSION_SCHEMA_VERSION,
            });
        }
        Ok(session)
    }
}

/// Per-question slot: the immutable question plus the mutable outcome of
/// its single accepted submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionQuestion {
    pub question: Question,
    #[serde(default)]
    pub is_skipped: bool,
    pub evaluation: Option<Evaluation>,
    /// Set when the evaluator failed and a degraded zero evaluation was
    /// recorded instead.
    pub evaluator_error: Option<String>,
}

impl SessionQuestion {
    pub fn new(question: Question) -> Self {
        Self {
            question,
            is_skipped: false,
            evaluation: None,
            evaluator_error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeterminedLevel {
    InsufficientData,
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl DeterminedLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeterminedLevel::InsufficientData => "InsufficientData",
            DeterminedLevel::A1 => "A1",
            DeterminedLevel::A2 => "A2",
            DeterminedLevel::B1 => "B1",
            DeterminedLevel::B2 => "B2",
            DeterminedLevel::C1 => "C1",
            DeterminedLevel::C2 => "C2",
        }
    }
}

impl fmt::Display for DeterminedLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillScores {
    pub accuracy: f64,
    pub pronunciation: f64,
    pub fluency: f64,
    pub grammar: f64,
}

/// Aggregated outcome of a completed session, pending the learner's
/// accept/reject decision. Keyed independently of the session
/// (`assessment-result:<user>:<language>`) with its own, longer TTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub schema_version: u32,
    pub assessment_id: Uuid,
    pub user_id: ObjectId,
    pub language_id: ObjectId,
    pub determined_level: DeterminedLevel,
    pub level_confidence: f64,
    pub overall_score: f64,
    pub skill_scores: SkillScores,
    pub answered_count: usize,
    pub skipped_count: usize,
    pub detailed_feedback: String,
    pub key_strengths: Vec<String>,
    pub improvement_areas: Vec<String>,
    #[serde(default)]
    pub recommended_courses: Vec<CourseSuggestion>,
    pub created_at: DateTime<Utc>,
}

impl AssessmentResult {
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let result: Self = serde_json::from_slice(bytes)?;
        if result.schema_version != RESULT_SCHEMA_VERSION {
            return Err(CodecError::VersionMismatch {
                found: result.schema_version,
                expected: RESULT_SCHEMA_VERSION,
            });
        }
        Ok(result)
    }
}
