pub mod aggregate;
pub mod error;
pub mod keys;
pub mod session;

pub use error::AssessmentError;
pub use session::{
    AssessmentResult, AssessmentSession, DeterminedLevel, SessionQuestion, SkillScores,
};

use std::sync::Arc;
use std::time::Duration;

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use linguaflow_config::AssessmentSettings;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::proficiency::ProficiencyStore;
use crate::questions::{Question, QuestionSource, QuestionSourceError};
use crate::speech::{Evaluation, EvaluatorError, SpeechEvaluator};
use crate::store::EphemeralStore;

use session::{RESULT_SCHEMA_VERSION, SESSION_SCHEMA_VERSION};

pub enum Submission {
    Skip,
    Audio(Vec<u8>),
}

#[derive(Debug, Clone, Copy)]
pub struct SubmitOutcome {
    pub is_completed: bool,
    /// 1-based number of the next question, absent once completed.
    pub next_question_number: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub assessment_id: Uuid,
    pub language_id: ObjectId,
    pub language_code: String,
    pub question_count: usize,
    pub answered_count: usize,
    pub is_completed: bool,
    pub started_at: DateTime<Utc>,
}

impl SessionSummary {
    fn from_session(session: &AssessmentSession) -> Self {
        Self {
            assessment_id: session.assessment_id,
            language_id: session.language_id,
            language_code: session.language_code.clone(),
            question_count: session.questions.len(),
            answered_count: session.current_index,
            is_completed: session.is_completed(),
            started_at: session.started_at,
        }
    }
}

/// The assessment state machine plus the promotion/discard controller.
/// All state lives in the injected ephemeral store; each call is an
/// independent request and the sequence-number check in `submit` is the
/// ordering mechanism, not a lock.
pub struct AssessmentService {
    store: Arc<dyn EphemeralStore>,
    questions: Arc<dyn QuestionSource>,
    evaluator: Arc<dyn SpeechEvaluator>,
    catalog: Arc<dyn Catalog>,
    proficiency: Arc<dyn ProficiencyStore>,
    settings: AssessmentSettings,
}

impl AssessmentService {
    pub fn new(
        store: Arc<dyn EphemeralStore>,
        questions: Arc<dyn QuestionSource>,
        evaluator: Arc<dyn SpeechEvaluator>,
        catalog: Arc<dyn Catalog>,
        proficiency: Arc<dyn ProficiencyStore>,
        settings: AssessmentSettings,
    ) -> Self {
        Self {
            store,
            questions,
            evaluator,
            catalog,
            proficiency,
            settings,
        }
    }

    fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.settings.session_ttl_secs)
    }

    fn result_ttl(&self) -> Duration {
        Duration::from_secs(self.settings.result_ttl_secs)
    }

    fn index_ttl(&self) -> Duration {
        Duration::from_secs(self.settings.session_ttl_secs + self.settings.index_ttl_slack_secs)
    }

    pub async fn start(
        &self,
        user_id: ObjectId,
        language_id: ObjectId,
        program_id: Option<ObjectId>,
        question_count: Option<usize>,
    ) -> Result<AssessmentSession, AssessmentError> {
        let language = self
            .catalog
            .find_language(language_id)
            .await?
            .ok_or_else(|| {
                AssessmentError::InvalidProgram(format!(
                    "unknown language {}",
                    language_id.to_hex()
                ))
            })?;

        if let Some(pid) = program_id {
            if !self.catalog.program_exists(language_id, pid).await? {
                return Err(AssessmentError::InvalidProgram(format!(
                    "program {} does not belong to language {}",
                    pid.to_hex(),
                    language_id.to_hex()
                )));
            }
        }

        let count = question_count
            .unwrap_or(self.settings.default_question_count)
            .clamp(1, self.settings.max_question_count);

        let program_hex = program_id.map(|p| p.to_hex());
        let questions = tokio::time::timeout(
            Duration::from_secs(self.settings.generation_timeout_secs),
            self.questions
                .generate(&language.code, program_hex.as_deref(), count),
        )
        .await
        .map_err(|_| QuestionSourceError::Timeout)??;

        if questions.is_empty() {
            return Err(
                QuestionSourceError::Backend("generation returned no questions".to_string())
                    .into(),
            );
        }

        let session = AssessmentSession {
            schema_version: SESSION_SCHEMA_VERSION,
            assessment_id: Uuid::new_v4(),
            user_id,
            language_id,
            language_code: language.code,
            program_id,
            questions: questions.into_iter().map(SessionQuestion::new).collect(),
            current_index: 0,
            started_at: Utc::now(),
        };

        self.store
            .set(
                &keys::session(&session.assessment_id),
                session.encode()?,
                self.session_ttl(),
            )
            .await?;
        self.index_add(&session).await;

        info!(
            assessment_id = %session.assessment_id,
            user_id = %user_id.to_hex(),
            questions = session.questions.len(),
            "assessment session started"
        );
        Ok(session)
    }

    pub async fn current_question(
        &self,
        user_id: ObjectId,
        assessment_id: Uuid,
    ) -> Result<Question, AssessmentError> {
        let session = self.load_owned(user_id, assessment_id).await?;
        if session.is_completed() {
            return Err(AssessmentError::AlreadyCompleted);
        }
        Ok(session.questions[session.current_index].question.clone())
    }

    /// Records exactly one submission for the current question and
    /// advances the index by one. `question_number` (1-based) must match
    /// the session's expectation; a retried or out-of-order request fails
    /// with `OutOfSequence` before any state changes.
    pub async fn submit(
        &self,
        user_id: ObjectId,
        assessment_id: Uuid,
        question_number: u32,
        submission: Submission,
    ) -> Result<SubmitOutcome, AssessmentError> {
        let mut session = self.load_owned(user_id, assessment_id).await?;
        if session.is_completed() {
            return Err(AssessmentError::AlreadyCompleted);
        }

        let expected = session.expected_question_number();
        if question_number != expected {
            return Err(AssessmentError::OutOfSequence {
                expected,
                got: question_number,
            });
        }

        let index = session.current_index;
        let language_code = session.language_code.clone();
        {
            let slot = &mut session.questions[index];
            match submission {
                Submission::Skip => {
                    slot.is_skipped = true;
                    debug!(assessment_id = %assessment_id, question_number, "question skipped");
                }
                Submission::Audio(audio) => {
                    let evaluated = tokio::time::timeout(
                        Duration::from_secs(self.settings.evaluation_timeout_secs),
                        self.evaluator
                            .evaluate(&language_code, &slot.question, &audio),
                    )
                    .await
                    .unwrap_or(Err(EvaluatorError::Timeout));

                    match evaluated {
                        Ok(evaluation) => slot.evaluation = Some(evaluation),
                        Err(e) => {
                            warn!(
                                assessment_id = %assessment_id,
                                question_number,
                                error = %e,
                                "evaluator failed, recording degraded evaluation"
                            );
                            slot.evaluation = Some(Evaluation::degraded());
                            slot.evaluator_error = Some(e.to_string());
                        }
                    }
                }
            }
        }

        session.current_index += 1;
        self.store
            .set(
                &keys::session(&assessment_id),
                session.encode()?,
                self.session_ttl(),
            )
            .await?;

        let is_completed = session.is_completed();
        if is_completed {
            self.finalize(&session).await?;
        }

        Ok(SubmitOutcome {
            is_completed,
            next_question_number: (!is_completed).then(|| session.expected_question_number()),
        })
    }

    /// Idempotent: returns the pending result when this session already
    /// aggregated, otherwise aggregates a completed session on the spot.
    pub async fn complete(
        &self,
        user_id: ObjectId,
        assessment_id: Uuid,
    ) -> Result<AssessmentResult, AssessmentError> {
        let session = self.load_owned(user_id, assessment_id).await?;

        let key = keys::result(&session.user_id, &session.language_id);
        if let Some(bytes) = self.store.get(&key).await? {
            match AssessmentResult::decode(&bytes) {
                Ok(result) if result.assessment_id == assessment_id => return Ok(result),
                // A leftover pending result from an earlier session for the
                // same language; the re-aggregation below replaces it.
                Ok(_) => {}
                Err(e) => warn!(error = %e, "discarding corrupt pending result"),
            }
        }

        if !session.is_completed() {
            return Err(AssessmentError::NotCompleted);
        }
        self.finalize(&session).await
    }

    /// Promotes the pending result into the durable proficiency record.
    /// Durable write happens before the ephemeral delete: a crash in
    /// between leaves a stale-but-harmless pending entry rather than a
    /// lost level. Delete-on-success makes a second accept fail NotFound.
    pub async fn accept(
        &self,
        user_id: ObjectId,
        language_id: ObjectId,
    ) -> Result<AssessmentResult, AssessmentError> {
        let key = keys::result(&user_id, &language_id);
        let bytes = self
            .store
            .get(&key)
            .await?
            .ok_or(AssessmentError::NotFound)?;
        let result = AssessmentResult::decode(&bytes)?;

        if result.determined_level == DeterminedLevel::InsufficientData {
            return Err(AssessmentError::InsufficientEvidence);
        }

        self.proficiency
            .upsert_level(
                user_id,
                language_id,
                result.determined_level.as_str(),
                result.level_confidence,
                &result.assessment_id.to_string(),
            )
            .await?;
        self.store.delete(&key).await?;
        self.cleanup_session(user_id, result.assessment_id).await;

        info!(
            user_id = %user_id.to_hex(),
            language_id = %language_id.to_hex(),
            level = %result.determined_level,
            "assessment result promoted"
        );
        Ok(result)
    }

    /// Discards the pending result so the user may retry. Idempotent and
    /// side-effect-light: rejecting when nothing is pending is a no-op.
    pub async fn reject(
        &self,
        user_id: ObjectId,
        language_id: ObjectId,
    ) -> Result<(), AssessmentError> {
        let key = keys::result(&user_id, &language_id);
        if let Some(bytes) = self.store.get(&key).await? {
            if let Ok(result) = AssessmentResult::decode(&bytes) {
                self.cleanup_session(user_id, result.assessment_id).await;
            }
        }
        self.store.delete(&key).await?;
        debug!(user_id = %user_id.to_hex(), "pending assessment result discarded");
        Ok(())
    }

    /// Live sessions of one user, resolved through the secondary index.
    /// Stale ids resolve to nothing, are silently dropped, and are
    /// opportunistically pruned; the index tolerates them.
    pub async fn list_for_user(
        &self,
        user_id: ObjectId,
    ) -> Result<Vec<SessionSummary>, AssessmentError> {
        let index_key = keys::user_index(&user_id);
        let members = self.store.set_members(&index_key).await?;

        let mut summaries = Vec::new();
        for member in members {
            let Ok(assessment_id) = Uuid::parse_str(&member) else {
                warn!(member, "dropping malformed id from user index");
                continue;
            };
            match self.store.get(&keys::session(&assessment_id)).await? {
                Some(bytes) => match AssessmentSession::decode(&bytes) {
                    Ok(session) => summaries.push(SessionSummary::from_session(&session)),
                    Err(e) => warn!(
                        error = %e,
                        assessment_id = %assessment_id,
                        "dropping corrupt session record"
                    ),
                },
                None => {
                    debug!(assessment_id = %assessment_id, "pruning stale index entry");
                    if let Err(e) = self.store.set_remove(&index_key, &member).await {
                        warn!(error = %e, "failed to prune stale index entry");
                    }
                }
            }
        }
        summaries.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(summaries)
    }

    async fn load_owned(
        &self,
        user_id: ObjectId,
        assessment_id: Uuid,
    ) -> Result<AssessmentSession, AssessmentError> {
        let bytes = self
            .store
            .get(&keys::session(&assessment_id))
            .await?
            .ok_or(AssessmentError::NotFound)?;
        let session = AssessmentSession::decode(&bytes)?;
        if session.user_id != user_id {
            return Err(AssessmentError::Forbidden);
        }
        Ok(session)
    }

    async fn finalize(
        &self,
        session: &AssessmentSession,
    ) -> Result<AssessmentResult, AssessmentError> {
        let agg = aggregate::aggregate(&session.questions, &self.settings.cutoffs);

        let recommended_courses = if agg.determined_level == DeterminedLevel::InsufficientData {
            Vec::new()
        } else {
            self.catalog
                .recommended_courses(
                    session.language_id,
                    agg.determined_level.as_str(),
                    self.settings.recommended_course_limit,
                )
                .await
                .unwrap_or_else(|e| {
                    warn!(error = %e, "course recommendation lookup failed");
                    Vec::new()
                })
        };

        let result = AssessmentResult {
            schema_version: RESULT_SCHEMA_VERSION,
            assessment_id: session.assessment_id,
            user_id: session.user_id,
            language_id: session.language_id,
            determined_level: agg.determined_level,
            level_confidence: agg.level_confidence,
            overall_score: agg.overall_score,
            skill_scores: agg.skill_scores,
            answered_count: agg.answered_count,
            skipped_count: agg.skipped_count,
            detailed_feedback: agg.detailed_feedback,
            key_strengths: agg.key_strengths,
            improvement_areas: agg.improvement_areas,
            recommended_courses,
            created_at: Utc::now(),
        };

        self.store
            .set(
                &keys::result(&session.user_id, &session.language_id),
                result.encode()?,
                self.result_ttl(),
            )
            .await?;

        info!(
            assessment_id = %session.assessment_id,
            level = %result.determined_level,
            confidence = result.level_confidence,
            "assessment result aggregated"
        );
        Ok(result)
    }

    /// Index maintenance is best-effort: losing an entry only affects
    /// discoverability, never the session itself.
    async fn index_add(&self, session: &AssessmentSession) {
        let key = keys::user_index(&session.user_id);
        let member = session.assessment_id.to_string();
        let outcome = match self.store.set_add(&key, &member).await {
            Ok(()) => self.store.expire(&key, self.index_ttl()).await,
            Err(e) => Err(e),
        };
        if let Err(e) = outcome {
            warn!(
                error = %e,
                assessment_id = %session.assessment_id,
                "failed to index assessment session"
            );
        }
    }

    async fn cleanup_session(&self, user_id: ObjectId, assessment_id: Uuid) {
        if let Err(e) = self.store.delete(&keys::session(&assessment_id)).await {
            warn!(error = %e, assessment_id = %assessment_id, "failed to delete finished session");
        }
        if let Err(e) = self
            .store
            .set_remove(&keys::user_index(&user_id), &assessment_id.to_string())
            .await
        {
            warn!(
                error = %e,
                assessment_id = %assessment_id,
                "failed to retract session from user index"
            );
        }
    }
}
