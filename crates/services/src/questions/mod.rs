use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod remote;

pub use remote::RemoteQuestionSource;

#[derive(Debug, Error)]
pub enum QuestionSourceError {
    #[error("question generation timed out")]
    Timeout,
    #[error("question generation failed: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    ReadAloud,
    OpenResponse,
    PictureDescription,
}

/// One spoken-response prompt. Immutable once generated; the session keeps
/// per-question mutable state separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// 1-based position within the session.
    pub number: u32,
    pub kind: QuestionKind,
    pub prompt: String,
    /// Text the learner is expected to read, for read-aloud scoring.
    pub reference_text: Option<String>,
    #[serde(default)]
    pub expected_tokens: Vec<String>,
    pub difficulty: Option<String>,
}

/// Produces the ordered question list for a session. Invoked once at
/// session start; a failure here means no session is created.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn generate(
        &self,
        language_code: &str,
        program_id: Option<&str>,
        count: usize,
    ) -> Result<Vec<Question>, QuestionSourceError>;
}
