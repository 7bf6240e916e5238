use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod remote;

pub use remote::RemoteSpeechEvaluator;

use crate::questions::Question;

#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("speech evaluation timed out")]
    Timeout,
    #[error("speech evaluation failed: {0}")]
    Backend(String),
}

/// Structured per-question evaluation. Sub-scores are 0..=100. Owned
/// exclusively by the question it scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub accuracy: f64,
    pub pronunciation: f64,
    pub fluency: f64,
    pub grammar: f64,
    pub feedback: String,
    #[serde(default)]
    pub recognized_tokens: Vec<String>,
    #[serde(default)]
    pub missing_tokens: Vec<String>,
}

impl Evaluation {
    pub fn overall(&self) -> f64 {
        (self.accuracy + self.pronunciation + self.fluency + self.grammar) / 4.0
    }

    /// Zero-score placeholder recorded when the evaluator fails or times
    /// out. The question still counts as answered: a partial assessment
    /// beats aborting the whole session.
    pub fn degraded() -> Self {
        Self {
            accuracy: 0.0,
            pronunciation: 0.0,
            fluency: 0.0,
            grammar: 0.0,
            feedback: "This answer could not be evaluated.".to_string(),
            recognized_tokens: Vec::new(),
            missing_tokens: Vec::new(),
        }
    }
}

/// Scores one audio clip against its question.
#[async_trait]
pub trait SpeechEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        language_code: &str,
        question: &Question,
        audio: &[u8],
    ) -> Result<Evaluation, EvaluatorError>;
}
