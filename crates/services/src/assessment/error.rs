use thiserror::Error;

use super::session::CodecError;
use crate::catalog::CatalogError;
use crate::proficiency::ProficiencyError;
use crate::questions::QuestionSourceError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AssessmentError {
    /// Session or pending result expired or never existed. Recoverable by
    /// restarting the assessment.
    #[error("assessment not found")]
    NotFound,
    /// Ownership mismatch: the session belongs to another user.
    #[error("assessment belongs to another user")]
    Forbidden,
    /// Submission index mismatch, from a client bug or a replay.
    /// Recoverable by re-fetching the current question; state is never
    /// mutated.
    #[error("expected question {expected}, got {got}")]
    OutOfSequence { expected: u32, got: u32 },
    #[error("unknown language or program: {0}")]
    InvalidProgram(String),
    #[error("assessment already completed")]
    AlreadyCompleted,
    #[error("assessment still in progress")]
    NotCompleted,
    /// The pending result carries no usable level (every question was
    /// skipped), so there is nothing to promote.
    #[error("assessment produced no usable level")]
    InsufficientEvidence,
    #[error(transparent)]
    QuestionSource(#[from] QuestionSourceError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Proficiency(#[from] ProficiencyError),
    #[error("corrupt cache record: {0}")]
    Codec(#[from] CodecError),
}
