//! Cache key namespace for the assessment workflow.

use bson::oid::ObjectId;
use uuid::Uuid;

pub fn session(assessment_id: &Uuid) -> String {
    format!("assessment:{assessment_id}")
}

/// One pending result per learner+language at a time.
pub fn result(user_id: &ObjectId, language_id: &ObjectId) -> String {
    format!(
        "assessment-result:{}:{}",
        user_id.to_hex(),
        language_id.to_hex()
    )
}

pub fn user_index(user_id: &ObjectId) -> String {
    format!("user-assessments:{}", user_id.to_hex())
}
