use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// The committed outcome of a voice assessment: one row per
/// (learner, language), written only when the learner accepts a pending
/// result. Everything else in the workflow lives in the ephemeral store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProficiencyRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub language_id: ObjectId,
    /// CEFR band, "A1".."C2".
    pub level: String,
    pub confidence: f64,
    /// Id of the assessment session the level came from.
    pub source_assessment_id: Option<String>,
    pub assessed_at: DateTime,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl ProficiencyRecord {
    pub const COLLECTION: &'static str = "proficiency_records";
}
