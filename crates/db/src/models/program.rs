use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// A learning track within a language (e.g. "Business English",
/// "Exam preparation"). Assessment sessions may be anchored to one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub language_id: ObjectId,
    pub name: String,
    pub description: Option<String>,
    pub goal: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Program {
    pub const COLLECTION: &'static str = "programs";
}
