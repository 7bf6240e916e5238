use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub language_id: ObjectId,
    pub title: String,
    /// CEFR band this course targets ("A1".."C2").
    pub level: String,
    pub description: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub is_published: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Course {
    pub const COLLECTION: &'static str = "courses";
}
