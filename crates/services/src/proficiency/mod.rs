use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use mongodb::Database;
use thiserror::Error;

use crate::dao::base::DaoError;
use crate::dao::proficiency::ProficiencyDao;

#[derive(Debug, Error)]
pub enum ProficiencyError {
    #[error("proficiency backend error: {0}")]
    Backend(String),
}

impl From<DaoError> for ProficiencyError {
    fn from(err: DaoError) -> Self {
        ProficiencyError::Backend(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ProficiencySnapshot {
    pub level: String,
    pub confidence: f64,
    pub assessed_at: DateTime<Utc>,
}

/// Durable side of the promotion step. The only artifact of the workflow
/// that survives outside the ephemeral store.
#[async_trait]
pub trait ProficiencyStore: Send + Sync {
    async fn upsert_level(
        &self,
        user_id: ObjectId,
        language_id: ObjectId,
        level: &str,
        confidence: f64,
        source_assessment_id: &str,
    ) -> Result<(), ProficiencyError>;

    async fn find(
        &self,
        user_id: ObjectId,
        language_id: ObjectId,
    ) -> Result<Option<ProficiencySnapshot>, ProficiencyError>;
}

pub struct MongoProficiencyStore {
    records: ProficiencyDao,
}

impl MongoProficiencyStore {
    pub fn new(db: &Database) -> Self {
        Self {
            records: ProficiencyDao::new(db),
        }
    }
}

#[async_trait]
impl ProficiencyStore for MongoProficiencyStore {
    async fn upsert_level(
        &self,
        user_id: ObjectId,
        language_id: ObjectId,
        level: &str,
        confidence: f64,
        source_assessment_id: &str,
    ) -> Result<(), ProficiencyError> {
        self.records
            .upsert(user_id, language_id, level, confidence, source_assessment_id)
            .await?;
        Ok(())
    }

    async fn find(
        &self,
        user_id: ObjectId,
        language_id: ObjectId,
    ) -> Result<Option<ProficiencySnapshot>, ProficiencyError> {
        let record = self.records.find_for_user(user_id, language_id).await?;
        Ok(record.map(|r| ProficiencySnapshot {
            level: r.level,
            confidence: r.confidence,
            assessed_at: r.assessed_at.to_chrono(),
        }))
    }
}
