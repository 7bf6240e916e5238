use bson::{DateTime, doc, oid::ObjectId};
use linguaflow_db::models::ProficiencyRecord;
use mongodb::Database;

use super::base::{BaseDao, DaoResult};

pub struct ProficiencyDao {
    pub base: BaseDao<ProficiencyRecord>,
}

impl ProficiencyDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, ProficiencyRecord::COLLECTION),
        }
    }

    /// One row per (learner, language); re-assessment overwrites the level.
    pub async fn upsert(
        &self,
        user_id: ObjectId,
        language_id: ObjectId,
        level: &str,
        confidence: f64,
        source_assessment_id: &str,
    ) -> DaoResult<()> {
        let now = DateTime::now();
        self.base
            .collection()
            .update_one(
                doc! { "user_id": user_id, "language_id": language_id },
                doc! {
                    "$set": {
                        "level": level,
                        "confidence": confidence,
                        "source_assessment_id": source_assessment_id,
                        "assessed_at": now,
                        "updated_at": now,
                    },
                    "$setOnInsert": {
                        "user_id": user_id,
                        "language_id": language_id,
                        "created_at": now,
                    },
                },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    pub async fn find_for_user(
        &self,
        user_id: ObjectId,
        language_id: ObjectId,
    ) -> DaoResult<Option<ProficiencyRecord>> {
        self.base
            .find_one(doc! { "user_id": user_id, "language_id": language_id })
            .await
    }
}
