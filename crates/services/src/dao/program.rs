use bson::{doc, oid::ObjectId};
use linguaflow_db::models::Program;
use mongodb::Database;

use super::base::{BaseDao, DaoResult};

pub struct ProgramDao {
    pub base: BaseDao<Program>,
}

impl ProgramDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Program::COLLECTION),
        }
    }

    /// A program is only valid for the language it was authored for.
    pub async fn find_for_language(
        &self,
        program_id: ObjectId,
        language_id: ObjectId,
    ) -> DaoResult<Option<Program>> {
        self.base
            .find_one(doc! {
                "_id": program_id,
                "language_id": language_id,
                "is_active": true,
            })
            .await
    }
}
