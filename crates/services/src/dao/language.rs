use bson::{doc, oid::ObjectId};
use linguaflow_db::models::Language;
use mongodb::Database;

use super::base::{BaseDao, DaoResult};

pub struct LanguageDao {
    pub base: BaseDao<Language>,
}

impl LanguageDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Language::COLLECTION),
        }
    }

    pub async fn find_active(&self, language_id: ObjectId) -> DaoResult<Option<Language>> {
        self.base
            .find_one(doc! { "_id": language_id, "is_active": true })
            .await
    }
}
