use bson::{doc, oid::ObjectId};
use futures::TryStreamExt;
use linguaflow_db::models::Course;
use mongodb::Database;

use super::base::{BaseDao, DaoResult};

pub struct CourseDao {
    pub base: BaseDao<Course>,
}

impl CourseDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Course::COLLECTION),
        }
    }

    pub async fn find_published_for_level(
        &self,
        language_id: ObjectId,
        level: &str,
        limit: usize,
    ) -> DaoResult<Vec<Course>> {
        let mut cursor = self
            .base
            .collection()
            .find(doc! {
                "language_id": language_id,
                "level": level,
                "is_published": true,
            })
            .sort(doc! { "position": 1 })
            .limit(limit as i64)
            .await?;

        let mut courses = Vec::new();
        while let Some(course) = cursor.try_next().await? {
            courses.push(course);
        }
        Ok(courses)
    }
}
