use async_trait::async_trait;
use bson::oid::ObjectId;
use mongodb::Database;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dao::base::DaoError;
use crate::dao::course::CourseDao;
use crate::dao::language::LanguageDao;
use crate::dao::program::ProgramDao;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog backend error: {0}")]
    Backend(String),
}

impl From<DaoError> for CatalogError {
    fn from(err: DaoError) -> Self {
        CatalogError::Backend(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct LanguageRef {
    pub id: ObjectId,
    pub code: String,
    pub name: String,
}

/// Course pointer embedded in a pending assessment result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseSuggestion {
    pub course_id: String,
    pub title: String,
    pub level: String,
}

/// Read-only view of the course catalog: language/program existence checks
/// at session start and course recommendations for an aggregated result.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn find_language(&self, language_id: ObjectId)
    -> Result<Option<LanguageRef>, CatalogError>;

    async fn program_exists(
        &self,
        language_id: ObjectId,
        program_id: ObjectId,
    ) -> Result<bool, CatalogError>;

    async fn recommended_courses(
        &self,
        language_id: ObjectId,
        level: &str,
        limit: usize,
    ) -> Result<Vec<CourseSuggestion>, CatalogError>;
}

pub struct MongoCatalog {
    languages: LanguageDao,
    programs: ProgramDao,
    courses: CourseDao,
}

impl MongoCatalog {
    pub fn new(db: &Database) -> Self {
        Self {
            languages: LanguageDao::new(db),
            programs: ProgramDao::new(db),
            courses: CourseDao::new(db),
        }
    }
}

#[async_trait]
impl Catalog for MongoCatalog {
    async fn find_language(
        &self,
        language_id: ObjectId,
    ) -> Result<Option<LanguageRef>, CatalogError> {
        let language = self.languages.find_active(language_id).await?;
        Ok(language.map(|l| LanguageRef {
            id: language_id,
            code: l.code,
            name: l.name,
        }))
    }

    async fn program_exists(
        &self,
        language_id: ObjectId,
        program_id: ObjectId,
    ) -> Result<bool, CatalogError> {
        let program = self
            .programs
            .find_for_language(program_id, language_id)
            .await?;
        Ok(program.is_some())
    }

    async fn recommended_courses(
        &self,
        language_id: ObjectId,
        level: &str,
        limit: usize,
    ) -> Result<Vec<CourseSuggestion>, CatalogError> {
        let courses = self
            .courses
            .find_published_for_level(language_id, level, limit)
            .await?;
        Ok(courses
            .into_iter()
            .filter_map(|c| {
                c.id.map(|id| CourseSuggestion {
                    course_id: id.to_hex(),
                    title: c.title,
                    level: c.level,
                })
            })
            .collect())
    }
}
