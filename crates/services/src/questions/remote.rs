use std::time::Duration;

use async_trait::async_trait;
use linguaflow_config::QuestionSourceSettings;
use serde::{Deserialize, Serialize};

use super::{Question, QuestionSource, QuestionSourceError};

/// HTTP client for the question-generation backend.
pub struct RemoteQuestionSource {
    settings: QuestionSourceSettings,
    client: reqwest::Client,
}

impl RemoteQuestionSource {
    pub fn new(settings: QuestionSourceSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { settings, client }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    language: &'a str,
    program_id: Option<&'a str>,
    count: usize,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    questions: Vec<Question>,
}

#[async_trait]
impl QuestionSource for RemoteQuestionSource {
    async fn generate(
        &self,
        language_code: &str,
        program_id: Option<&str>,
        count: usize,
    ) -> Result<Vec<Question>, QuestionSourceError> {
        let url = format!("{}/v1/questions/generate", self.settings.base_url);
        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest {
                language: language_code,
                program_id,
                count,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    QuestionSourceError::Timeout
                } else {
                    QuestionSourceError::Backend(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(QuestionSourceError::Backend(format!(
                "generation backend returned {}",
                response.status()
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| QuestionSourceError::Backend(e.to_string()))?;
        Ok(body.questions)
    }
}
