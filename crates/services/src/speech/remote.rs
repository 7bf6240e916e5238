use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use linguaflow_config::EvaluatorSettings;
use serde::Serialize;

use super::{Evaluation, EvaluatorError, SpeechEvaluator};
use crate::questions::Question;

/// HTTP client for the pronunciation-scoring backend.
pub struct RemoteSpeechEvaluator {
    settings: EvaluatorSettings,
    client: reqwest::Client,
}

impl RemoteSpeechEvaluator {
    pub fn new(settings: EvaluatorSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { settings, client }
    }
}

#[derive(Debug, Serialize)]
struct EvaluateRequest<'a> {
    language: &'a str,
    question_number: u32,
    prompt: &'a str,
    reference_text: Option<&'a str>,
    expected_tokens: &'a [String],
    audio_base64: String,
}

#[async_trait]
impl SpeechEvaluator for RemoteSpeechEvaluator {
    async fn evaluate(
        &self,
        language_code: &str,
        question: &Question,
        audio: &[u8],
    ) -> Result<Evaluation, EvaluatorError> {
        let url = format!("{}/v1/evaluate", self.settings.base_url);
        let response = self
            .client
            .post(&url)
            .json(&EvaluateRequest {
                language: language_code,
                question_number: question.number,
                prompt: &question.prompt,
                reference_text: question.reference_text.as_deref(),
                expected_tokens: &question.expected_tokens,
                audio_base64: BASE64.encode(audio),
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EvaluatorError::Timeout
                } else {
                    EvaluatorError::Backend(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(EvaluatorError::Backend(format!(
                "scoring backend returned {}",
                response.status()
            )));
        }

        response
            .json::<Evaluation>()
            .await
            .map_err(|e| EvaluatorError::Backend(e.to_string()))
    }
}
