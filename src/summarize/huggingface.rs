use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{GenerationParams, ModelArtifact, SummarizationModel};
use crate::{SummaryError, SummaryResult};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Summaries(Vec<SummaryOutput>),
    Failure { error: String },
}

#[derive(Debug, Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

/// Summarization model served by the Hugging Face inference API
pub struct HuggingFaceModel {
    client: reqwest::Client,
    api_url: String,
    api_token: Option<String>,
    model_id: String,
}

impl HuggingFaceModel {
    pub fn new(artifact: &ModelArtifact, api_token: Option<String>, timeout: Duration) -> crate::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_url: artifact.api_url(),
            api_token,
            model_id: artifact.model_id.clone(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl SummarizationModel for HuggingFaceModel {
    async fn summarize(&self, text: &str, params: &GenerationParams) -> SummaryResult<String> {
        let mut request = self.client.post(&self.api_url).json(&serde_json::json!({
            "inputs": text,
            "parameters": {
                "max_length": params.max_length,
                "min_length": params.min_length,
                "do_sample": params.do_sample
            },
            "options": {
                "wait_for_model": true
            }
        }));

        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SummaryError::Model(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SummaryError::Model(e.to_string()))?;

        parse_inference_response(status.as_u16(), &body)
    }

    fn model_name(&self) -> String {
        self.model_id.clone()
    }
}

/// Interpret an inference API reply
pub fn parse_inference_response(status: u16, body: &str) -> SummaryResult<String> {
    match serde_json::from_str::<InferenceResponse>(body) {
        Ok(InferenceResponse::Summaries(outputs)) => outputs
            .into_iter()
            .next()
            .map(|output| output.summary_text.trim().to_string())
            .ok_or_else(|| SummaryError::Model("no summary generated".to_string())),
        Ok(InferenceResponse::Failure { error }) => {
            Err(SummaryError::Model(format!("HTTP {}: {}", status, error)))
        }
        Err(_) => Err(SummaryError::Model(format!(
            "HTTP {}: unexpected response: {}",
            status,
            body.chars().take(200).collect::<String>()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_summary() {
        let body = r#"[{"summary_text": " The video covers Rust ownership. "}]"#;
        assert_eq!(
            parse_inference_response(200, body).unwrap(),
            "The video covers Rust ownership."
        );
    }

    #[test]
    fn test_parse_error_payload() {
        let body = r#"{"error": "Model is currently loading", "estimated_time": 20.0}"#;
        assert_eq!(
            parse_inference_response(503, body),
            Err(SummaryError::Model("HTTP 503: Model is currently loading".to_string()))
        );
    }

    #[test]
    fn test_parse_empty_list() {
        assert!(matches!(parse_inference_response(200, "[]"), Err(SummaryError::Model(_))));
    }

    #[test]
    fn test_parse_garbage() {
        let err = parse_inference_response(502, "<html>Bad Gateway</html>").unwrap_err();
        assert!(err.to_string().contains("HTTP 502"));
    }

    #[test]
    fn test_api_url_from_artifact() {
        let artifact = ModelArtifact::new(
            "https://api-inference.huggingface.co/models/",
            "facebook/bart-large-cnn",
        );
        let model = HuggingFaceModel::new(&artifact, None, Duration::from_secs(5)).unwrap();
        assert_eq!(
            model.api_url(),
            "https://api-inference.huggingface.co/models/facebook/bart-large-cnn"
        );
        assert_eq!(model.model_name(), "facebook/bart-large-cnn");
    }
}
