use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::utils::split_on_words;
use crate::{SummaryError, SummaryResult};

/// Longest piece sent in one translation request
const MAX_REQUEST_CHARS: usize = 4500;

/// Translates text into a target language
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_language`, detecting the source language
    async fn translate(&self, text: &str, target_language: &str) -> SummaryResult<String>;
}

/// Translator backed by the public Google Translate endpoint
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> crate::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    async fn translate_piece(&self, piece: &str, target_language: &str) -> SummaryResult<String> {
        let url = Url::parse_with_params(
            &self.endpoint,
            &[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target_language),
                ("dt", "t"),
                ("q", piece),
            ],
        )
        .map_err(|e| SummaryError::Translation(format!("invalid endpoint: {}", e)))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SummaryError::Translation(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SummaryError::Translation(format!("HTTP {}", response.status())));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SummaryError::Translation(e.to_string()))?;

        parse_translation(&body)
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> SummaryResult<String> {
        let mut translated = Vec::new();
        for piece in split_on_words(text, MAX_REQUEST_CHARS) {
            translated.push(self.translate_piece(&piece, target_language).await?);
        }
        Ok(translated.join(" "))
    }
}

/// Join the sentence fragments of a `translate_a/single` response
pub fn parse_translation(body: &Value) -> SummaryResult<String> {
    let sentences = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| SummaryError::Translation("unexpected response shape".to_string()))?;

    Ok(sentences
        .iter()
        .filter_map(|sentence| sentence.get(0).and_then(Value::as_str))
        .collect::<String>()
        .trim()
        .to_string())
}
