use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::SummarizerConfig;
use crate::utils::truncate_words;
use crate::{SummaryError, SummaryResult};

pub mod cache;
pub mod huggingface;

pub use cache::ModelArtifact;
pub use huggingface::HuggingFaceModel;

/// Length bounds passed to the model for every chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Upper bound on output length
    pub max_length: u32,

    /// Lower bound on output length
    pub min_length: u32,

    /// Sampling decode; always false so output is deterministic
    pub do_sample: bool,
}

impl GenerationParams {
    /// Bounds for a summary of `max_words` words
    pub fn for_budget(max_words: usize, min_length: u32) -> Self {
        let max_length = u32::try_from(max_words.saturating_mul(2)).unwrap_or(u32::MAX);
        Self {
            max_length,
            min_length: min_length.min(max_length),
            do_sample: false,
        }
    }
}

/// External model that shortens a piece of text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SummarizationModel: Send + Sync {
    /// Summarize one chunk of text within the given bounds
    async fn summarize(&self, text: &str, params: &GenerationParams) -> SummaryResult<String>;

    /// Identifier of the underlying model
    fn model_name(&self) -> String;
}

/// Lazy iterator over fixed-size windows of whitespace-delimited words
pub struct WordChunks<'a> {
    words: Vec<&'a str>,
    position: usize,
    size: usize,
}

impl<'a> Iterator for WordChunks<'a> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.words.len() {
            return None;
        }

        let end = (self.position + self.size).min(self.words.len());
        let chunk = self.words[self.position..end].join(" ");
        self.position = end;
        Some(chunk)
    }
}

/// Split text into windows of `size` words; the last window may be shorter
pub fn chunk_words(text: &str, size: usize) -> WordChunks<'_> {
    WordChunks {
        words: text.split_whitespace().collect(),
        position: 0,
        size: size.max(1),
    }
}

/// Chunk-and-summarize driver around a shared model
pub struct Summarizer {
    model: Arc<dyn SummarizationModel>,
    chunk_size: usize,
    min_length: u32,
    // The model's thread-safety is unknown, so requests take turns
    gate: Mutex<()>,
}

impl Summarizer {
    pub fn new(model: Arc<dyn SummarizationModel>, chunk_size: usize, min_length: u32) -> Self {
        Self {
            model,
            chunk_size,
            min_length,
            gate: Mutex::new(()),
        }
    }

    pub fn from_config(model: Arc<dyn SummarizationModel>, config: &SummarizerConfig) -> Self {
        Self::new(model, config.chunk_size, config.min_length)
    }

    pub fn model_name(&self) -> String {
        self.model.model_name()
    }

    /// Summarize a transcript to at most `max_words` words
    pub async fn summarize(&self, transcript: &str, max_words: usize) -> SummaryResult<String> {
        if max_words == 0 {
            return Err(SummaryError::InvalidMaxWords(0));
        }

        if transcript.trim().is_empty() {
            tracing::debug!("Empty transcript, skipping the model");
            return Ok(String::new());
        }

        let params = GenerationParams::for_budget(max_words, self.min_length);
        let _guard = self.gate.lock().await;

        let mut summaries = Vec::new();
        for (index, chunk) in chunk_words(transcript, self.chunk_size).enumerate() {
            tracing::debug!("Summarizing chunk {} ({} chars)", index + 1, chunk.len());
            summaries.push(self.model.summarize(&chunk, &params).await?);
        }

        let combined = summaries.join(" ");
        Ok(truncate_words(&combined, max_words))
    }
}
