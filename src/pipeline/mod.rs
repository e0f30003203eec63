use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::extractors::{extract_video_id, LanguageListing, TranscriptProvider, YoutubeTranscriptClient};
use crate::summarize::{cache, HuggingFaceModel, Summarizer};
use crate::translate::{GoogleTranslator, Translator};
use crate::utils::word_count;
use crate::{Result, SummaryError, SummaryResult};

/// Summary of one video with length metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSummary {
    /// Video identifier extracted from the URL
    pub video_id: String,

    /// The summary text
    pub summary: String,

    /// Words in the summary
    pub summary_length: usize,

    /// Words in the transcript that was summarized
    pub original_length: usize,
}

/// Translation step applied to fetched transcripts
pub struct TranslationStep {
    translator: Arc<dyn Translator>,
    target_language: String,
}

impl TranslationStep {
    pub fn new(translator: Arc<dyn Translator>, target_language: impl Into<String>) -> Self {
        Self {
            translator,
            target_language: target_language.into(),
        }
    }
}

/// URL to summary flow with all collaborators injected
pub struct SummaryPipeline {
    transcripts: Arc<dyn TranscriptProvider>,
    translation: Option<TranslationStep>,
    summarizer: Summarizer,
    language: String,
}

impl SummaryPipeline {
    pub fn new(
        transcripts: Arc<dyn TranscriptProvider>,
        translation: Option<TranslationStep>,
        summarizer: Summarizer,
        language: impl Into<String>,
    ) -> Self {
        Self {
            transcripts,
            translation,
            summarizer,
            language: language.into(),
        }
    }

    /// Build the production pipeline: YouTube captions, optional Google translation and the
    /// Hugging Face model described by the cached artifact
    pub fn from_config(config: &Config) -> Result<Self> {
        let transcripts = YoutubeTranscriptClient::new(Duration::from_secs(
            config.transcript.request_timeout_secs,
        ))?;

        let model_config = &config.summarizer.model;
        let artifact = cache::load_or_create(&config.model_cache_path(), model_config);
        let model = HuggingFaceModel::new(
            &artifact,
            model_config.api_token.clone(),
            Duration::from_secs(model_config.request_timeout_secs),
        )?;

        if model_config.api_token.is_none() {
            tracing::warn!("No Hugging Face API token configured; requests may be rate limited");
        }

        let translation = if config.translation.enabled {
            let translator = GoogleTranslator::new(
                config.translation.endpoint.clone(),
                Duration::from_secs(config.transcript.request_timeout_secs),
            )?;
            Some(TranslationStep::new(
                Arc::new(translator),
                config.translation.target_language.clone(),
            ))
        } else {
            None
        };

        tracing::info!(
            "Pipeline ready (model: {}, chunk size: {}, translation: {})",
            artifact.model_id,
            config.summarizer.chunk_size,
            translation.is_some()
        );

        Ok(Self::new(
            Arc::new(transcripts),
            translation,
            Summarizer::from_config(Arc::new(model), &config.summarizer),
            config.transcript.language.clone(),
        ))
    }

    /// Extract the video identifier or fail with `InvalidUrl`
    pub fn video_id(&self, url: &str) -> SummaryResult<String> {
        extract_video_id(url).ok_or(SummaryError::InvalidUrl)
    }

    pub fn model_name(&self) -> String {
        self.summarizer.model_name()
    }

    pub async fn available_languages(&self, video_id: &str) -> SummaryResult<LanguageListing> {
        self.transcripts.available_languages(video_id).await
    }

    /// Fetch the transcript, translating it when translation is enabled.
    ///
    /// A failed translation falls back to the untranslated transcript.
    pub async fn fetch_transcript(&self, video_id: &str) -> SummaryResult<String> {
        tracing::info!(
            "Fetching {} transcript for {} from {}",
            self.language,
            video_id,
            self.transcripts.provider_name()
        );
        let transcript = self.transcripts.fetch_transcript(video_id, &self.language).await?;

        let Some(step) = &self.translation else {
            return Ok(transcript);
        };

        match step.translator.translate(&transcript, &step.target_language).await {
            Ok(translated) => Ok(translated),
            Err(e) => {
                tracing::warn!("{}; summarizing the untranslated transcript", e);
                Ok(transcript)
            }
        }
    }

    pub async fn summarize(&self, transcript: &str, max_words: usize) -> SummaryResult<String> {
        self.summarizer.summarize(transcript, max_words).await
    }

    /// Run the whole flow for one URL
    pub async fn summarize_url(&self, url: &str, max_words: usize) -> SummaryResult<VideoSummary> {
        if url.is_empty() {
            return Err(SummaryError::MissingUrl);
        }
        if max_words == 0 {
            return Err(SummaryError::InvalidMaxWords(0));
        }

        let video_id = self.video_id(url)?;
        let transcript = self.fetch_transcript(&video_id).await?;
        let summary = self.summarize(&transcript, max_words).await?;

        Ok(VideoSummary {
            video_id,
            summary_length: word_count(&summary),
            original_length: word_count(&transcript),
            summary,
        })
    }
}
