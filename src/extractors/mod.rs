use async_trait::async_trait;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub mod youtube;

pub use youtube::YoutubeTranscriptClient;

use crate::SummaryResult;

/// Human-readable language name mapped to its caption language code
pub type LanguageListing = BTreeMap<String, String>;

/// Source of video transcripts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch the transcript as one string, caption segments joined by single spaces
    async fn fetch_transcript(&self, video_id: &str, language: &str) -> SummaryResult<String>;

    /// List the caption languages available for a video
    async fn available_languages(&self, video_id: &str) -> SummaryResult<LanguageListing>;

    /// Get the name of this provider
    fn provider_name(&self) -> &'static str;
}

fn video_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11}).*").expect("video id pattern is valid")
    })
}

/// Extract the 11-character video identifier that follows `v=` or a `/`
pub fn extract_video_id(url: &str) -> Option<String> {
    video_id_pattern()
        .captures(url)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}
