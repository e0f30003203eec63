//! YouTube Summarizer - summarize videos from their transcripts
//!
//! This library fetches a video's transcript, optionally translates it, and reduces it to a
//! word-bounded summary through an external summarization model. It is exposed both as an
//! HTTP service and as an interactive command-line loop.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod interactive;
pub mod output;
pub mod pipeline;
pub mod server;
pub mod summarize;
pub mod translate;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use extractors::{extract_video_id, TranscriptProvider};
pub use pipeline::{SummaryPipeline, VideoSummary};
pub use summarize::{SummarizationModel, Summarizer};
pub use translate::Translator;

/// Result type used for startup and plumbing code
pub type Result<T> = anyhow::Result<T>;

/// Result type for request-scoped operations
pub type SummaryResult<T> = std::result::Result<T, SummaryError>;

/// Error types specific to a summarization request
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SummaryError {
    #[error("No URL provided!")]
    MissingUrl,

    #[error("Invalid YouTube URL!")]
    InvalidUrl,

    #[error("max_words must be a positive integer, got {0}")]
    InvalidMaxWords(i64),

    #[error("Error: Transcripts are disabled for this video.")]
    TranscriptsDisabled,

    #[error("Error fetching transcript: {0}")]
    TranscriptUnavailable(String),

    #[error("Translation failed: {0}")]
    Translation(String),

    #[error("Summarization failed: {0}")]
    Model(String),
}

impl SummaryError {
    /// Whether the failure was caused by the caller's input or the video itself
    pub fn is_client_error(&self) -> bool {
        !matches!(self, SummaryError::Model(_) | SummaryError::Translation(_))
    }
}
