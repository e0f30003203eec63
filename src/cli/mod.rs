use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "yt-summarizer",
    about = "YouTube Summarizer - Summarize videos from their transcripts",
    version,
    long_about = "Fetches a YouTube video's transcript, optionally translates it, and produces a word-bounded summary using a Hugging Face summarization model. Runs as an HTTP service or an interactive prompt."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Hugging Face API token
    #[arg(long, global = true, env = "HF_API_TOKEN", hide_env_values = true)]
    pub hf_token: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP service
    Serve {
        /// Address to bind (defaults to the configured host)
        #[arg(long, value_name = "HOST")]
        host: Option<String>,

        /// Port to listen on (defaults to the configured port)
        #[arg(short, long, value_name = "PORT")]
        port: Option<u16>,
    },

    /// Summarize videos interactively
    Interactive,

    /// Summarize a single video and exit
    Summarize {
        /// YouTube video URL
        #[arg(value_name = "URL")]
        url: String,

        /// Maximum number of words in the summary
        #[arg(short, long, value_name = "COUNT", value_parser = clap::value_parser!(u32).range(1..))]
        max_words: Option<u32>,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show or create the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON with length metadata
    Json,
}
