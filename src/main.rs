use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yt_summarizer::cli::{Cli, Commands};
use yt_summarizer::config::Config;
use yt_summarizer::interactive::InteractiveSession;
use yt_summarizer::output;
use yt_summarizer::pipeline::SummaryPipeline;
use yt_summarizer::server::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "yt_summarizer=debug,tower_http=debug"
    } else {
        "yt_summarizer=info,tower_http=info"
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load(cli.config.as_deref())
        .await?
        .with_api_token(cli.hf_token.clone());

    match cli.command {
        Commands::Serve { host, port } => {
            let pipeline = SummaryPipeline::from_config(&config)?;
            let state = AppState {
                pipeline: Arc::new(pipeline),
                default_max_words: config.summarizer.default_max_words,
            };

            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            server::start_http_server(state, &host, port).await?;
        }
        Commands::Interactive => {
            let pipeline = Arc::new(SummaryPipeline::from_config(&config)?);
            let input = tokio::io::BufReader::new(tokio::io::stdin());

            let mut session = InteractiveSession::new(pipeline, input, std::io::stdout(), !cli.quiet);
            session.run().await?;
        }
        Commands::Summarize {
            url,
            max_words,
            output,
            format,
        } => {
            let pipeline = SummaryPipeline::from_config(&config)?;
            let max_words = max_words.unwrap_or(config.summarizer.default_max_words) as usize;

            tracing::info!("Summarizing {} to at most {} words", url, max_words);

            let result = pipeline.summarize_url(&url, max_words).await?;

            match output {
                Some(path) => {
                    output::save_to_file(&result, &path, &format).await?;
                    println!("Summary saved to: {}", path.display());
                }
                None => {
                    output::print_to_console(&result, &format)?;
                }
            }
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                let path = match cli.config {
                    Some(path) => path,
                    None => Config::config_path()?,
                };
                println!("Configuration file: {}", path.display());
                println!("Edit it to change the model, chunk size or server settings.");
            }
        }
    }

    Ok(())
}
