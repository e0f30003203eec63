use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::pipeline::SummaryPipeline;
use crate::utils::{format_duration, word_count};

/// Outcome of a step that may ask the user to start over
enum Step<T> {
    Ready(T),
    Retry,
    Quit,
}

enum MenuChoice {
    NewUrl,
    Exit,
}

/// Prompt-driven summarization loop
pub struct InteractiveSession<R, W> {
    pipeline: Arc<SummaryPipeline>,
    input: R,
    output: W,
    show_progress: bool,
}

impl<R, W> InteractiveSession<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(pipeline: Arc<SummaryPipeline>, input: R, output: W, show_progress: bool) -> Self {
        Self {
            pipeline,
            input,
            output,
            show_progress,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run until the user exits or input ends
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let transcript = match self.load_transcript().await? {
                Step::Ready(transcript) => transcript,
                Step::Retry => continue,
                Step::Quit => break,
            };

            let Some(max_words) = self
                .prompt_word_count("Enter the number of words for the summary: ")
                .await?
            else {
                break;
            };

            self.summarize_and_print(&transcript, max_words, "Summary").await?;

            match self.menu(&transcript).await? {
                MenuChoice::NewUrl => continue,
                MenuChoice::Exit => break,
            }
        }

        writeln!(self.output, "\n👋 Exiting... Thank you!")?;
        Ok(())
    }

    async fn load_transcript(&mut self) -> Result<Step<String>> {
        let Some(url) = self.read_line("\nEnter YouTube Video URL: ").await? else {
            return Ok(Step::Quit);
        };

        let video_id = match self.pipeline.video_id(&url) {
            Ok(id) => id,
            Err(e) => {
                writeln!(self.output, "{}", style(format!("⚠️ {}", e)).yellow())?;
                return Ok(Step::Retry);
            }
        };

        writeln!(self.output, "Fetching available languages...")?;
        match self.pipeline.available_languages(&video_id).await {
            Ok(languages) if !languages.is_empty() => {
                writeln!(self.output, "\nAvailable languages:")?;
                for (language, code) in &languages {
                    writeln!(self.output, "{} ({})", language, code)?;
                }
            }
            Ok(_) | Err(_) => {
                writeln!(self.output, "Could not retrieve available languages.")?;
            }
        }

        writeln!(self.output)?;
        let spinner = self.spinner("Fetching transcript...");
        let fetched = self.pipeline.fetch_transcript(&video_id).await;
        spinner.finish_and_clear();

        match fetched {
            Ok(transcript) => {
                writeln!(
                    self.output,
                    "\nTranscript Length: {} words",
                    word_count(&transcript)
                )?;
                Ok(Step::Ready(transcript))
            }
            Err(e) => {
                writeln!(self.output, "{}", style(e.to_string()).red())?;
                Ok(Step::Retry)
            }
        }
    }

    async fn menu(&mut self, transcript: &str) -> Result<MenuChoice> {
        loop {
            writeln!(self.output, "\n🔄 What would you like to do next?")?;
            writeln!(self.output, "1️⃣ Change word count and re-summarize")?;
            writeln!(self.output, "2️⃣ Enter a new YouTube URL")?;
            writeln!(self.output, "3️⃣ Exit")?;

            let Some(choice) = self.read_line("Enter your choice (1/2/3): ").await? else {
                return Ok(MenuChoice::Exit);
            };

            match choice.as_str() {
                "1" => {
                    let Some(max_words) = self.prompt_word_count("Enter new word count: ").await?
                    else {
                        return Ok(MenuChoice::Exit);
                    };
                    self.summarize_and_print(transcript, max_words, "Updated Summary")
                        .await?;
                }
                "2" => return Ok(MenuChoice::NewUrl),
                "3" => return Ok(MenuChoice::Exit),
                _ => writeln!(
                    self.output,
                    "{}",
                    style("⚠️ Invalid choice. Please enter 1, 2, or 3.").yellow()
                )?,
            }
        }
    }

    async fn summarize_and_print(&mut self, transcript: &str, max_words: usize, title: &str) -> Result<()> {
        let spinner = self.spinner(&format!("Summarizing with {}...", self.pipeline.model_name()));
        let started = Instant::now();
        let summarized = self.pipeline.summarize(transcript, max_words).await;
        spinner.finish_and_clear();

        match summarized {
            Ok(summary) => {
                writeln!(self.output, "\n{}", style(format!("📌 {}:", title)).bold())?;
                writeln!(self.output, "{}", summary)?;
                writeln!(self.output, "\n📏 Summary Length: {} words", word_count(&summary))?;
                tracing::debug!(
                    "Summarized in {}",
                    format_duration(started.elapsed().as_secs_f64())
                );
            }
            Err(e) => writeln!(self.output, "{}", style(e.to_string()).red())?,
        }

        Ok(())
    }

    /// Ask until a positive integer is entered; `None` when input ends
    async fn prompt_word_count(&mut self, prompt: &str) -> Result<Option<usize>> {
        loop {
            let Some(line) = self.read_line(prompt).await? else {
                return Ok(None);
            };

            match line.parse::<i64>() {
                Ok(n) if n > 0 => return Ok(Some(n as usize)),
                Ok(_) => writeln!(
                    self.output,
                    "{}",
                    style("⚠️ Please enter a positive integer.").yellow()
                )?,
                Err(_) => writeln!(
                    self.output,
                    "{}",
                    style("⚠️ Invalid input! Please enter a valid number.").yellow()
                )?,
            }
        }
    }

    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim().to_string()))
    }

    fn spinner(&self, message: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        progress.set_message(message.to_string());
        progress.enable_steady_tick(Duration::from_millis(100));
        progress
    }
}
