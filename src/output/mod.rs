use anyhow::Result;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::pipeline::VideoSummary;

/// Render a summary in the requested format
pub fn format_summary(result: &VideoSummary, format: &OutputFormat) -> Result<String> {
    let content = match format {
        OutputFormat::Text => format_as_text(result),
        OutputFormat::Json => serde_json::to_string_pretty(result)?,
    };
    Ok(content)
}

fn format_as_text(result: &VideoSummary) -> String {
    format!(
        "{}\n\nSummary Length: {} words\nOriginal Length: {} words\n",
        result.summary, result.summary_length, result.original_length
    )
}

/// Save summary to file
pub async fn save_to_file(result: &VideoSummary, path: &Path, format: &OutputFormat) -> Result<()> {
    let content = format_summary(result, format)?;
    fs_err::write(path, content)?;
    Ok(())
}

/// Print summary to console
pub fn print_to_console(result: &VideoSummary, format: &OutputFormat) -> Result<()> {
    let content = format_summary(result, format)?;
    println!("{}", content);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VideoSummary {
        VideoSummary {
            video_id: "abcdefghijk".to_string(),
            summary: "A short summary.".to_string(),
            summary_length: 3,
            original_length: 1200,
        }
    }

    #[test]
    fn test_text_format() {
        let text = format_summary(&sample(), &OutputFormat::Text).unwrap();
        assert!(text.starts_with("A short summary.\n"));
        assert!(text.contains("Summary Length: 3 words"));
        assert!(text.contains("Original Length: 1200 words"));
    }

    #[test]
    fn test_json_format() {
        let json = format_summary(&sample(), &OutputFormat::Json).unwrap();
        let parsed: VideoSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample());
    }

    #[tokio::test]
    async fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.txt");

        save_to_file(&sample(), &path, &OutputFormat::Text).await.unwrap();

        assert!(fs_err::read_to_string(&path).unwrap().contains("A short summary."));
    }
}
