use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, COOKIE};
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;

use super::{LanguageListing, TranscriptProvider};
use crate::{SummaryError, SummaryResult};

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const INNERTUBE_PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player?key=";

/// A caption track advertised by the player response
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub language_code: String,
    pub language: String,
    pub base_url: String,
    pub is_generated: bool,
}

#[derive(Debug, Deserialize)]
struct Json3Transcript {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(default)]
    segs: Option<Vec<Json3Segment>>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// Transcript provider backed by YouTube's caption tracks
pub struct YoutubeTranscriptClient {
    client: reqwest::Client,
}

impl YoutubeTranscriptClient {
    pub fn new(timeout: Duration) -> crate::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US"));
        // Skips the EU consent interstitial on the watch page
        headers.insert(COOKIE, HeaderValue::from_static("CONSENT=YES+cb"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    /// Resolve every caption track for a video
    pub async fn list_tracks(&self, video_id: &str) -> SummaryResult<Vec<CaptionTrack>> {
        let html = self.fetch_watch_page(video_id).await?;
        let api_key = extract_innertube_api_key(&html)?;
        let player = self.fetch_player_response(video_id, &api_key).await?;
        parse_caption_tracks(&player)
    }

    async fn fetch_watch_page(&self, video_id: &str) -> SummaryResult<String> {
        let url = format!("{}{}", WATCH_URL, urlencoding::encode(video_id));
        tracing::debug!("Fetching watch page: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| unavailable(format!("failed to fetch video page: {}", e)))?;

        check_status(&response)?;

        response
            .text()
            .await
            .map_err(|e| unavailable(format!("failed to read video page: {}", e)))
    }

    async fn fetch_player_response(&self, video_id: &str, api_key: &str) -> SummaryResult<Value> {
        let url = format!("{}{}", INNERTUBE_PLAYER_URL, api_key);
        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": "ANDROID",
                    "clientVersion": "20.10.38"
                }
            },
            "videoId": video_id
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| unavailable(format!("failed to query player: {}", e)))?;

        check_status(&response)?;

        response
            .json()
            .await
            .map_err(|e| unavailable(format!("unreadable player response: {}", e)))
    }

    async fn fetch_track_text(&self, track: &CaptionTrack) -> SummaryResult<String> {
        let url = json3_url(&track.base_url);
        if url.contains("&exp=xpe") {
            return Err(unavailable("this video requires a PO token"));
        }

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| unavailable(format!("failed to download captions: {}", e)))?;

        check_status(&response)?;

        let body = response
            .text()
            .await
            .map_err(|e| unavailable(format!("failed to read captions: {}", e)))?;

        Ok(parse_json3_segments(&body)?.join(" "))
    }
}

#[async_trait]
impl TranscriptProvider for YoutubeTranscriptClient {
    async fn fetch_transcript(&self, video_id: &str, language: &str) -> SummaryResult<String> {
        let tracks = self.list_tracks(video_id).await?;
        let track = select_track(&tracks, language).ok_or_else(|| {
            unavailable(format!("no transcript found for video {} in language '{}'", video_id, language))
        })?;

        tracing::debug!(
            "Using {} caption track '{}' for {}",
            if track.is_generated { "generated" } else { "manual" },
            track.language_code,
            video_id
        );

        self.fetch_track_text(track).await
    }

    async fn available_languages(&self, video_id: &str) -> SummaryResult<LanguageListing> {
        let tracks = self.list_tracks(video_id).await?;
        Ok(tracks
            .into_iter()
            .map(|track| (track.language, track.language_code))
            .collect())
    }

    fn provider_name(&self) -> &'static str {
        "YouTube"
    }
}

fn unavailable(reason: impl Into<String>) -> SummaryError {
    SummaryError::TranscriptUnavailable(reason.into())
}

fn check_status(response: &reqwest::Response) -> SummaryResult<()> {
    let status = response.status();
    if status.as_u16() == 429 {
        return Err(unavailable("too many requests, YouTube is rate limiting this IP"));
    }
    if !status.is_success() {
        return Err(unavailable(format!("HTTP {}", status)));
    }
    Ok(())
}

fn api_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).expect("api key pattern is valid")
    })
}

/// Pull the innertube API key out of the watch page
pub fn extract_innertube_api_key(html: &str) -> SummaryResult<String> {
    if html.contains("class=\"g-recaptcha\"") {
        return Err(unavailable("requests are being blocked by YouTube (captcha)"));
    }

    api_key_pattern()
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| unavailable("could not parse the video page"))
}

/// Read the caption tracks out of an innertube player response
pub fn parse_caption_tracks(player: &Value) -> SummaryResult<Vec<CaptionTrack>> {
    if let Some(playability) = player.get("playabilityStatus") {
        let status = playability.get("status").and_then(Value::as_str).unwrap_or("OK");
        if status != "OK" {
            let reason = playability
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or("video is unplayable");
            return Err(unavailable(format!("{} ({})", reason, status)));
        }
    }

    let renderer = player
        .get("captions")
        .and_then(|c| c.get("playerCaptionsTracklistRenderer"))
        .ok_or(SummaryError::TranscriptsDisabled)?;

    let tracks: Vec<CaptionTrack> = renderer
        .get("captionTracks")
        .and_then(Value::as_array)
        .map(|tracks| tracks.iter().filter_map(parse_track).collect())
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(SummaryError::TranscriptsDisabled);
    }

    Ok(tracks)
}

fn parse_track(caption: &Value) -> Option<CaptionTrack> {
    let language_code = caption.get("languageCode")?.as_str()?.to_string();
    let base_url = caption.get("baseUrl")?.as_str()?.to_string();

    let language = caption
        .get("name")
        .and_then(|name| {
            name.get("simpleText").and_then(Value::as_str).or_else(|| {
                name.get("runs")
                    .and_then(Value::as_array)
                    .and_then(|runs| runs.first())
                    .and_then(|run| run.get("text"))
                    .and_then(Value::as_str)
            })
        })
        .unwrap_or(&language_code)
        .to_string();

    let is_generated = caption.get("kind").and_then(Value::as_str) == Some("asr");

    Some(CaptionTrack {
        language_code,
        language,
        base_url,
        is_generated,
    })
}

/// Pick the track for a language, preferring manually created captions
pub fn select_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    tracks
        .iter()
        .find(|t| t.language_code == language && !t.is_generated)
        .or_else(|| tracks.iter().find(|t| t.language_code == language))
}

fn json3_url(base_url: &str) -> String {
    let stripped = base_url
        .replace("&fmt=srv3", "")
        .replace("&fmt=json3", "");
    format!("{}&fmt=json3", stripped)
}

/// Segment texts of a json3 caption document, timing discarded
pub fn parse_json3_segments(body: &str) -> SummaryResult<Vec<String>> {
    let transcript: Json3Transcript = serde_json::from_str(body)
        .map_err(|e| unavailable(format!("unreadable caption data: {}", e)))?;

    Ok(transcript
        .events
        .into_iter()
        .filter_map(|event| event.segs)
        .map(|segs| segs.into_iter().map(|s| s.utf8).collect::<String>())
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
        .collect())
}
