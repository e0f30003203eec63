//! HTTP service exposing the summarization pipeline

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, Method, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, Instrument};

use crate::pipeline::SummaryPipeline;
use crate::{Result, SummaryError};

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SummaryPipeline>,
    pub default_max_words: u32,
}

/// Body of `POST /summarize`
#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub url: Option<String>,
    pub max_words: Option<i64>,
}

/// Successful reply of `POST /summarize`
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummarizeResponse {
    pub summary: String,
    pub summary_length: usize,
    pub original_length: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl SummaryError {
    pub fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for SummaryError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_string())
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorResponse { error: message })).into_response()
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/summarize", post(summarize_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// Bind and serve until the process is stopped
pub async fn start_http_server(state: AppState, host: &str, port: u16) -> Result<()> {
    let address = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("🌐 Summarizer listening on http://{}", address);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "yt-summarizer",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn summarize_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SummarizeRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("summarize", %request_id);

    match summarize_request(&state, request).instrument(span).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            tracing::warn!(%request_id, "Request failed: {}", e);
            e.into_response()
        }
    }
}

async fn summarize_request(
    state: &AppState,
    request: SummarizeRequest,
) -> std::result::Result<SummarizeResponse, SummaryError> {
    let url = request
        .url
        .filter(|url| !url.is_empty())
        .ok_or(SummaryError::MissingUrl)?;

    let max_words = request
        .max_words
        .unwrap_or(i64::from(state.default_max_words));
    let max_words = usize::try_from(max_words)
        .ok()
        .filter(|n| *n > 0)
        .ok_or(SummaryError::InvalidMaxWords(max_words))?;

    info!("Summarizing {} to {} words", url, max_words);
    let result = state.pipeline.summarize_url(&url, max_words).await?;
    info!(
        "Summarized {} ({} -> {} words)",
        result.video_id, result.original_length, result.summary_length
    );

    Ok(SummarizeResponse {
        summary: result.summary,
        summary_length: result.summary_length,
        original_length: result.original_length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::MockTranscriptProvider;
    use crate::summarize::{MockSummarizationModel, Summarizer};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn state_with(provider: MockTranscriptProvider, model: MockSummarizationModel) -> AppState {
        let pipeline = SummaryPipeline::new(
            Arc::new(provider),
            None,
            Summarizer::new(Arc::new(model), 300, 40),
            "en",
        );
        AppState {
            pipeline: Arc::new(pipeline),
            default_max_words: 100,
        }
    }

    fn unused_provider() -> MockTranscriptProvider {
        let mut provider = MockTranscriptProvider::new();
        provider.expect_fetch_transcript().never();
        provider
    }

    fn unused_model() -> MockSummarizationModel {
        let mut model = MockSummarizationModel::new();
        model.expect_summarize().never();
        model
    }

    async fn post_json(state: AppState, body: &str) -> (StatusCode, serde_json::Value) {
        let response = router(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/summarize")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_url() {
        let state = state_with(unused_provider(), unused_model());
        let (status, body) = post_json(state, r#"{"max_words": 50}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No URL provided!");
    }

    #[tokio::test]
    async fn test_empty_url() {
        let state = state_with(unused_provider(), unused_model());
        let (status, body) = post_json(state, r#"{"url": ""}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No URL provided!");
    }

    #[tokio::test]
    async fn test_blank_url_is_invalid() {
        let state = state_with(unused_provider(), unused_model());
        let (status, body) = post_json(state, r#"{"url": "   "}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid YouTube URL!");
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let state = state_with(unused_provider(), unused_model());
        let (status, body) = post_json(state, r#"{"url": "https://example.com/?v=short"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid YouTube URL!");
    }

    #[tokio::test]
    async fn test_non_positive_max_words() {
        let state = state_with(unused_provider(), unused_model());
        let (status, body) = post_json(
            state,
            r#"{"url": "https://www.youtube.com/watch?v=abcdefghijk", "max_words": -5}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "max_words must be a positive integer, got -5");
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let state = state_with(unused_provider(), unused_model());
        let (status, body) = post_json(state, "{not json").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body["error"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transcript_error_never_summarizes() {
        let mut provider = MockTranscriptProvider::new();
        provider
            .expect_fetch_transcript()
            .returning(|_, _| Err(SummaryError::TranscriptsDisabled));
        provider.expect_provider_name().return_const("mock");

        let state = state_with(provider, unused_model());
        let (status, body) =
            post_json(state, r#"{"url": "https://www.youtube.com/watch?v=abcdefghijk"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Error: Transcripts are disabled for this video.");
    }

    #[tokio::test]
    async fn test_fetch_failure_message_is_forwarded() {
        let mut provider = MockTranscriptProvider::new();
        provider
            .expect_fetch_transcript()
            .returning(|_, _| Err(SummaryError::TranscriptUnavailable("HTTP 404 Not Found".to_string())));
        provider.expect_provider_name().return_const("mock");

        let state = state_with(provider, unused_model());
        let (status, body) =
            post_json(state, r#"{"url": "https://youtu.be/abcdefghijk"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Error fetching transcript: HTTP 404 Not Found");
    }

    #[tokio::test]
    async fn test_model_failure_is_server_error() {
        let mut provider = MockTranscriptProvider::new();
        provider
            .expect_fetch_transcript()
            .returning(|_, _| Ok("some transcript text".to_string()));
        provider.expect_provider_name().return_const("mock");

        let mut model = MockSummarizationModel::new();
        model
            .expect_summarize()
            .returning(|_, _| Err(SummaryError::Model("HTTP 503: loading".to_string())));

        let state = state_with(provider, model);
        let (status, body) =
            post_json(state, r#"{"url": "https://youtu.be/abcdefghijk"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Summarization failed: HTTP 503: loading");
    }

    #[tokio::test]
    async fn test_successful_summary() {
        let transcript: String = (0..650).map(|i| format!("word{} ", i)).collect();

        let mut provider = MockTranscriptProvider::new();
        provider
            .expect_fetch_transcript()
            .withf(|video_id, language| video_id == "abcdefghijk" && language == "en")
            .returning(move |_, _| Ok(transcript.clone()));
        provider.expect_provider_name().return_const("mock");

        let mut model = MockSummarizationModel::new();
        model
            .expect_summarize()
            .withf(|_, params| params.max_length == 100 && params.min_length == 40 && !params.do_sample)
            .times(3)
            .returning(|text, _| Ok(text.split_whitespace().take(40).collect::<Vec<_>>().join(" ")));

        let state = state_with(provider, model);
        let (status, body) = post_json(
            state,
            r#"{"url": "https://www.youtube.com/watch?v=abcdefghijk", "max_words": 50}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary_length"], 50);
        assert_eq!(body["original_length"], 650);
        assert_eq!(body["summary"].as_str().unwrap().split_whitespace().count(), 50);
    }

    #[tokio::test]
    async fn test_default_max_words() {
        let mut provider = MockTranscriptProvider::new();
        provider
            .expect_fetch_transcript()
            .returning(|_, _| Ok("short transcript".to_string()));
        provider.expect_provider_name().return_const("mock");

        let mut model = MockSummarizationModel::new();
        model
            .expect_summarize()
            .withf(|_, params| params.max_length == 200)
            .times(1)
            .returning(|text, _| Ok(text.to_string()));

        let state = state_with(provider, model);
        let (status, body) =
            post_json(state, r#"{"url": "https://youtu.be/abcdefghijk"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], "short transcript");
        assert_eq!(body["summary_length"], 2);
    }

    #[tokio::test]
    async fn test_index_and_health() {
        let app = router(state_with(unused_provider(), unused_model()));

        let index = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(index.status(), StatusCode::OK);

        let health = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(health.status(), StatusCode::OK);
    }
}
