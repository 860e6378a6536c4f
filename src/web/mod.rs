// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! REST services: caption generation and hashtag generation

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::pipeline::{ContentPipeline, ContentRequest, ContentResult};
use crate::platform::Platform;
use crate::{AppConfig, CaptionsError, ErrorKind};

/// Most requests accepted by one batch call
pub const MAX_BATCH: usize = 10;

/// Shared application state
pub struct AppState {
    pub pipeline: ContentPipeline,
}

impl AppState {
    pub fn new(pipeline: ContentPipeline) -> Arc<Self> {
        Arc::new(Self { pipeline })
    }
}

/// Router of the caption service
pub fn caption_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(caption_index))
        .route("/health", get(caption_health))
        .route("/captions/generate", post(generate_caption))
        .route("/captions/multi", post(generate_multi))
        .route("/captions/batch", post(generate_batch))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Router of the hashtag service
pub fn hashtag_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(hashtag_index))
        .route("/health", get(hashtag_health))
        .route("/hashtags/generate", post(generate_hashtags))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// HTTP status for a result's error kind
pub fn status_for(kind: Option<ErrorKind>) -> StatusCode {
    match kind {
        None => StatusCode::OK,
        Some(ErrorKind::InvalidInputError) => StatusCode::BAD_REQUEST,
        Some(ErrorKind::ProviderError) => StatusCode::BAD_GATEWAY,
        Some(ErrorKind::ConfigurationError) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    error_kind: ErrorKind,
}

fn bad_request(message: impl Into<String>) -> Response {
    let body = ErrorBody {
        success: false,
        error: message.into(),
        error_kind: ErrorKind::InvalidInputError,
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn result_response(result: ContentResult) -> Response {
    (status_for(result.error_kind), Json(result)).into_response()
}

// === Service info ===

async fn caption_index() -> Json<serde_json::Value> {
    Json(json!({
        "service": "CaptionsAI Caption Service",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ["/health", "/captions/generate", "/captions/multi", "/captions/batch"],
    }))
}

async fn hashtag_index() -> Json<serde_json::Value> {
    Json(json!({
        "service": "CaptionsAI Hashtag Service",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ["/health", "/hashtags/generate"],
    }))
}

async fn caption_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    health(&state, "caption")
}

async fn hashtag_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    health(&state, "hashtag")
}

fn health(state: &AppState, service: &str) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": service,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now(),
        "supported_platforms": state.pipeline.config().platforms.supported,
    }))
}

// === Generation ===

async fn generate_caption(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ContentRequest>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(request)) => result_response(state.pipeline.generate(&request).await),
        Err(e) => bad_request(e.body_text()),
    }
}

async fn generate_hashtags(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ContentRequest>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(request)) => result_response(state.pipeline.generate_hashtags(&request).await),
        Err(e) => bad_request(e.body_text()),
    }
}

#[derive(Deserialize)]
struct MultiRequest {
    #[serde(flatten)]
    request: ContentRequest,
    platforms: Vec<Platform>,
}

#[derive(Serialize)]
struct MultiResponse {
    success: bool,
    results: BTreeMap<String, ContentResult>,
}

async fn generate_multi(
    State(state): State<Arc<AppState>>,
    body: Result<Json<MultiRequest>, JsonRejection>,
) -> Response {
    let multi = match body {
        Ok(Json(multi)) => multi,
        Err(e) => return bad_request(e.body_text()),
    };
    if multi.platforms.is_empty() {
        return bad_request("at least one platform is required");
    }

    let results = state.pipeline.generate_multi(&multi.request, &multi.platforms).await;
    let success = results.values().any(|r| r.success);
    Json(MultiResponse { success, results }).into_response()
}

#[derive(Deserialize)]
struct BatchRequest {
    requests: Vec<ContentRequest>,
}

#[derive(Serialize)]
struct BatchResponse {
    total: usize,
    succeeded: usize,
    results: Vec<ContentResult>,
}

async fn generate_batch(
    State(state): State<Arc<AppState>>,
    body: Result<Json<BatchRequest>, JsonRejection>,
) -> Response {
    let batch = match body {
        Ok(Json(batch)) => batch,
        Err(e) => return bad_request(e.body_text()),
    };
    if batch.requests.is_empty() {
        return bad_request("batch contains no requests");
    }
    if batch.requests.len() > MAX_BATCH {
        return bad_request(format!(
            "batch of {} exceeds the limit of {} requests",
            batch.requests.len(),
            MAX_BATCH
        ));
    }

    let mut results = Vec::with_capacity(batch.requests.len());
    for request in &batch.requests {
        results.push(state.pipeline.generate(request).await);
    }

    let succeeded = results.iter().filter(|r| r.success).count();
    info!("Batch finished: {}/{} succeeded", succeeded, results.len());

    Json(BatchResponse {
        total: results.len(),
        succeeded,
        results,
    })
    .into_response()
}

// === Servers ===

async fn serve(router: Router, host: &str, port: u16) -> crate::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Listening on http://{}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| CaptionsError::Configuration(format!("Server error: {}", e)))?;

    Ok(())
}

/// Start the caption service on the configured host and caption port
pub async fn start_caption_server(config: AppConfig) -> crate::Result<()> {
    let host = config.web.host.clone();
    let port = config.web.caption_port;
    let state = AppState::new(ContentPipeline::from_config(config)?);
    serve(caption_router(state), &host, port).await
}

/// Start the hashtag service on the configured host and hashtag port
pub async fn start_hashtag_server(config: AppConfig) -> crate::Result<()> {
    let host = config.web.host.clone();
    let port = config.web.hashtag_port;
    let state = AppState::new(ContentPipeline::from_config(config)?);
    serve(hashtag_router(state), &host, port).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::VisionProvider;
    use crate::trending::CuratedTrending;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use std::io::Write;
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct StubProvider {
        fail: bool,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl VisionProvider for StubProvider {
        async fn describe_image(&self, _prompt: &str, _image: &str) -> crate::Result<String> {
            if self.fail {
                return Err(CaptionsError::Provider {
                    status: Some(429),
                    message: "rate limit exceeded".to_string(),
                });
            }
            Ok("a plate of pasta on a wooden table".to_string())
        }

        async fn generate_text(&self, prompt: &str) -> crate::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(r#"{"caption": "Pasta night is the best night. What's on your plate?"}"#.to_string())
        }
    }

    fn state(fail: bool) -> Arc<AppState> {
        state_with(Arc::new(StubProvider { fail, ..StubProvider::default() }))
    }

    fn state_with(provider: Arc<StubProvider>) -> Arc<AppState> {
        let pipeline = ContentPipeline::new(AppConfig::default(), provider, Arc::new(CuratedTrending));
        AppState::new(pipeline)
    }

    fn image() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        file.write_all(b"not really a jpeg").unwrap();
        file
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = caption_router(state(false))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "caption");
    }

    #[tokio::test]
    async fn test_generate_caption() {
        let file = image();
        let response = caption_router(state(false))
            .oneshot(post_json("/captions/generate", json!({ "image_path": file.path() })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["post"]["category"], "lifestyle");
        assert_eq!(body["post"]["platform"], "instagram");
    }

    #[tokio::test]
    async fn test_personalization_fields_reach_prompt() {
        let file = image();
        let provider = Arc::new(StubProvider::default());
        let response = caption_router(state_with(provider.clone()))
            .oneshot(post_json(
                "/captions/generate",
                json!({
                    "image_path": file.path(),
                    "brand_voice": "playful",
                    "industry": "restaurant",
                    "brand_keywords": ["handmade"],
                    "occasion": "date night",
                    "content_goal": "sales",
                    "mood": "romantic"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let prompts = provider.prompts.lock().unwrap();
        let prompt = prompts.first().expect("caption prompt");
        assert!(prompt.contains("- Brand Voice: playful"));
        assert!(prompt.contains("- Industry: restaurant"));
        assert!(prompt.contains("- Include Keywords: handmade"));
        assert!(prompt.contains("- Occasion: date night"));
        assert!(prompt.contains("- Goal: sales"));
        assert!(prompt.contains("- Desired Mood: romantic"));
    }

    #[tokio::test]
    async fn test_missing_image_is_bad_request() {
        let response = caption_router(state(false))
            .oneshot(post_json("/captions/generate", json!({ "image_path": "/no/such/photo.jpg" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error_kind"], "InvalidInputError");
    }

    #[tokio::test]
    async fn test_provider_failure_is_bad_gateway() {
        let file = image();
        let response = caption_router(state(true))
            .oneshot(post_json("/captions/generate", json!({ "image_path": file.path() })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error_kind"], "ProviderError");
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let response = caption_router(state(false))
            .oneshot(post_json("/captions/generate", json!({ "platform": "instagram" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_batch_limit() {
        let requests: Vec<serde_json::Value> = (0..=MAX_BATCH)
            .map(|i| json!({ "image_path": format!("/tmp/{}.jpg", i) }))
            .collect();
        let response = caption_router(state(false))
            .oneshot(post_json("/captions/batch", json!({ "requests": requests })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_multi_platform() {
        let file = image();
        let response = caption_router(state(false))
            .oneshot(post_json(
                "/captions/multi",
                json!({ "image_path": file.path(), "platforms": ["instagram", "facebook"] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["results"]["instagram"]["success"], true);
        assert_eq!(body["results"]["facebook"]["success"], true);
        let facebook_tags = body["results"]["facebook"]["post"]["hashtags"].as_array().unwrap();
        assert!(facebook_tags.len() <= 10);
    }

    #[tokio::test]
    async fn test_hashtag_service() {
        let file = image();
        let response = hashtag_router(state(false))
            .oneshot(post_json(
                "/hashtags/generate",
                json!({ "image_path": file.path(), "platform": "facebook" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["post"]["caption"], "");
        assert!(!body["post"]["hashtags"].as_array().unwrap().is_empty());
    }
}
