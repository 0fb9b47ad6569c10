use axum::{
    body::Bytes,
    extract::State,
    http::{header, header::InvalidHeaderValue, HeaderMap, HeaderValue},
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{analyze, ApiError};
use crate::config::Config;
use crate::providers::InferenceProvider;
use crate::types::{AnalysisRequest, AnalysisResponse};

pub struct AppState {
    pub provider: Arc<dyn InferenceProvider>,
}

impl AppState {
    pub fn new(provider: Arc<dyn InferenceProvider>) -> Self {
        Self { provider }
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid CORS origin: {0}")]
    Cors(#[from] InvalidHeaderValue),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(std::io::Error),
}

pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let request = parse_request(&headers, &body).map_err(|err| {
        tracing::info!(error = %err, "Rejected analysis request body");
        err
    })?;

    tracing::info!(
        provider = state.provider.provider_name(),
        document_chars = request.document_text.chars().count(),
        "Received analysis request"
    );

    let response = analyze(request, state.provider.as_ref())
        .await
        .map_err(|e| {
            let err = ApiError::from(e);
            tracing::error!(kind = err.kind(), error = %err, "Analysis failed");
            err
        })?;

    Ok(Json(response))
}

/// Decodes the body as JSON when the content type is JSON or absent. Any
/// other declared content type is rejected.
fn parse_request(headers: &HeaderMap, body: &[u8]) -> Result<AnalysisRequest, ApiError> {
    if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
        if !is_json_content_type(content_type) {
            return Err(ApiError::ClientInput(
                "Expected request with `Content-Type: application/json`".to_string(),
            ));
        }
    }

    serde_json::from_slice(body)
        .map_err(|e| ApiError::ClientInput(format!("Invalid request body: {}", e)))
}

fn is_json_content_type(value: &HeaderValue) -> bool {
    let Ok(value) = value.to_str() else {
        return false;
    };
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Allows one origin, with credentials, mirroring whatever method and headers
/// the preflight asks for. Requests from other origins get no
/// `access-control-allow-origin` header back.
pub fn build_cors(origin: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    let origin: HeaderValue = origin.parse()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

pub fn create_router(state: Arc<AppState>, cors_origin: &str) -> Result<Router, ServerError> {
    let cors = build_cors(cors_origin)?;

    Ok(Router::new()
        .route("/api/analyze", post(analyze_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

pub async fn run_server(
    config: Config,
    provider: Arc<dyn InferenceProvider>,
) -> Result<(), ServerError> {
    let state = Arc::new(AppState::new(provider));
    let app = create_router(state, &config.cors_origin)?;

    let addr = config.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    tracing::info!(%addr, cors_origin = %config.cors_origin, "Server listening");

    axum::serve(listener, app).await.map_err(ServerError::Serve)
}
