mod chat;
mod eli5;
mod fomo;
mod stock;
mod stoic;

use axum::{
    body::Body,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures_util::TryStreamExt;
use kirboreo_core::domain::message::Message;
use kirboreo_core::llm::{LlmClient, TextStream};
use kirboreo_core::market::MarketDataProvider;
use kirboreo_core::retrieval::Retriever;
use kirboreo_core::sentiment::fomo::FomoMeter;
use kirboreo_core::storage::rate_limit::SlidingWindowLimiter;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    /// `None` when no model key is configured; generation routes answer 500.
    pub llm: Option<Arc<dyn LlmClient>>,
    pub retriever: Arc<Retriever>,
    pub market: Arc<dyn MarketDataProvider>,
    pub fomo: Arc<FomoMeter>,
    pub limiter: Arc<SlidingWindowLimiter>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/chat", post(chat::chat))
        .route("/eli5", post(eli5::eli5))
        .route("/fomo-meter", post(fomo::fomo_meter))
        .route("/stoic", post(stoic::stoic))
        .route("/stocks/:ticker", get(stock::summary))
        .route("/stocks/:ticker/chart", get(stock::chart))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

fn json_error(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

/// Streams model output as a plain-text body. Errors after the first chunk
/// end the body early; they are logged, the status is already sent.
fn text_stream(route: &'static str, stream: TextStream) -> Response {
    let stream = stream.inspect_err(move |e| {
        tracing::warn!(route, error = %e, "model stream ended with an error");
    });
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(stream),
    )
        .into_response()
}

/// Reads `{messages: [{role, content}, ...]}`. Anything else is a 400 with
/// a human-readable reason.
fn parse_messages(body: &[u8]) -> Result<Vec<Message>, &'static str> {
    let value: Value = serde_json::from_slice(body).map_err(|_| "Request body must be JSON")?;
    let messages = match value.get("messages") {
        None | Some(Value::Null) => return Err("messages is required"),
        Some(Value::Array(items)) if items.is_empty() => return Err("messages must not be empty"),
        Some(v @ Value::Array(_)) => v.clone(),
        Some(_) => return Err("messages must be an array"),
    };
    serde_json::from_value::<Vec<Message>>(messages)
        .map_err(|_| "each message needs a role and string content")
}

fn bad_messages(reason: &str) -> Response {
    json_error(StatusCode::BAD_REQUEST, json!({ "error": reason }))
}

/// First `x-forwarded-for` entry, then `x-real-ip`, then `unknown`.
fn client_ip(headers: &HeaderMap) -> String {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    header_value("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header_value("x-real-ip"))
        .unwrap_or("unknown")
        .to_string()
}
