use axum::{body::Bytes, extract::State, http::StatusCode, response::Response};
use kirboreo_core::labs::eli5;
use serde_json::{json, Value};

use super::{json_error, text_stream, AppState};

const FAILURE: &str = "Failed to generate explanation. Please try again.";

pub(super) async fn eli5(State(state): State<AppState>, body: Bytes) -> Response {
    // Unparseable bodies are treated like a missing field.
    let value = serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null);
    let text = match eli5::validate_input(value.get("text").and_then(Value::as_str)) {
        Ok(t) => t,
        Err(e) => {
            return json_error(StatusCode::BAD_REQUEST, json!({ "error": e.to_string() }));
        }
    };

    let Some(llm) = &state.llm else {
        tracing::error!("eli5 requested without a configured language model");
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": FAILURE }));
    };

    match llm.stream(eli5::completion_request(text)).await {
        Ok(stream) => text_stream("eli5", stream),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(provider = ?llm.provider(), error = %e, "eli5 generation failed to start");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": FAILURE }))
        }
    }
}
