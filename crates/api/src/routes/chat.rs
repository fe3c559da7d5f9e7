use axum::{body::Bytes, extract::State, http::StatusCode, response::Response};
use kirboreo_core::domain::message::last_user_message;
use kirboreo_core::llm::CompletionRequest;
use kirboreo_core::retrieval::prompt::chat_system_prompt;
use serde_json::json;

use super::{bad_messages, json_error, parse_messages, text_stream, AppState};

const FAILURE: &str = "Failed to process chat request";

pub(super) async fn chat(State(state): State<AppState>, body: Bytes) -> Response {
    let messages = match parse_messages(&body) {
        Ok(m) => m,
        Err(reason) => return bad_messages(reason),
    };

    let Some(llm) = &state.llm else {
        return json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": FAILURE, "details": "OPENAI_API_KEY is required" }),
        );
    };

    let fragments = match last_user_message(&messages) {
        Some(m) => state.retriever.retrieve(&m.content).await,
        None => Vec::new(),
    };
    tracing::debug!(fragments = fragments.len(), "chat context assembled");

    let req = CompletionRequest::new(chat_system_prompt(&fragments), messages);
    match llm.stream(req).await {
        Ok(stream) => text_stream("chat", stream),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(provider = ?llm.provider(), error = %e, "chat generation failed to start");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": FAILURE, "details": e.to_string() }),
            )
        }
    }
}
