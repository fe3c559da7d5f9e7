use axum::{body::Bytes, extract::State, http::StatusCode, response::Response};
use kirboreo_core::labs::stoic;
use kirboreo_core::llm::CompletionRequest;
use serde_json::json;

use super::{bad_messages, json_error, parse_messages, text_stream, AppState};

const FAILURE: &str = "Failed to reach the mirror. Please try again.";

pub(super) async fn stoic(State(state): State<AppState>, body: Bytes) -> Response {
    let messages = match parse_messages(&body) {
        Ok(m) => m,
        Err(reason) => return bad_messages(reason),
    };

    let Some(llm) = &state.llm else {
        tracing::error!("stoic requested without a configured language model");
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": FAILURE }));
    };

    let persona = stoic::random_persona();
    tracing::debug!(persona = persona.name, "stoic persona selected");

    let req = CompletionRequest::new(stoic::system_prompt(persona), messages);
    match llm.stream(req).await {
        Ok(stream) => text_stream("stoic", stream),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, persona = persona.name, "stoic generation failed to start");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": FAILURE }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::router;
    use super::super::test_support::*;
    use axum::http::StatusCode;
    use kirboreo_core::labs::stoic::PERSONAS;
    use kirboreo_core::retrieval::Retriever;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn answers_in_one_of_the_personas() {
        let llm = Arc::new(FakeLlm::streaming(vec!["Breathe. ", "Act."]));
        let app = router(state(Some(llm.clone()), Retriever::disabled(), Arc::default()));

        let body = json!({"messages": [{"role": "user", "content": "I missed a deadline."}]});
        let (status, _, bytes) = send(app, post_json("/stoic", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, b"Breathe. Act.");

        let system = llm.requests.lock()[0].system.clone().unwrap();
        assert!(PERSONAS
            .iter()
            .any(|p| system.starts_with(&format!("You are {}", p.name))));
    }

    #[tokio::test]
    async fn validates_messages_like_chat() {
        let app = router(state(
            Some(Arc::new(FakeLlm::default())),
            Retriever::disabled(),
            Arc::default(),
        ));
        let (status, _, _) = send(app, post_json("/stoic", json!({"messages": "help"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
