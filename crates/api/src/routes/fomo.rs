use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use kirboreo_core::sentiment::fomo::FomoError;
use serde_json::{json, Value};

use super::{client_ip, json_error, AppState};

fn fomo_error(status: StatusCode, code: &str, message: &str) -> Response {
    json_error(
        status,
        json!({ "success": false, "error": { "code": code, "message": message } }),
    )
}

pub(super) async fn fomo_meter(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let value = serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null);
    let Some(ticker) = value
        .get("ticker")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
    else {
        return fomo_error(
            StatusCode::BAD_REQUEST,
            "MISSING_TICKER",
            "Please enter a stock ticker or crypto symbol.",
        );
    };

    let ip = client_ip(&headers);
    if !state.limiter.check(&ip) {
        tracing::info!(%ip, "fomo meter rate limit exceeded");
        return fomo_error(
            StatusCode::TOO_MANY_REQUESTS,
            "RATE_LIMIT_EXCEEDED",
            "Too many requests! Take a 60 second break and try again ☕",
        );
    }

    // Run on its own task so a panic in the pipeline becomes a 500 here.
    let meter = state.fomo.clone();
    let outcome = tokio::spawn(async move { meter.report(&ticker).await }).await;

    match outcome {
        Ok(Ok(outcome)) => {
            let mut body = json!({ "success": true, "data": outcome.report });
            if outcome.cached {
                body["cached"] = Value::Bool(true);
            }
            Json(body).into_response()
        }
        Ok(Err(e @ FomoError::TickerNotFound(_))) => {
            tracing::warn!(error = %e, "fomo meter ticker not found");
            fomo_error(
                StatusCode::NOT_FOUND,
                "TICKER_NOT_FOUND",
                "Couldn't find that stock or crypto symbol. Try AAPL, TSLA or BTC-USD 🤔",
            )
        }
        Err(e) => {
            let err = anyhow::Error::new(e);
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "fomo meter task failed");
            fomo_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Something went wrong while reading the market mood. Please try again.",
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::router;
    use super::super::test_support::*;
    use axum::http::StatusCode;
    use chrono::Utc;
    use kirboreo_core::market::types::{NewsItem, Quote};
    use kirboreo_core::retrieval::Retriever;
    use serde_json::json;
    use std::sync::Arc;

    fn market() -> Arc<FakeMarket> {
        Arc::new(FakeMarket {
            news: vec![NewsItem {
                title: "Nvidia shares soar on record revenue".to_string(),
                source: "Reuters".to_string(),
                published_at: Utc::now(),
                url: "https://example.com/nvda".to_string(),
            }],
            quote: Quote {
                price: 120.0,
                change_percent: 3.0,
                ..Default::default()
            },
            ..Default::default()
        })
    }

    fn request(ip: &str, ticker: serde_json::Value) -> axum::http::Request<axum::body::Body> {
        let mut req = post_json("/fomo-meter", json!({ "ticker": ticker }));
        req.headers_mut()
            .insert("x-forwarded-for", ip.parse().unwrap());
        req
    }

    #[tokio::test]
    async fn reports_then_serves_from_cache() {
        let app = router(state(None, Retriever::disabled(), market()));

        let (status, _, bytes) = send(app.clone(), request("1.1.1.1", json!("nvidia"))).await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&bytes);
        assert_eq!(body["success"], true);
        assert!(body.get("cached").is_none());
        assert_eq!(body["data"]["ticker"], "NVDA");
        assert_eq!(body["data"]["companyName"], "NVIDIA");
        assert_eq!(body["data"]["priceChange"], "+3.00%");
        assert_eq!(body["data"]["headlines"][0]["sentiment"], "bullish");

        assert_eq!(
            body["data"]["hint"],
            "Resolved \"nvidia\" to NVDA (NVIDIA)"
        );

        let (status, _, bytes) = send(app, request("1.1.1.1", json!("NVDA"))).await;
        assert_eq!(status, StatusCode::OK);
        let cached = json_body(&bytes);
        assert_eq!(cached["cached"], true);
        // The symbol was typed directly this time, so no resolution hint.
        assert!(cached["data"].get("hint").is_none());

        let mut first = body["data"].clone();
        first.as_object_mut().unwrap().remove("hint");
        assert_eq!(cached["data"], first);
    }

    #[tokio::test]
    async fn missing_ticker_is_rejected_before_rate_limiting() {
        let app = router(state(None, Retriever::disabled(), market()));
        for _ in 0..7 {
            let (status, _, bytes) = send(app.clone(), request("2.2.2.2", json!(""))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json_body(&bytes)["error"]["code"], "MISSING_TICKER");
        }
        // Rejections above consumed no quota.
        let (status, _, _) = send(app, request("2.2.2.2", json!("TSLA"))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn sixth_request_in_a_minute_is_limited() {
        let app = router(state(None, Retriever::disabled(), market()));
        for _ in 0..5 {
            let (status, _, _) = send(app.clone(), request("3.3.3.3", json!("AAPL"))).await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, _, bytes) = send(app.clone(), request("3.3.3.3", json!("AAPL"))).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        let body = json_body(&bytes);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "RATE_LIMIT_EXCEEDED");

        // Other clients keep their own window.
        let (status, _, _) = send(app, request("4.4.4.4", json!("AAPL"))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_ticker_is_404() {
        let app = router(state(None, Retriever::disabled(), Arc::default()));
        let (status, _, bytes) = send(app, request("5.5.5.5", json!("qqqqq"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json_body(&bytes)["error"]["code"], "TICKER_NOT_FOUND");
    }
}
