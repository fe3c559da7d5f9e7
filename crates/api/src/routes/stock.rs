use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use kirboreo_core::domain::ticker::resolve_ticker;
use kirboreo_core::market::types::{ChartPoint, StockSummary};
use kirboreo_core::time::chart_range::{ChartQuery, TimeRange};
use serde::Deserialize;
use serde_json::json;

use super::{json_error, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ChartParams {
    range: Option<String>,
}

pub(super) async fn chart(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(params): Query<ChartParams>,
) -> Response {
    let range = match params.range.as_deref() {
        None | Some("") => TimeRange::default(),
        Some(raw) => match raw.parse::<TimeRange>() {
            Ok(r) => r,
            Err(e) => {
                return json_error(StatusCode::BAD_REQUEST, json!({ "error": e.to_string() }));
            }
        },
    };

    let ticker = resolve_ticker(&ticker).ticker;
    Json(chart_or_empty(&state, &ticker, range).await).into_response()
}

/// Quote, name and currency plus the one-year series. 404 when the provider
/// has no quote for the symbol; a failed chart only empties the series.
pub(super) async fn summary(State(state): State<AppState>, Path(ticker): Path<String>) -> Response {
    let ticker = resolve_ticker(&ticker).ticker;

    let (quote, points) = tokio::join!(
        state.market.quote(&ticker),
        chart_or_empty(&state, &ticker, TimeRange::OneYear)
    );

    match quote {
        Ok(quote) if quote.is_available() => {
            Json(StockSummary::new(&ticker, quote, points)).into_response()
        }
        Ok(_) => not_found(&ticker),
        Err(e) => {
            tracing::warn!(
                %ticker,
                provider = state.market.provider_name(),
                error = %e,
                "quote fetch failed"
            );
            not_found(&ticker)
        }
    }
}

fn not_found(ticker: &str) -> Response {
    json_error(
        StatusCode::NOT_FOUND,
        json!({ "error": format!("Could not fetch live data for {ticker}.") }),
    )
}

async fn chart_or_empty(state: &AppState, ticker: &str, range: TimeRange) -> Vec<ChartPoint> {
    let query = ChartQuery::for_range_now(range, Utc::now());
    match state.market.chart(ticker, &query).await {
        Ok(points) => points,
        Err(e) => {
            tracing::warn!(
                %ticker,
                %range,
                provider = state.market.provider_name(),
                error = %e,
                "chart fetch failed; returning empty series"
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::router;
    use super::super::test_support::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use kirboreo_core::market::types::{ChartPoint, Quote};
    use kirboreo_core::retrieval::Retriever;
    use serde_json::json;
    use std::sync::Arc;

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn returns_points_for_requested_range() {
        let market = Arc::new(FakeMarket {
            points: vec![ChartPoint {
                date: Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap(),
                close: 101.5,
            }],
            ..Default::default()
        });
        let app = router(state(None, Retriever::disabled(), market.clone()));

        let (status, _, bytes) = send(app, get("/stocks/tesla/chart?range=5d")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json_body(&bytes),
            json!([{"date": "2026-01-02T00:00:00Z", "close": 101.5}])
        );
        assert_eq!(market.charts.lock()[0].interval, "1h");
    }

    #[tokio::test]
    async fn defaults_to_one_year() {
        let market = Arc::new(FakeMarket::default());
        let app = router(state(None, Retriever::disabled(), market.clone()));

        let (status, _, bytes) = send(app, get("/stocks/AAPL/chart")).await;
        assert_eq!(status, StatusCode::OK);
        // The fake fails on an empty series; the route degrades to [].
        assert_eq!(json_body(&bytes), json!([]));
        let query = market.charts.lock()[0].clone();
        assert_eq!(query.interval, "1d");
    }

    #[tokio::test]
    async fn unknown_range_is_rejected() {
        let app = router(state(None, Retriever::disabled(), Arc::default()));
        let (status, _, bytes) = send(app, get("/stocks/AAPL/chart?range=3y")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&bytes)["error"], "unknown chart range: 3y");
    }

    #[tokio::test]
    async fn summary_combines_quote_and_one_year_series() {
        let market = Arc::new(FakeMarket {
            quote: Quote {
                price: 131.25,
                change_percent: -1.5,
                symbol: Some("NVDA".to_string()),
                short_name: Some("NVIDIA Corporation".to_string()),
                currency: Some("USD".to_string()),
            },
            points: vec![ChartPoint {
                date: Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap(),
                close: 120.0,
            }],
            ..Default::default()
        });
        let app = router(state(None, Retriever::disabled(), market.clone()));

        let (status, _, bytes) = send(app, get("/stocks/nvidia")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json_body(&bytes),
            json!({
                "symbol": "NVDA",
                "shortName": "NVIDIA Corporation",
                "regularMarketPrice": 131.25,
                "regularMarketChangePercent": -1.5,
                "currency": "USD",
                "chart": [{"date": "2026-01-02T00:00:00Z", "close": 120.0}]
            })
        );

        let query = market.charts.lock()[0].clone();
        assert_eq!(query.interval, "1d");
        assert!((365..=366).contains(&(query.period2 - query.period1).num_days()));
    }

    #[tokio::test]
    async fn summary_without_chart_still_reports_quote() {
        let market = Arc::new(FakeMarket {
            quote: Quote {
                price: 80.0,
                change_percent: 0.5,
                ..Default::default()
            },
            ..Default::default()
        });
        let app = router(state(None, Retriever::disabled(), market));

        let (status, _, bytes) = send(app, get("/stocks/CRCL")).await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&bytes);
        assert_eq!(body["symbol"], "CRCL");
        assert_eq!(body["shortName"], "CRCL");
        assert_eq!(body["currency"], "USD");
        assert_eq!(body["chart"], json!([]));
    }

    #[tokio::test]
    async fn summary_without_quote_is_404() {
        let app = router(state(None, Retriever::disabled(), Arc::default()));
        let (status, _, bytes) = send(app, get("/stocks/ZZZZ")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(&bytes)["error"],
            "Could not fetch live data for ZZZZ."
        );
    }
}
