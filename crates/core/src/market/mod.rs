pub mod types;
pub mod yahoo;

use crate::market::types::{ChartPoint, NewsItem, Quote};
use crate::time::chart_range::ChartQuery;
use anyhow::Result;
use chrono::{DateTime, Datelike, TimeZone, Utc};

#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn news(&self, ticker: &str, limit: usize) -> Result<Vec<NewsItem>>;

    async fn quote(&self, ticker: &str) -> Result<Quote>;

    async fn chart(&self, ticker: &str, query: &ChartQuery) -> Result<Vec<ChartPoint>>;
}

/// Provider timestamps arrive either in seconds (10 digits) or milliseconds.
/// Anything that does not land in 2000..=2100 is replaced by `now`.
pub fn normalize_publish_time(raw: i64, now: DateTime<Utc>) -> DateTime<Utc> {
    let is_seconds = raw.unsigned_abs().to_string().len() == 10;
    let parsed = if is_seconds {
        Utc.timestamp_opt(raw, 0).single()
    } else {
        Utc.timestamp_millis_opt(raw).single()
    };

    match parsed {
        Some(t) if (2000..=2100).contains(&t.year()) => t,
        _ => now,
    }
}
