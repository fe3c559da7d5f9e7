use crate::config::Settings;
use crate::market::types::{ChartPoint, NewsItem, Quote};
use crate::market::{normalize_publish_time, MarketDataProvider};
use crate::time::chart_range::ChartQuery;
use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const SEARCH_NEWS_COUNT: usize = 15;
// Yahoo rejects requests without a browser-like agent.
const AGENT: &str = "Mozilla/5.0 (compatible; kirboreo/0.1)";

#[derive(Debug, Clone)]
pub struct YahooClient {
    http: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .yahoo_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("YAHOO_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(AGENT));

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .default_headers(headers)
            .build()
            .context("failed to build Yahoo http client")?;

        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let res = self
            .http
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .with_context(|| format!("Yahoo request failed: {path}"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Yahoo response")?;
        if !status.is_success() {
            anyhow::bail!("Yahoo HTTP {status} for {path}: {text}");
        }

        serde_json::from_str::<T>(&text)
            .with_context(|| format!("unexpected Yahoo response for {path}: {text}"))
    }

    async fn chart_result(&self, ticker: &str, query: &[(&str, String)]) -> Result<ChartResult> {
        let path = chart_path(ticker)?;
        let envelope = self.get_json::<ChartEnvelope>(&path, query).await?;
        envelope.into_result(ticker)
    }
}

/// The ticker becomes a path segment, so only symbol characters are allowed
/// (`BRK-B`, `^GSPC`, `EURUSD=X`, `RY.TO`).
fn chart_path(ticker: &str) -> Result<String> {
    let valid = !ticker.is_empty()
        && ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '^' | '=' | '-'));
    anyhow::ensure!(valid, "invalid ticker symbol: {ticker:?}");
    Ok(format!("/v8/finance/chart/{ticker}"))
}

#[async_trait::async_trait]
impl MarketDataProvider for YahooClient {
    fn provider_name(&self) -> &'static str {
        "yahoo"
    }

    async fn news(&self, ticker: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let search = self
            .get_json::<SearchResponse>(
                "/v1/finance/search",
                &[
                    ("q", ticker.to_string()),
                    ("newsCount", SEARCH_NEWS_COUNT.to_string()),
                    ("quotesCount", "0".to_string()),
                ],
            )
            .await?;
        Ok(search.into_news(limit, Utc::now()))
    }

    async fn quote(&self, ticker: &str) -> Result<Quote> {
        let result = self
            .chart_result(
                ticker,
                &[
                    ("range", "1d".to_string()),
                    ("interval", "1d".to_string()),
                ],
            )
            .await?;
        Ok(result.meta.to_quote())
    }

    async fn chart(&self, ticker: &str, query: &ChartQuery) -> Result<Vec<ChartPoint>> {
        let result = self
            .chart_result(
                ticker,
                &[
                    ("period1", query.period1_unix().to_string()),
                    ("period2", query.period2_unix().to_string()),
                    ("interval", query.interval.to_string()),
                ],
            )
            .await?;
        Ok(result.into_points())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<SearchNews>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchNews {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    publisher: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    provider_publish_time: Option<i64>,
}

impl SearchResponse {
    fn into_news(self, limit: usize, now: DateTime<Utc>) -> Vec<NewsItem> {
        self.news
            .into_iter()
            .take(limit)
            .map(|n| NewsItem {
                title: n.title.unwrap_or_default(),
                source: n
                    .publisher
                    .filter(|p| !p.trim().is_empty())
                    .unwrap_or_else(|| "Unknown".to_string()),
                published_at: normalize_publish_time(n.provider_publish_time.unwrap_or(0), now),
                url: n.link.unwrap_or_default(),
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Option<ChartIndicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    long_name: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    chart_previous_close: Option<f64>,
    #[serde(default)]
    previous_close: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuoteSeries>,
}

#[derive(Debug, Deserialize)]
struct ChartQuoteSeries {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl ChartEnvelope {
    fn into_result(self, ticker: &str) -> Result<ChartResult> {
        if let Some(err) = self.chart.error.filter(|e| !e.is_null()) {
            anyhow::bail!("Yahoo chart error for {ticker}: {err}");
        }
        self.chart
            .result
            .and_then(|r| r.into_iter().next())
            .with_context(|| format!("Yahoo chart returned no result for {ticker}"))
    }
}

impl ChartMeta {
    fn to_quote(&self) -> Quote {
        let price = self.regular_market_price.unwrap_or(0.0);
        let previous = self
            .chart_previous_close
            .or(self.previous_close)
            .unwrap_or(0.0);
        let change_percent = if price != 0.0 && previous != 0.0 {
            (price - previous) / previous * 100.0
        } else {
            0.0
        };
        Quote {
            price,
            change_percent,
            symbol: self.symbol.clone(),
            short_name: self.short_name.clone().or_else(|| self.long_name.clone()),
            currency: self.currency.clone(),
        }
    }
}

impl ChartResult {
    fn into_points(self) -> Vec<ChartPoint> {
        let closes = self
            .indicators
            .and_then(|i| i.quote.into_iter().next())
            .map(|q| q.close)
            .unwrap_or_default();

        self.timestamp
            .into_iter()
            .zip(closes)
            .filter_map(|(ts, close)| {
                let close = close.filter(|c| *c != 0.0)?;
                let date = Utc.timestamp_opt(ts, 0).single()?;
                Some(ChartPoint { date, close })
            })
            .collect()
    }
}
