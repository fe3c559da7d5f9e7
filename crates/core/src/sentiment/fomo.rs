use crate::domain::headline::Headline;
use crate::domain::sentiment::SentimentResult;
use crate::domain::ticker::resolve_ticker;
use crate::market::types::{NewsItem, Quote};
use crate::market::MarketDataProvider;
use crate::sentiment::{keywords, SentimentAnalyzer, MAX_HEADLINES};
use crate::storage::cache::TtlCache;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const REPORT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FomoReport {
    pub ticker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub current_price: f64,
    pub price_change: String,
    pub sentiment: SentimentResult,
    pub headlines: Vec<Headline>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FomoOutcome {
    pub report: FomoReport,
    pub cached: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FomoError {
    /// Neither news nor a price came back for the symbol.
    TickerNotFound(String),
}

impl fmt::Display for FomoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FomoError::TickerNotFound(ticker) => write!(
                f,
                "Could not find data for ticker \"{ticker}\". Please check the symbol."
            ),
        }
    }
}

impl std::error::Error for FomoError {}

pub struct FomoMeter {
    market: Arc<dyn MarketDataProvider>,
    analyzer: SentimentAnalyzer,
    cache: TtlCache<FomoReport>,
}

impl FomoMeter {
    pub fn new(market: Arc<dyn MarketDataProvider>, analyzer: SentimentAnalyzer) -> Self {
        Self::with_ttl(market, analyzer, REPORT_TTL)
    }

    pub fn with_ttl(
        market: Arc<dyn MarketDataProvider>,
        analyzer: SentimentAnalyzer,
        ttl: Duration,
    ) -> Self {
        Self {
            market,
            analyzer,
            cache: TtlCache::new(ttl),
        }
    }

    pub async fn report(&self, input: &str) -> Result<FomoOutcome, FomoError> {
        let resolved = resolve_ticker(input);
        let ticker = resolved.ticker;

        // Cached reports carry no hint; it belongs to the current input.
        if let Some(mut report) = self.cache.get(&ticker) {
            tracing::debug!(%ticker, "fomo report served from cache");
            report.hint = resolved.hint;
            return Ok(FomoOutcome {
                report,
                cached: true,
            });
        }

        let (news, quote) = tokio::join!(
            self.market.news(&ticker, MAX_HEADLINES),
            self.market.quote(&ticker)
        );

        let news = news.unwrap_or_else(|e| {
            tracing::warn!(%ticker, provider = self.market.provider_name(), error = %e, "news fetch failed");
            Vec::new()
        });
        let quote = quote.unwrap_or_else(|e| {
            tracing::warn!(%ticker, provider = self.market.provider_name(), error = %e, "quote fetch failed");
            Quote::default()
        });

        if news.is_empty() && !quote.is_available() {
            return Err(FomoError::TickerNotFound(ticker));
        }

        let sentiment = self.analyzer.analyze(&ticker, &news).await;

        let mut report = FomoReport {
            company_name: resolved.company_name,
            hint: None,
            current_price: quote.price,
            price_change: quote.change_display(),
            sentiment,
            headlines: tag_headlines(news),
            timestamp: Utc::now(),
            ticker: ticker.clone(),
        };

        self.cache.insert(ticker, report.clone());
        report.hint = resolved.hint;
        Ok(FomoOutcome {
            report,
            cached: false,
        })
    }
}

fn tag_headlines(news: Vec<NewsItem>) -> Vec<Headline> {
    news.into_iter()
        .map(|n| Headline {
            sentiment: keywords::tag_headline(&n.title),
            title: n.title,
            source: n.source,
            published_at: n.published_at,
            url: n.url,
        })
        .collect()
}
