use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub url: String,
}

/// `price == 0.0` means the provider had nothing for the symbol.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub price: f64,
    pub change_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl Quote {
    pub fn is_available(&self) -> bool {
        self.price != 0.0
    }

    /// Signed percentage with two decimals, e.g. `+1.25%` or `-0.40%`.
    pub fn change_display(&self) -> String {
        if self.change_percent > 0.0 {
            format!("+{:.2}%", self.change_percent)
        } else {
            format!("{:.2}%", self.change_percent)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: DateTime<Utc>,
    pub close: f64,
}

pub const DEFAULT_CURRENCY: &str = "USD";

/// Quote plus price history for a single symbol, as served by the stock page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    pub symbol: String,
    pub short_name: String,
    pub regular_market_price: f64,
    pub regular_market_change_percent: f64,
    pub currency: String,
    pub chart: Vec<ChartPoint>,
}

impl StockSummary {
    /// Missing symbol and name fall back to the requested ticker.
    pub fn new(ticker: &str, quote: Quote, chart: Vec<ChartPoint>) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            symbol: non_empty(quote.symbol).unwrap_or_else(|| ticker.to_string()),
            short_name: non_empty(quote.short_name).unwrap_or_else(|| ticker.to_string()),
            regular_market_price: quote.price,
            regular_market_change_percent: quote.change_percent,
            currency: non_empty(quote.currency).unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            chart,
        }
    }
}
