//! Company-name aliases for the handful of tickers people tend to type by name.

#[derive(Debug, Clone, Copy)]
pub struct TickerMapping {
    pub ticker: &'static str,
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

pub const TICKER_MAPPINGS: &[TickerMapping] = &[
    TickerMapping {
        ticker: "PATH",
        name: "UiPath",
        aliases: &["uipath", "ui path", "uipath inc"],
    },
    TickerMapping {
        ticker: "CRCL",
        name: "Circle",
        aliases: &["circle", "circle internet financial"],
    },
    TickerMapping {
        ticker: "COIN",
        name: "Coinbase",
        aliases: &["coinbase", "coinbase global"],
    },
    TickerMapping {
        ticker: "TSLA",
        name: "Tesla",
        aliases: &["tesla", "tesla motors", "tesla inc"],
    },
    TickerMapping {
        ticker: "AAPL",
        name: "Apple",
        aliases: &["apple", "apple inc", "apple computer"],
    },
    TickerMapping {
        ticker: "NVDA",
        name: "NVIDIA",
        aliases: &["nvidia", "nvidia corp", "nvidia corporation"],
    },
    TickerMapping {
        ticker: "MSFT",
        name: "Microsoft",
        aliases: &["microsoft", "microsoft corp", "microsoft corporation"],
    },
    TickerMapping {
        ticker: "GOOGL",
        name: "Google",
        aliases: &["google", "alphabet", "alphabet inc"],
    },
    TickerMapping {
        ticker: "AMZN",
        name: "Amazon",
        aliases: &["amazon", "amazon.com", "amazon inc"],
    },
    TickerMapping {
        ticker: "META",
        name: "Meta",
        aliases: &["meta", "facebook", "meta platforms"],
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTicker {
    pub ticker: String,
    pub company_name: Option<String>,
    /// Set only when the input was an alias rather than the symbol itself.
    pub hint: Option<String>,
}

/// Resolves user input (symbol or company name) to a canonical symbol.
///
/// Unknown input is passed through uppercased; it may still be a valid symbol
/// the alias table does not know about.
pub fn resolve_ticker(input: &str) -> ResolvedTicker {
    let cleaned = input.trim().replace('$', "");
    let cleaned = cleaned.trim();
    let normalized = cleaned.to_lowercase();

    if let Some(m) = TICKER_MAPPINGS
        .iter()
        .find(|m| m.ticker.to_lowercase() == normalized)
    {
        return ResolvedTicker {
            ticker: m.ticker.to_string(),
            company_name: Some(m.name.to_string()),
            hint: None,
        };
    }

    if let Some(m) = TICKER_MAPPINGS
        .iter()
        .find(|m| m.aliases.iter().any(|alias| *alias == normalized))
    {
        return ResolvedTicker {
            ticker: m.ticker.to_string(),
            company_name: Some(m.name.to_string()),
            hint: Some(format!(
                "Resolved \"{cleaned}\" to {} ({})",
                m.ticker, m.name
            )),
        };
    }

    ResolvedTicker {
        ticker: cleaned.to_uppercase(),
        company_name: None,
        hint: None,
    }
}

pub fn company_name(ticker: &str) -> Option<&'static str> {
    TICKER_MAPPINGS
        .iter()
        .find(|m| m.ticker.eq_ignore_ascii_case(ticker.trim()))
        .map(|m| m.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_alias_with_hint() {
        let r = resolve_ticker("uipath");
        assert_eq!(r.ticker, "PATH");
        assert_eq!(r.company_name.as_deref(), Some("UiPath"));
        let hint = r.hint.unwrap();
        assert!(!hint.is_empty());
        assert!(hint.contains("PATH"));
    }

    #[test]
    fn alias_match_ignores_case_and_whitespace() {
        let r = resolve_ticker("  Meta Platforms ");
        assert_eq!(r.ticker, "META");
        assert!(r.hint.is_some());

        let r = resolve_ticker("FACEBOOK");
        assert_eq!(r.ticker, "META");
    }

    #[test]
    fn direct_symbol_match_has_no_hint() {
        let r = resolve_ticker("tsla");
        assert_eq!(r.ticker, "TSLA");
        assert_eq!(r.company_name.as_deref(), Some("Tesla"));
        assert!(r.hint.is_none());
    }

    #[test]
    fn unknown_input_is_uppercased_without_hint() {
        let r = resolve_ticker("btc-usd");
        assert_eq!(r.ticker, "BTC-USD");
        assert!(r.hint.is_none());
        assert!(r.company_name.is_none());
    }

    #[test]
    fn strips_dollar_prefix() {
        assert_eq!(resolve_ticker("$nvda").ticker, "NVDA");
        assert_eq!(resolve_ticker("$xyz").ticker, "XYZ");
    }

    #[test]
    fn company_name_lookup() {
        assert_eq!(company_name("googl"), Some("Google"));
        assert_eq!(company_name("ZZZZ"), None);
    }
}
