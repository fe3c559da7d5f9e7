//! Deterministic keyword scoring, used when the model is unavailable and for
//! per-headline tags.

use crate::domain::headline::HeadlineSentiment;
use crate::domain::sentiment::{SentimentLabel, SentimentResult, NEUTRAL_SCORE};

const POSITIVE_WORDS: &[&str] = &[
    "breakthrough", "surge", "rally", "record", "high", "bullish", "growth", "突破", "暴涨",
    "创新高", "看涨",
];

const NEGATIVE_WORDS: &[&str] = &[
    "crash", "plunge", "crisis", "fear", "drop", "bearish", "decline", "暴跌", "崩盘", "危机",
    "下跌",
];

const KEYWORD_WEIGHT: i64 = 10;

const STRONG_BULLISH: &[&str] = &[
    "soar", "surge", "rocket", "skyrocket", "breakthrough", "record high", "all-time high",
    "rally", "boom", "暴涨", "飙升", "突破", "创新高",
];

const BULLISH: &[&str] = &[
    "rise", "gain", "grow", "up", "bullish", "positive", "boost", "upgrade", "beat",
    "outperform", "strength", "上涨", "看涨", "增长", "利好",
];

const STRONG_BEARISH: &[&str] = &[
    "crash", "plunge", "collapse", "tank", "plummet", "crisis", "disaster", "崩盘", "暴跌", "危机",
];

const BEARISH: &[&str] = &[
    "fall", "drop", "decline", "down", "bearish", "negative", "concern", "worry", "miss",
    "underperform", "weakness", "cut", "downgrade", "下跌", "看跌", "担忧", "利空",
];

pub const NO_NEWS_COMMENTARY: &str = "Not enough news to read the mood.";

/// Counts each listed word at most once, anywhere in the lowercased text.
fn hits(text: &str, words: &[&str]) -> i64 {
    words.iter().filter(|w| text.contains(*w)).count() as i64
}

pub fn keyword_score<S: AsRef<str>>(titles: &[S]) -> i64 {
    let text = titles
        .iter()
        .map(|t| t.as_ref().to_lowercase())
        .collect::<Vec<_>>()
        .join("\n");

    i64::from(NEUTRAL_SCORE) + KEYWORD_WEIGHT * hits(&text, POSITIVE_WORDS)
        - KEYWORD_WEIGHT * hits(&text, NEGATIVE_WORDS)
}

pub fn fallback_commentary(label: SentimentLabel) -> &'static str {
    match label {
        SentimentLabel::ExtremeGreed => "Easy there. Even Iron Man needs to sleep. 😴",
        SentimentLabel::Greed => "The crowd is getting optimistic. Careful.",
        SentimentLabel::Neutral => "Mood is neutral. Wait and see.",
        SentimentLabel::Fear => "Maybe a good time to DCA?",
        SentimentLabel::ExtremeFear => "When there's blood in the streets, shop the dip. 🛒",
    }
}

/// Keyword-counting verdict for a set of headline titles.
pub fn fallback_sentiment<S: AsRef<str>>(titles: &[S]) -> SentimentResult {
    let mut result = SentimentResult::from_score(keyword_score(titles), "", Vec::new());
    result.commentary = fallback_commentary(result.label).to_string();
    result
}

pub fn neutral_without_news() -> SentimentResult {
    SentimentResult::from_score(i64::from(NEUTRAL_SCORE), NO_NEWS_COMMENTARY, Vec::new())
}

pub fn headline_score(title: &str) -> i64 {
    let title = title.to_lowercase();
    2 * hits(&title, STRONG_BULLISH) + hits(&title, BULLISH)
        - 2 * hits(&title, STRONG_BEARISH)
        - hits(&title, BEARISH)
}

pub fn tag_headline(title: &str) -> HeadlineSentiment {
    match headline_score(title) {
        s if s >= 2 => HeadlineSentiment::Bullish,
        s if s <= -2 => HeadlineSentiment::Bearish,
        _ => HeadlineSentiment::Neutral,
    }
}
