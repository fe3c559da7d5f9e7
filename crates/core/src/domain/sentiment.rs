use serde::{Deserialize, Serialize};

pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 100;
pub const NEUTRAL_SCORE: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SentimentLabel {
    ExtremeFear,
    Fear,
    Neutral,
    Greed,
    ExtremeGreed,
}

impl SentimentLabel {
    pub fn from_score(score: u8) -> Self {
        if score >= 90 {
            SentimentLabel::ExtremeGreed
        } else if score >= 70 {
            SentimentLabel::Greed
        } else if score <= 20 {
            SentimentLabel::ExtremeFear
        } else if score <= 40 {
            SentimentLabel::Fear
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            SentimentLabel::ExtremeFear => "😱",
            SentimentLabel::Fear => "😰",
            SentimentLabel::Neutral => "😐",
            SentimentLabel::Greed => "😏",
            SentimentLabel::ExtremeGreed => "🚀",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub score: u8,
    pub label: SentimentLabel,
    pub emoji: String,
    pub commentary: String,
    pub keywords: Vec<String>,
}

impl SentimentResult {
    /// Builds a result whose label and emoji follow from the (clamped) score.
    pub fn from_score(score: i64, commentary: impl Into<String>, keywords: Vec<String>) -> Self {
        let score = clamp_score(score);
        let label = SentimentLabel::from_score(score);
        Self {
            score,
            label,
            emoji: label.emoji().to_string(),
            commentary: commentary.into(),
            keywords,
        }
    }
}

pub fn clamp_score(score: i64) -> u8 {
    score.clamp(MIN_SCORE, MAX_SCORE) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_thresholds() {
        assert_eq!(SentimentLabel::from_score(100), SentimentLabel::ExtremeGreed);
        assert_eq!(SentimentLabel::from_score(95), SentimentLabel::ExtremeGreed);
        assert_eq!(SentimentLabel::from_score(90), SentimentLabel::ExtremeGreed);
        assert_eq!(SentimentLabel::from_score(89), SentimentLabel::Greed);
        assert_eq!(SentimentLabel::from_score(70), SentimentLabel::Greed);
        assert_eq!(SentimentLabel::from_score(69), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(50), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(41), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(40), SentimentLabel::Fear);
        assert_eq!(SentimentLabel::from_score(21), SentimentLabel::Fear);
        assert_eq!(SentimentLabel::from_score(20), SentimentLabel::ExtremeFear);
        assert_eq!(SentimentLabel::from_score(15), SentimentLabel::ExtremeFear);
        assert_eq!(SentimentLabel::from_score(0), SentimentLabel::ExtremeFear);
    }

    #[test]
    fn emoji_follows_label() {
        assert_eq!(SentimentResult::from_score(95, "", vec![]).emoji, "🚀");
        assert_eq!(SentimentResult::from_score(15, "", vec![]).emoji, "😱");
        assert_eq!(SentimentResult::from_score(50, "", vec![]).emoji, "😐");
    }

    #[test]
    fn scores_are_clamped() {
        assert_eq!(SentimentResult::from_score(140, "", vec![]).score, 100);
        assert_eq!(SentimentResult::from_score(-30, "", vec![]).score, 0);
        assert_eq!(clamp_score(i64::MAX), 100);
        assert_eq!(clamp_score(i64::MIN), 0);
    }

    #[test]
    fn label_serializes_kebab_case() {
        let v = serde_json::to_value(SentimentLabel::ExtremeGreed).unwrap();
        assert_eq!(v, serde_json::json!("extreme-greed"));
        let v = serde_json::to_value(SentimentLabel::ExtremeFear).unwrap();
        assert_eq!(v, serde_json::json!("extreme-fear"));
    }
}
