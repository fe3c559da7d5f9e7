use crate::domain::sentiment::{SentimentResult, NEUTRAL_SCORE};
use anyhow::ensure;
use serde::{Deserialize, Serialize};

const MAX_KEYWORDS: usize = 8;

/// Shape the model is asked to emit for a sentiment verdict.
///
/// `label` and `emoji` are accepted but not trusted; both are re-derived from
/// the clamped score so the three fields can never disagree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSentimentVerdict {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
    pub commentary: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl LlmSentimentVerdict {
    pub fn validate_and_into_result(self) -> anyhow::Result<SentimentResult> {
        let score = match self.score {
            Some(s) => {
                ensure!(s.is_finite(), "score must be a finite number (got {s})");
                s.round() as i64
            }
            None => i64::from(NEUTRAL_SCORE),
        };

        let commentary = self.commentary.trim().to_string();
        ensure!(!commentary.is_empty(), "commentary must be non-empty");

        let keywords: Vec<String> = self
            .keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .take(MAX_KEYWORDS)
            .collect();

        Ok(SentimentResult::from_score(score, commentary, keywords))
    }
}
