pub mod fomo;
pub mod keywords;

use crate::domain::message::Message;
use crate::domain::sentiment::SentimentResult;
use crate::llm::{json, CompletionRequest, LlmClient};
use crate::market::types::NewsItem;
use std::sync::Arc;

pub const MAX_HEADLINES: usize = 10;
const TEMPERATURE: f32 = 0.8;

/// Scores market mood for a ticker from its headlines.
///
/// The model is optional: when it is missing, fails, or answers with anything
/// that does not validate, the keyword heuristic takes over.
#[derive(Clone)]
pub struct SentimentAnalyzer {
    llm: Option<Arc<dyn LlmClient>>,
}

impl SentimentAnalyzer {
    pub fn new(llm: Option<Arc<dyn LlmClient>>) -> Self {
        Self { llm }
    }

    pub async fn analyze(&self, ticker: &str, headlines: &[NewsItem]) -> SentimentResult {
        let headlines = &headlines[..headlines.len().min(MAX_HEADLINES)];
        if headlines.is_empty() {
            return keywords::neutral_without_news();
        }

        let titles: Vec<&str> = headlines.iter().map(|h| h.title.as_str()).collect();

        let Some(llm) = &self.llm else {
            tracing::debug!(%ticker, "no language model configured; using keyword sentiment");
            return keywords::fallback_sentiment(&titles);
        };

        let req = CompletionRequest {
            messages: vec![Message::user(sentiment_prompt(ticker, &titles))],
            ..Default::default()
        }
        .with_temperature(TEMPERATURE);

        match llm.complete(req).await {
            Ok(text) => match json::parse_sentiment(&text) {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(%ticker, error = %e, "sentiment output invalid; using keyword fallback");
                    keywords::fallback_sentiment(&titles)
                }
            },
            Err(e) => {
                tracing::warn!(%ticker, error = %e, "sentiment model call failed; using keyword fallback");
                keywords::fallback_sentiment(&titles)
            }
        }
    }
}

pub fn sentiment_prompt(ticker: &str, titles: &[&str]) -> String {
    let numbered = titles
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{}. {}", i + 1, t))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze the following news headlines about {ticker} and rate the market mood.\n\n\
Headlines:\n{numbered}\n\n\
Return a JSON object in exactly this shape:\n\
{{\n\
  \"score\": 0-100,\n\
  \"label\": \"extreme-fear\" | \"fear\" | \"neutral\" | \"greed\" | \"extreme-greed\",\n\
  \"emoji\": \"😱\" | \"😰\" | \"😐\" | \"😏\" | \"🚀\",\n\
  \"commentary\": \"one sharp, witty line (max 50 characters)\",\n\
  \"keywords\": [\"keyword1\", \"keyword2\", \"keyword3\"]\n\
}}\n\n\
Scoring:\n\
- 90-100: headlines are all breakthroughs, surges and record highs → extreme-greed 🚀\n\
- 70-89: mostly positive, the market is optimistic → greed 😏\n\
- 40-69: mixed → neutral 😐\n\
- 20-39: mostly negative, the market is worried → fear 😰\n\
- 0-19: crashes, crises and panic → extreme-fear 😱\n\n\
Commentary: sharp, funny, a little sarcastic. At extreme greed remind people trees \
don't grow to the sky; at extreme fear point out that blood in the streets is a buying \
opportunity.\n\n\
Return only the JSON, nothing else."
    )
}


#[cfg(test)]
mod tests {
    use super::test_support::ScriptedLlm;
    use super::*;
    use crate::domain::sentiment::SentimentLabel;
    use chrono::Utc;

    fn news(titles: &[&str]) -> Vec<NewsItem> {
        titles
            .iter()
            .map(|t| NewsItem {
                title: t.to_string(),
                source: "Reuters".to_string(),
                published_at: Utc::now(),
                url: String::new(),
            })
            .collect()
    }

    fn analyzer(llm: Arc<ScriptedLlm>) -> SentimentAnalyzer {
        let llm: Arc<dyn LlmClient> = llm;
        SentimentAnalyzer::new(Some(llm))
    }

    #[tokio::test]
    async fn no_headlines_is_neutral_without_model_call() {
        let llm = Arc::new(ScriptedLlm::default());
        let r = analyzer(llm.clone()).analyze("TSLA", &[]).await;
        assert_eq!(r.score, 50);
        assert_eq!(r.commentary, keywords::NO_NEWS_COMMENTARY);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn uses_model_verdict_when_valid() {
        let llm = Arc::new(ScriptedLlm::replying(Ok(
            "```json\n{\"score\": 12, \"label\": \"extreme-fear\", \"emoji\": \"😱\", \"commentary\": \"Buy the blood.\", \"keywords\": [\"recall\"]}\n```"
                .to_string(),
        )));
        let r = analyzer(llm.clone())
            .analyze("TSLA", &news(&["Tesla recall widens"]))
            .await;
        assert_eq!(r.score, 12);
        assert_eq!(r.label, SentimentLabel::ExtremeFear);
        assert_eq!(r.commentary, "Buy the blood.");

        let requests = llm.requests.lock();
        assert_eq!(requests[0].temperature, Some(0.8));
        assert!(requests[0].messages[0].content.contains("1. Tesla recall widens"));
    }

    #[tokio::test]
    async fn non_json_reply_falls_back_to_keywords() {
        let llm = Arc::new(ScriptedLlm::replying(Ok("I'd rather not say.".to_string())));
        let r = analyzer(llm)
            .analyze("NVDA", &news(&["Nvidia stock surge continues", "Chip rally"]))
            .await;
        assert_eq!(r.score, 70);
        assert_eq!(r.label, SentimentLabel::Greed);
        assert!(r.keywords.is_empty());
    }

    #[tokio::test]
    async fn model_error_falls_back_to_keywords() {
        let llm = Arc::new(ScriptedLlm::replying(Err(anyhow::anyhow!("quota exceeded"))));
        let r = analyzer(llm).analyze("X", &news(&["Shares crash"])).await;
        assert_eq!(r.score, 40);
        assert_eq!(r.label, SentimentLabel::Fear);
    }

    #[tokio::test]
    async fn missing_model_uses_keywords() {
        let r = SentimentAnalyzer::new(None)
            .analyze("X", &news(&["Quiet day"]))
            .await;
        assert_eq!(r.score, 50);
    }

    #[tokio::test]
    async fn prompt_includes_at_most_ten_headlines() {
        let llm = Arc::new(ScriptedLlm::replying(Ok("{\"score\": 50, \"commentary\": \"meh\"}".to_string())));
        let titles: Vec<String> = (1..=12).map(|i| format!("headline {i}")).collect();
        let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
        analyzer(llm.clone()).analyze("X", &news(&refs)).await;

        let prompt = llm.requests.lock()[0].messages[0].content.clone();
        assert!(prompt.contains("10. headline 10"));
        assert!(!prompt.contains("headline 11"));
    }
}
