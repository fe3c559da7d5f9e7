use crate::domain::contract::LlmSentimentVerdict;
use crate::domain::sentiment::SentimentResult;
use anyhow::Context;

pub fn extract_json(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        // Remove Markdown fences (```json ... ``` or ``` ... ```). A one-line
        // fence has no newline, so only the trailing fence is cut.
        let mut inner = trimmed;
        if let Some(after_first) = inner.splitn(2, '\n').nth(1) {
            inner = after_first;
        }
        if let Some(end) = inner.rfind("```") {
            inner = &inner[..end];
        }
        if let Some(json) = brace_slice(inner) {
            return Some(json);
        }
    }

    brace_slice(trimmed)
}

// First '{' to last '}'.
fn brace_slice(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(text[start..=end].trim().to_string())
}

/// Parses a model reply into a validated sentiment result.
///
/// Every failure mode (no braces, bad JSON, schema mismatch) is an `Err`;
/// callers route those to the keyword fallback.
pub fn parse_sentiment(text: &str) -> anyhow::Result<SentimentResult> {
    let json_str = extract_json(text).context("no JSON object in model output")?;
    let parsed = serde_json::from_str::<LlmSentimentVerdict>(&json_str)
        .with_context(|| format!("model output does not match sentiment schema: {json_str}"))?;
    parsed.validate_and_into_result()
}
