use crate::config::Settings;
use crate::retrieval::{RetrievedFragment, VectorIndex};
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_CONTROL_URL: &str = "https://api.pinecone.io";
const API_VERSION: &str = "2024-07";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug)]
pub struct PineconeIndex {
    http: reqwest::Client,
    api_key: String,
    index_name: String,
    control_url: String,

    // Data-plane host, resolved once from the control plane unless configured.
    host_cache: tokio::sync::Mutex<Option<String>>,
}

impl PineconeIndex {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.require_pinecone_api_key()?.to_string();
        let control_url = std::env::var("PINECONE_CONTROL_URL")
            .unwrap_or_else(|_| DEFAULT_CONTROL_URL.to_string());
        let timeout_secs = std::env::var("PINECONE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build Pinecone http client")?;

        Ok(Self {
            http,
            api_key,
            index_name: settings.pinecone_index_name.clone(),
            control_url,
            host_cache: tokio::sync::Mutex::new(
                settings.pinecone_index_host.as_deref().map(normalize_host),
            ),
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert("Api-Key", HeaderValue::from_str(&self.api_key)?);
        headers.insert(
            "X-Pinecone-API-Version",
            HeaderValue::from_static(API_VERSION),
        );
        Ok(headers)
    }

    async fn index_host(&self) -> Result<String> {
        let mut cached = self.host_cache.lock().await;
        if let Some(host) = cached.as_ref() {
            return Ok(host.clone());
        }

        let url = format!(
            "{}/indexes/{}",
            self.control_url.trim_end_matches('/'),
            self.index_name
        );
        let res = self
            .http
            .get(url)
            .headers(self.headers()?)
            .send()
            .await
            .context("Pinecone describe_index request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Pinecone describe_index response")?;
        if !status.is_success() {
            anyhow::bail!("Pinecone describe_index HTTP {status}: {text}");
        }

        let described = serde_json::from_str::<DescribeIndexResponse>(&text)
            .with_context(|| format!("unexpected describe_index response: {text}"))?;
        let host = normalize_host(&described.host);
        tracing::info!(index = %self.index_name, %host, "resolved Pinecone index host");
        *cached = Some(host.clone());
        Ok(host)
    }
}

#[async_trait::async_trait]
impl VectorIndex for PineconeIndex {
    fn index_name(&self) -> &str {
        &self.index_name
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<RetrievedFragment>> {
        let host = self.index_host().await?;
        let body = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
        };

        let res = self
            .http
            .post(format!("{host}/query"))
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .context("Pinecone query request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Pinecone query response")?;
        if !status.is_success() {
            anyhow::bail!("Pinecone query HTTP {status}: {text}");
        }

        let parsed = serde_json::from_str::<QueryResponse>(&text)
            .context("failed to parse Pinecone query response")?;
        Ok(parsed.into_fragments())
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct DescribeIndexResponse {
    host: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<MatchMetadata>,
}

#[derive(Debug, Deserialize)]
struct MatchMetadata {
    #[serde(default)]
    text: Option<String>,
}

impl QueryResponse {
    fn into_fragments(self) -> Vec<RetrievedFragment> {
        self.matches
            .into_iter()
            .map(|m| RetrievedFragment {
                id: m.id,
                score: m.score,
                text: m.metadata.and_then(|md| md.text).unwrap_or_default(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_request_uses_camel_case() {
        let v = serde_json::to_value(QueryRequest {
            vector: &[0.5, 0.25],
            top_k: 3,
            include_metadata: true,
        })
        .unwrap();
        assert_eq!(v, json!({"vector": [0.5, 0.25], "topK": 3, "includeMetadata": true}));
    }

    #[test]
    fn matches_without_text_become_empty_fragments() {
        let parsed: QueryResponse = serde_json::from_value(json!({
            "matches": [
                {"id": "post-1", "score": 0.91, "metadata": {"title": "Q3", "text": "Revenue grew."}},
                {"id": "post-2", "score": 0.42, "metadata": {"title": "untitled"}},
                {"id": "post-3", "score": 0.30}
            ],
            "namespace": ""
        }))
        .unwrap();
        let fragments = parsed.into_fragments();
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[0].text, "Revenue grew.");
        assert!(fragments[1].text.is_empty());
        assert!(fragments[2].text.is_empty());
    }

    #[test]
    fn normalizes_bare_hosts() {
        assert_eq!(
            normalize_host("knowledge-abc.svc.pinecone.io/"),
            "https://knowledge-abc.svc.pinecone.io"
        );
        assert_eq!(normalize_host("http://localhost:5080"), "http://localhost:5080");
    }
}
