use crate::config::Settings;
use crate::domain::message::Message;
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::stream::content_deltas;
use crate::llm::{CompletionRequest, Embedder, LlmClient, Provider, TextStream};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_CHAT_MODEL: &str = "gpt-4o";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
// Matches the 60s ceiling the routes are allowed to run for.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    chat_model: String,
    embedding_model: String,
}

impl OpenAiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_openai_api_key()?.to_string();
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let chat_model =
            std::env::var("OPENAI_CHAT_MODEL").unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string());
        let embedding_model = std::env::var("OPENAI_EMBEDDING_MODEL")
            .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string());

        let timeout_secs = std::env::var("OPENAI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            chat_model,
            embedding_model,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn headers(&self) -> anyhow::Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .context("invalid OpenAI API key")?,
        );
        Ok(headers)
    }

    fn chat_request(&self, req: CompletionRequest, stream: bool) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.chat_model.clone(),
            messages: wire_messages(req.system, req.messages),
            temperature: req.temperature,
            stream,
        }
    }

    async fn post(&self, path: &str, stage: &'static str, body: &impl Serialize) -> anyhow::Result<reqwest::Response> {
        let res = self
            .http
            .post(self.url(path))
            .headers(self.headers()?)
            .json(body)
            .send()
            .await
            .with_context(|| format!("OpenAI {stage} request failed"))?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(LlmDiagnosticsError::http(Provider::OpenAI, stage, status, text).into());
        }
        Ok(res)
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<String> {
        let body = self.chat_request(req, false);
        let res = self.post("chat/completions", "chat", &body).await?;
        let text = res
            .text()
            .await
            .context("failed to read OpenAI response body")?;
        let parsed = serde_json::from_str::<ChatCompletionResponse>(&text)
            .with_context(|| format!("failed to decode OpenAI chat response: {text}"))?;
        response_text(parsed).ok_or_else(|| {
            LlmDiagnosticsError {
                provider: Provider::OpenAI,
                stage: "chat_empty",
                detail: "response had no message content".to_string(),
                raw_output: Some(text),
                raw_response_json: None,
            }
            .into()
        })
    }

    async fn stream(&self, req: CompletionRequest) -> anyhow::Result<TextStream> {
        let body = self.chat_request(req, true);
        let res = self.post("chat/completions", "chat_stream", &body).await?;
        Ok(Box::pin(content_deltas(res.bytes_stream())))
    }
}

#[async_trait::async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let body = EmbeddingRequest {
            model: &self.embedding_model,
            input: text,
        };
        let res = self.post("embeddings", "embeddings", &body).await?;
        let parsed = res
            .json::<EmbeddingResponse>()
            .await
            .context("failed to decode OpenAI embedding response")?;
        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .context("OpenAI returned no embedding")
    }
}

fn wire_messages(system: Option<String>, messages: Vec<Message>) -> Vec<WireMessage> {
    let mut out = Vec::with_capacity(messages.len() + 1);
    if let Some(system) = system {
        out.push(WireMessage {
            role: "system",
            content: system,
        });
    }
    out.extend(messages.into_iter().map(|m| WireMessage {
        role: m.role.as_str(),
        content: m.content,
    }));
    out
}

fn response_text(res: ChatCompletionResponse) -> Option<String> {
    res.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Clone, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}
