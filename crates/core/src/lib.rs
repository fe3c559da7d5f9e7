pub mod domain;
pub mod labs;
pub mod llm;
pub mod market;
pub mod retrieval;
pub mod sentiment;
pub mod storage;
pub mod time;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_PINECONE_INDEX_NAME: &str = "knowledge";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub openai_api_key: Option<String>,
        pub pinecone_api_key: Option<String>,
        pub pinecone_index_name: String,
        pub pinecone_index_host: Option<String>,
        pub sentry_dsn: Option<String>,
        pub yahoo_base_url: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                openai_api_key: non_empty_var("OPENAI_API_KEY"),
                pinecone_api_key: non_empty_var("PINECONE_API_KEY"),
                pinecone_index_name: non_empty_var("PINECONE_INDEX_NAME")
                    .unwrap_or_else(|| DEFAULT_PINECONE_INDEX_NAME.to_string()),
                pinecone_index_host: non_empty_var("PINECONE_INDEX_HOST"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                yahoo_base_url: non_empty_var("YAHOO_BASE_URL"),
            })
        }

        pub fn require_openai_api_key(&self) -> anyhow::Result<&str> {
            self.openai_api_key
                .as_deref()
                .context("OPENAI_API_KEY is required")
        }

        pub fn require_pinecone_api_key(&self) -> anyhow::Result<&str> {
            self.pinecone_api_key
                .as_deref()
                .context("PINECONE_API_KEY is required")
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
