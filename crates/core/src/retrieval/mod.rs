pub mod pinecone;
pub mod prompt;

use crate::llm::Embedder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedFragment {
    pub id: String,
    pub score: f32,
    pub text: String,
}

#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    fn index_name(&self) -> &str;

    async fn query(&self, vector: &[f32], top_k: usize) -> anyhow::Result<Vec<RetrievedFragment>>;
}

/// Embed-then-query step of the chat pipeline.
///
/// Retrieval is enrichment only: a missing index or any upstream failure
/// produces an empty context and a warning, never an error.
#[derive(Clone)]
pub struct Retriever {
    embedder: Option<Arc<dyn Embedder>>,
    index: Option<Arc<dyn VectorIndex>>,
    top_k: usize,
}

impl Retriever {
    pub fn new(embedder: Option<Arc<dyn Embedder>>, index: Option<Arc<dyn VectorIndex>>) -> Self {
        Self {
            embedder,
            index,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None, None)
    }

    pub fn is_enabled(&self) -> bool {
        self.embedder.is_some() && self.index.is_some()
    }

    pub async fn retrieve(&self, query: &str) -> Vec<RetrievedFragment> {
        let (Some(embedder), Some(index)) = (&self.embedder, &self.index) else {
            tracing::debug!("vector retrieval not configured; answering without context");
            return Vec::new();
        };
        if query.trim().is_empty() {
            return Vec::new();
        }

        let vector = match embedder.embed(query).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "query embedding failed; continuing without context");
                return Vec::new();
            }
        };

        match index.query(&vector, self.top_k).await {
            Ok(fragments) => {
                let fragments = rank_fragments(fragments, self.top_k);
                tracing::debug!(
                    index = index.index_name(),
                    matches = fragments.len(),
                    "vector retrieval complete"
                );
                fragments
            }
            Err(e) => {
                tracing::warn!(
                    index = index.index_name(),
                    error = %e,
                    "vector index query failed; continuing without context"
                );
                Vec::new()
            }
        }
    }
}

/// Drops blank fragments and orders the rest by descending score.
pub fn rank_fragments(fragments: Vec<RetrievedFragment>, top_k: usize) -> Vec<RetrievedFragment> {
    let mut out: Vec<_> = fragments
        .into_iter()
        .filter(|f| !f.text.trim().is_empty())
        .collect();
    out.sort_by(|a, b| b.score.total_cmp(&a.score));
    out.truncate(top_k);
    out
}
