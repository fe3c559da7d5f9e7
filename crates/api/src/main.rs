mod routes;

use std::sync::Arc;

use kirboreo_core::config::Settings;
use kirboreo_core::llm::openai::OpenAiClient;
use kirboreo_core::llm::{Embedder, LlmClient};
use kirboreo_core::market::yahoo::YahooClient;
use kirboreo_core::market::MarketDataProvider;
use kirboreo_core::retrieval::pinecone::PineconeIndex;
use kirboreo_core::retrieval::{Retriever, VectorIndex};
use kirboreo_core::sentiment::fomo::FomoMeter;
use kirboreo_core::sentiment::SentimentAnalyzer;
use kirboreo_core::storage::rate_limit::SlidingWindowLimiter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let openai: Option<Arc<OpenAiClient>> = match OpenAiClient::from_settings(&settings) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "language model unavailable; starting API in degraded mode");
            None
        }
    };

    let index: Option<Arc<dyn VectorIndex>> = match PineconeIndex::from_settings(&settings) {
        Ok(index) => Some(Arc::new(index)),
        Err(e) => {
            tracing::warn!(error = %e, "vector index unavailable; chat will answer without context");
            None
        }
    };

    let market: Arc<dyn MarketDataProvider> = Arc::new(YahooClient::from_settings(&settings)?);

    let llm = openai.clone().map(|c| c as Arc<dyn LlmClient>);
    let embedder = openai.map(|c| c as Arc<dyn Embedder>);

    let state = AppState {
        fomo: Arc::new(FomoMeter::new(
            market.clone(),
            SentimentAnalyzer::new(llm.clone()),
        )),
        retriever: Arc::new(Retriever::new(embedder, index)),
        llm,
        market,
        limiter: Arc::new(SlidingWindowLimiter::default()),
    };

    tracing::info!(
        llm = state.llm.is_some(),
        retrieval = state.retriever.is_enabled(),
        market = state.market.provider_name(),
        "providers configured"
    );

    let app = routes::router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
