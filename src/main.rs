mod article;
mod auth;
mod error;
mod forge;
mod llm;
mod publish;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn, Level};

use article::ContentExtractor;
use auth::MemberstackVerifier;
use forge::ToolForge;
use llm::LlmClient;
use publish::{GitHubStore, Publisher};
use state::{AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load env
    let _ = dotenv::dotenv();
    let settings = Settings::from_env()?;

    let level: Level = settings.log_level.parse().unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    // Init LLM client
    let llm_client = Arc::new(LlmClient::new(&settings.llm)?);
    if settings.llm.api_key.is_none() {
        warn!("No LLM API key configured; generation requests will likely be rejected");
    }
    info!(model = llm_client.model(), "LLM client initialized");

    // Init content store
    let store = Arc::new(GitHubStore::new(&settings.store)?);
    if settings.store.token.is_none() {
        warn!("GITHUB_TOKEN not set; publishing will fail");
    }
    info!(
        repo = %settings.store.repo,
        branch = %settings.store.branch,
        "Content store initialized"
    );

    let app_state = AppState {
        extractor: Arc::new(ContentExtractor::new()?),
        forge: Arc::new(ToolForge::new(llm_client)),
        publisher: Arc::new(Publisher::new(store, settings.store.public_base_url.clone())),
        verifier: Arc::new(MemberstackVerifier::new(&settings.auth)?),
    };

    let app = routes::router(app_state, &settings.allowed_origins);

    let addr = format!("0.0.0.0:{}", settings.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(port = settings.port, "Content extraction server running");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
