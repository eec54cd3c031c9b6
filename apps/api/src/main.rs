mod config;
mod errors;
mod layout;
mod llm_client;
mod models;
mod recommendation;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::layout::TableLayoutConfig;
use crate::llm_client::{CompletionProvider, LlmClient};
use crate::render::ReportRenderer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting MaterialMind API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client. A missing key is reported per request, not at startup.
    let llm = LlmClient::new(config.groq_api_key.clone());
    if llm.is_configured() {
        info!("LLM client initialized (model: {})", llm_client::MODEL);
    } else {
        warn!("GROQ_API_KEY is not set; recommendation requests will fail until it is");
    }

    // Validate the report layout once so a bad config shows up at boot, not per job
    let layout_config = TableLayoutConfig::default();
    layout_config.validate()?;

    tokio::fs::create_dir_all(&config.output_dir).await?;
    let renderer = ReportRenderer::new(config.output_dir.clone(), layout_config);
    info!("Reports will be written to {}", renderer.output_dir().display());

    // Build app state
    let state = AppState {
        provider: Arc::new(llm),
        renderer,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
