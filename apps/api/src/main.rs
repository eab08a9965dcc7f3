mod actions;
mod config;
mod context;
mod document;
mod errors;
mod export;
mod layout;
mod llm_client;
mod profile;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::profile::{load_profile, source_from_config};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ResumeBuilder API v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::build(&config)?;
    info!(
        actions = state.registry.list_actions().len(),
        export_dir = %config.export_dir.display(),
        markdown = ?config.export_markdown,
        "Session initialized"
    );

    if state.relay.is_configured() {
        info!("Chat relay enabled (default model: {})", config.chat_model);
    } else {
        warn!("OPENAI_API_KEY not set; /api/v1/chat will return 503");
    }

    // Profile is context only; the server starts without waiting for it.
    match source_from_config(&config) {
        Ok(Some(source)) => {
            tokio::spawn(load_profile(source, state.context.clone()));
        }
        Ok(None) => info!("GITHUB_TOKEN / GITHUB_USERNAME not set; profile context disabled"),
        Err(e) => warn!(error = %e, "Profile source could not be built; profile context disabled"),
    }

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
