mod category;
mod config;
mod error;
mod model;
mod output;
mod prompt;
mod rate_limit;
mod reference;
mod server;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use visim_llm::openai::{OpenAiClient, OpenAiClientConfig};

use category::Category;
use config::Config;
use rate_limit::RateLimiter;
use reference::{ReferenceSource, ReferenceStore};
use server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting visim server");

    let config = Config::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        reference_dirs = ?config.reference_dirs,
        "server configured"
    );

    let openai_config = OpenAiClientConfig::from_env();
    info!(
        base_url = %openai_config.base_url,
        model = %openai_config.model,
        timeout_ms = openai_config.default_timeout.as_millis(),
        "openai client configured"
    );
    let has_api_key = openai_config.api_key.is_some();
    if !has_api_key {
        warn!("OPENAI_API_KEY is not set; generation requests will be sent unauthenticated");
    }
    let openai = Arc::new(OpenAiClient::new(openai_config)?);

    let limiter = RateLimiter::from_env();
    if let Some(limiter) = &limiter {
        info!(rps = limiter.rps(), "rate limiting enabled");
    }

    let references = ReferenceStore::new(config.reference_dirs);
    let mut on_disk = 0;
    for category in Category::ALL {
        if let ReferenceSource::File(_) = references.load(category).await.source {
            on_disk += 1;
        }
    }
    info!(
        on_disk,
        embedded = Category::ALL.len() - on_disk,
        "reference templates resolved"
    );

    let state = AppState::new(openai, references, limiter, has_api_key);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "HTTP server ready");
    axum::serve(listener, server::router(state))
        .await
        .inspect_err(|e| tracing::error!(error = %e, "HTTP server error"))?;

    info!("HTTP server shut down");
    Ok(())
}
