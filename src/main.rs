//! Streaming chat relay in front of a local LLM runtime
//!
//! (c) Softlandia 2025

use tokio_llm_chat_relay::api;
use tokio_llm_chat_relay::core::config::RelayConfig;

use anyhow::anyhow;
use log::{error, info};
use tokio::runtime::{Builder, Runtime};

fn main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt::init();

    let config = RelayConfig::from_env()?;

    let runtime: Runtime = Builder::new_multi_thread().enable_all().build()?;

    runtime.block_on(web_server_task(config))
}

async fn web_server_task(config: RelayConfig) -> anyhow::Result<()> {
    let provider = tokio_llm_chat_relay::services(config.clone())?
        .build_provider()
        .map_err(|e| anyhow!("invalid service registrations: {e:?}"))?;

    let app = api::app(provider, &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    info!(
        "relaying to {} with model {}",
        config.chat_url(),
        config.model_name
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
