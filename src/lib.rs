//! Streaming chat relay in front of a local LLM runtime - Library exports for testing
//!
//! (c) Softlandia 2025

pub mod api;
pub mod core;
pub mod infrastructure;

use crate::core::config::RelayConfig;
use crate::core::services::BackendChatRelay;
use crate::infrastructure::http::build_http_client;
use crate::infrastructure::ollama::OllamaClient;
use di::{Injectable, Ref, ServiceCollection, singleton_as_self};

/// Registers everything the relay needs, talking to the backend named in `config`.
pub fn services(config: RelayConfig) -> anyhow::Result<ServiceCollection> {
    let http = build_http_client(&config)?;

    let mut services = ServiceCollection::new();
    services
        .add(singleton_as_self::<RelayConfig>().from(move |_| Ref::new(config.clone())))
        .add(singleton_as_self::<reqwest::Client>().from(move |_| Ref::new(http.clone())))
        .add(OllamaClient::singleton())
        .add(BackendChatRelay::scoped());

    Ok(services)
}
