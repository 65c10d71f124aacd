//! Fake inference backend speaking the NDJSON chat protocol on an ephemeral port.

#![allow(dead_code)]

use async_stream::stream;
use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use di::Ref;
use futures_util::StreamExt;
use serde_json::Value;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_llm_chat_relay::core::config::RelayConfig;
use tokio_llm_chat_relay::infrastructure::http::build_http_client;
use tokio_llm_chat_relay::infrastructure::ollama::OllamaClient;
use tokio_llm_chat_relay::infrastructure::traits::TokenStream;

pub const HELLO_EVENTS: &str = concat!(
    "{\"model\":\"test\",\"message\":{\"role\":\"assistant\",\"content\":\"Hel\"},\"done\":false}\n",
    "{\"model\":\"test\",\"message\":{\"role\":\"assistant\",\"content\":\"lo\"},\"done\":false}\n",
    "{\"model\":\"test\",\"done\":true}\n",
);

/// How the fake backend answers `POST /api/chat`.
#[derive(Clone)]
pub enum Script {
    /// 200 with the given body, sent in one piece.
    Body(&'static str),
    /// Non-success status with the given body.
    Status(StatusCode, &'static str),
    /// Sends the first line, then aborts the connection mid-body.
    DropAfter(&'static str),
    /// Sends the first line, then never sends anything again.
    StallAfter(&'static str),
}

pub struct FakeBackend {
    pub addr: SocketAddr,
    /// JSON bodies received on `/api/chat`, in arrival order.
    pub requests: Arc<Mutex<Vec<Value>>>,
}

impl FakeBackend {
    pub async fn spawn(script: Script) -> FakeBackend {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();

        let router = Router::new().route(
            "/api/chat",
            post(move |body: Bytes| {
                let script = script.clone();
                let recorded = recorded.clone();
                async move {
                    if let Ok(value) = serde_json::from_slice::<Value>(&body) {
                        recorded.lock().unwrap().push(value);
                    }
                    respond(script)
                }
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        FakeBackend { addr, requests }
    }

    pub fn config(&self) -> RelayConfig {
        config_for(self.addr)
    }

    pub fn client(&self) -> OllamaClient {
        client_for(self.config())
    }
}

fn respond(script: Script) -> Response {
    match script {
        Script::Body(body) => body.into_response(),
        Script::Status(status, body) => (status, body).into_response(),
        Script::DropAfter(first) => Body::from_stream(stream! {
            yield Ok::<_, io::Error>(Bytes::from_static(first.as_bytes()));
            tokio::time::sleep(Duration::from_millis(100)).await;
            yield Err(io::Error::new(io::ErrorKind::ConnectionAborted, "backend crashed"));
        })
        .into_response(),
        Script::StallAfter(first) => Body::from_stream(stream! {
            yield Ok::<_, io::Error>(Bytes::from_static(first.as_bytes()));
            futures_util::future::pending::<()>().await;
        })
        .into_response(),
    }
}

pub fn config_for(addr: SocketAddr) -> RelayConfig {
    RelayConfig {
        backend_host: format!("http://{addr}"),
        model_name: "test-model:1b".to_owned(),
        idle_timeout: Some(Duration::from_secs(5)),
        ..RelayConfig::default()
    }
}

pub fn client_for(config: RelayConfig) -> OllamaClient {
    let http = build_http_client(&config).unwrap();
    OllamaClient::new(Ref::new(config), Ref::new(http))
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Concatenated fragments, plus the terminal error if the stream ended with one.
pub async fn drain(mut tokens: TokenStream) -> (String, Option<String>) {
    let mut text = String::new();
    while let Some(step) = tokens.next().await {
        match step {
            Ok(fragment) => text.push_str(&fragment),
            Err(e) => {
                assert!(tokens.next().await.is_none(), "error must be terminal");
                return (text, Some(e.to_string()));
            }
        }
    }
    (text, None)
}
