//! Ollama-compatible inference backend client

use crate::core::chat::{ChatMessage, Prompt};
use crate::core::config::RelayConfig;
use crate::core::error::BackendError;
use crate::infrastructure::entities::{ChatPayload, ErrorBody};
use crate::infrastructure::http::within;
use crate::infrastructure::ndjson::decode_events;
use crate::infrastructure::traits::{ChatBackend, TokenStream};
use async_stream::stream;
use di::{Ref, injectable};
use futures_util::StreamExt;
use log::debug;
use reqwest::Client;

const MAX_DETAIL_CHARS: usize = 200;

#[injectable(ChatBackend)]
pub struct OllamaClient {
    config: Ref<RelayConfig>,
    http: Ref<Client>,
}

impl OllamaClient {
    pub fn new(config: Ref<RelayConfig>, http: Ref<Client>) -> Self {
        Self { config, http }
    }
}

impl ChatBackend for OllamaClient {
    fn stream_chat(&self, prompt: &Prompt) -> TokenStream {
        let http = self.http.clone();
        let url = self.config.chat_url();
        let model = self.config.model_name.clone();
        let idle_timeout = self.config.idle_timeout;
        let messages = vec![ChatMessage::user(prompt)];

        stream! {
            let payload = ChatPayload {
                model: &model,
                messages,
                stream: true,
            };

            debug!("POST {url} with model {model}");
            let response = match within(idle_timeout, http.post(&url).json(&payload).send()).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    yield Err(BackendError::Request(e));
                    return;
                }
                Err(limit) => {
                    yield Err(BackendError::Idle(limit));
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let body = within(idle_timeout, response.text())
                    .await
                    .ok()
                    .and_then(Result::ok)
                    .unwrap_or_default();
                yield Err(BackendError::Status {
                    status,
                    detail: status_detail(&body),
                });
                return;
            }

            let mut events = Box::pin(decode_events(response.bytes_stream(), idle_timeout));
            while let Some(event) = events.next().await {
                let event = match event {
                    Ok(event) => event,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };

                if let Some(error) = event.error {
                    yield Err(BackendError::Remote(error));
                    return;
                }

                let done = event.done;
                if let Some(content) = event.into_content().filter(|c| !c.is_empty()) {
                    yield Ok(content);
                }
                if done {
                    debug!("backend signalled done");
                    return;
                }
            }
        }
        .boxed()
    }
}

/// Short description of a non-success response body.
fn status_detail(body: &str) -> String {
    if let Ok(ErrorBody { error }) = serde_json::from_str::<ErrorBody>(body) {
        return error;
    }

    let body = body.trim();
    if body.chars().count() > MAX_DETAIL_CHARS {
        let mut detail: String = body.chars().take(MAX_DETAIL_CHARS).collect();
        detail.push_str("...");
        detail
    } else {
        body.to_owned()
    }
}
