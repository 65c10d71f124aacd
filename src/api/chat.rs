//! Chat endpoint

use crate::api::ExtractPrompt;
use crate::core::traits::ChatRelay;
use axum::Router;
use axum::body::Body;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use di_axum::Inject;
use futures_util::StreamExt;
use log::info;
use std::convert::Infallible;
use uuid::Uuid;

pub fn router() -> Router {
    Router::new().route("/chat", post(chat))
}

/// Streams the backend's answer as plain text, one chunk per fragment.
///
/// Backend failures never change the status: they end the body with an inline marker.
async fn chat(
    Inject(relay): Inject<dyn ChatRelay>,
    ExtractPrompt(prompt): ExtractPrompt,
) -> Response {
    let request_id = Uuid::new_v4();
    info!(
        "[{request_id}] chat request, prompt of {} chars",
        prompt.char_count()
    );

    let fragments = relay.relay(request_id, prompt).map(Ok::<_, Infallible>);

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        Body::from_stream(fragments),
    )
        .into_response()
}

pub mod schemas {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
    pub struct ErrorResponse {
        pub error: String,
    }
}
