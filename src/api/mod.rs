use crate::api::chat::schemas::ErrorResponse;
use crate::core::chat::Prompt;
use crate::core::config::RelayConfig;
use crate::core::error::ValidationError;
use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::{Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use di::ServiceProvider;
use di_axum::{Inject, RouterServiceProviderExtensions};
use log::{error, info};
use minijinja::{Environment, context};
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;

pub mod chat;

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");

/// Builds the full application: page, static assets and the chat endpoint.
pub fn app(provider: ServiceProvider, config: &RelayConfig) -> Router {
    let app = Router::new()
        .route("/", get(index))
        .merge(chat::router())
        .nest_service(
            "/static",
            ServiceBuilder::new().service(ServeDir::new(&config.static_dir)),
        );

    let app = if config.allowed_origins.is_empty() {
        app
    } else {
        app.layer(
            CorsLayer::new()
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_origin(AllowOrigin::list(config.allowed_origins.clone())),
        )
    };

    app.with_provider(provider)
}

async fn index(Inject(config): Inject<RelayConfig>) -> Result<Html<String>, StatusCode> {
    render_index(&config.model_name).map(Html).map_err(|e| {
        error!("failed to render index page: {e}");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

pub fn render_index(model_name: &str) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("index.html", INDEX_TEMPLATE)?;
    env.get_template("index.html")?
        .render(context! { model_name })
}

/// Validated prompt taken from a JSON body of the form `{"prompt": "..."}`.
#[derive(Debug)]
pub struct ExtractPrompt(pub Prompt);

#[async_trait]
impl<S> FromRequest<S> for ExtractPrompt
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Response> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        parse_prompt(&body).map(ExtractPrompt).map_err(|e| {
            info!("rejected chat request: {e}");
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        })
    }
}

/// A prompt that is missing, empty or not a string is rejected the same way.
pub fn parse_prompt(body: &[u8]) -> Result<Prompt, ValidationError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ValidationError::MalformedBody)?;
    let prompt = value
        .get("prompt")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Prompt::new(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prompt() {
        let prompt = parse_prompt(br#"{"prompt":"Hello"}"#).unwrap();
        assert_eq!(prompt.as_str(), "Hello");
    }

    #[test]
    fn test_parse_prompt_ignores_extra_fields() {
        let prompt = parse_prompt(br#"{"prompt":"Hi","temperature":0.2}"#).unwrap();
        assert_eq!(prompt.as_str(), "Hi");
    }

    #[test]
    fn test_parse_prompt_rejections() {
        let bodies: [&[u8]; 5] = [
            br#"{}"#,
            br#"{"prompt":""}"#,
            br#"{"prompt":null}"#,
            br#"{"prompt":42}"#,
            br#"["prompt"]"#,
        ];
        for body in bodies {
            assert_eq!(parse_prompt(body), Err(ValidationError::MissingPrompt));
        }
    }

    #[test]
    fn test_parse_prompt_malformed() {
        assert_eq!(parse_prompt(b"prompt=hi"), Err(ValidationError::MalformedBody));
        assert_eq!(parse_prompt(b""), Err(ValidationError::MalformedBody));
    }

    #[test]
    fn test_render_index_escapes_model_name() {
        let page = render_index("<b>llama</b>").unwrap();
        assert!(page.contains("&lt;b&gt;llama"));
        assert!(!page.contains("<b>llama"));
    }
}
