//! Infrastructure traits, used for DI on higher levels

use crate::core::chat::Prompt;
use crate::core::error::BackendError;
use futures_util::stream::BoxStream;

/// Incremental text fragments from the backend. An `Err` item is always the last one.
pub type TokenStream = BoxStream<'static, Result<String, BackendError>>;

pub trait ChatBackend: Send + Sync {
    /// Starts a streaming chat completion for a single user prompt.
    ///
    /// Nothing happens until the returned stream is polled. Connection failures and bad
    /// statuses surface as the stream's terminal `Err`, never as a panic.
    fn stream_chat(&self, prompt: &Prompt) -> TokenStream;
}
