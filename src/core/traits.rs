//! DI "Interfaces"

use crate::core::chat::Prompt;
use futures_util::stream::BoxStream;
use uuid::Uuid;

/// Text fragments written to the caller's response body, in order.
pub type FragmentStream = BoxStream<'static, String>;

pub trait ChatRelay: Send + Sync {
    /// Relays a prompt to the backend and returns the caller-facing body.
    ///
    /// The stream always terminates normally. A backend failure becomes one final
    /// `[Error: <description>]` fragment.
    fn relay(&self, request_id: Uuid, prompt: Prompt) -> FragmentStream;
}
