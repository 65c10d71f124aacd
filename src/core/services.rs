//! Implementations for the service the app needs.
//!

use crate::core::chat::{Prompt, error_marker};
use crate::core::traits::{ChatRelay, FragmentStream};
use crate::infrastructure::traits::{ChatBackend, TokenStream};
use async_stream::stream;
use di::{Ref, injectable};
use futures_util::{Stream, StreamExt};
use log::{debug, info, warn};
use uuid::Uuid;

#[injectable(ChatRelay)]
pub struct BackendChatRelay {
    backend: Ref<dyn ChatBackend>,
}

impl ChatRelay for BackendChatRelay {
    fn relay(&self, request_id: Uuid, prompt: Prompt) -> FragmentStream {
        render_fragments(request_id, self.backend.stream_chat(&prompt)).boxed()
    }
}

/// Passes fragments through untouched and turns a terminal backend error into an inline marker.
pub fn render_fragments(request_id: Uuid, tokens: TokenStream) -> impl Stream<Item = String> + Send {
    stream! {
        let mut tokens = tokens;
        let mut progress = Progress::new(request_id);

        while let Some(step) = tokens.next().await {
            match step {
                Ok(fragment) => {
                    progress.fragments += 1;
                    yield fragment;
                }
                Err(e) => {
                    warn!(
                        "[{request_id}] backend failed after {} fragments: {e}",
                        progress.fragments
                    );
                    progress.finished = true;
                    yield error_marker(&e);
                    return;
                }
            }
        }

        progress.finished = true;
        info!("[{request_id}] relayed {} fragments", progress.fragments);
    }
}

/// Notices a body dropped before the backend stream was exhausted.
struct Progress {
    request_id: Uuid,
    fragments: usize,
    finished: bool,
}

impl Progress {
    fn new(request_id: Uuid) -> Self {
        Self {
            request_id,
            fragments: 0,
            finished: false,
        }
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        if !self.finished {
            debug!(
                "[{}] client went away after {} fragments, dropping backend stream",
                self.request_id, self.fragments
            );
        }
    }
}
