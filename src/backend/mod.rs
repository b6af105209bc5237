//! Completion backend abstraction.

pub mod openai;

pub use openai::OpenAiBackend;

use async_trait::async_trait;

use crate::error::BackendError;

/// A generative backend that turns a prompt into a commit message.
///
/// This abstraction allows mocking the network backend in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Request `candidates` alternative completions for `prompt` and return
    /// the text of the first one. Network-bound; the only suspension point
    /// of an invocation.
    async fn complete(&self, prompt: &str, candidates: u32) -> Result<String, BackendError>;
}
