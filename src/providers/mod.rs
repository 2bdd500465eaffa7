// Completion backends
//
// The experiment core only ever talks to `CompletionService`; the concrete
// OpenAI-compatible HTTP client lives behind it so tests (and alternative
// backends) can stand in without touching the roles or the controller.

use async_trait::async_trait;

pub mod error;
pub mod openai;
pub mod types;

pub use error::CompletionError;
pub use openai::OpenAiCompatibleClient;
pub use types::{ChatMessage, CompletionRequest, Role, Transcript};

/// Trait for chat completion backends
///
/// Given an ordered conversation and a sampling temperature, return one
/// generated text. One request, one response; no streaming.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send the conversation and wait for the full reply
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;

    /// Backend name used in logs (e.g., "openai-compatible")
    fn name(&self) -> &str;
}
