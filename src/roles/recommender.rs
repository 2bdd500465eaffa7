// Recommender role: the persuading side of the conversation

use std::sync::Arc;

use super::RoleDiagnostics;
use crate::config::constants::{DEFAULT_MAX_TOKENS, DEFAULT_RECOMMENDER_TEMPERATURE};
use crate::providers::{CompletionRequest, CompletionService, Transcript};

/// Returned (and recorded) in place of a reply when the completion call fails
pub const RECOMMENDER_FAILURE: &str = "[API_ERROR: recommender failed to respond]";

/// Recommender with a fixed persona instruction and one persistent transcript
pub struct RecommenderRole {
    service: Arc<dyn CompletionService>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    transcript: Transcript,
    diagnostics: RoleDiagnostics,
}

impl RecommenderRole {
    pub fn new(
        service: Arc<dyn CompletionService>,
        model: impl Into<String>,
        persona_instruction: impl Into<String>,
    ) -> Self {
        Self {
            service,
            model: model.into(),
            temperature: DEFAULT_RECOMMENDER_TEMPERATURE,
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            transcript: Transcript::new(persona_instruction),
            diagnostics: RoleDiagnostics::default(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Reply to the latest user-side text.
    ///
    /// On failure the sentinel is returned and also kept in the transcript,
    /// so later turns still see a strict user/assistant alternation.
    pub async fn respond(&mut self, input: &str) -> String {
        self.transcript.push_user(input);

        let request = CompletionRequest::new(&self.model, &self.transcript, self.temperature)
            .with_max_tokens(self.max_tokens);

        let reply = match self.service.complete(&request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Recommender completion via {} failed: {}", self.service.name(), e);
                self.diagnostics.api_failures += 1;
                RECOMMENDER_FAILURE.to_string()
            }
        };

        self.transcript.push_assistant(reply.clone());
        reply
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn diagnostics(&self) -> RoleDiagnostics {
        self.diagnostics
    }
}
