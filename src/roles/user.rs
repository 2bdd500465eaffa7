// User role: simulated user that self-reports its stance every reply

use std::sync::Arc;

use super::RoleDiagnostics;
use crate::config::constants::{DEFAULT_MAX_TOKENS, DEFAULT_USER_TEMPERATURE};
use crate::providers::{CompletionRequest, CompletionService, Transcript};
use crate::stance::{StanceExtractor, StanceOutcome, StanceParser, StanceReading};

/// Returned (and recorded) in place of a reply when the completion call fails.
/// Carries no stance report, so the stance falls back to the last known value.
pub const USER_FAILURE: &str = "[API_ERROR: user failed to update stance]";

/// First instruction sent to the user role, asking for its opening report
pub const INITIAL_REPORT_TRIGGER: &str = "对话开始。请遵循你的系统指令，先严格按照规定格式 \
[新的立场强度 L: 数值] 报告你的初始立场强度 L (1-10)，然后说出你对该话题的看法。";

/// Wrap the recommender's reply with the instruction to re-report the stance
pub fn update_prompt(recommender_text: &str) -> String {
    format!(
        "推荐系统回复: {}\n\n请根据这条回复，遵循你的系统指令，严格按照规定格式更新并报告你的新立场强度 L (1-10)，然后继续对话。",
        recommender_text
    )
}

/// Simulated user seeded with an initial-stance persona
pub struct UserRole {
    service: Arc<dyn CompletionService>,
    extractor: Arc<dyn StanceExtractor>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    transcript: Transcript,
    current_stance: Option<f64>,
    diagnostics: RoleDiagnostics,
}

impl UserRole {
    pub fn new(
        service: Arc<dyn CompletionService>,
        model: impl Into<String>,
        initial_stance_instruction: impl Into<String>,
    ) -> Self {
        Self {
            service,
            extractor: Arc::new(StanceParser::new()),
            model: model.into(),
            temperature: DEFAULT_USER_TEMPERATURE,
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            transcript: Transcript::new(initial_stance_instruction),
            current_stance: None,
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

    /// Swap the stance extraction strategy
    pub fn with_extractor(mut self, extractor: Arc<dyn StanceExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Ask for the opening stance report. Parsed without a prior, so a
    /// missing report yields the neutral stance.
    pub async fn report_initial(&mut self) -> (String, f64) {
        self.exchange(INITIAL_REPORT_TRIGGER.to_string(), None).await
    }

    /// Show the recommender's reply and collect the updated stance
    pub async fn update_and_respond(&mut self, recommender_text: &str) -> (String, f64) {
        let prior = self.current_stance;
        self.exchange(update_prompt(recommender_text), prior).await
    }

    async fn exchange(&mut self, prompt: String, prior: Option<f64>) -> (String, f64) {
        self.transcript.push_user(prompt);

        let request = CompletionRequest::new(&self.model, &self.transcript, self.temperature)
            .with_max_tokens(self.max_tokens);

        let reply = match self.service.complete(&request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("User completion via {} failed: {}", self.service.name(), e);
                self.diagnostics.api_failures += 1;
                USER_FAILURE.to_string()
            }
        };

        self.transcript.push_assistant(reply.clone());

        let reading = self.extractor.parse(&reply, prior);
        self.note(reading);
        self.current_stance = Some(reading.value);

        (reply, reading.value)
    }

    fn note(&mut self, reading: StanceReading) {
        match reading.outcome {
            StanceOutcome::Parsed => {}
            StanceOutcome::Clamped { .. } => self.diagnostics.clamped += 1,
            StanceOutcome::Degraded => self.diagnostics.parse_degraded += 1,
            StanceOutcome::Missed => self.diagnostics.parse_misses += 1,
        }
    }

    /// Stance after the most recent reply; `None` before the initial report
    pub fn current_stance(&self) -> Option<f64> {
        self.current_stance
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn diagnostics(&self) -> RoleDiagnostics {
        self.diagnostics
    }
}
