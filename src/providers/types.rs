// Chat message and request types shared by every completion backend
//
// A role's conversation is a `Transcript`: one system entry first, then
// alternating user/assistant turns appended for the lifetime of a run.

use serde::Serialize;

use crate::config::constants::DEFAULT_MAX_TOKENS;

/// Who authored a message in a chat transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Append-only conversation history owned by a single role instance.
///
/// The system instruction is fixed at construction and is always the first
/// entry; the only way to grow the transcript is to append user or assistant
/// messages.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::new(Role::System, system_instruction)],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(Role::User, content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(Role::Assistant, content));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

/// A single completion call: full history plus sampling parameters
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier understood by the backend
    pub model: String,

    /// Ordered, role-tagged conversation
    pub messages: Vec<ChatMessage>,

    /// Sampling temperature
    pub temperature: f32,

    /// Optional cap on generated tokens
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Build a request from a transcript snapshot
    pub fn new(model: impl Into<String>, transcript: &Transcript, temperature: f32) -> Self {
        Self {
            model: model.into(),
            messages: transcript.messages().to_vec(),
            temperature,
            max_tokens: Some(DEFAULT_MAX_TOKENS),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}
