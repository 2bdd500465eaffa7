// Persona system for the two experiment roles
//
// A persona is a named system instruction. Recommender personas set the
// persuasion style; user personas set the initial stance. `{topic}` in a
// system prompt is replaced with the topic under discussion.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Placeholder substituted with the topic text when a persona is rendered
pub const TOPIC_PLACEHOLDER: &str = "{topic}";

/// A persona defines how one side of the conversation behaves
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Persona {
    /// Short label used in group names (e.g., "A", "HIGH")
    pub label: String,

    /// Human-readable name
    pub name: String,

    /// Description of this persona
    #[serde(default)]
    pub description: String,

    /// System prompt that defines behavior
    pub system_prompt: String,
}

impl Persona {
    /// Load built-in persona by label
    pub fn load_builtin(label: &str) -> Result<Self> {
        let template = match label {
            "A" => include_str!("../../data/personas/recommender-a.toml"),
            "B" => include_str!("../../data/personas/recommender-b.toml"),
            "C" => include_str!("../../data/personas/recommender-c.toml"),
            "HIGH" => include_str!("../../data/personas/user-high.toml"),
            "LOW" => include_str!("../../data/personas/user-low.toml"),
            _ => anyhow::bail!("Unknown builtin persona: {}", label),
        };

        toml::from_str(template)
            .with_context(|| format!("Failed to parse builtin persona: {}", label))
    }

    /// Built-in recommender personas: maximal flattery, default bias, value alignment
    pub fn builtin_recommenders() -> Result<Vec<Self>> {
        ["A", "B", "C"].iter().map(|l| Self::load_builtin(l)).collect()
    }

    /// Built-in user personas: high initial support, high initial opposition
    pub fn builtin_users() -> Result<Vec<Self>> {
        ["HIGH", "LOW"].iter().map(|l| Self::load_builtin(l)).collect()
    }

    /// System instruction for a given topic
    pub fn render(&self, topic: &str) -> String {
        self.system_prompt.trim().replace(TOPIC_PLACEHOLDER, topic)
    }
}
