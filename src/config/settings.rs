// Configuration structs

use anyhow::{bail, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use super::constants::*;
use super::persona::Persona;

/// `[api]` section: credential and endpoint for the completion service
#[derive(Clone, Deserialize)]
pub struct ApiSettings {
    /// Bearer token; may be filled from the environment instead
    #[serde(default)]
    pub api_key: String,

    /// OpenAI-compatible base URL including the version segment
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-call HTTP timeout. A hung call fails after this and the role
    /// records its failure sentinel.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl ApiSettings {
    /// True when a usable credential is present
    pub fn has_api_key(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && key != PLACEHOLDER_API_KEY
    }
}

/// `[models]` section: model identifier per role
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    #[serde(default = "default_recommender_model")]
    pub recommender: String,

    #[serde(default = "default_user_model")]
    pub user: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            recommender: default_recommender_model(),
            user: default_user_model(),
        }
    }
}

/// `[sampling]` section
#[derive(Debug, Clone, Deserialize)]
pub struct SamplingSettings {
    #[serde(default = "default_recommender_temperature")]
    pub recommender_temperature: f32,

    #[serde(default = "default_user_temperature")]
    pub user_temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: Option<u32>,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            recommender_temperature: default_recommender_temperature(),
            user_temperature: default_user_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_recommender_model() -> String {
    DEFAULT_RECOMMENDER_MODEL.to_string()
}

fn default_user_model() -> String {
    DEFAULT_USER_MODEL.to_string()
}

fn default_recommender_temperature() -> f32 {
    DEFAULT_RECOMMENDER_TEMPERATURE
}

fn default_user_temperature() -> f32 {
    DEFAULT_USER_TEMPERATURE
}

fn default_max_tokens() -> Option<u32> {
    Some(DEFAULT_MAX_TOKENS)
}

/// Fully resolved experiment configuration.
///
/// Built once at startup and passed by reference to everything that needs it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Topics to discuss; each gets the full group matrix. `TopicIndex` in the
    /// output refers to a position in this list.
    pub topics: Vec<String>,

    /// Turns per run
    pub num_turns: u32,

    /// Independent runs per group
    pub num_runs: u32,

    /// Base name of the output CSV; the topic prefix and a timestamp are appended
    pub output_filename: String,

    /// Courtesy pause between turns
    pub turn_delay_ms: u64,

    pub api: ApiSettings,
    pub models: ModelSettings,
    pub sampling: SamplingSettings,

    /// Recommender personas (persuasion styles)
    pub recommender_personas: Vec<Persona>,

    /// User personas (initial stances)
    pub user_personas: Vec<Persona>,
}

impl Config {
    /// Default configuration with the built-in persona matrix
    pub fn with_builtin_personas() -> Result<Self> {
        Ok(Self {
            topics: vec![DEFAULT_TOPIC.to_string()],
            num_turns: DEFAULT_NUM_TURNS,
            num_runs: DEFAULT_NUM_RUNS,
            output_filename: DEFAULT_OUTPUT_FILENAME.to_string(),
            turn_delay_ms: DEFAULT_TURN_DELAY_MS,
            api: ApiSettings::default(),
            models: ModelSettings::default(),
            sampling: SamplingSettings::default(),
            recommender_personas: Persona::builtin_recommenders()?,
            user_personas: Persona::builtin_users()?,
        })
    }

    pub fn turn_delay(&self) -> Duration {
        Duration::from_millis(self.turn_delay_ms)
    }

    /// Topic used to name the output file
    pub fn primary_topic(&self) -> &str {
        self.topics.first().map(String::as_str).unwrap_or_default()
    }

    /// Check structural validity (everything except the credential)
    pub fn validate(&self) -> Result<()> {
        if self.topics.is_empty() || self.topics.iter().any(|t| t.trim().is_empty()) {
            bail!("At least one non-empty topic is required");
        }
        if !(1..=MAX_NUM_TURNS).contains(&self.num_turns) {
            bail!("num_turns must be within [1, {}], got {}", MAX_NUM_TURNS, self.num_turns);
        }
        if !(1..=MAX_NUM_RUNS).contains(&self.num_runs) {
            bail!("num_runs must be within [1, {}], got {}", MAX_NUM_RUNS, self.num_runs);
        }
        if self.output_filename.trim().is_empty() {
            bail!("output_filename must not be empty");
        }
        if self.models.recommender.trim().is_empty() || self.models.user.trim().is_empty() {
            bail!("Both [models] recommender and user must be set");
        }
        for (name, value) in [
            ("recommender_temperature", self.sampling.recommender_temperature),
            ("user_temperature", self.sampling.user_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                bail!("{} must be within [0.0, 2.0], got {}", name, value);
            }
        }

        validate_personas("recommender", &self.recommender_personas)?;
        validate_personas("user", &self.user_personas)?;

        Ok(())
    }

    /// Fail unless a usable API credential is configured
    pub fn require_api_key(&self) -> Result<()> {
        if !self.api.has_api_key() {
            bail!(
                "No API key configured.\n\n\
                Set it in the [api] section of your config file:\n\
                \x20   api_key = \"sk-...\"\n\n\
                or export one of: {}",
                API_KEY_ENV_VARS.join(", ")
            );
        }
        Ok(())
    }
}

fn validate_personas(kind: &str, personas: &[Persona]) -> Result<()> {
    if personas.is_empty() {
        bail!("At least one {} persona is required", kind);
    }

    let mut seen = HashSet::new();
    for persona in personas {
        if persona.label.trim().is_empty() {
            bail!("A {} persona has an empty label", kind);
        }
        if persona.system_prompt.trim().is_empty() {
            bail!("{} persona '{}' has an empty system_prompt", kind, persona.label);
        }
        if !seen.insert(persona.label.as_str()) {
            bail!("Duplicate {} persona label '{}'", kind, persona.label);
        }
    }
    Ok(())
}
