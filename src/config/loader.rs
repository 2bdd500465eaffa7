// Configuration loader
// Loads experiment settings from a TOML file, then fills the credential from
// the environment when the file does not carry one.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::constants::{API_KEY_ENV_VARS, BASE_URL_ENV_VAR};
use super::persona::Persona;
use super::settings::{ApiSettings, Config, ModelSettings, SamplingSettings};

/// Default config location: `~/.stancelab/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".stancelab").join("config.toml"))
}

/// Load configuration.
///
/// An explicit `path` must exist. Without one, `~/.stancelab/config.toml` is
/// used when present, otherwise the built-in defaults. Environment overrides
/// are applied last; validation is left to the caller.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => load_from_file(path)?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => load_from_file(&path)?,
            None => {
                tracing::debug!("No config file found, using built-in defaults");
                Config::with_builtin_personas()?
            }
        },
    };

    Ok(apply_env_overrides(config, |name| std::env::var(name).ok()))
}

fn load_from_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        bail!("Configuration file not found: {}", path.display());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;

    tracing::debug!("Loading configuration from {}", path.display());
    parse_config(&contents).with_context(|| format!("Invalid configuration in {}", path.display()))
}

/// Parse a TOML document into a `Config`, filling unset fields with defaults
pub fn parse_config(contents: &str) -> Result<Config> {
    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct TomlConfig {
        #[serde(default)]
        topic: Option<String>,
        #[serde(default)]
        topics: Vec<String>,
        #[serde(default)]
        num_turns: Option<u32>,
        #[serde(default)]
        num_runs: Option<u32>,
        #[serde(default)]
        output_filename: Option<String>,
        #[serde(default)]
        turn_delay_ms: Option<u64>,
        #[serde(default)]
        api: Option<ApiSettings>,
        #[serde(default)]
        models: Option<ModelSettings>,
        #[serde(default)]
        sampling: Option<SamplingSettings>,
        #[serde(default)]
        recommender_personas: Vec<Persona>,
        #[serde(default)]
        user_personas: Vec<Persona>,
    }

    let toml_config: TomlConfig =
        toml::from_str(contents).context("Failed to parse configuration TOML")?;

    let mut config = Config::with_builtin_personas()?;

    // `topic = "..."` is shorthand for a single-entry `topics` list.
    let mut topics = toml_config.topics;
    if let Some(topic) = toml_config.topic {
        topics.insert(0, topic);
    }
    if !topics.is_empty() {
        config.topics = topics;
    }

    if let Some(n) = toml_config.num_turns {
        config.num_turns = n;
    }
    if let Some(n) = toml_config.num_runs {
        config.num_runs = n;
    }
    if let Some(name) = toml_config.output_filename {
        config.output_filename = name;
    }
    if let Some(delay) = toml_config.turn_delay_ms {
        config.turn_delay_ms = delay;
    }
    if let Some(api) = toml_config.api {
        config.api = api;
    }
    if let Some(models) = toml_config.models {
        config.models = models;
    }
    if let Some(sampling) = toml_config.sampling {
        config.sampling = sampling;
    }
    if !toml_config.recommender_personas.is_empty() {
        config.recommender_personas = toml_config.recommender_personas;
    }
    if !toml_config.user_personas.is_empty() {
        config.user_personas = toml_config.user_personas;
    }

    Ok(config)
}

/// Fill the API key (when missing) and base URL from the environment.
///
/// `lookup` is injected so tests don't have to mutate the process environment.
pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    if !config.api.has_api_key() {
        if let Some(key) = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
        {
            config.api.api_key = key;
        }
    }

    if let Some(url) = lookup(BASE_URL_ENV_VAR).filter(|v| !v.trim().is_empty()) {
        config.api.base_url = url;
    }

    config
}
