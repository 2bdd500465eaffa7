// Configuration module
// Public interface for configuration loading

pub mod constants;
mod loader;
pub mod persona;
mod settings;

pub use loader::{apply_env_overrides, default_config_path, load_config, parse_config};
pub use persona::Persona;
pub use settings::{ApiSettings, Config, ModelSettings, SamplingSettings};
