// Project-wide constants
//
// Centralised here so sampling defaults and other magic values have one
// source of truth. Import via `use crate::config::constants::*;`.

/// Sampling temperature for the recommender ("expressive").
pub const DEFAULT_RECOMMENDER_TEMPERATURE: f32 = 0.7;

/// Sampling temperature for the user role ("disciplined"), low enough that the
/// self-report format is followed reliably.
pub const DEFAULT_USER_TEMPERATURE: f32 = 0.5;

/// Default maximum tokens per completion.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Default HTTP timeout for a single completion call.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Courtesy pause between turns, in milliseconds.
pub const DEFAULT_TURN_DELAY_MS: u64 = 1000;

pub const DEFAULT_NUM_TURNS: u32 = 10;
pub const DEFAULT_NUM_RUNS: u32 = 5;

/// Upper bounds accepted by `Config::validate`.
pub const MAX_NUM_TURNS: u32 = 1000;
pub const MAX_NUM_RUNS: u32 = 1000;

/// Default OpenAI-compatible endpoint (includes the version segment).
pub const DEFAULT_BASE_URL: &str = "https://api.siliconflow.cn/v1";

pub const DEFAULT_RECOMMENDER_MODEL: &str = "Qwen/Qwen2.5-72B-Instruct";
pub const DEFAULT_USER_MODEL: &str = "Qwen/Qwen2.5-7B-Instruct";

pub const DEFAULT_OUTPUT_FILENAME: &str = "experiment_results.csv";

pub const DEFAULT_TOPIC: &str = "人工智能是否应该全面取代人类完成重复性工作";

/// Placeholder shipped in sample configs; treated the same as a missing key.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

/// Environment variables consulted (in order) for the API key.
pub const API_KEY_ENV_VARS: [&str; 2] = ["STANCELAB_API_KEY", "OPENAI_API_KEY"];

/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV_VAR: &str = "STANCELAB_BASE_URL";
