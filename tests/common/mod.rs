// Shared test fixtures: a scripted completion service and small configs

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use stancelab::config::{Config, Persona};
use stancelab::providers::{CompletionError, CompletionRequest, CompletionService, Role};

pub const RECOMMENDER_PROMPT: &str = "RECOMMENDER persuading about {topic}";
pub const USER_PROMPT: &str = "USER discussing {topic}";

type Handler = dyn Fn(&CompletionRequest) -> Result<String, CompletionError> + Send + Sync;

/// Completion service driven by a closure; records every request it sees
pub struct FakeService {
    handler: Box<Handler>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl FakeService {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&CompletionRequest) -> Result<String, CompletionError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Recommender says "推荐 #n"; the user starts at L=8 and drops one
    /// point per reply, derived purely from the transcript it is sent.
    pub fn scripted() -> Arc<Self> {
        Self::new(|request| {
            let replies = assistant_count(request);
            if is_user_request(request) {
                Ok(user_reply(8.0 - replies as f64, replies))
            } else {
                Ok(format!("推荐 #{}", replies + 1))
            }
        })
    }

    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn user_calls(&self) -> Vec<CompletionRequest> {
        self.calls().into_iter().filter(is_user_request).collect()
    }

    pub fn recommender_calls(&self) -> Vec<CompletionRequest> {
        self.calls()
            .into_iter()
            .filter(|r| !is_user_request(r))
            .collect()
    }
}

#[async_trait]
impl CompletionService for FakeService {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.calls.lock().unwrap().push(request.clone());
        (self.handler)(request)
    }

    fn name(&self) -> &str {
        "fake"
    }
}

pub fn is_user_request(request: &CompletionRequest) -> bool {
    request.messages[0].content.starts_with("USER")
}

pub fn assistant_count(request: &CompletionRequest) -> usize {
    request
        .messages
        .iter()
        .filter(|m| m.role == Role::Assistant)
        .count()
}

pub fn user_reply(stance: f64, n: usize) -> String {
    format!("[新的立场强度 L: {}]\n回复 #{}", stance, n)
}

pub fn persona(label: &str, prompt: &str) -> Persona {
    Persona {
        label: label.to_string(),
        name: format!("Test {}", label),
        description: String::new(),
        system_prompt: prompt.to_string(),
    }
}

/// Two recommenders × two users, no pacing delay
pub fn test_config(num_turns: u32, num_runs: u32) -> Config {
    let mut config = Config::with_builtin_personas().unwrap();
    config.api.api_key = "sk-test".to_string();
    config.num_turns = num_turns;
    config.num_runs = num_runs;
    config.turn_delay_ms = 0;
    config.topics = vec!["远程办公".to_string()];
    config.recommender_personas = vec![
        persona("A", RECOMMENDER_PROMPT),
        persona("B", RECOMMENDER_PROMPT),
    ];
    config.user_personas = vec![persona("HIGH", USER_PROMPT), persona("LOW", USER_PROMPT)];
    config
}
