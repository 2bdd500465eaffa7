// Per-turn measurement record

use chrono::{DateTime, Local};

/// Identifies the run a record belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Group label, e.g. "A-HIGH"
    pub group: String,
    /// 0-based run number within the group
    pub run_id: u32,
    /// 0-based position of the topic in the configured list
    pub topic_index: u32,
}

/// One completed turn: a recommender reply and the user's answer to it.
///
/// Immutable once built; `stance_change` is always `new_stance - prev_stance`.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnRecord {
    pub timestamp: DateTime<Local>,
    pub group: String,
    pub run_id: u32,
    pub topic_index: u32,
    /// 1-based turn index
    pub turn: u32,
    pub prev_stance: f64,
    pub new_stance: f64,
    pub stance_change: f64,
    pub recommender_output: String,
    pub user_output: String,
}

impl TurnRecord {
    pub fn new(
        context: &RunContext,
        turn: u32,
        prev_stance: f64,
        new_stance: f64,
        recommender_output: impl Into<String>,
        user_output: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            group: context.group.clone(),
            run_id: context.run_id,
            topic_index: context.topic_index,
            turn,
            prev_stance,
            new_stance,
            stance_change: new_stance - prev_stance,
            recommender_output: recommender_output.into(),
            user_output: user_output.into(),
        }
    }
}
