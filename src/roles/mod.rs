// Conversation roles
//
// Each role owns one transcript for the lifetime of a single run and wraps
// the completion service with its own persona and sampling temperature.
// Completion failures never escape a role: they become sentinel texts that
// are recorded like any other output.

pub mod recommender;
pub mod user;

pub use recommender::{RecommenderRole, RECOMMENDER_FAILURE};
pub use user::{UserRole, INITIAL_REPORT_TRIGGER, USER_FAILURE};

use std::ops::AddAssign;

/// Degradation counters collected by a role during one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleDiagnostics {
    /// Completion calls that failed and were replaced by a sentinel
    pub api_failures: u32,
    /// Replies with no stance report
    pub parse_misses: u32,
    /// Replies whose stance payload was unusable
    pub parse_degraded: u32,
    /// Stance reports outside the valid range
    pub clamped: u32,
}

impl AddAssign for RoleDiagnostics {
    fn add_assign(&mut self, other: Self) {
        self.api_failures += other.api_failures;
        self.parse_misses += other.parse_misses;
        self.parse_degraded += other.parse_degraded;
        self.clamped += other.clamped;
    }
}
