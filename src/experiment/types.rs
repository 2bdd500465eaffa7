// Run and experiment summaries

use uuid::Uuid;

use crate::recording::RunContext;
use crate::roles::RoleDiagnostics;

/// Outcome of one complete run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub context: RunContext,
    /// Stance parsed from the opening report
    pub initial_stance: f64,
    /// Stance after the last turn
    pub final_stance: f64,
    /// Turns executed (always the configured count)
    pub turns: u32,
    pub records_written: u32,
    pub records_dropped: u32,
    /// Recommender and user counters combined
    pub diagnostics: RoleDiagnostics,
}

/// Totals for one group across all its runs
#[derive(Debug, Clone)]
pub struct GroupSummary {
    pub label: String,
    pub topic_index: u32,
    pub runs: Vec<RunSummary>,
}

impl GroupSummary {
    pub fn turns(&self) -> u32 {
        self.runs.iter().map(|r| r.turns).sum()
    }
}

/// Totals for a whole invocation
#[derive(Debug, Clone)]
pub struct ExperimentSummary {
    pub experiment_id: Uuid,
    /// Where the records went
    pub sink: String,
    pub groups: Vec<GroupSummary>,
}

impl ExperimentSummary {
    pub fn new(sink: impl Into<String>) -> Self {
        Self {
            experiment_id: Uuid::new_v4(),
            sink: sink.into(),
            groups: Vec::new(),
        }
    }

    fn all_runs(&self) -> impl Iterator<Item = &RunSummary> {
        self.groups.iter().flat_map(|g| g.runs.iter())
    }

    pub fn total_runs(&self) -> usize {
        self.all_runs().count()
    }

    pub fn total_turns(&self) -> u32 {
        self.all_runs().map(|r| r.turns).sum()
    }

    pub fn records_written(&self) -> u32 {
        self.all_runs().map(|r| r.records_written).sum()
    }

    pub fn records_dropped(&self) -> u32 {
        self.all_runs().map(|r| r.records_dropped).sum()
    }

    pub fn diagnostics(&self) -> RoleDiagnostics {
        let mut total = RoleDiagnostics::default();
        for run in self.all_runs() {
            total += run.diagnostics;
        }
        total
    }
}
