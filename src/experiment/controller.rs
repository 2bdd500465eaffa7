// Experiment controller: drives runs, groups and the full matrix
//
// A run is `INIT -> TURN x num_turns -> DONE`. Failures inside a turn
// (API errors, unparseable stances, dropped records) degrade the data but
// never end a run early.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, info_span, warn, Instrument};

use super::groups::ExperimentGroup;
use super::types::{ExperimentSummary, GroupSummary, RunSummary};
use crate::config::{Config, ModelSettings, SamplingSettings};
use crate::providers::CompletionService;
use crate::recording::{RunContext, RunRecorder, TurnRecord};
use crate::roles::{RecommenderRole, UserRole};

const PREVIEW_CHARS: usize = 30;

/// Sequential experiment driver.
///
/// Holds only what every run needs; roles and transcripts are created per run
/// and dropped when it ends.
pub struct ExperimentController {
    service: Arc<dyn CompletionService>,
    models: ModelSettings,
    sampling: SamplingSettings,
    num_turns: u32,
    num_runs: u32,
    turn_delay: Duration,
}

impl ExperimentController {
    pub fn new(service: Arc<dyn CompletionService>, config: &Config) -> Self {
        Self {
            service,
            models: config.models.clone(),
            sampling: config.sampling.clone(),
            num_turns: config.num_turns,
            num_runs: config.num_runs,
            turn_delay: config.turn_delay(),
        }
    }

    /// Run every topic × group × run, sequentially, into one recorder
    pub async fn run_all(
        &self,
        topics: &[String],
        groups: &[ExperimentGroup],
        recorder: &mut dyn RunRecorder,
    ) -> ExperimentSummary {
        let mut summary = ExperimentSummary::new(recorder.location());
        info!(
            "Experiment {} starting: {} topic(s) × {} group(s) × {} run(s) × {} turn(s)",
            summary.experiment_id,
            topics.len(),
            groups.len(),
            self.num_runs,
            self.num_turns
        );

        for (topic_index, topic) in topics.iter().enumerate() {
            info!("Topic {}: {}", topic_index, topic);
            for group in groups {
                let group_summary = self
                    .run_group(group, topic_index as u32, topic, recorder)
                    .await;
                summary.groups.push(group_summary);
            }
        }

        summary
    }

    /// Run `num_runs` independent conversations for one group
    pub async fn run_group(
        &self,
        group: &ExperimentGroup,
        topic_index: u32,
        topic: &str,
        recorder: &mut dyn RunRecorder,
    ) -> GroupSummary {
        info!(
            "Running group {} ({} runs, {} turns/run)",
            group.label, self.num_runs, self.num_turns
        );

        let mut runs = Vec::new();
        for run_id in 0..self.num_runs {
            let context = RunContext {
                group: group.label.clone(),
                run_id,
                topic_index,
            };
            let span = info_span!(
                "run",
                group = %group.label,
                run = run_id + 1,
                of = self.num_runs
            );
            let run = self
                .run_once(group, topic, context, recorder)
                .instrument(span)
                .await;
            runs.push(run);
        }

        GroupSummary {
            label: group.label.clone(),
            topic_index,
            runs,
        }
    }

    /// One complete conversation with fresh roles
    pub async fn run_once(
        &self,
        group: &ExperimentGroup,
        topic: &str,
        context: RunContext,
        recorder: &mut dyn RunRecorder,
    ) -> RunSummary {
        // INIT
        let mut recommender = RecommenderRole::new(
            self.service.clone(),
            &self.models.recommender,
            group.recommender.render(topic),
        )
        .with_temperature(self.sampling.recommender_temperature)
        .with_max_tokens(self.sampling.max_tokens);

        let mut user = UserRole::new(
            self.service.clone(),
            &self.models.user,
            group.user.render(topic),
        )
        .with_temperature(self.sampling.user_temperature)
        .with_max_tokens(self.sampling.max_tokens);

        let (initial_text, initial_stance) = user.report_initial().await;
        info!("Initial stance L={}", initial_stance);

        let mut previous = initial_stance;
        let mut next_input = initial_text;
        let mut written = 0;
        let mut dropped = 0;

        // TURN 1..=num_turns
        for turn in 1..=self.num_turns {
            let recommender_text = recommender.respond(&next_input).await;
            let (user_text, new_stance) = user.update_and_respond(&recommender_text).await;

            info!(
                "Turn {}: L({} -> {}) | recommender: {}",
                turn,
                previous,
                new_stance,
                preview(&recommender_text)
            );

            let record = TurnRecord::new(
                &context,
                turn,
                previous,
                new_stance,
                recommender_text,
                user_text.clone(),
            );
            match recorder.record(&record) {
                Ok(()) => written += 1,
                Err(e) => {
                    warn!("Failed to record turn {}, record dropped: {:#}", turn, e);
                    dropped += 1;
                }
            }

            previous = new_stance;
            next_input = user_text;

            if !self.turn_delay.is_zero() {
                tokio::time::sleep(self.turn_delay).await;
            }
        }

        // DONE
        let mut diagnostics = recommender.diagnostics();
        diagnostics += user.diagnostics();

        RunSummary {
            context,
            initial_stance,
            final_stance: previous,
            turns: self.num_turns,
            records_written: written,
            records_dropped: dropped,
            diagnostics,
        }
    }
}

/// First few characters of a reply, for progress lines
fn preview(text: &str) -> String {
    let flat = text.replace('\n', " ");
    let mut chars = flat.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
