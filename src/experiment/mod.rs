// Experiment orchestration
//
// Builds the persona group matrix and drives each run's turn loop between a
// fresh recommender and a fresh simulated user, handing every turn to the
// run recorder.

pub mod controller;
pub mod groups;
pub mod types;

pub use controller::ExperimentController;
pub use groups::{build_groups, select_groups, ExperimentGroup};
pub use types::{ExperimentSummary, GroupSummary, RunSummary};
