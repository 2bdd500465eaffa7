// Stancelab - multi-turn persuasion experiments
// Library exports

pub mod cli;
pub mod config;
pub mod experiment;
pub mod providers;
pub mod recording;
pub mod roles;
pub mod stance;
