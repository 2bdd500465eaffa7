// CSV sink for turn records

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use tracing::debug;

use super::record::TurnRecord;
use super::RunRecorder;

/// Column order of the output file. Stable across releases.
pub const CSV_COLUMNS: [&str; 10] = [
    "Timestamp",
    "Group",
    "RunID",
    "TopicIndex",
    "Turn",
    "PrevStance",
    "NewStance",
    "StanceChange",
    "LLMResponse",
    "SLMOutput",
];

/// Derive the output file path for this process.
///
/// `{base without .csv}_{first two chars of topic}_{YYYYmmdd_HHMMSS}.csv`
pub fn output_path(base: &str, topic: &str, started: DateTime<Local>) -> PathBuf {
    let stem = base.strip_suffix(".csv").unwrap_or(base);
    let prefix: String = topic
        .trim()
        .chars()
        .take(2)
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();

    PathBuf::from(format!(
        "{}_{}_{}.csv",
        stem,
        prefix,
        started.format("%Y%m%d_%H%M%S")
    ))
}

#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "Group")]
    group: &'a str,
    #[serde(rename = "RunID")]
    run_id: u32,
    #[serde(rename = "TopicIndex")]
    topic_index: u32,
    #[serde(rename = "Turn")]
    turn: u32,
    #[serde(rename = "PrevStance")]
    prev_stance: f64,
    #[serde(rename = "NewStance")]
    new_stance: f64,
    #[serde(rename = "StanceChange")]
    stance_change: f64,
    #[serde(rename = "LLMResponse")]
    recommender_output: &'a str,
    #[serde(rename = "SLMOutput")]
    user_output: &'a str,
}

impl<'a> From<&'a TurnRecord> for CsvRow<'a> {
    fn from(record: &'a TurnRecord) -> Self {
        Self {
            timestamp: record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            group: &record.group,
            run_id: record.run_id,
            topic_index: record.topic_index,
            turn: record.turn,
            prev_stance: record.prev_stance,
            new_stance: record.new_stance,
            stance_change: record.stance_change,
            recommender_output: &record.recommender_output,
            user_output: &record.user_output,
        }
    }
}

/// Appends one row per turn to a single CSV file shared by every group and run.
///
/// The file is created and its header written in `create`; each `record`
/// reopens in append mode and flushes, so partial progress survives a crash.
pub struct CsvRunRecorder {
    path: PathBuf,
    header_written: bool,
    rows_written: u64,
}

impl CsvRunRecorder {
    /// Create (or truncate) the file and write the header
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }

        let mut recorder = Self {
            path,
            header_written: false,
            rows_written: 0,
        };
        recorder.write_header()?;
        Ok(recorder)
    }

    fn write_header(&mut self) -> Result<()> {
        if self.header_written {
            return Ok(());
        }

        let file = File::create(&self.path)
            .with_context(|| format!("Failed to create output file: {}", self.path.display()))?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer
            .write_record(CSV_COLUMNS)
            .context("Failed to write CSV header")?;
        writer.flush().context("Failed to flush CSV header")?;

        self.header_written = true;
        debug!("Created output file {}", self.path.display());
        Ok(())
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }
}

impl RunRecorder for CsvRunRecorder {
    fn record(&mut self, record: &TurnRecord) -> Result<()> {
        self.write_header()?;

        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open output file: {}", self.path.display()))?;

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer
            .serialize(CsvRow::from(record))
            .context("Failed to write turn record")?;
        writer.flush().context("Failed to flush turn record")?;

        self.rows_written += 1;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
