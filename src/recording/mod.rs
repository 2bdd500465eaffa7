// Run recording
//
// Every completed turn becomes a `TurnRecord` handed to a `RunRecorder`.
// The CSV recorder is the production sink; the memory recorder backs tests
// and anything else that wants the records in-process.

pub mod csv_recorder;
pub mod record;

pub use csv_recorder::{output_path, CsvRunRecorder, CSV_COLUMNS};
pub use record::{RunContext, TurnRecord};

use anyhow::Result;

/// Durable sink for turn records
pub trait RunRecorder {
    /// Persist one record. An error means this record was not stored; the
    /// caller decides whether to carry on.
    fn record(&mut self, record: &TurnRecord) -> Result<()>;

    /// Human-readable sink location for summaries
    fn location(&self) -> String;
}

/// Keeps records in memory
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    records: Vec<TurnRecord>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[TurnRecord] {
        &self.records
    }
}

impl RunRecorder for MemoryRecorder {
    fn record(&mut self, record: &TurnRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
