//! CSV record sink
//!
//! Appends normalized records to a per-manufacturer CSV file. The header
//! row is written exactly once, when the file is empty at open; concurrent
//! writers must serialize access externally (the worker pool wraps the sink
//! in a mutex).

use crate::extract::SpecRecord;
use std::fs::{File, OpenOptions};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while appending records
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Column headers, in [`SpecRecord`] field order
const HEADERS: [&str; 15] = [
    "Manufacturer",
    "Model Name",
    "Model No",
    "Device release date",
    "Model EOL Date",
    "AOSP version code (released)",
    "AOSP version code (latest)",
    "OEMOS version code (released)",
    "OEMOS version code (latest)",
    "Latest Security Update Dt",
    "LatestSecUpdateReleasedDt",
    "CPU Make & Model",
    "GPU Make & Model",
    "NCCS Approved",
    "Google Certified",
];

/// Append-only CSV sink for spec records
pub struct CsvSink {
    writer: csv::Writer<File>,
}

impl CsvSink {
    /// Opens the sink in append mode, writing the header row if the file
    /// is empty
    pub fn open(path: &Path) -> SinkResult<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let is_empty = file.metadata()?.len() == 0;

        // Serde would re-emit the header before every first record of a new
        // writer, so header writing is handled manually instead.
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if is_empty {
            writer.write_record(HEADERS)?;
            writer.flush()?;
        }

        Ok(Self { writer })
    }

    /// Appends records and flushes, so each append is a self-contained write
    ///
    /// Returns the number of records written.
    pub fn append_all(&mut self, records: &[SpecRecord]) -> SinkResult<usize> {
        for record in records {
            self.writer.serialize(record)?;
        }
        self.writer.flush()?;
        Ok(records.len())
    }
}
