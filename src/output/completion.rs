//! Completion audit log
//!
//! An append-only text file listing every link whose records were written,
//! one URL per line. This is an audit trail distinct from the job state's
//! completed set.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Append-only, line-oriented completion log
pub struct CompletionLog {
    file: File,
}

impl CompletionLog {
    /// Opens the log in append mode, creating it if missing
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }

    /// Appends one URL and flushes
    pub fn append(&mut self, url: &str) -> std::io::Result<()> {
        writeln!(self.file, "{url}")?;
        self.file.flush()
    }
}
