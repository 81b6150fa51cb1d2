//! State-store trait and error types

use crate::state::JobState;
use thiserror::Error;

/// Errors that can occur during state-store operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for state-store operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable record of a manufacturer's harvest progress
///
/// One store per manufacturer; two manufacturers never share state. The
/// store is the sole recovery mechanism: on restart the work queue is
/// recomputed from the persisted universe and completed sets.
pub trait StateStore {
    /// Adds discovered links to the universe, preserving first-insertion
    /// order and ignoring links already present
    ///
    /// Returns the number of links actually inserted.
    fn insert_links(&mut self, urls: &[String]) -> StorageResult<usize>;

    /// Loads the full job state; empty when no prior state exists
    fn load_state(&self) -> StorageResult<JobState>;

    /// Flags links as completed
    ///
    /// Completion is a flag on a discovered link, so the completed set can
    /// never grow beyond the universe. Marking is monotonic and idempotent.
    fn mark_completed(&mut self, urls: &[String]) -> StorageResult<()>;

    /// Discards all persisted state for this manufacturer
    fn clear(&mut self) -> StorageResult<()>;

    /// Records a metadata value (config hash, discovery start URL)
    fn set_meta(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Reads a metadata value
    fn get_meta(&self, key: &str) -> StorageResult<Option<String>>;
}
