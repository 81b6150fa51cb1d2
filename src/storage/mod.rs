//! Durable job-state storage
//!
//! Persists the universe/completed link sets per manufacturer so an
//! interrupted harvest resumes exactly where it stopped.

mod schema;
mod sqlite;
mod traits;

pub use schema::initialize_schema;
pub use sqlite::SqliteStateStore;
pub use traits::{StateStore, StorageError, StorageResult};
