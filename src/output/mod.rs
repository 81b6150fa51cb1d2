//! Output sinks
//!
//! The CSV record sink and the completion audit log. Both are append-only
//! and shared across worker tasks behind mutexes.

mod completion;
mod sink;

pub use completion::CompletionLog;
pub use sink::{CsvSink, SinkError, SinkResult};
