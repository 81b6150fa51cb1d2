//! Page-to-record extraction
//!
//! Turns fetched detail-page HTML into structured [`SpecRecord`] rows.

mod normalizer;
mod record;

pub use normalizer::normalize;
pub use record::SpecRecord;
