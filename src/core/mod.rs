//! Core module - calling-layer types the engine stays agnostic of

pub mod identity;
pub mod record;

pub use identity::{IdParseError, RecordId, RecordPrefix};
pub use record::CostRecord;
