//! Cost record envelope - what the persistence layer stores
//!
//! The engine returns a bare breakdown; identity, timestamps, and
//! authorship are attached here, after the fact, by the calling layer.
//! The stored breakdown is kept verbatim - consumers recompute by
//! calling the engine again with the stored input rather than trusting
//! derived columns ("recompute on read" lives at this boundary, not
//! inside the engine).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{RecordId, RecordPrefix};
use crate::engine::{CostBreakdown, CostInput};

/// A persisted cost calculation: input echo plus the returned breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    /// Unique identifier, prefixed by cost model
    pub id: RecordId,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who ran the calculation)
    pub author: String,

    /// The exact input the engine was called with
    pub input: CostInput,

    /// The breakdown the engine returned, stored unchanged
    pub breakdown: CostBreakdown,
}

impl CostRecord {
    /// Wrap a calculation in a new record with a fresh id and timestamp
    pub fn new(author: impl Into<String>, input: CostInput, breakdown: CostBreakdown) -> Self {
        Self {
            id: RecordId::new(RecordPrefix::for_input(&input)),
            created: Utc::now(),
            author: author.into(),
            input,
            breakdown,
        }
    }

    /// Re-run the engine on the stored input (recompute-on-read policy)
    pub fn recompute(&self) -> Result<CostBreakdown, crate::engine::CostError> {
        crate::engine::estimate(&self.input)
    }
}
