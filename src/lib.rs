//! shopcost: manufacturing cost estimation engine
//!
//! A pure, stateless cost derivation library (raw-material,
//! purchased/manufactured-part, and process-operation models) with a
//! small CLI front-end for one-off estimates and CSV batch runs.

pub mod cli;
pub mod core;
pub mod engine;
