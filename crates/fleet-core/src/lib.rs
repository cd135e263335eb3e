//! Core types and utilities for botfleet
//!
//! # Modules
//!
//! - `config`: Environment configuration loading
//! - `cost`: Per-bot cost estimate table
//! - `error`: Error types and Result alias
//! - `execution`: Execution records and result envelopes
//! - `types`: Bot identifiers and display metadata

pub mod config;
pub mod cost;
pub mod error;
pub mod execution;
pub mod types;

// Re-exports
pub use cost::CostTable;
pub use error::{Error, Result};
pub use execution::{ExecutionEnvelope, ExecutionOutcome, ExecutionRecord};
pub use types::{BotInfo, BotKind};
