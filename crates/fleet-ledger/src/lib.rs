//! Fleet Ledger - append-only execution history
//!
//! Every `execute()` call appends exactly one [`ExecutionRecord`]; readers
//! page through history most-recent-first.
//!
//! Backends:
//! - [`MemoryLedger`]: bounded in-process ring, for tests and ephemeral runs
//! - [`SqliteLedger`]: durable storage through SQLx
//!
//! [`ExecutionRecord`]: fleet_core::ExecutionRecord

pub mod error;
pub mod ledger;
pub mod memory;
pub mod sqlite;

pub use error::{LedgerError, Result};
pub use ledger::ExecutionLedger;
pub use memory::MemoryLedger;
pub use sqlite::SqliteLedger;
