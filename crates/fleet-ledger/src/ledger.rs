use crate::error::Result;
use async_trait::async_trait;
use fleet_core::ExecutionRecord;

/// Append/query contract of the execution ledger
#[async_trait]
pub trait ExecutionLedger: Send + Sync {
    /// Append one record
    async fn log_task(&self, record: &ExecutionRecord) -> Result<()>;

    /// Up to `limit` records, most recent first
    async fn get_history(&self, limit: usize) -> Result<Vec<ExecutionRecord>>;
}
