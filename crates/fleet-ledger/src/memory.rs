//! In-memory ledger

use async_trait::async_trait;
use fleet_core::ExecutionRecord;
use std::collections::VecDeque;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::ledger::ExecutionLedger;

/// Default number of records kept
pub const DEFAULT_CAPACITY: usize = 1000;

/// Bounded ledger held in process memory. Once full, the oldest record is
/// dropped for each new one.
pub struct MemoryLedger {
    records: RwLock<VecDeque<ExecutionRecord>>,
    capacity: usize,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: RwLock::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY))),
            capacity,
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutionLedger for MemoryLedger {
    async fn log_task(&self, record: &ExecutionRecord) -> Result<()> {
        let mut records = self.records.write().await;
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(record.clone());
        Ok(())
    }

    async fn get_history(&self, limit: usize) -> Result<Vec<ExecutionRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().rev().take(limit).cloned().collect())
    }
}
