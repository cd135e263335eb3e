//! Dispatcher - one-shot command execution with bookkeeping
//!
//! `execute()` never fails: routing errors, handler errors, timeouts and
//! panics all come back as a failure envelope. Within one call the order is
//! fixed: duration measured, stats updated, ledger written.

use chrono::{DateTime, Utc};
use fleet_bots::BotRegistry;
use fleet_core::{BotKind, CostTable, Error, ExecutionEnvelope, ExecutionRecord, Result};
use fleet_ledger::ExecutionLedger;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{info, instrument, warn};

use crate::metrics::FleetMetrics;
use crate::stats::Stats;

/// An execution that has been dispatched and not yet settled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTask {
    pub bot: String,
    pub command: String,
    pub started_at: DateTime<Utc>,
}

struct DispatcherInner {
    registry: BotRegistry,
    ledger: Arc<dyn ExecutionLedger>,
    costs: CostTable,
    timeout: Option<Duration>,
    stats: RwLock<Stats>,
    active: RwLock<BTreeMap<u64, ActiveTask>>,
    next_ticket: AtomicU64,
    metrics: FleetMetrics,
}

/// Cheaply cloneable handle; cron timers hold their own clone.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl Dispatcher {
    pub fn new(
        registry: BotRegistry,
        ledger: Arc<dyn ExecutionLedger>,
        costs: CostTable,
        timeout: Option<Duration>,
        stats: Stats,
        metrics: FleetMetrics,
    ) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                registry,
                ledger,
                costs,
                timeout,
                stats: RwLock::new(stats),
                active: RwLock::new(BTreeMap::new()),
                next_ticket: AtomicU64::new(0),
                metrics,
            }),
        }
    }

    /// Run one bot command and return its envelope
    #[instrument(skip_all, fields(bot = %bot, command = %command))]
    pub async fn execute(&self, bot: &str, command: &str, params: Value) -> ExecutionEnvelope {
        let started = Instant::now();
        let ticket = self.begin(bot, command).await;

        let outcome = self.dispatch(bot, command, params.clone()).await;

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.end(ticket).await;

        let record = match outcome {
            Ok(result) => {
                let cost = bot
                    .parse::<BotKind>()
                    .map(|kind| self.inner.costs.estimate(kind))
                    .unwrap_or(0.0);
                self.inner.stats.write().await.record_success(duration_ms, cost);
                self.inner.metrics.execution_succeeded(duration_ms);
                info!(duration_ms, "Execution completed");
                ExecutionRecord::succeeded(bot, command, params, result, duration_ms)
            }
            Err(err) => {
                self.inner.stats.write().await.record_failure();
                self.inner.metrics.execution_failed();
                warn!(duration_ms, kind = err.kind(), error = %err, "Execution failed");
                ExecutionRecord::failed(bot, command, params, err.to_string(), duration_ms)
            }
        };

        if let Err(e) = self.inner.ledger.log_task(&record).await {
            warn!(error = %e, "Failed to append execution to ledger");
        }

        ExecutionEnvelope::from(&record)
    }

    async fn dispatch(&self, bot: &str, command: &str, params: Value) -> Result<Value> {
        let call = AssertUnwindSafe(self.inner.registry.dispatch(bot, command, params)).catch_unwind();

        let settled = match self.inner.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                Error::Timeout(format!(
                    "{}.{} did not finish within {}ms",
                    bot,
                    command,
                    limit.as_millis()
                ))
            })?,
            None => call.await,
        };

        settled.unwrap_or_else(|panic| Err(Error::handler(panic_message(panic))))
    }

    async fn begin(&self, bot: &str, command: &str) -> u64 {
        let ticket = self.inner.next_ticket.fetch_add(1, Ordering::Relaxed);
        let task = ActiveTask {
            bot: bot.to_string(),
            command: command.to_string(),
            started_at: Utc::now(),
        };
        self.inner.active.write().await.insert(ticket, task);
        self.inner.metrics.execution_started();
        ticket
    }

    async fn end(&self, ticket: u64) {
        self.inner.active.write().await.remove(&ticket);
        self.inner.metrics.execution_finished();
    }

    /// Snapshot of the aggregate counters
    pub async fn stats(&self) -> Stats {
        self.inner.stats.read().await.clone()
    }

    /// Number of executions currently in flight
    pub async fn in_flight(&self) -> usize {
        self.inner.active.read().await.len()
    }

    /// Most recently started execution still in flight
    pub async fn active_task(&self) -> Option<ActiveTask> {
        self.inner.active.read().await.values().next_back().cloned()
    }

    pub fn registry(&self) -> &BotRegistry {
        &self.inner.registry
    }

    pub fn ledger(&self) -> &Arc<dyn ExecutionLedger> {
        &self.inner.ledger
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("Bot handler panicked: {}", detail)
}
