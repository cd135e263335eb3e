//! Orchestrator façade
//!
//! Owns the dispatcher, the schedule registry and the metrics. One instance
//! per process; callers share it behind an `Arc`.

use fleet_bots::{BotDescriptor, BotRegistry};
use fleet_core::{BotKind, Error, ExecutionEnvelope, ExecutionRecord, Result};
use fleet_ledger::ExecutionLedger;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::OrchestratorConfig;
use crate::dispatcher::{ActiveTask, Dispatcher};
use crate::metrics::FleetMetrics;
use crate::scheduler::{ScheduleAck, ScheduleRegistry, ScheduledTask, UnscheduleAck};
use crate::stats::Stats;

/// Per-bot entry of [`BotStatus`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotStatusEntry {
    pub name: String,
    pub description: String,
    pub commands: Vec<String>,
    pub registered: bool,
}

/// Point-in-time view of the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotStatus {
    pub bots: BTreeMap<String, BotStatusEntry>,
    pub stats: Stats,
    /// Executions currently in flight
    pub queue_length: usize,
    pub active_task: Option<ActiveTask>,
}

pub struct Orchestrator {
    dispatcher: Dispatcher,
    schedules: ScheduleRegistry,
    metrics: FleetMetrics,
}

impl Orchestrator {
    pub async fn new(
        registry: BotRegistry,
        ledger: Arc<dyn ExecutionLedger>,
        config: OrchestratorConfig,
    ) -> Result<Self> {
        let metrics = FleetMetrics::new()
            .map_err(|e| Error::internal(format!("failed to register metrics: {}", e)))?;

        let stats = if config.restore_stats {
            let mut history = ledger.get_history(config.replay_limit).await?;
            history.reverse();
            let stats = Stats::replay(&history, &config.costs);
            info!(
                replayed = history.len(),
                completed = stats.tasks_completed,
                failed = stats.tasks_failed,
                "Restored stats from ledger"
            );
            stats
        } else {
            Stats::default()
        };

        info!(
            bots = registry.len(),
            timeout_ms = ?config.execute_timeout.map(|t| t.as_millis()),
            skip_overlapping_ticks = config.skip_overlapping_ticks,
            "Orchestrator initialized"
        );

        let dispatcher = Dispatcher::new(
            registry,
            ledger,
            config.costs,
            config.execute_timeout,
            stats,
            metrics.clone(),
        );
        let schedules = ScheduleRegistry::new(metrics.clone(), config.skip_overlapping_ticks);

        Ok(Self {
            dispatcher,
            schedules,
            metrics,
        })
    }

    /// Run one command. Always returns an envelope.
    pub async fn execute(&self, bot: &str, command: &str, params: Value) -> ExecutionEnvelope {
        self.dispatcher.execute(bot, command, params).await
    }

    pub fn schedule(&self, task: ScheduledTask) -> Result<ScheduleAck> {
        self.schedules.schedule(task, self.dispatcher.clone())
    }

    pub fn unschedule(&self, id: &str) -> Result<UnscheduleAck> {
        self.schedules.unschedule(id)
    }

    pub fn get_scheduled(&self) -> Vec<ScheduledTask> {
        self.schedules.get_scheduled()
    }

    pub async fn get_bot_status(&self) -> BotStatus {
        let registry = self.dispatcher.registry();
        let bots = BotKind::ALL
            .into_iter()
            .map(|kind| {
                let info = kind.info();
                let handler = registry.get(kind);
                let entry = BotStatusEntry {
                    name: info.name,
                    description: info.description,
                    commands: handler.as_ref().map(|bot| bot.commands()).unwrap_or_default(),
                    registered: handler.is_some(),
                };
                (kind.as_str().to_string(), entry)
            })
            .collect();

        BotStatus {
            bots,
            stats: self.dispatcher.stats().await,
            queue_length: self.dispatcher.in_flight().await,
            active_task: self.dispatcher.active_task().await,
        }
    }

    /// Most recent ledger records, newest first
    pub async fn history(&self, limit: usize) -> Result<Vec<ExecutionRecord>> {
        Ok(self.dispatcher.ledger().get_history(limit).await?)
    }

    pub async fn stats(&self) -> Stats {
        self.dispatcher.stats().await
    }

    /// Descriptors of the registered bots
    pub fn bots(&self) -> Vec<BotDescriptor> {
        self.dispatcher.registry().descriptors()
    }

    pub fn metrics(&self) -> &FleetMetrics {
        &self.metrics
    }

    /// Stop every schedule. Safe to call more than once.
    pub async fn shutdown(&self) {
        let scheduled = self.schedules.len();
        self.schedules.shutdown();
        let in_flight = self.dispatcher.in_flight().await;
        if in_flight > 0 {
            warn!(in_flight, "Shutting down with executions still running");
        }
        info!(stopped = scheduled, "Orchestrator shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fleet_bots::{CommandTable, FnBot};
    use fleet_core::CostTable;
    use fleet_ledger::{LedgerError, MemoryLedger};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Docs bot whose `daily-log` returns "OK" after `delay` ms
    fn stub_registry() -> BotRegistry {
        BotRegistry::new().with_bot(FnBot::new(
            BotKind::Docs,
            CommandTable::new()
                .command("daily-log", |params: Value| async move {
                    if let Some(delay) = params.get("delay").and_then(Value::as_u64) {
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                    }
                    Ok(json!("OK"))
                })
                .command("fail", |_| async { Err("disk full".to_string()) }),
        ))
    }

    async fn orchestrator_with(
        config: OrchestratorConfig,
    ) -> (Orchestrator, Arc<MemoryLedger>) {
        let ledger = Arc::new(MemoryLedger::new());
        let orchestrator = Orchestrator::new(stub_registry(), ledger.clone(), config)
            .await
            .unwrap();
        (orchestrator, ledger)
    }

    async fn orchestrator() -> (Orchestrator, Arc<MemoryLedger>) {
        orchestrator_with(OrchestratorConfig::default()).await
    }

    fn job(id: &str, schedule: &str) -> ScheduledTask {
        ScheduledTask {
            id: id.to_string(),
            schedule: schedule.to_string(),
            bot: "docs".to_string(),
            command: "daily-log".to_string(),
            params: json!({}),
        }
    }

    #[derive(Default)]
    struct CountingLedger {
        appends: AtomicUsize,
    }

    #[async_trait]
    impl ExecutionLedger for CountingLedger {
        async fn log_task(&self, _record: &ExecutionRecord) -> fleet_ledger::Result<()> {
            self.appends.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn get_history(&self, _limit: usize) -> fleet_ledger::Result<Vec<ExecutionRecord>> {
            Ok(Vec::new())
        }
    }

    struct BrokenLedger;

    #[async_trait]
    impl ExecutionLedger for BrokenLedger {
        async fn log_task(&self, _record: &ExecutionRecord) -> fleet_ledger::Result<()> {
            Err(LedgerError::Corrupt {
                id: 0,
                reason: "read-only database".to_string(),
            })
        }

        async fn get_history(&self, _limit: usize) -> fleet_ledger::Result<Vec<ExecutionRecord>> {
            Err(LedgerError::Corrupt {
                id: 0,
                reason: "read-only database".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_successful_execution() {
        let (orchestrator, ledger) = orchestrator().await;

        let envelope = orchestrator
            .execute("docs", "daily-log", json!({"date": "2024-01-01"}))
            .await;

        assert!(envelope.success);
        assert_eq!(envelope.result, Some(json!("OK")));
        assert_eq!(envelope.bot, "docs");
        assert_eq!(envelope.command, "daily-log");

        let stats = orchestrator.stats().await;
        assert_eq!(stats.tasks_completed, 1);
        assert_eq!(stats.cost_saved, 2.0);

        let history = ledger.get_history(10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].success);
        assert_eq!(history[0].params, json!({"date": "2024-01-01"}));
    }

    #[tokio::test]
    async fn test_unknown_bot() {
        let (orchestrator, ledger) = orchestrator().await;

        let envelope = orchestrator.execute("unknown-bot", "x", json!({})).await;

        assert!(!envelope.success);
        assert!(envelope.error.unwrap().contains("Bot not found"));
        assert_eq!(orchestrator.stats().await.tasks_failed, 1);
        assert!(!ledger.get_history(1).await.unwrap()[0].success);
    }

    #[tokio::test]
    async fn test_registered_kind_without_handler() {
        let (orchestrator, _ledger) = orchestrator().await;

        let envelope = orchestrator.execute("code", "generate", json!({})).await;

        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("Bot not found: code"));
    }

    #[tokio::test]
    async fn test_handler_error_surfaces_verbatim() {
        let (orchestrator, _ledger) = orchestrator().await;

        let envelope = orchestrator.execute("docs", "fail", json!({})).await;
        assert_eq!(envelope.error.as_deref(), Some("disk full"));

        let envelope = orchestrator.execute("docs", "publish", json!({})).await;
        assert_eq!(
            envelope.error.as_deref(),
            Some("Unknown command 'publish' for bot 'docs'")
        );

        let stats = orchestrator.stats().await;
        assert_eq!((stats.tasks_completed, stats.tasks_failed), (0, 2));
        assert_eq!(stats.cost_saved, 0.0);
    }

    #[tokio::test]
    async fn test_duplicate_schedule_rejected() {
        let (orchestrator, _ledger) = orchestrator().await;

        let ack = orchestrator.schedule(job("job1", "0 9 * * *")).unwrap();
        assert_eq!(ack.task_id, "job1");

        let mut other = job("job1", "*/5 * * * *");
        other.command = "fail".to_string();
        let err = orchestrator.schedule(other).unwrap_err();
        assert_eq!(err.to_string(), "Task already scheduled: job1");

        let scheduled = orchestrator.get_scheduled();
        assert_eq!(scheduled, vec![job("job1", "0 9 * * *")]);
        orchestrator.shutdown().await;
    }

    #[tokio::test]
    async fn test_invalid_cron_rejected() {
        let (orchestrator, _ledger) = orchestrator().await;

        let err = orchestrator.schedule(job("bad", "not a cron")).unwrap_err();

        assert!(matches!(err, Error::InvalidCron { .. }));
        assert!(orchestrator.get_scheduled().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_average_duration() {
        let (orchestrator, _ledger) = orchestrator().await;

        let first = orchestrator.execute("docs", "daily-log", json!({"delay": 100})).await;
        let second = orchestrator.execute("docs", "daily-log", json!({"delay": 300})).await;

        assert_eq!((first.duration, second.duration), (100, 300));
        assert_eq!(orchestrator.stats().await.avg_duration, 200.0);
    }

    #[tokio::test]
    async fn test_unschedule_unknown() {
        let (orchestrator, _ledger) = orchestrator().await;
        orchestrator.schedule(job("job2", "0 9 * * *")).unwrap();

        let err = orchestrator.unschedule("job1").unwrap_err();

        assert_eq!(err.to_string(), "Task not found: job1");
        assert_eq!(orchestrator.get_scheduled().len(), 1);
        orchestrator.shutdown().await;
    }

    #[tokio::test]
    async fn test_unschedule_removes_task() {
        let (orchestrator, _ledger) = orchestrator().await;
        orchestrator.schedule(job("job1", "0 9 * * *")).unwrap();

        let ack = orchestrator.unschedule("job1").unwrap();

        assert!(ack.success);
        assert!(orchestrator.get_scheduled().is_empty());
        assert!(orchestrator.unschedule("job1").is_err());
    }

    #[tokio::test]
    async fn test_counters_add_up() {
        let (orchestrator, _ledger) = orchestrator().await;
        let calls = [
            ("docs", "daily-log"),
            ("docs", "fail"),
            ("social", "platforms"),
            ("docs", "daily-log"),
            ("docs", "nope"),
        ];

        for (bot, command) in calls {
            orchestrator.execute(bot, command, json!({})).await;
        }

        let stats = orchestrator.stats().await;
        assert_eq!(stats.total(), calls.len() as u64);
        assert_eq!(stats.tasks_completed, 2);
    }

    #[tokio::test]
    async fn test_exactly_one_ledger_append_per_execute() {
        let ledger = Arc::new(CountingLedger::default());
        let orchestrator = Orchestrator::new(stub_registry(), ledger.clone(), OrchestratorConfig::default())
            .await
            .unwrap();

        orchestrator.execute("docs", "daily-log", json!({})).await;
        orchestrator.execute("docs", "fail", json!({})).await;
        orchestrator.execute("ghost", "x", Value::Null).await;

        assert_eq!(ledger.appends.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_ledger_failure_does_not_change_envelope() {
        let orchestrator = Orchestrator::new(stub_registry(), Arc::new(BrokenLedger), OrchestratorConfig::default())
            .await
            .unwrap();

        let envelope = orchestrator.execute("docs", "daily-log", json!({})).await;

        assert!(envelope.success);
        assert_eq!(orchestrator.stats().await.tasks_completed, 1);
        assert!(matches!(orchestrator.history(5).await, Err(Error::Ledger(_))));
    }

    #[tokio::test]
    async fn test_restore_stats_from_ledger() {
        let ledger = Arc::new(MemoryLedger::new());
        for duration in [100, 300] {
            let record = ExecutionRecord::succeeded("docs", "daily-log", json!({}), json!("OK"), duration);
            ledger.log_task(&record).await.unwrap();
        }
        ledger
            .log_task(&ExecutionRecord::failed("docs", "fail", json!({}), "disk full", 3))
            .await
            .unwrap();

        let config = OrchestratorConfig::default()
            .with_costs(CostTable::zero().with_rate(BotKind::Docs, 1.5))
            .restore_stats(true);
        let orchestrator = Orchestrator::new(stub_registry(), ledger, config).await.unwrap();

        let stats = orchestrator.stats().await;
        assert_eq!(stats.tasks_completed, 2);
        assert_eq!(stats.tasks_failed, 1);
        assert_eq!(stats.avg_duration, 200.0);
        assert_eq!(stats.cost_saved, 3.0);
    }

    #[tokio::test]
    async fn test_bot_status() {
        let (orchestrator, _ledger) = orchestrator().await;
        orchestrator.execute("docs", "daily-log", json!({})).await;

        let status = orchestrator.get_bot_status().await;

        assert_eq!(status.bots.len(), BotKind::ALL.len());
        let docs = &status.bots["docs"];
        assert!(docs.registered);
        assert_eq!(docs.name, "Docs Bot");
        assert_eq!(docs.commands, vec!["daily-log", "fail"]);
        assert!(!status.bots["code"].registered);
        assert_eq!(status.stats.tasks_completed, 1);
        assert_eq!(status.queue_length, 0);
        assert!(status.active_task.is_none());

        let value = serde_json::to_value(&status).unwrap();
        assert!(value.get("queueLength").is_some());
        assert!(value.get("activeTask").is_some());
    }

    #[tokio::test]
    async fn test_cron_tick_executes() {
        let (orchestrator, ledger) = orchestrator().await;
        orchestrator.schedule(job("every-second", "* * * * * *")).unwrap();

        tokio::time::sleep(Duration::from_millis(2500)).await;
        orchestrator.shutdown().await;

        assert!(orchestrator.metrics().ticks_fired() >= 1);
        let history = ledger.get_history(10).await.unwrap();
        assert!(!history.is_empty());
        assert!(history.iter().all(|r| r.bot == "docs" && r.success));
    }

    #[tokio::test]
    async fn test_shutdown_stops_ticks() {
        let (orchestrator, ledger) = orchestrator().await;
        orchestrator.schedule(job("a", "* * * * * *")).unwrap();
        orchestrator.schedule(job("b", "*/2 * * * * *")).unwrap();

        orchestrator.shutdown().await;
        assert!(orchestrator.get_scheduled().is_empty());

        tokio::time::sleep(Duration::from_millis(100)).await;
        let settled = ledger.len().await;
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(ledger.len().await, settled);

        // idempotent
        orchestrator.shutdown().await;
    }

    #[tokio::test]
    async fn test_overlapping_ticks_run_concurrently_by_default() {
        let (orchestrator, _ledger) = orchestrator_with(OrchestratorConfig::default()).await;
        let mut slow = job("slow", "* * * * * *");
        slow.params = json!({"delay": 10_000});
        orchestrator.schedule(slow).unwrap();

        tokio::time::sleep(Duration::from_millis(2600)).await;

        assert!(orchestrator.get_bot_status().await.queue_length >= 2);
        assert_eq!(orchestrator.metrics().ticks_skipped(), 0);
        orchestrator.shutdown().await;
    }

    #[tokio::test]
    async fn test_overlapping_ticks_skipped_when_enabled() {
        let (orchestrator, ledger) =
            orchestrator_with(OrchestratorConfig::default().skip_overlapping_ticks(true)).await;
        let mut slow = job("slow", "* * * * * *");
        slow.params = json!({"delay": 10_000});
        orchestrator.schedule(slow).unwrap();

        tokio::time::sleep(Duration::from_millis(3500)).await;
        orchestrator.shutdown().await;

        assert_eq!(orchestrator.metrics().ticks_fired(), 1);
        assert!(orchestrator.metrics().ticks_skipped() >= 1);
        assert!(ledger.is_empty().await);
        assert_eq!(orchestrator.get_bot_status().await.queue_length, 1);
    }
}
