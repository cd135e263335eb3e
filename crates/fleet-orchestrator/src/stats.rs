//! Stats Aggregator
//!
//! Process-wide counters, updated once per `execute()` call.

use fleet_core::{BotKind, CostTable, ExecutionRecord};
use serde::{Deserialize, Serialize};

/// Aggregate execution counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    /// Running sum of the per-bot cost estimate
    pub cost_saved: f64,
    /// Mean duration (ms) of successful executions only
    pub avg_duration: f64,
}

impl Stats {
    /// Count a success and fold its duration into the running mean.
    pub fn record_success(&mut self, duration_ms: u64, cost: f64) {
        self.tasks_completed += 1;
        self.avg_duration += (duration_ms as f64 - self.avg_duration) / self.tasks_completed as f64;
        self.cost_saved += cost;
    }

    pub fn record_failure(&mut self) {
        self.tasks_failed += 1;
    }

    /// Total executions seen
    pub fn total(&self) -> u64 {
        self.tasks_completed + self.tasks_failed
    }

    /// Rebuild stats from ledger records, oldest first.
    pub fn replay<'a>(records: impl IntoIterator<Item = &'a ExecutionRecord>, costs: &CostTable) -> Self {
        let mut stats = Self::default();
        for record in records {
            if record.success {
                let cost = record
                    .bot
                    .parse::<BotKind>()
                    .map(|kind| costs.estimate(kind))
                    .unwrap_or(0.0);
                stats.record_success(record.duration_ms, cost);
            } else {
                stats.record_failure();
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_incremental_mean_matches_arithmetic_mean() {
        let durations = [120u64, 5, 3000, 47, 47, 999, 1];
        let mut stats = Stats::default();
        for d in durations {
            stats.record_success(d, 0.0);
        }

        let expected = durations.iter().sum::<u64>() as f64 / durations.len() as f64;
        assert!((stats.avg_duration - expected).abs() < 1e-9);
        assert_eq!(stats.tasks_completed, durations.len() as u64);
    }

    #[test]
    fn test_failures_do_not_move_mean() {
        let mut stats = Stats::default();
        stats.record_success(100, 1.5);
        stats.record_failure();
        stats.record_success(300, 1.5);

        assert_eq!(stats.avg_duration, 200.0);
        assert_eq!(stats.cost_saved, 3.0);
        assert_eq!(stats.total(), 3);
    }

    #[test]
    fn test_replay_from_history() {
        let costs = CostTable::zero().with_rate(BotKind::Code, 10.0);
        let records = vec![
            ExecutionRecord::succeeded("code", "generate", json!({}), json!("a"), 100),
            ExecutionRecord::failed("unknown-bot", "x", json!({}), "Bot not found: unknown-bot", 0),
            ExecutionRecord::succeeded("code", "review", json!({}), json!("b"), 300),
        ];

        let stats = Stats::replay(&records, &costs);
        assert_eq!(stats.tasks_completed, 2);
        assert_eq!(stats.tasks_failed, 1);
        assert_eq!(stats.avg_duration, 200.0);
        assert_eq!(stats.cost_saved, 20.0);
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(Stats::default()).unwrap();
        for key in ["tasksCompleted", "tasksFailed", "costSaved", "avgDuration"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }
}
