use fleet_core::config::{get_config_bool, get_config_int, get_config_millis, get_config_opt};
use fleet_core::{CostTable, Result};
use std::time::Duration;

/// Orchestrator tuning
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Per-bot cost estimate
    pub costs: CostTable,
    /// Upper bound on a single bot call; `None` waits indefinitely
    pub execute_timeout: Option<Duration>,
    /// Skip a cron tick while the previous run of the same schedule is
    /// still in flight. Off by default: ticks may overlap.
    pub skip_overlapping_ticks: bool,
    /// Rebuild stats from ledger history at startup
    pub restore_stats: bool,
    /// How many ledger records to replay when restoring stats
    pub replay_limit: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            costs: CostTable::default(),
            execute_timeout: None,
            skip_overlapping_ticks: false,
            restore_stats: false,
            replay_limit: 10_000,
        }
    }
}

impl OrchestratorConfig {
    /// Load from `FLEET_*` environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = get_config_opt("FLEET_COST_TABLE") {
            config.costs = CostTable::load(&path)?;
        }

        config.execute_timeout = get_config_millis("FLEET_EXECUTE_TIMEOUT_MS");
        config.skip_overlapping_ticks = get_config_bool("FLEET_SKIP_OVERLAPPING_TICKS", false);
        config.restore_stats = get_config_bool("FLEET_RESTORE_STATS", false);

        let replay_limit = get_config_int("FLEET_REPLAY_LIMIT", config.replay_limit as i64);
        if let Ok(limit) = usize::try_from(replay_limit) {
            config.replay_limit = limit;
        }

        Ok(config)
    }

    pub fn with_costs(mut self, costs: CostTable) -> Self {
        self.costs = costs;
        self
    }

    pub fn with_execute_timeout(mut self, timeout: Duration) -> Self {
        self.execute_timeout = Some(timeout);
        self
    }

    pub fn skip_overlapping_ticks(mut self, skip: bool) -> Self {
        self.skip_overlapping_ticks = skip;
        self
    }

    pub fn restore_stats(mut self, restore: bool) -> Self {
        self.restore_stats = restore;
        self
    }
}
