use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};

/// Orchestrator metrics collector.
///
/// Each instance owns its registry, so several orchestrators (tests, for
/// one) never clash on metric names.
#[derive(Clone)]
pub struct FleetMetrics {
    executions_succeeded: IntCounter,
    executions_failed: IntCounter,
    executions_in_flight: IntGauge,
    execution_duration: Histogram,
    schedules_active: IntGauge,
    schedule_ticks: IntCounter,
    schedule_ticks_skipped: IntCounter,
    registry: Registry,
}

impl FleetMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let executions_succeeded = IntCounter::new(
            "fleet_executions_succeeded_total",
            "Total number of successful bot command executions",
        )?;
        registry.register(Box::new(executions_succeeded.clone()))?;

        let executions_failed = IntCounter::new(
            "fleet_executions_failed_total",
            "Total number of failed bot command executions",
        )?;
        registry.register(Box::new(executions_failed.clone()))?;

        let executions_in_flight = IntGauge::new(
            "fleet_executions_in_flight",
            "Number of bot command executions currently running",
        )?;
        registry.register(Box::new(executions_in_flight.clone()))?;

        let execution_duration = Histogram::with_opts(
            HistogramOpts::new(
                "fleet_execution_duration_seconds",
                "Bot command execution duration in seconds",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
        )?;
        registry.register(Box::new(execution_duration.clone()))?;

        let schedules_active = IntGauge::new(
            "fleet_schedules_active",
            "Number of registered cron schedules",
        )?;
        registry.register(Box::new(schedules_active.clone()))?;

        let schedule_ticks = IntCounter::new(
            "fleet_schedule_ticks_total",
            "Cron ticks that started an execution",
        )?;
        registry.register(Box::new(schedule_ticks.clone()))?;

        let schedule_ticks_skipped = IntCounter::new(
            "fleet_schedule_ticks_skipped_total",
            "Cron ticks skipped because the previous run was still in flight",
        )?;
        registry.register(Box::new(schedule_ticks_skipped.clone()))?;

        Ok(Self {
            executions_succeeded,
            executions_failed,
            executions_in_flight,
            execution_duration,
            schedules_active,
            schedule_ticks,
            schedule_ticks_skipped,
            registry,
        })
    }

    pub fn execution_started(&self) {
        self.executions_in_flight.inc();
    }

    pub fn execution_finished(&self) {
        self.executions_in_flight.dec();
    }

    pub fn execution_succeeded(&self, duration_ms: u64) {
        self.executions_succeeded.inc();
        self.execution_duration.observe(duration_ms as f64 / 1000.0);
    }

    pub fn execution_failed(&self) {
        self.executions_failed.inc();
    }

    pub fn schedules_changed(&self, active: usize) {
        self.schedules_active.set(active as i64);
    }

    pub fn tick_fired(&self) {
        self.schedule_ticks.inc();
    }

    pub fn tick_skipped(&self) {
        self.schedule_ticks_skipped.inc();
    }

    pub fn ticks_fired(&self) -> u64 {
        self.schedule_ticks.get()
    }

    pub fn ticks_skipped(&self) -> u64 {
        self.schedule_ticks_skipped.get()
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
