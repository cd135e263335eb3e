//! Fleet Orchestrator
//!
//! Single entry point for running bot commands:
//! - Dispatch of `(bot, command, params)` to the bot registry
//! - Execution bookkeeping: stats, cost estimate, ledger append
//! - Cron-driven recurring schedules
//! - Prometheus metrics
//!
//! ```text
//! caller ── execute() ──► Dispatcher ──► BotRegistry ──► Bot
//!                            │
//!                            ├──► Stats (incremental mean, cost)
//!                            └──► ExecutionLedger (append)
//!
//! cron tick ──► ScheduleRegistry timer ──► tokio::spawn(execute())
//! ```

pub mod config;
pub mod dispatcher;
pub mod metrics;
pub mod orchestrator;
pub mod scheduler;
pub mod stats;

pub use config::OrchestratorConfig;
pub use dispatcher::{ActiveTask, Dispatcher};
pub use metrics::FleetMetrics;
pub use orchestrator::{BotStatus, BotStatusEntry, Orchestrator};
pub use scheduler::{ScheduleAck, ScheduleRegistry, ScheduledTask, UnscheduleAck};
pub use stats::Stats;
