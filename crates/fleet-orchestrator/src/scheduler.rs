//! Schedule Registry
//!
//! Cron-driven recurring executions. Every registered schedule owns one
//! timer task; each tick spawns an independent `execute()` so a slow bot
//! never delays the next tick.

use chrono::{DateTime, Utc};
use cron::Schedule;
use fleet_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::dispatcher::Dispatcher;
use crate::metrics::FleetMetrics;

/// A recurring bot command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub id: String,
    /// Cron expression, 5 fields (minute-first) or 6 (second-first)
    pub schedule: String,
    pub bot: String,
    pub command: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleAck {
    pub success: bool,
    #[serde(rename = "taskId")]
    pub task_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnscheduleAck {
    pub success: bool,
}

struct ScheduleEntry {
    task: ScheduledTask,
    timer: JoinHandle<()>,
}

/// Parse a cron expression.
///
/// Five-field expressions are Unix cron: an implied `0` seconds field, and
/// numeric weekdays where 0 and 7 are Sunday. Six-field expressions are
/// passed through in the `cron` crate's dialect (1 is Sunday).
pub fn parse_cron(expression: &str) -> Result<Schedule> {
    let invalid = |reason: String| Error::InvalidCron {
        expression: expression.to_string(),
        reason,
    };

    let fields: Vec<&str> = expression.split_whitespace().collect();
    let normalized = match fields.as_slice() {
        [minute, hour, day, month, weekday] => {
            let weekday = unix_weekdays(weekday).map_err(invalid)?;
            format!("0 {} {} {} {} {}", minute, hour, day, month, weekday)
        }
        [_, _, _, _, _, _] => fields.join(" "),
        _ => return Err(invalid(format!("expected 5 or 6 fields, got {}", fields.len()))),
    };

    Schedule::from_str(&normalized).map_err(|e| invalid(e.to_string()))
}

/// Rewrite a Unix day-of-week field (0-7, Sunday = 0 or 7) as an explicit
/// list in the `cron` crate's numbering (1-7, Sunday = 1). Named days and
/// bare wildcards mean the same in both and are left alone.
fn unix_weekdays(field: &str) -> std::result::Result<String, String> {
    if field == "*" || field == "?" || field.chars().any(|c| c.is_ascii_alphabetic()) {
        return Ok(field.to_string());
    }

    let number = |text: &str| {
        text.parse::<u32>()
            .map_err(|_| format!("invalid day-of-week value '{}'", text))
    };

    let mut days = BTreeSet::new();
    for part in field.split(',') {
        let (range, step) = match part.split_once('/') {
            Some((range, step)) => (range, Some(number(step)?)),
            None => (part, None),
        };
        let (start, end) = match (range, range.split_once('-')) {
            ("*", _) => (0, 6),
            (_, Some((start, end))) => (number(start)?, number(end)?),
            (single, None) => {
                let day = number(single)?;
                (day, if step.is_some() { 6 } else { day })
            }
        };
        if start > end || end > 7 {
            return Err(format!("day-of-week range '{}' is outside 0-7", range));
        }
        let step = match step {
            Some(0) => return Err("day-of-week step must be positive".to_string()),
            Some(step) => step as usize,
            None => 1,
        };
        days.extend((start..=end).step_by(step).map(|day| day % 7 + 1));
    }

    Ok(days.iter().map(u32::to_string).collect::<Vec<_>>().join(","))
}

/// Registry of active cron schedules keyed by task id
pub struct ScheduleRegistry {
    entries: Mutex<HashMap<String, ScheduleEntry>>,
    metrics: FleetMetrics,
    skip_overlapping: bool,
}

impl ScheduleRegistry {
    pub fn new(metrics: FleetMetrics, skip_overlapping: bool) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            metrics,
            skip_overlapping,
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, ScheduleEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `task` and start its timer.
    ///
    /// Fails without side effects on a duplicate id or a bad expression.
    pub fn schedule(&self, task: ScheduledTask, dispatcher: Dispatcher) -> Result<ScheduleAck> {
        let mut entries = self.entries();

        if entries.contains_key(&task.id) {
            return Err(Error::DuplicateSchedule(task.id));
        }

        let cron = parse_cron(&task.schedule)?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::internal(format!("schedule requires a tokio runtime: {}", e)))?;

        let guard = self.skip_overlapping.then(|| Arc::new(AtomicBool::new(false)));
        let timer = runtime.spawn(run_timer(
            task.clone(),
            cron,
            dispatcher,
            self.metrics.clone(),
            guard,
        ));

        info!(
            task_id = %task.id,
            schedule = %task.schedule,
            bot = %task.bot,
            command = %task.command,
            "Task scheduled"
        );

        let task_id = task.id.clone();
        entries.insert(task_id.clone(), ScheduleEntry { task, timer });
        self.metrics.schedules_changed(entries.len());

        Ok(ScheduleAck {
            success: true,
            task_id,
        })
    }

    /// Stop and remove a schedule. Executions already spawned keep running.
    pub fn unschedule(&self, id: &str) -> Result<UnscheduleAck> {
        let mut entries = self.entries();
        let entry = entries
            .remove(id)
            .ok_or_else(|| Error::ScheduleNotFound(id.to_string()))?;

        entry.timer.abort();
        self.metrics.schedules_changed(entries.len());
        info!(task_id = %id, "Task unscheduled");

        Ok(UnscheduleAck { success: true })
    }

    /// Snapshot of every schedule, sorted by id
    pub fn get_scheduled(&self) -> Vec<ScheduledTask> {
        let mut tasks: Vec<ScheduledTask> =
            self.entries().values().map(|entry| entry.task.clone()).collect();
        tasks.sort_by(|a, b| a.id.cmp(&b.id));
        tasks
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Abort every timer and clear the registry
    pub fn shutdown(&self) {
        let drained: Vec<(String, ScheduleEntry)> = self.entries().drain().collect();
        if drained.is_empty() {
            debug!("No schedules to stop");
            return;
        }

        for (id, entry) in drained {
            entry.timer.abort();
            debug!(task_id = %id, "Stopped schedule timer");
        }
        self.metrics.schedules_changed(0);
        info!("All schedules stopped");
    }
}

impl Drop for ScheduleRegistry {
    fn drop(&mut self) {
        for entry in self.entries().values() {
            entry.timer.abort();
        }
    }
}

async fn run_timer(
    task: ScheduledTask,
    cron: Schedule,
    dispatcher: Dispatcher,
    metrics: FleetMetrics,
    guard: Option<Arc<AtomicBool>>,
) {
    // Never fire the same instant twice, even if the sleep wakes early.
    let mut cursor: DateTime<Utc> = Utc::now();

    loop {
        let from = cursor.max(Utc::now());
        let Some(next) = cron.after(&from).next() else {
            info!(task_id = %task.id, "Schedule has no further fire times");
            return;
        };
        cursor = next;

        let wait = (next - Utc::now()).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        if let Some(busy) = &guard {
            if busy.swap(true, Ordering::AcqRel) {
                metrics.tick_skipped();
                warn!(task_id = %task.id, "Previous run still in flight, skipping tick");
                continue;
            }
        }

        metrics.tick_fired();
        debug!(task_id = %task.id, fire_time = %next, "Cron tick");

        let dispatcher = dispatcher.clone();
        let task = task.clone();
        let guard = guard.clone();
        tokio::spawn(async move {
            dispatcher
                .execute(&task.bot, &task.command, task.params.clone())
                .await;
            if let Some(busy) = guard {
                busy.store(false, Ordering::Release);
            }
        });
    }
}
