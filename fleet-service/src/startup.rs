//! Startup helpers: ledger selection and the schedule file.

use anyhow::{Context, Result};
use fleet_ledger::{ExecutionLedger, MemoryLedger, SqliteLedger};
use fleet_orchestrator::{Orchestrator, ScheduledTask};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Open the SQLite ledger at `url`, or an in-memory ledger when absent
pub async fn open_ledger(url: Option<&str>) -> Result<Arc<dyn ExecutionLedger>> {
    match url {
        Some(url) => {
            let ledger = SqliteLedger::new(url)
                .await
                .with_context(|| format!("failed to open ledger at {}", url))?;
            Ok(Arc::new(ledger))
        }
        None => {
            info!("No database configured, execution history is kept in memory");
            Ok(Arc::new(MemoryLedger::new()))
        }
    }
}

/// Read a JSON array of schedules
pub fn load_schedule_file(path: &Path) -> Result<Vec<ScheduledTask>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schedule file {}", path.display()))?;
    let tasks: Vec<ScheduledTask> = serde_json::from_str(&text)
        .with_context(|| format!("invalid schedule file {}", path.display()))?;
    Ok(tasks)
}

/// Register every schedule from `path`; the first rejected entry aborts startup
pub fn install_schedules(orchestrator: &Orchestrator, path: &Path) -> Result<usize> {
    let tasks = load_schedule_file(path)?;
    let count = tasks.len();
    for task in tasks {
        let id = task.id.clone();
        orchestrator
            .schedule(task)
            .with_context(|| format!("failed to schedule '{}' from {}", id, path.display()))?;
    }
    info!(count, file = %path.display(), "Loaded schedules");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_orchestrator::OrchestratorConfig;
    use std::io::Write;

    fn schedule_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    async fn orchestrator() -> Orchestrator {
        let ledger = open_ledger(None).await.unwrap();
        Orchestrator::new(fleet_bots::builtin_registry(), ledger, OrchestratorConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_install_schedules() {
        let file = schedule_file(
            r#"[
                {"id": "nightly-log", "schedule": "0 23 * * *", "bot": "docs", "command": "daily-log",
                 "params": {"date": "today", "entries": ["shipped"]}},
                {"id": "weekly-report", "schedule": "0 0 9 * * MON", "bot": "business", "command": "report"}
            ]"#,
        );
        let orchestrator = orchestrator().await;

        let count = install_schedules(&orchestrator, file.path()).unwrap();

        assert_eq!(count, 2);
        let ids: Vec<String> = orchestrator.get_scheduled().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["nightly-log", "weekly-report"]);
        orchestrator.shutdown().await;
    }

    #[tokio::test]
    async fn test_duplicate_in_file_aborts() {
        let file = schedule_file(
            r#"[
                {"id": "a", "schedule": "0 1 * * *", "bot": "docs", "command": "daily-log"},
                {"id": "a", "schedule": "0 2 * * *", "bot": "docs", "command": "daily-log"}
            ]"#,
        );
        let orchestrator = orchestrator().await;

        let err = install_schedules(&orchestrator, file.path()).unwrap_err();

        assert!(format!("{:#}", err).contains("Task already scheduled: a"));
        orchestrator.shutdown().await;
    }

    #[test]
    fn test_malformed_schedule_file() {
        let file = schedule_file(r#"{"id": "not-a-list"}"#);
        assert!(load_schedule_file(file.path()).is_err());
    }

    #[tokio::test]
    async fn test_open_sqlite_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("fleet.db").display());

        let ledger = open_ledger(Some(&url)).await.unwrap();

        assert!(ledger.get_history(10).await.unwrap().is_empty());
    }
}
