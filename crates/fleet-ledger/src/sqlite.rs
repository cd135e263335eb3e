//! SQLite-backed execution ledger
//!
//! Durable append-only storage for execution records. Uses SQLx for async
//! database operations; rows are only ever inserted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fleet_core::ExecutionRecord;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::{LedgerError, Result};
use crate::ledger::ExecutionLedger;

/// SQLite ledger
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    /// Open (creating if missing) the database at `url`
    ///
    /// URL format: `sqlite:///path/to/ledger.db` or `sqlite::memory:`
    pub async fn new(url: &str) -> Result<Self> {
        info!("Initializing SQLite ledger: {}", url);

        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // every connection to :memory: is a separate database
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let ledger = Self { pool };
        ledger.initialize_schema().await?;

        info!("SQLite ledger initialized");
        Ok(ledger)
    }

    /// Create an in-memory ledger for testing
    pub async fn in_memory() -> Result<Self> {
        Self::new("sqlite::memory:").await
    }

    async fn initialize_schema(&self) -> Result<()> {
        debug!("Initializing ledger schema");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS task_executions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                bot TEXT NOT NULL,
                command TEXT NOT NULL,
                params TEXT NOT NULL,
                result TEXT,
                error TEXT,
                duration_ms INTEGER NOT NULL,
                success INTEGER NOT NULL,
                timestamp TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_task_executions_bot ON task_executions(bot)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Number of stored records
    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM task_executions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

#[async_trait]
impl ExecutionLedger for SqliteLedger {
    async fn log_task(&self, record: &ExecutionRecord) -> Result<()> {
        let params_json = serde_json::to_string(&record.params)?;
        let result_json = record.result().map(serde_json::to_string).transpose()?;

        sqlx::query(
            r#"
            INSERT INTO task_executions (bot, command, params, result, error, duration_ms, success, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.bot)
        .bind(&record.command)
        .bind(&params_json)
        .bind(&result_json)
        .bind(record.error())
        .bind(record.duration_ms as i64)
        .bind(record.success)
        .bind(record.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(bot = %record.bot, command = %record.command, "Logged task execution");
        Ok(())
    }

    async fn get_history(&self, limit: usize) -> Result<Vec<ExecutionRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            "SELECT id, bot, command, params, result, error, duration_ms, success, timestamp FROM task_executions ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_record).collect()
    }
}

fn row_to_record(row: &SqliteRow) -> Result<ExecutionRecord> {
    let id: i64 = row.get("id");
    let corrupt = |reason: String| LedgerError::Corrupt { id, reason };

    let bot: String = row.get("bot");
    let command: String = row.get("command");
    let params_json: String = row.get("params");
    let result_json: Option<String> = row.get("result");
    let error: Option<String> = row.get("error");
    let duration_ms: i64 = row.get("duration_ms");
    let success: bool = row.get("success");
    let timestamp_str: String = row.get("timestamp");

    let params = serde_json::from_str(&params_json)?;
    let duration_ms = u64::try_from(duration_ms).map_err(|e| corrupt(e.to_string()))?;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
        .map_err(|e| corrupt(e.to_string()))?
        .with_timezone(&Utc);

    let record = match (success, result_json, error) {
        (true, Some(result), None) => {
            ExecutionRecord::succeeded(bot, command, params, serde_json::from_str(&result)?, duration_ms)
        }
        (false, None, Some(error)) => {
            ExecutionRecord::failed(bot, command, params, error, duration_ms)
        }
        _ => return Err(corrupt("outcome columns disagree with success flag".to_string())),
    };

    Ok(record.at(timestamp))
}
