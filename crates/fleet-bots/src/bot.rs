//! Base bot trait and closure-backed bots
//!
//! Defines the common interface for all bots.

use async_trait::async_trait;
use fleet_core::{BotInfo, BotKind};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

/// Base trait for all bots
#[async_trait]
pub trait Bot: Send + Sync {
    /// Which registry slot this bot fills
    fn kind(&self) -> BotKind;

    /// Display metadata; defaults to the static table in `fleet-core`
    fn info(&self) -> BotInfo {
        self.kind().info()
    }

    /// Commands this bot accepts
    fn commands(&self) -> Vec<String>;

    /// Run one command. `Err` carries a human-readable message.
    async fn execute(&self, command: &str, params: Value) -> Result<Value, String>;

    /// Check if the bot accepts a command
    fn supports_command(&self, command: &str) -> bool {
        self.commands().iter().any(|c| c == command)
    }
}

/// Boxed async command handler
pub type CommandFn = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, String>> + Send + Sync>;

/// Command name to handler table
#[derive(Clone, Default)]
pub struct CommandTable {
    handlers: BTreeMap<String, CommandFn>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command. A later registration under the same name replaces
    /// the earlier one.
    pub fn command<F, Fut>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, String>> + Send + 'static,
    {
        let handler: CommandFn = Arc::new(move |params| handler(params).boxed());
        self.handlers.insert(name.to_string(), handler);
        self
    }

    pub fn get(&self, name: &str) -> Option<&CommandFn> {
        self.handlers.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for CommandTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandTable")
            .field("commands", &self.names())
            .finish()
    }
}

/// A bot assembled from a [`CommandTable`].
///
/// ```
/// use fleet_bots::{BotKind, CommandTable, FnBot};
/// use serde_json::json;
///
/// let docs = FnBot::new(
///     BotKind::Docs,
///     CommandTable::new().command("daily-log", |_params| async { Ok(json!("OK")) }),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct FnBot {
    kind: BotKind,
    table: CommandTable,
}

impl FnBot {
    pub fn new(kind: BotKind, table: CommandTable) -> Self {
        Self { kind, table }
    }
}

#[async_trait]
impl Bot for FnBot {
    fn kind(&self) -> BotKind {
        self.kind
    }

    fn commands(&self) -> Vec<String> {
        self.table.names()
    }

    fn supports_command(&self, command: &str) -> bool {
        self.table.get(command).is_some()
    }

    async fn execute(&self, command: &str, params: Value) -> Result<Value, String> {
        match self.table.get(command) {
            Some(handler) => handler(params).await,
            None => Err(format!("Unknown command: {}", command)),
        }
    }
}
