//! Bot Registry
//!
//! Pure routing from bot names to handlers. The registry is assembled at
//! startup and is read-only afterwards; unknown bots and unknown commands
//! fail fast with distinct error variants.

use fleet_core::{BotKind, Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::bot::Bot;
use crate::catalog::BotDescriptor;

/// Mapping from [`BotKind`] to its handler
#[derive(Clone, Default)]
pub struct BotRegistry {
    bots: BTreeMap<BotKind, Arc<dyn Bot>>,
}

impl BotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bot, returning the handler it replaced (if any)
    pub fn register(&mut self, bot: Arc<dyn Bot>) -> Option<Arc<dyn Bot>> {
        let kind = bot.kind();
        debug!(bot = %kind, commands = ?bot.commands(), "Registering bot");
        self.bots.insert(kind, bot)
    }

    /// Builder-style registration
    pub fn with_bot(mut self, bot: impl Bot + 'static) -> Self {
        self.register(Arc::new(bot));
        self
    }

    /// Resolve a bot by wire name
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Bot>> {
        let kind: BotKind = name.parse()?;
        self.get(kind).ok_or_else(|| Error::bot_not_found(name))
    }

    pub fn get(&self, kind: BotKind) -> Option<Arc<dyn Bot>> {
        self.bots.get(&kind).cloned()
    }

    pub fn contains(&self, kind: BotKind) -> bool {
        self.bots.contains_key(&kind)
    }

    /// Registered bot kinds, in declaration order
    pub fn kinds(&self) -> Vec<BotKind> {
        self.bots.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }

    /// Route one command to its bot.
    ///
    /// Handler failures come back as [`Error::Handler`] with the bot's
    /// message untouched.
    pub async fn dispatch(&self, bot: &str, command: &str, params: Value) -> Result<Value> {
        let handler = self.lookup(bot)?;
        if !handler.supports_command(command) {
            return Err(Error::command_not_found(bot, command));
        }
        handler.execute(command, params).await.map_err(Error::Handler)
    }

    /// Descriptors of every registered bot
    pub fn descriptors(&self) -> Vec<BotDescriptor> {
        self.bots
            .values()
            .map(|bot| BotDescriptor::describe(bot.as_ref()))
            .collect()
    }
}

impl std::fmt::Debug for BotRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotRegistry")
            .field("bots", &self.kinds())
            .finish()
    }
}
