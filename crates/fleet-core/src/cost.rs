//! Cost-saved estimate table
//!
//! Flat-rate heuristic: every successful execution of a bot adds that bot's
//! rate to the running `costSaved` figure, whatever the command was. This is
//! an approximation for dashboards, not billing data.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::BotKind;

/// Per-bot cost estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostTable {
    rates: BTreeMap<BotKind, f64>,
}

impl Default for CostTable {
    fn default() -> Self {
        let rates = BotKind::ALL
            .into_iter()
            .map(|kind| {
                let rate = match kind {
                    BotKind::Docs => 2.0,
                    BotKind::Research => 5.0,
                    BotKind::Code => 10.0,
                    BotKind::Social => 1.0,
                    BotKind::Business => 3.0,
                };
                (kind, rate)
            })
            .collect();
        Self { rates }
    }
}

impl CostTable {
    /// A table where every bot is free; useful when the estimate is unwanted.
    pub fn zero() -> Self {
        Self {
            rates: BotKind::ALL.into_iter().map(|kind| (kind, 0.0)).collect(),
        }
    }

    /// Override a single rate
    pub fn with_rate(mut self, bot: BotKind, rate: f64) -> Self {
        self.rates.insert(bot, rate);
        self
    }

    /// Estimated saving for one successful execution of `bot`
    pub fn estimate(&self, bot: BotKind) -> f64 {
        self.rates.get(&bot).copied().unwrap_or(0.0)
    }

    /// Parse overrides from TOML of the form `code = 12.5`.
    ///
    /// Bots not mentioned keep their default rate.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: HashMap<String, f64> =
            toml::from_str(text).map_err(|e| Error::config(format!("invalid cost table: {}", e)))?;

        let mut table = Self::default();
        for (name, rate) in raw {
            let kind: BotKind = name
                .parse()
                .map_err(|_| Error::config(format!("cost table names unknown bot '{}'", name)))?;
            if !rate.is_finite() || rate < 0.0 {
                return Err(Error::config(format!(
                    "cost for '{}' must be a non-negative number, got {}",
                    name, rate
                )));
            }
            table.rates.insert(kind, rate);
        }
        Ok(table)
    }

    /// Load overrides from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let table = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.as_ref().display(), "Loaded cost table");
        Ok(table)
    }
}
