//! Bot identifiers shared across botfleet

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The closed set of bots the orchestrator knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotKind {
    Docs,
    Research,
    Code,
    Social,
    Business,
}

impl BotKind {
    pub const ALL: [BotKind; 5] = [
        BotKind::Docs,
        BotKind::Research,
        BotKind::Code,
        BotKind::Social,
        BotKind::Business,
    ];

    /// Wire name used in commands, schedules and ledger records
    pub fn as_str(&self) -> &'static str {
        match self {
            BotKind::Docs => "docs",
            BotKind::Research => "research",
            BotKind::Code => "code",
            BotKind::Social => "social",
            BotKind::Business => "business",
        }
    }

    /// Static display metadata for status views
    pub fn info(&self) -> BotInfo {
        let (name, description) = match self {
            BotKind::Docs => ("Docs Bot", "Daily logs, changelogs and project documentation"),
            BotKind::Research => ("Research Bot", "Research outlines and text summaries"),
            BotKind::Code => ("Code Bot", "Code scaffolding and lightweight review"),
            BotKind::Social => ("Social Bot", "Social media post drafting"),
            BotKind::Business => ("Business Bot", "Reports, invoices and business paperwork"),
        };
        BotInfo {
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

impl fmt::Display for BotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BotKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BotKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::bot_not_found(s))
    }
}

/// Human-facing description of a bot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotInfo {
    pub name: String,
    pub description: String,
}
