//! Bot catalog for status views and the HTTP listing.

use fleet_core::BotKind;
use serde::{Deserialize, Serialize};

use crate::bot::Bot;

/// Minimal descriptor of a registered bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotDescriptor {
    pub bot: BotKind,
    pub name: String,
    pub description: String,
    pub commands: Vec<String>,
}

impl BotDescriptor {
    pub fn describe(bot: &dyn Bot) -> Self {
        let info = bot.info();
        Self {
            bot: bot.kind(),
            name: info.name,
            description: info.description,
            commands: bot.commands(),
        }
    }
}
