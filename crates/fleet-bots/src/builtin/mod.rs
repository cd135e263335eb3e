//! Built-in bots
//!
//! Deterministic, template-based handlers so a fresh service has something
//! to run. They do no network or model calls.
//!
//! - `docs`: daily logs and changelog sections
//! - `research`: research outlines and extractive summaries
//! - `code`: function skeletons and lightweight review
//! - `social`: post drafts checked against platform limits
//! - `business`: metric reports and invoices

mod business;
mod code;
mod docs;
mod research;
mod social;

pub use business::BusinessBot;
pub use code::CodeBot;
pub use docs::DocsBot;
pub use research::ResearchBot;
pub use social::SocialBot;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::registry::BotRegistry;

/// Registry with every built-in bot registered
pub fn builtin_registry() -> BotRegistry {
    BotRegistry::new()
        .with_bot(DocsBot::new())
        .with_bot(ResearchBot::new())
        .with_bot(CodeBot::new())
        .with_bot(SocialBot::new())
        .with_bot(BusinessBot::new())
}

/// Decode command params, naming the command in the error.
fn parse_params<T: DeserializeOwned>(command: &str, params: Value) -> Result<T, String> {
    // Callers often send `null` for "no params"
    let params = if params.is_null() {
        Value::Object(Default::default())
    } else {
        params
    };
    serde_json::from_value(params).map_err(|e| format!("Invalid params for {}: {}", command, e))
}

fn unknown_command(command: &str) -> String {
    format!("Unknown command: {}", command)
}
