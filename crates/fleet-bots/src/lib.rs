//! fleet-bots: Bot Registry and built-in bots
//!
//! A bot is a named handler exposing a table of commands. The registry maps
//! the closed set of [`BotKind`]s to handlers and routes
//! `(bot, command, params)` triples to them.

pub mod bot;
pub mod builtin;
pub mod catalog;
pub mod registry;

// Re-export main types
pub use bot::{Bot, CommandFn, CommandTable, FnBot};
pub use builtin::builtin_registry;
pub use catalog::BotDescriptor;
pub use fleet_core::BotKind;
pub use registry::BotRegistry;
