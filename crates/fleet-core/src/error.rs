//! Error types for botfleet

use thiserror::Error;

/// Main error type for orchestrator operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Bot not found: {0}")]
    BotNotFound(String),

    #[error("Unknown command '{command}' for bot '{bot}'")]
    CommandNotFound { bot: String, command: String },

    /// Failure reported by a bot handler; the message is surfaced verbatim.
    #[error("{0}")]
    Handler(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Task already scheduled: {0}")]
    DuplicateSchedule(String),

    #[error("Task not found: {0}")]
    ScheduleNotFound(String),

    #[error("Invalid cron expression '{expression}': {reason}")]
    InvalidCron { expression: String, reason: String },

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a bot-not-found error
    pub fn bot_not_found(name: impl Into<String>) -> Self {
        Error::BotNotFound(name.into())
    }

    /// Create a command-not-found error
    pub fn command_not_found(bot: impl Into<String>, command: impl Into<String>) -> Self {
        Error::CommandNotFound {
            bot: bot.into(),
            command: command.into(),
        }
    }

    /// Create a handler error
    pub fn handler(msg: impl Into<String>) -> Self {
        Error::Handler(msg.into())
    }

    /// Create a ledger error
    pub fn ledger(msg: impl Into<String>) -> Self {
        Error::Ledger(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// True for errors raised while routing a command to a bot, as
    /// opposed to failures reported by the bot itself.
    pub fn is_routing(&self) -> bool {
        matches!(self, Error::BotNotFound(_) | Error::CommandNotFound { .. })
    }

    /// Short machine-readable name of the variant, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::BotNotFound(_) => "bot_not_found",
            Error::CommandNotFound { .. } => "command_not_found",
            Error::Handler(_) => "handler",
            Error::Timeout(_) => "timeout",
            Error::DuplicateSchedule(_) => "duplicate_schedule",
            Error::ScheduleNotFound(_) => "schedule_not_found",
            Error::InvalidCron { .. } => "invalid_cron",
            Error::Ledger(_) => "ledger",
            Error::Config(_) => "config",
            Error::Serialization(_) => "serialization",
            Error::Io(_) => "io",
            Error::Internal(_) => "internal",
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal(err.to_string())
    }
}
