use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Corrupt ledger row {id}: {reason}")]
    Corrupt { id: i64, reason: String },
}

pub type Result<T> = std::result::Result<T, LedgerError>;

impl From<LedgerError> for fleet_core::Error {
    fn from(err: LedgerError) -> Self {
        fleet_core::Error::Ledger(err.to_string())
    }
}
