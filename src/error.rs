use sea_orm::DbErr;
use thiserror::Error;

/// Guidance shown when no backing database has been configured.
pub const SETUP_HINT: &str =
    "Database is not configured. Please set DATABASE_URL in your .env file.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The backing store is missing or unreachable.
    #[error("Backing store not configured: {0}")]
    NotConfigured(String),

    /// A read or write against the backing store failed.
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),
}

impl LedgerError {
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::NotConfigured(_))
    }
}

impl From<DbErr> for LedgerError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::Conn(e) => Self::NotConfigured(e.to_string()),
            // The pool fails this way once the database goes away after startup.
            DbErr::ConnectionAcquire(e) => Self::NotConfigured(e.to_string()),
            DbErr::RecordNotFound(what) => Self::NotFound(what),
            other => Self::Query(other.to_string()),
        }
    }
}

pub type Result<T, E = LedgerError> = std::result::Result<T, E>;
