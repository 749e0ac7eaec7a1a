//! Error taxonomy shared by every layer of the ORM.
//!
//! Build errors are bugs in statement construction (they should never occur given
//! valid input) and are kept apart from execution errors, which carry the driver's
//! error untouched as their source.

use crate::value::ValueExtractionError;
use std::error::Error as StdError;

/// Boxed driver error kept as the `source` of connection and execution failures.
pub type DriverError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors produced by configuration, connection, statement building and execution.
#[derive(Debug, thiserror::Error)]
pub enum OrmError {
    /// Unsupported dialect, unreadable configuration, or a backend that was not compiled in.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The underlying driver could not open a connection.
    #[error("connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: DriverError,
    },

    /// A statement could not be assembled from the supplied description.
    #[error("statement build error: {0}")]
    Build(String),

    /// The database rejected or failed a statement.
    #[error("execution error: {source} (sql: {sql})")]
    Execution {
        sql: String,
        #[source]
        source: DriverError,
    },

    /// A record or predicate referenced a column the entity does not declare.
    #[error("unknown column `{column}` on table `{table}`")]
    UnknownColumn { table: String, column: String },

    /// A stored value could not be read as the requested Rust type.
    #[error("cannot read column `{column}`: {source}")]
    Extraction {
        column: String,
        #[source]
        source: ValueExtractionError,
    },

    /// Transaction bookkeeping failed (commit or rollback without `begin`).
    #[error("transaction error: {0}")]
    Transaction(String),

    /// The connection mutex was poisoned by a panic in another caller.
    #[error("connection handle poisoned by a previous panic")]
    Poisoned,
}

impl OrmError {
    /// Wrap a driver failure for `sql`.
    pub fn execution<E>(sql: impl Into<String>, source: E) -> Self
    where
        E: Into<DriverError>,
    {
        OrmError::Execution {
            sql: sql.into(),
            source: source.into(),
        }
    }

    /// Wrap a driver connect failure.
    pub fn connection<E>(message: impl Into<String>, source: E) -> Self
    where
        E: Into<DriverError>,
    {
        OrmError::Connection {
            message: message.into(),
            source: source.into(),
        }
    }

    /// True when the error came from the database while running a statement.
    pub fn is_execution(&self) -> bool {
        matches!(self, OrmError::Execution { .. })
    }

    /// True when the error is a statement construction bug.
    pub fn is_build(&self) -> bool {
        matches!(self, OrmError::Build(_))
    }
}

impl From<config::ConfigError> for OrmError {
    fn from(err: config::ConfigError) -> Self {
        OrmError::Configuration(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, OrmError>;
