//! Error types for recorm

use crate::value::Value;
use thiserror::Error;

/// Result type alias for recorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for query building and database operations
#[derive(Debug, Clone, Error)]
pub enum OrmError {
    /// Malformed call to a condition builder (wrong argument count or shape)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation or relation name that cannot be resolved
    #[error("Unknown operation `{name}` on `{target}`")]
    UnknownOperation { name: String, target: String },

    /// Database connection error
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// Query execution error, carrying the attempted SQL and bound values
    #[error("Query error: {message} (sql: {sql})")]
    Query {
        message: String,
        sql: String,
        params: Vec<Value>,
    },

    /// No driver registered for the configured kind
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// A query hook refused to run the statement
    #[error("Query aborted: {0}")]
    Aborted(String),
}

impl OrmError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an unknown operation error
    pub fn unknown_operation(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::UnknownOperation {
            name: name.into(),
            target: target.into(),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the statement that failed
    pub fn query(message: impl Into<String>, sql: &str, params: &[Value]) -> Self {
        Self::Query {
            message: message.into(),
            sql: sql.to_string(),
            params: params.to_vec(),
        }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is an invalid argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this is a connection error
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Check if this is a query execution error
    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query { .. })
    }

    /// The SQL text attached to a query error, if any.
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::Query { sql, .. } => Some(sql),
            _ => None,
        }
    }

    /// The bound values attached to a query error, if any.
    pub fn params(&self) -> Option<&[Value]> {
        match self {
            Self::Query { params, .. } => Some(params),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for OrmError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
