//! Database errors shared across the workspace

use sqlx::Error as SqlxError;
use sqlx::migrate::MigrateError;
use thiserror::Error;

/// Failure while talking to PostgreSQL
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The pool could not open or hand out a connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// A statement failed
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    #[error("Database migration error: {0}")]
    Migration(#[from] MigrateError),

    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// SQLSTATE reported by the server, if the failure came from a statement
    /// the server rejected
    pub fn sqlstate(&self) -> Option<String> {
        match self {
            DatabaseError::Connection(err) | DatabaseError::Query(err) => err
                .as_database_error()
                .and_then(|db| db.code())
                .map(|code| code.into_owned()),
            DatabaseError::Migration(_) | DatabaseError::Configuration(_) => None,
        }
    }
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlstate_absent_without_server_error() {
        assert_eq!(DatabaseError::Query(SqlxError::RowNotFound).sqlstate(), None);
        assert_eq!(
            DatabaseError::Configuration("bad url".to_string()).sqlstate(),
            None
        );
    }
}
