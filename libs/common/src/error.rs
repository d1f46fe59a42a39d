//! Errors raised while setting up and checking the PostgreSQL pool

use sqlx::Error as SqlxError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The pool could not open its first connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// A health check statement failed on an open pool
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// An embedded schema migration failed to apply
    #[error("Database migration error: {0}")]
    Migration(String),

    /// The database URL could not be parsed into connection options
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failing_stage() {
        let err = DatabaseError::Migration("relation \"tickets\" already exists".into());
        assert_eq!(
            err.to_string(),
            "Database migration error: relation \"tickets\" already exists"
        );

        let err = DatabaseError::Query(SqlxError::PoolTimedOut);
        assert!(err.to_string().starts_with("Database query error"));
    }
}
