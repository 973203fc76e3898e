//! Access error types

use igrejas_shared::IgrejasError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The row exists but is no longer in a state that allows the change
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// PostgreSQL unique violation
const UNIQUE_VIOLATION: &str = "23505";

impl From<sqlx::Error> for AccessError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AccessError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                AccessError::Conflict("Resource already exists".to_string())
            }
            other => AccessError::Database(other.to_string()),
        }
    }
}

impl From<IgrejasError> for AccessError {
    fn from(err: IgrejasError) -> Self {
        match err {
            IgrejasError::NotFound(msg) => AccessError::NotFound(msg),
            IgrejasError::Validation(msg) => AccessError::InvalidInput(msg),
            IgrejasError::Internal(msg) => AccessError::Internal(msg),
        }
    }
}

pub type AccessResult<T> = Result<T, AccessError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[derive(Debug)]
    struct PgError {
        code: &'static str,
    }

    impl std::fmt::Display for PgError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "duplicate key value violates unique constraint \"planos_nome_key\"")
        }
    }

    impl std::error::Error for PgError {}

    impl sqlx::error::DatabaseError for PgError {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.code))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn test_unique_violation_is_a_conflict() {
        let err = sqlx::Error::Database(Box::new(PgError { code: "23505" }));
        assert!(matches!(AccessError::from(err), AccessError::Conflict(_)));
    }

    #[test]
    fn test_other_database_errors_stay_database_errors() {
        let err = sqlx::Error::Database(Box::new(PgError { code: "23503" }));
        assert!(matches!(AccessError::from(err), AccessError::Database(_)));
        assert!(matches!(
            AccessError::from(sqlx::Error::RowNotFound),
            AccessError::NotFound(_)
        ));
    }
}
