use diesel::r2d2::{Error as R2D2Error, PoolError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found")]
    NotFound,

    /// Unique, foreign key or check constraint rejected the write.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// A stored row no longer satisfies the domain value objects.
    #[error("Invalid stored data: {0}")]
    InvalidRow(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

fn constraint_message(kind: &DatabaseErrorKind, message: &str) -> Option<String> {
    let text = match kind {
        DatabaseErrorKind::UniqueViolation => format!("already exists ({message})"),
        DatabaseErrorKind::ForeignKeyViolation => {
            format!("referenced record does not exist ({message})")
        }
        DatabaseErrorKind::NotNullViolation => format!("missing required value ({message})"),
        DatabaseErrorKind::CheckViolation => format!("value not allowed ({message})"),
        _ => return None,
    };
    Some(text)
}

impl From<DieselError> for RepositoryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => RepositoryError::NotFound,
            DieselError::DatabaseError(kind, info) => {
                let message = info.message();
                match constraint_message(&kind, message) {
                    Some(text) => RepositoryError::ConstraintViolation(text),
                    None => RepositoryError::DatabaseError(message.to_string()),
                }
            }
            // JSON columns (criteria, design, details) that fail to decode.
            DieselError::DeserializationError(e) => RepositoryError::InvalidRow(e.to_string()),
            other => RepositoryError::DatabaseError(other.to_string()),
        }
    }
}

impl From<R2D2Error> for RepositoryError {
    fn from(err: R2D2Error) -> Self {
        RepositoryError::ConnectionError(err.to_string())
    }
}

impl From<PoolError> for RepositoryError {
    fn from(err: PoolError) -> Self {
        RepositoryError::ConnectionError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_key_failures_name_the_missing_reference() {
        let text = constraint_message(
            &DatabaseErrorKind::ForeignKeyViolation,
            "FOREIGN KEY constraint failed",
        )
        .unwrap();
        assert_eq!(
            text,
            "referenced record does not exist (FOREIGN KEY constraint failed)"
        );
        assert!(constraint_message(&DatabaseErrorKind::SerializationFailure, "busy").is_none());
    }

    #[test]
    fn missing_rows_are_not_found() {
        assert!(matches!(
            RepositoryError::from(DieselError::NotFound),
            RepositoryError::NotFound
        ));
        assert!(matches!(
            RepositoryError::from(DieselError::RollbackTransaction),
            RepositoryError::DatabaseError(_)
        ));
    }
}
