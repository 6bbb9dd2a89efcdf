use thiserror::Error;

use crate::domain::campaign::TransitionError;
use crate::forms::FormError;
use crate::repository::errors::RepositoryError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("authentication required")]
    Unauthorized,

    #[error("access denied")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Form(String),

    #[error("{0}")]
    TypeConstraint(String),

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("dispatch failed: {0}")]
    Dispatch(String),

    #[error("repository error: {0}")]
    Repository(RepositoryError),

    #[error("{0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::ConstraintViolation(message) => ServiceError::Conflict(message),
            other => ServiceError::Repository(other),
        }
    }
}

impl From<TransitionError> for ServiceError {
    fn from(err: TransitionError) -> Self {
        ServiceError::Conflict(err.to_string())
    }
}

impl From<FormError> for ServiceError {
    fn from(err: FormError) -> Self {
        ServiceError::Form(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::campaign::CampaignAction;
    use crate::domain::types::CampaignStatus;

    #[test]
    fn unique_violations_become_conflicts() {
        let err = ServiceError::from(RepositoryError::ConstraintViolation("dup".into()));
        assert!(matches!(err, ServiceError::Conflict(msg) if msg == "dup"));
        assert!(matches!(
            ServiceError::from(RepositoryError::NotFound),
            ServiceError::NotFound
        ));
    }

    #[test]
    fn illegal_transition_is_a_conflict() {
        let err = ServiceError::from(TransitionError {
            from: CampaignStatus::Sent,
            action: CampaignAction::Cancel,
        });
        assert_eq!(err.to_string(), "cannot cancel a campaign that is sent");
    }
}
