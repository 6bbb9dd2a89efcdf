//! Request payloads accepted by the API and their conversion into domain
//! values.

use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod campaigns;
pub mod clients;
pub mod contact_lists;
pub mod contacts;
pub mod templates;
pub mod webhook;

#[derive(Debug, Error)]
/// Errors that can occur when processing request data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    TypeConstraint(#[from] TypeConstraintError),

    #[error("invalid csv: {0}")]
    Csv(String),

    #[error("{0}")]
    Invalid(String),
}

/// Treats blank optional strings as absent.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
