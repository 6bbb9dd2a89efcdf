use serde::{Deserialize, Serialize};

use crate::domain::types::ContactStatus;

/// Query parameters accepted by the contact listing endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ContactsQuery {
    pub search: Option<String>,
    pub status: Option<ContactStatus>,
    pub page: Option<usize>,
}

/// Result of a CSV contact import.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    /// Rows whose email already exists for the client.
    pub skipped: usize,
    /// Rows with an invalid email or phone.
    pub invalid: usize,
}
