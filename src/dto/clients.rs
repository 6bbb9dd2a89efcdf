use serde::Deserialize;

/// Query parameters accepted by `GET /api/v1/clients`.
#[derive(Debug, Default, Deserialize)]
pub struct ClientsQuery {
    /// Free-form search applied to name, email and company.
    pub search: Option<String>,
    pub page: Option<usize>,
}
