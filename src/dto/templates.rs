use serde::Deserialize;

/// Query parameters accepted by `GET /api/v1/templates`.
#[derive(Debug, Default, Deserialize)]
pub struct TemplatesQuery {
    /// Restricts the listing to shared templates plus this client's own.
    pub client_id: Option<i32>,
}
