//! DTOs exchanged between routes and services.

use serde::Deserialize;

pub mod analytics;
pub mod campaigns;
pub mod clients;
pub mod contact_lists;
pub mod contacts;
pub mod templates;
pub mod unsubscribe;

/// Plain `?page=` query.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
}
