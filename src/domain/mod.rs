//! Domain aggregates exposed by the service layer.

pub mod activity_log;
pub mod analytics;
pub mod campaign;
pub mod client;
pub mod contact;
pub mod contact_list;
pub mod filter;
pub mod template;
pub mod types;
pub mod user;
