//! Business logic behind the HTTP routes and the event worker.
//!
//! Every function takes the repository as a generic bound on the narrow
//! reader/writer traits it needs, so it can be tested against
//! `MockRepository`.

pub mod access;
pub mod activity;
pub mod analytics;
pub mod audience;
pub mod campaigns;
pub mod clients;
pub mod contact_lists;
pub mod contacts;
pub mod delivery;
pub mod dispatch;
pub mod errors;
pub mod templates;
pub mod unsubscribe;
pub mod users;

pub use errors::{ServiceError, ServiceResult};
