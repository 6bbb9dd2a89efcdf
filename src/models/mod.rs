//! Diesel models, configuration and wire messages.

pub mod activity_log;
pub mod analytics;
#[cfg(feature = "server")]
pub mod auth;
pub mod campaign;
pub mod client;
pub mod config;
pub mod contact;
pub mod contact_list;
pub mod template;
pub mod user;
pub mod zmq;
