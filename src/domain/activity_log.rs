//! Audit trail of mutations performed through the API.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::{ActivityLogId, ClientId, UserId};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActivityLog {
    pub id: ActivityLogId,
    pub client_id: Option<ClientId>,
    pub user_id: Option<UserId>,
    pub action: String,
    pub entity_type: EntityType,
    pub entity_id: Option<i32>,
    pub details: Value,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Client,
    Contact,
    ContactList,
    Template,
    Campaign,
    User,
}

impl EntityType {
    pub const fn as_str(self) -> &'static str {
        match self {
            EntityType::Client => "client",
            EntityType::Contact => "contact",
            EntityType::ContactList => "contact_list",
            EntityType::Template => "template",
            EntityType::Campaign => "campaign",
            EntityType::User => "user",
        }
    }
}

impl From<&str> for EntityType {
    fn from(s: &str) -> Self {
        match s {
            "contact" => EntityType::Contact,
            "contact_list" => EntityType::ContactList,
            "template" => EntityType::Template,
            "campaign" => EntityType::Campaign,
            "user" => EntityType::User,
            _ => EntityType::Client,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewActivityLog {
    pub client_id: Option<ClientId>,
    pub user_id: Option<UserId>,
    pub action: String,
    pub entity_type: EntityType,
    pub entity_id: Option<i32>,
    pub details: Value,
}

impl NewActivityLog {
    #[must_use]
    pub fn new(
        client_id: Option<ClientId>,
        user_id: Option<UserId>,
        action: &str,
        entity_type: EntityType,
        entity_id: Option<i32>,
        details: Value,
    ) -> Self {
        Self {
            client_id,
            user_id,
            action: action.to_string(),
            entity_type,
            entity_id,
            details,
        }
    }
}
