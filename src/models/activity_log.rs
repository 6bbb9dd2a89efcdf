//! Diesel models for the activity log.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::activity_log::{
    ActivityLog as DomainActivityLog, EntityType, NewActivityLog as DomainNewActivityLog,
};
use crate::domain::types::{ActivityLogId, ClientId, TypeConstraintError, UserId};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::activity_logs)]
pub struct ActivityLog {
    pub id: i32,
    pub client_id: Option<i32>,
    pub user_id: Option<String>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<i32>,
    pub details: String, // store JSON text in the DB
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::activity_logs)]
pub struct NewActivityLog<'a> {
    pub client_id: Option<i32>,
    pub user_id: Option<&'a str>,
    pub action: &'a str,
    pub entity_type: &'static str,
    pub entity_id: Option<i32>,
    pub details: String,
    pub created_at: NaiveDateTime,
}

impl TryFrom<ActivityLog> for DomainActivityLog {
    type Error = TypeConstraintError;

    fn try_from(log: ActivityLog) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActivityLogId::try_from(log.id)?,
            client_id: log.client_id.map(ClientId::try_from).transpose()?,
            user_id: log.user_id.map(UserId::new).transpose()?,
            action: log.action,
            entity_type: EntityType::from(log.entity_type.as_str()),
            entity_id: log.entity_id,
            details: serde_json::from_str(&log.details).unwrap_or_default(),
            created_at: log.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewActivityLog> for NewActivityLog<'a> {
    fn from(log: &'a DomainNewActivityLog) -> Self {
        Self {
            client_id: log.client_id.map(ClientId::get),
            user_id: log.user_id.as_ref().map(UserId::as_str),
            action: &log.action,
            entity_type: log.entity_type.as_str(),
            entity_id: log.entity_id,
            details: log.details.to_string(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
