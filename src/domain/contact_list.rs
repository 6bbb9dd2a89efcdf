//! Saved contact segments evaluated on demand.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::filter::FilterCriteria;
use crate::domain::types::{ClientId, ContactListId, ListName};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ContactList {
    pub id: ContactListId,
    pub client_id: ClientId,
    pub name: ListName,
    pub description: String,
    pub criteria: FilterCriteria,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewContactList {
    pub client_id: ClientId,
    pub name: ListName,
    pub description: String,
    pub criteria: FilterCriteria,
}

impl NewContactList {
    #[must_use]
    pub fn new(
        client_id: ClientId,
        name: ListName,
        description: &str,
        criteria: FilterCriteria,
    ) -> Self {
        Self {
            client_id,
            name,
            description: description.trim().to_string(),
            criteria,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UpdateContactList {
    pub name: ListName,
    pub description: String,
    pub criteria: FilterCriteria,
}

impl From<NewContactList> for UpdateContactList {
    fn from(value: NewContactList) -> Self {
        Self {
            name: value.name,
            description: value.description,
            criteria: value.criteria,
        }
    }
}
