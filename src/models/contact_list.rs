//! Diesel models for saved contact lists.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::contact_list::{
    ContactList as DomainContactList, NewContactList as DomainNewContactList,
    UpdateContactList as DomainUpdateContactList,
};
use crate::domain::filter::FilterCriteria;
use crate::domain::types::{ClientId, ContactListId, ListName, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::contact_lists)]
pub struct ContactList {
    pub id: i32,
    pub client_id: i32,
    pub name: String,
    pub description: String,
    pub filter_criteria: String, // JSON text
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::contact_lists)]
pub struct NewContactList<'a> {
    pub client_id: i32,
    pub name: &'a str,
    pub description: &'a str,
    pub filter_criteria: String,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::contact_lists)]
pub struct UpdateContactList<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub filter_criteria: String,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<ContactList> for DomainContactList {
    type Error = TypeConstraintError;

    fn try_from(list: ContactList) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ContactListId::try_from(list.id)?,
            client_id: ClientId::try_from(list.client_id)?,
            name: ListName::new(list.name)?,
            description: list.description,
            criteria: FilterCriteria::from_json(&list.filter_criteria)?,
            created_at: list.created_at,
            updated_at: list.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewContactList> for NewContactList<'a> {
    fn from(list: &'a DomainNewContactList) -> Self {
        Self {
            client_id: list.client_id.get(),
            name: list.name.as_str(),
            description: &list.description,
            filter_criteria: list.criteria.to_json(),
        }
    }
}

impl<'a> From<&'a DomainUpdateContactList> for UpdateContactList<'a> {
    fn from(list: &'a DomainUpdateContactList) -> Self {
        Self {
            name: list.name.as_str(),
            description: &list.description,
            filter_criteria: list.criteria.to_json(),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}
