//! Diesel models for provisioned users.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{ClientId, EmailAddress, TypeConstraintError, UserId, UserRole};
use crate::domain::user::{NewUser as DomainNewUser, User as DomainUser};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub client_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::users)]
#[diesel(treat_none_as_null = true)]
pub struct NewUser<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub name: &'a str,
    pub role: &'static str,
    pub client_id: Option<i32>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<User> for DomainUser {
    type Error = TypeConstraintError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(user.id)?,
            email: EmailAddress::new(user.email)?,
            name: user.name,
            role: user.role.parse::<UserRole>()?,
            client_id: user.client_id.map(ClientId::try_from).transpose()?,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewUser> for NewUser<'a> {
    fn from(user: &'a DomainNewUser) -> Self {
        Self {
            id: user.id.as_str(),
            email: user.email.as_str(),
            name: &user.name,
            role: user.role.as_str(),
            client_id: user.client_id.map(ClientId::get),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}
