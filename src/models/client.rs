//! Diesel models for client accounts.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::client::{
    Client as DomainClient, NewClient as DomainNewClient, UpdateClient as DomainUpdateClient,
};
use crate::domain::types::{ClientId, ClientName, EmailAddress, PhoneNumber, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::clients)]
/// Diesel model for [`crate::domain::client::Client`].
pub struct Client {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::clients)]
/// Insertable form of [`Client`].
pub struct NewClient<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub company: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::clients)]
#[diesel(treat_none_as_null = true)]
/// Data used when updating a [`Client`] record.
pub struct UpdateClient<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub company: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Client> for DomainClient {
    type Error = TypeConstraintError;

    fn try_from(client: Client) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ClientId::try_from(client.id)?,
            name: ClientName::new(client.name)?,
            email: EmailAddress::new(client.email)?,
            phone: client.phone.as_deref().map(PhoneNumber::new).transpose()?,
            company: client.company,
            created_at: client.created_at,
            updated_at: client.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewClient> for NewClient<'a> {
    fn from(client: &'a DomainNewClient) -> Self {
        Self {
            name: client.name.as_str(),
            email: client.email.as_str(),
            phone: client.phone.as_ref().map(PhoneNumber::as_str),
            company: client.company.as_deref(),
        }
    }
}

impl<'a> From<&'a DomainUpdateClient> for UpdateClient<'a> {
    fn from(client: &'a DomainUpdateClient) -> Self {
        Self {
            name: client.name.as_str(),
            email: client.email.as_str(),
            phone: client.phone.as_ref().map(PhoneNumber::as_str),
            company: client.company.as_deref(),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn from_domain_new_creates_newclient() {
        let domain = DomainNewClient::new(
            ClientName::new("Harbor Realty").unwrap(),
            EmailAddress::new("Team@Harbor.com").unwrap(),
            None,
            Some("  Harbor Group ".to_string()),
        );
        let new: NewClient = (&domain).into();
        assert_eq!(new.name, "Harbor Realty");
        assert_eq!(new.email, "team@harbor.com");
        assert_eq!(new.phone, None);
        assert_eq!(new.company, Some("Harbor Group"));
    }

    #[test]
    fn client_into_domain_rejects_bad_rows() {
        let now: NaiveDateTime = Utc::now().naive_utc();
        let db_client = Client {
            id: 1,
            name: "n".to_string(),
            email: "broken".to_string(),
            phone: None,
            company: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(
            DomainClient::try_from(db_client),
            Err(TypeConstraintError::InvalidEmail)
        );
    }
}
