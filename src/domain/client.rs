//! Client accounts: the tenants whose contacts and campaigns are managed.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ClientId, ClientName, EmailAddress, PhoneNumber};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: ClientId,
    pub name: ClientName,
    pub email: EmailAddress,
    pub phone: Option<PhoneNumber>,
    pub company: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewClient {
    pub name: ClientName,
    pub email: EmailAddress,
    pub phone: Option<PhoneNumber>,
    pub company: Option<String>,
}

impl NewClient {
    #[must_use]
    pub fn new(
        name: ClientName,
        email: EmailAddress,
        phone: Option<PhoneNumber>,
        company: Option<String>,
    ) -> Self {
        Self {
            name,
            email,
            phone,
            company: company
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}

/// Replacement values for an existing client.
#[derive(Clone, Debug, Deserialize)]
pub struct UpdateClient {
    pub name: ClientName,
    pub email: EmailAddress,
    pub phone: Option<PhoneNumber>,
    pub company: Option<String>,
}

impl From<NewClient> for UpdateClient {
    fn from(value: NewClient) -> Self {
        Self {
            name: value.name,
            email: value.email,
            phone: value.phone,
            company: value.company,
        }
    }
}
