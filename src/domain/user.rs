//! Users provisioned by the hosted auth provider.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ClientId, EmailAddress, UserId, UserRole};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub name: String,
    pub role: UserRole,
    pub client_id: Option<ClientId>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Admins see every client; client users only their own account.
    pub fn can_access(&self, client_id: ClientId) -> bool {
        self.is_admin() || self.client_id == Some(client_id)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewUser {
    pub id: UserId,
    pub email: EmailAddress,
    pub name: String,
    pub role: UserRole,
    pub client_id: Option<ClientId>,
}

impl NewUser {
    #[must_use]
    pub fn new(
        id: UserId,
        email: EmailAddress,
        name: &str,
        role: UserRole,
        client_id: Option<ClientId>,
    ) -> Self {
        Self {
            id,
            email,
            name: name.trim().to_string(),
            role,
            client_id: match role {
                UserRole::Admin => None,
                UserRole::Client => client_id,
            },
        }
    }
}
