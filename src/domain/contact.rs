//! Contacts belonging to a client account.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ClientId, ContactId, ContactStatus, EmailAddress, PhoneNumber, Tags};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    pub id: ContactId,
    pub client_id: ClientId,
    pub email: EmailAddress,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<PhoneNumber>,
    pub city: String,
    pub source: String,
    pub tags: Tags,
    pub notes: String,
    pub status: ContactStatus,
    pub unsubscribed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Contact {
    /// Full name when known, otherwise the email address.
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.to_string()
        } else {
            name.to_string()
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ContactStatus::Active
    }
}

/// Editable contact attributes shared by create and update.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<PhoneNumber>,
    pub city: String,
    pub source: String,
    pub tags: Tags,
    pub notes: String,
}

impl ContactDetails {
    /// Trims free-text attributes and strips markup from notes.
    #[must_use]
    pub fn new(
        first_name: &str,
        last_name: &str,
        phone: Option<PhoneNumber>,
        city: &str,
        source: &str,
        tags: Tags,
        notes: &str,
    ) -> Self {
        Self {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            phone,
            city: city.trim().to_string(),
            source: source.trim().to_lowercase(),
            tags,
            notes: ammonia::clean(notes.trim()),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewContact {
    pub client_id: ClientId,
    pub email: EmailAddress,
    pub details: ContactDetails,
}

impl NewContact {
    #[must_use]
    pub fn new(client_id: ClientId, email: EmailAddress, details: ContactDetails) -> Self {
        Self {
            client_id,
            email,
            details,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UpdateContact {
    pub email: EmailAddress,
    pub details: ContactDetails,
    pub status: ContactStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_are_trimmed_and_notes_sanitized() {
        let details = ContactDetails::new(
            "  Ada ",
            " Lovelace",
            None,
            " Austin ",
            " Open-House ",
            Tags::parse("buyer"),
            "<script>alert(1)</script>Prefers <b>email</b>",
        );
        assert_eq!(details.first_name, "Ada");
        assert_eq!(details.city, "Austin");
        assert_eq!(details.source, "open-house");
        assert_eq!(details.notes, "Prefers <b>email</b>");
    }
}
