//! Diesel models for contacts.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::contact::{
    Contact as DomainContact, NewContact as DomainNewContact, UpdateContact as DomainUpdateContact,
};
use crate::domain::types::{
    ClientId, ContactId, ContactStatus, EmailAddress, PhoneNumber, Tags, TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::contacts)]
/// Diesel model for [`crate::domain::contact::Contact`].
pub struct Contact {
    pub id: i32,
    pub client_id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub city: String,
    pub source: String,
    pub tags: String,
    pub notes: String,
    pub status: String,
    pub unsubscribed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::contacts)]
pub struct NewContact<'a> {
    pub client_id: i32,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone: &'a str,
    pub city: &'a str,
    pub source: &'a str,
    pub tags: String,
    pub notes: &'a str,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::contacts)]
pub struct UpdateContact<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone: &'a str,
    pub city: &'a str,
    pub source: &'a str,
    pub tags: String,
    pub notes: &'a str,
    pub status: &'a str,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Contact> for DomainContact {
    type Error = TypeConstraintError;

    fn try_from(contact: Contact) -> Result<Self, Self::Error> {
        let phone = if contact.phone.is_empty() {
            None
        } else {
            Some(PhoneNumber::new(contact.phone)?)
        };

        Ok(Self {
            id: ContactId::try_from(contact.id)?,
            client_id: ClientId::try_from(contact.client_id)?,
            email: EmailAddress::new(contact.email)?,
            first_name: contact.first_name,
            last_name: contact.last_name,
            phone,
            city: contact.city,
            source: contact.source,
            tags: Tags::parse(&contact.tags),
            notes: contact.notes,
            status: contact.status.parse::<ContactStatus>()?,
            unsubscribed_at: contact.unsubscribed_at,
            created_at: contact.created_at,
            updated_at: contact.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewContact> for NewContact<'a> {
    fn from(contact: &'a DomainNewContact) -> Self {
        let details = &contact.details;
        Self {
            client_id: contact.client_id.get(),
            email: contact.email.as_str(),
            first_name: &details.first_name,
            last_name: &details.last_name,
            phone: details.phone.as_ref().map_or("", PhoneNumber::as_str),
            city: &details.city,
            source: &details.source,
            tags: details.tags.to_storage(),
            notes: &details.notes,
        }
    }
}

impl<'a> From<&'a DomainUpdateContact> for UpdateContact<'a> {
    fn from(contact: &'a DomainUpdateContact) -> Self {
        let details = &contact.details;
        Self {
            email: contact.email.as_str(),
            first_name: &details.first_name,
            last_name: &details.last_name,
            phone: details.phone.as_ref().map_or("", PhoneNumber::as_str),
            city: &details.city,
            source: &details.source,
            tags: details.tags.to_storage(),
            notes: &details.notes,
            status: contact.status.as_str(),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contact::ContactDetails;
    use chrono::Utc;

    #[test]
    fn new_contact_stores_tags_and_blank_phone() {
        let domain = DomainNewContact::new(
            ClientId::new(2).unwrap(),
            EmailAddress::new("buyer@example.com").unwrap(),
            ContactDetails {
                tags: Tags::parse("Buyer, Condo"),
                ..ContactDetails::default()
            },
        );
        let new: NewContact = (&domain).into();
        assert_eq!(new.client_id, 2);
        assert_eq!(new.phone, "");
        assert_eq!(new.tags, "buyer,condo");
    }

    #[test]
    fn contact_into_domain_parses_status() {
        let now = Utc::now().naive_utc();
        let row = Contact {
            id: 5,
            client_id: 2,
            email: "seller@example.com".into(),
            first_name: "Sam".into(),
            last_name: String::new(),
            phone: String::new(),
            city: "Denver".into(),
            source: "zillow".into(),
            tags: "seller".into(),
            notes: String::new(),
            status: "bounced".into(),
            unsubscribed_at: None,
            created_at: now,
            updated_at: now,
        };
        let contact = DomainContact::try_from(row).unwrap();
        assert_eq!(contact.status, ContactStatus::Bounced);
        assert_eq!(contact.phone, None);
        assert_eq!(contact.tags.as_slice(), ["seller"]);
    }
}
