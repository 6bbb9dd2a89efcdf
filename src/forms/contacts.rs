use std::io::Read;

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use serde::Deserialize;
use validator::Validate;

use crate::domain::contact::{ContactDetails, NewContact, UpdateContact};
use crate::domain::types::{ClientId, ContactStatus, EmailAddress, PhoneNumber, Tags};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Default, Deserialize, Validate)]
/// Payload for creating or replacing a contact.
pub struct ContactForm {
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub notes: String,
    /// Only honoured on update; new contacts start active.
    #[serde(default)]
    pub status: Option<ContactStatus>,
}

impl ContactForm {
    fn details(&self) -> Result<ContactDetails, FormError> {
        Ok(ContactDetails::new(
            &self.first_name,
            &self.last_name,
            non_blank(self.phone.as_deref())
                .map(PhoneNumber::new)
                .transpose()?,
            &self.city,
            &self.source,
            Tags::from(self.tags.clone()),
            &self.notes,
        ))
    }

    pub fn to_new_contact(&self, client_id: ClientId) -> Result<NewContact, FormError> {
        self.validate()?;
        Ok(NewContact::new(
            client_id,
            EmailAddress::new(self.email.as_str())?,
            self.details()?,
        ))
    }

    pub fn to_update_contact(&self, current: ContactStatus) -> Result<UpdateContact, FormError> {
        self.validate()?;
        Ok(UpdateContact {
            email: EmailAddress::new(self.email.as_str())?,
            details: self.details()?,
            status: self.status.unwrap_or(current),
        })
    }
}

#[derive(MultipartForm)]
pub struct UploadContactsForm {
    #[multipart(limit = "10MB")]
    pub csv: TempFile,
}

/// Outcome of parsing an uploaded CSV file.
#[derive(Debug, Default)]
pub struct ParsedContacts {
    pub contacts: Vec<NewContact>,
    /// Rows rejected because of an invalid email or phone.
    pub invalid: usize,
}

#[derive(Debug, Deserialize)]
struct ContactRecord {
    email: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    tags: String,
}

impl ContactRecord {
    fn into_new_contact(self, client_id: ClientId) -> Option<NewContact> {
        let email = EmailAddress::new(self.email).ok()?;
        let phone = match non_blank(Some(&self.phone)) {
            Some(raw) => Some(PhoneNumber::new(raw).ok()?),
            None => None,
        };
        let details = ContactDetails::new(
            &self.first_name,
            &self.last_name,
            phone,
            &self.city,
            &self.source,
            Tags::parse(&self.tags),
            "",
        );
        Some(NewContact::new(client_id, email, details))
    }
}

/// Reads contacts from CSV with a header row.
///
/// Recognised columns are `email, first_name, last_name, phone, city, source,
/// tags`; other columns are ignored. Rows that fail to parse or carry an
/// invalid email/phone are counted as invalid.
pub fn parse_contacts_csv<R: Read>(
    reader: R,
    client_id: ClientId,
) -> Result<ParsedContacts, FormError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| FormError::Csv(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect::<csv::StringRecord>();
    if !headers.iter().any(|h| h == "email") {
        return Err(FormError::Csv("missing `email` column".to_string()));
    }
    rdr.set_headers(headers);

    let mut parsed = ParsedContacts::default();
    for record in rdr.deserialize::<ContactRecord>() {
        match record.ok().and_then(|r| r.into_new_contact(client_id)) {
            Some(contact) => parsed.contacts.push(contact),
            None => parsed.invalid += 1,
        }
    }
    Ok(parsed)
}

impl UploadContactsForm {
    /// Opens the uploaded file from its start.
    pub fn reader(&self) -> Result<std::fs::File, FormError> {
        self.csv
            .file
            .reopen()
            .map_err(|e| FormError::Csv(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ClientId {
        ClientId::new(1).unwrap()
    }

    #[test]
    fn parses_known_columns_and_counts_invalid_rows() {
        let csv = "Email,First_Name,City,Tags,Budget\n\
                   ann@example.com,Ann,Austin,\"buyer, condo\",500k\n\
                   not-an-email,Bob,Dallas,,\n\
                   cat@example.com,Cat,,seller,\n";
        let parsed = parse_contacts_csv(csv.as_bytes(), client()).unwrap();
        assert_eq!(parsed.contacts.len(), 2);
        assert_eq!(parsed.invalid, 1);
        assert_eq!(parsed.contacts[0].details.tags.to_storage(), "buyer,condo");
        assert_eq!(parsed.contacts[1].email.as_str(), "cat@example.com");
    }

    #[test]
    fn bad_phone_marks_row_invalid() {
        let csv = "email,phone\nann@example.com,12\nbob@example.com,(201) 555-0123\n";
        let parsed = parse_contacts_csv(csv.as_bytes(), client()).unwrap();
        assert_eq!(parsed.invalid, 1);
        assert_eq!(
            parsed.contacts[0].details.phone.as_ref().map(PhoneNumber::as_str),
            Some("+12015550123")
        );
    }

    #[test]
    fn missing_email_column_is_rejected() {
        let result = parse_contacts_csv("name\nAnn\n".as_bytes(), client());
        assert!(matches!(result, Err(FormError::Csv(_))));
    }

    #[test]
    fn update_keeps_status_unless_given() {
        let form = ContactForm {
            email: "ann@example.com".into(),
            ..ContactForm::default()
        };
        let update = form.to_update_contact(ContactStatus::Bounced).unwrap();
        assert_eq!(update.status, ContactStatus::Bounced);
    }
}
