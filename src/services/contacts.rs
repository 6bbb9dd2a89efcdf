use std::io::Read;

use serde_json::json;

use crate::domain::activity_log::EntityType;
use crate::domain::contact::Contact;
use crate::domain::types::{ClientId, ContactId};
use crate::dto::contacts::{ContactsQuery, ImportSummary};
use crate::forms::contacts::{ContactForm, parse_contacts_csv};
use crate::models::auth::AuthenticatedUser;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    ActivityLogWriter, ContactQuery, ContactReader, ContactWriter, UserReader,
};
use crate::services::access::{page_or_first, record_activity, require_admin, require_client_access};
use crate::services::{ServiceError, ServiceResult};

pub fn list_contacts<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    params: ContactsQuery,
) -> ServiceResult<Paginated<Contact>>
where
    R: UserReader + ContactReader + ?Sized,
{
    require_client_access(repo, auth, client_id)?;
    let page = page_or_first(params.page);

    let mut query = ContactQuery::new(client_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(term) = params.search.filter(|s| !s.trim().is_empty()) {
        query = query.search(term);
    }
    if let Some(status) = params.status {
        query = query.status(status);
    }
    let (total, contacts) = repo.list_contacts(query)?;

    Ok(Paginated::new(contacts, total, page, DEFAULT_ITEMS_PER_PAGE))
}

pub fn get_contact<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    contact_id: ContactId,
) -> ServiceResult<Contact>
where
    R: UserReader + ContactReader + ?Sized,
{
    require_client_access(repo, auth, client_id)?;
    repo.get_contact_by_id(contact_id, client_id)?
        .ok_or(ServiceError::NotFound)
}

pub fn create_contact<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    form: &ContactForm,
) -> ServiceResult<Contact>
where
    R: UserReader + ContactReader + ContactWriter + ActivityLogWriter + ?Sized,
{
    let user = require_admin(repo, auth)?;
    let new_contact = form.to_new_contact(client_id)?;

    if repo
        .get_contact_by_email(&new_contact.email, client_id)?
        .is_some()
    {
        return Err(ServiceError::Conflict(format!(
            "a contact with email {} already exists",
            new_contact.email
        )));
    }

    let contact = repo.create_contact(&new_contact).map_err(|err| {
        log::error!("Failed to create contact: {err}");
        err
    })?;

    record_activity(
        repo,
        Some(&user),
        Some(client_id),
        "contact.created",
        (EntityType::Contact, Some(contact.id.get())),
        json!({ "email": contact.email }),
    );
    Ok(contact)
}

pub fn update_contact<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    contact_id: ContactId,
    form: &ContactForm,
) -> ServiceResult<Contact>
where
    R: UserReader + ContactReader + ContactWriter + ActivityLogWriter + ?Sized,
{
    let user = require_admin(repo, auth)?;
    let existing = repo
        .get_contact_by_id(contact_id, client_id)?
        .ok_or(ServiceError::NotFound)?;
    let updates = form.to_update_contact(existing.status)?;

    let contact = repo.update_contact(contact_id, client_id, &updates)?;

    record_activity(
        repo,
        Some(&user),
        Some(client_id),
        "contact.updated",
        (EntityType::Contact, Some(contact_id.get())),
        json!({ "email": contact.email, "status": contact.status }),
    );
    Ok(contact)
}

pub fn delete_contact<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    contact_id: ContactId,
) -> ServiceResult<()>
where
    R: UserReader + ContactWriter + ActivityLogWriter + ?Sized,
{
    let user = require_admin(repo, auth)?;
    repo.delete_contact(contact_id, client_id)?;

    record_activity(
        repo,
        Some(&user),
        Some(client_id),
        "contact.deleted",
        (EntityType::Contact, Some(contact_id.get())),
        json!({}),
    );
    Ok(())
}

/// Imports contacts from CSV, skipping emails the client already has.
pub fn import_contacts<R, F>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    csv: F,
) -> ServiceResult<ImportSummary>
where
    R: UserReader + ContactWriter + ActivityLogWriter + ?Sized,
    F: Read,
{
    let user = require_admin(repo, auth)?;

    let parsed = parse_contacts_csv(csv, client_id).map_err(|err| {
        log::error!("Failed to parse contacts csv: {err}");
        ServiceError::from(err)
    })?;

    let inserted = repo.import_contacts(&parsed.contacts).map_err(|err| {
        log::error!("Failed to import contacts: {err}");
        err
    })?;

    let summary = ImportSummary {
        inserted,
        skipped: parsed.contacts.len() - inserted,
        invalid: parsed.invalid,
    };

    record_activity(
        repo,
        Some(&user),
        Some(client_id),
        "contacts.imported",
        (EntityType::Contact, None),
        json!({
            "inserted": summary.inserted,
            "skipped": summary.skipped,
            "invalid": summary.invalid,
        }),
    );
    Ok(summary)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::types::ContactStatus;
    use crate::services::access::test_support::*;

    fn client_one() -> ClientId {
        ClientId::new(1).unwrap()
    }

    #[test]
    fn duplicate_email_is_a_conflict() {
        let mut repo = repo_with_users();
        repo.expect_get_contact_by_email()
            .returning(|email, _| Ok(Some(contact(9, email.as_str()))));
        repo.expect_create_contact().never();

        let form = ContactForm {
            email: "Ann@Example.com".into(),
            ..ContactForm::default()
        };
        let result = create_contact(&repo, &auth("admin"), client_one(), &form);
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn client_users_cannot_edit_contacts() {
        let repo = repo_with_users();
        let form = ContactForm {
            email: "ann@example.com".into(),
            ..ContactForm::default()
        };
        assert!(matches!(
            create_contact(&repo, &auth("agent"), client_one(), &form),
            Err(ServiceError::Forbidden)
        ));
        assert!(matches!(
            delete_contact(&repo, &auth("agent"), client_one(), ContactId::new(1).unwrap()),
            Err(ServiceError::Forbidden)
        ));
    }

    #[test]
    fn client_users_can_read_own_contacts() {
        let mut repo = repo_with_users();
        repo.expect_list_contacts()
            .withf(|q| q.client_id.get() == 1 && q.status == Some(ContactStatus::Active))
            .returning(|_| Ok((1, vec![contact(1, "ann@example.com")])));

        let params = ContactsQuery {
            status: Some(ContactStatus::Active),
            ..ContactsQuery::default()
        };
        let page = list_contacts(&repo, &auth("agent"), client_one(), params).unwrap();
        assert_eq!(page.total, 1);
    }

    #[test]
    fn import_reports_skipped_and_invalid_rows() {
        let mut repo = repo_with_users();
        repo.expect_import_contacts()
            .withf(|rows| rows.len() == 3)
            .returning(|_| Ok(2));

        let csv = "email,first_name\n\
                   ann@example.com,Ann\n\
                   bob@example.com,Bob\n\
                   ann@example.com,Ann again\n\
                   broken,Nobody\n";
        let summary = import_contacts(&repo, &auth("admin"), client_one(), csv.as_bytes()).unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                inserted: 2,
                skipped: 1,
                invalid: 1,
            }
        );
    }
}
