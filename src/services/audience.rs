//! Resolution of a campaign audience into concrete recipients.
//!
//! Every audience is narrowed to the `active` contacts of the campaign's
//! client, so unsubscribed, bounced and complained contacts never receive a
//! send regardless of how the audience was configured.

use std::collections::HashSet;

use crate::domain::campaign::Audience;
use crate::domain::contact::Contact;
use crate::domain::types::{ClientId, ContactStatus};
use crate::dto::campaigns::AudiencePreview;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{ContactListReader, ContactQuery, ContactReader};
use crate::services::{ServiceError, ServiceResult};

/// Builds the contact query selecting `audience`.
///
/// Returns `None` when the audience cannot match anyone (an empty custom
/// set), which callers treat as an empty result without touching the
/// database.
pub fn audience_query<R>(
    repo: &R,
    client_id: ClientId,
    audience: &Audience,
) -> ServiceResult<Option<ContactQuery>>
where
    R: ContactListReader + ?Sized,
{
    let base = ContactQuery::new(client_id).status(ContactStatus::Active);
    let query = match audience {
        Audience::All => base,
        Audience::List { list_id } => {
            let list = repo
                .get_contact_list(*list_id, client_id)?
                .ok_or_else(|| {
                    ServiceError::Conflict(format!(
                        "contact list {list_id} does not belong to this client"
                    ))
                })?;
            base.criteria(list.criteria)
        }
        Audience::Custom { contact_ids } if contact_ids.is_empty() => return Ok(None),
        Audience::Custom { contact_ids } => base.contact_ids(contact_ids.clone()),
    };
    Ok(Some(query))
}

/// Every recipient of the audience, ordered by id and unique by email.
pub fn resolve_audience<R>(
    repo: &R,
    client_id: ClientId,
    audience: &Audience,
) -> ServiceResult<Vec<Contact>>
where
    R: ContactListReader + ContactReader + ?Sized,
{
    let Some(query) = audience_query(repo, client_id, audience)? else {
        return Ok(Vec::new());
    };
    let (_, contacts) = repo.list_contacts(query)?;

    let mut seen = HashSet::new();
    Ok(contacts
        .into_iter()
        .filter(|contact| seen.insert(contact.email.clone()))
        .collect())
}

pub fn audience_count<R>(repo: &R, client_id: ClientId, audience: &Audience) -> ServiceResult<usize>
where
    R: ContactListReader + ContactReader + ?Sized,
{
    match audience_query(repo, client_id, audience)? {
        Some(query) => Ok(repo.count_contacts(query)?),
        None => Ok(0),
    }
}

/// One page of the audience together with its total size.
pub fn preview_audience<R>(
    repo: &R,
    client_id: ClientId,
    audience: &Audience,
    page: usize,
) -> ServiceResult<AudiencePreview>
where
    R: ContactListReader + ContactReader + ?Sized,
{
    let (count, contacts) = match audience_query(repo, client_id, audience)? {
        Some(query) => repo.list_contacts(query.paginate(page, DEFAULT_ITEMS_PER_PAGE))?,
        None => (0, Vec::new()),
    };
    Ok(AudiencePreview {
        count,
        contacts: Paginated::new(contacts, count, page, DEFAULT_ITEMS_PER_PAGE),
    })
}
