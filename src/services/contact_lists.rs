use serde_json::json;

use crate::domain::activity_log::EntityType;
use crate::domain::contact::Contact;
use crate::domain::contact_list::ContactList;
use crate::domain::filter::FilterCriteria;
use crate::domain::types::{ClientId, ContactListId, ContactStatus};
use crate::dto::campaigns::AudiencePreview;
use crate::dto::contact_lists::ContactListView;
use crate::forms::FormError;
use crate::forms::contact_lists::ContactListForm;
use crate::models::auth::AuthenticatedUser;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    ActivityLogWriter, CampaignReader, ContactListReader, ContactListWriter, ContactQuery,
    ContactReader, UserReader,
};
use crate::services::access::{record_activity, require_admin, require_client_access};
use crate::services::{ServiceError, ServiceResult};

fn view<R>(repo: &R, list: ContactList) -> ServiceResult<ContactListView>
where
    R: ContactReader + ?Sized,
{
    let query = ContactQuery::new(list.client_id).criteria(list.criteria.clone());
    let contact_count = repo.count_contacts(query.clone())?;
    let active_count = repo.count_contacts(query.status(ContactStatus::Active))?;
    Ok(ContactListView {
        list,
        contact_count,
        active_count,
    })
}

fn find_list<R>(repo: &R, client_id: ClientId, list_id: ContactListId) -> ServiceResult<ContactList>
where
    R: ContactListReader + ?Sized,
{
    repo.get_contact_list(list_id, client_id)?
        .ok_or(ServiceError::NotFound)
}

pub fn list_contact_lists<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
) -> ServiceResult<Vec<ContactListView>>
where
    R: UserReader + ContactListReader + ContactReader + ?Sized,
{
    require_client_access(repo, auth, client_id)?;
    repo.list_contact_lists(client_id)?
        .into_iter()
        .map(|list| view(repo, list))
        .collect()
}

pub fn get_contact_list<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    list_id: ContactListId,
) -> ServiceResult<ContactListView>
where
    R: UserReader + ContactListReader + ContactReader + ?Sized,
{
    require_client_access(repo, auth, client_id)?;
    let list = find_list(repo, client_id, list_id)?;
    view(repo, list)
}

pub fn create_contact_list<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    form: &ContactListForm,
) -> ServiceResult<ContactListView>
where
    R: UserReader + ContactListWriter + ContactReader + ActivityLogWriter + ?Sized,
{
    let user = require_admin(repo, auth)?;
    let new_list = form.to_new_list(client_id)?;

    let list = repo.create_contact_list(&new_list).map_err(|err| {
        log::error!("Failed to create contact list: {err}");
        err
    })?;

    record_activity(
        repo,
        Some(&user),
        Some(client_id),
        "list.created",
        (EntityType::ContactList, Some(list.id.get())),
        json!({ "name": list.name, "conditions": list.criteria.conditions.len() }),
    );
    view(repo, list)
}

pub fn update_contact_list<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    list_id: ContactListId,
    form: &ContactListForm,
) -> ServiceResult<ContactListView>
where
    R: UserReader
        + ContactListReader
        + ContactListWriter
        + ContactReader
        + ActivityLogWriter
        + ?Sized,
{
    let user = require_admin(repo, auth)?;
    find_list(repo, client_id, list_id)?;
    let updates = form.to_update_list(client_id)?;

    let list = repo.update_contact_list(list_id, &updates)?;

    record_activity(
        repo,
        Some(&user),
        Some(client_id),
        "list.updated",
        (EntityType::ContactList, Some(list_id.get())),
        json!({ "name": list.name }),
    );
    view(repo, list)
}

/// Lists still used by an unfinished campaign cannot be deleted.
pub fn delete_contact_list<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    list_id: ContactListId,
) -> ServiceResult<()>
where
    R: UserReader
        + ContactListReader
        + ContactListWriter
        + CampaignReader
        + ActivityLogWriter
        + ?Sized,
{
    let user = require_admin(repo, auth)?;
    find_list(repo, client_id, list_id)?;

    let open = repo.count_open_campaigns_for_list(list_id)?;
    if open > 0 {
        return Err(ServiceError::Conflict(format!(
            "list is used by {open} campaign(s) that have not finished"
        )));
    }

    repo.delete_contact_list(list_id)?;

    record_activity(
        repo,
        Some(&user),
        Some(client_id),
        "list.deleted",
        (EntityType::ContactList, Some(list_id.get())),
        json!({}),
    );
    Ok(())
}

/// Evaluates unsaved criteria against the client's active contacts.
pub fn preview_criteria<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    criteria: FilterCriteria,
    page: usize,
) -> ServiceResult<AudiencePreview>
where
    R: UserReader + ContactReader + ?Sized,
{
    require_client_access(repo, auth, client_id)?;
    criteria.validate().map_err(FormError::from)?;

    let query = ContactQuery::new(client_id)
        .status(ContactStatus::Active)
        .criteria(criteria)
        .paginate(page, DEFAULT_ITEMS_PER_PAGE);
    let (count, contacts) = repo.list_contacts(query)?;

    Ok(AudiencePreview {
        count,
        contacts: Paginated::new(contacts, count, page, DEFAULT_ITEMS_PER_PAGE),
    })
}

/// Every contact matched by the list, whatever its status.
pub fn list_members<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    list_id: ContactListId,
    page: usize,
) -> ServiceResult<Paginated<Contact>>
where
    R: UserReader + ContactListReader + ContactReader + ?Sized,
{
    require_client_access(repo, auth, client_id)?;
    let list = find_list(repo, client_id, list_id)?;

    let query = ContactQuery::new(client_id)
        .criteria(list.criteria)
        .paginate(page, DEFAULT_ITEMS_PER_PAGE);
    let (total, contacts) = repo.list_contacts(query)?;

    Ok(Paginated::new(contacts, total, page, DEFAULT_ITEMS_PER_PAGE))
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::filter::{FilterCondition, FilterField, FilterLogic, FilterOperator};
    use crate::domain::types::ListName;
    use crate::services::access::test_support::*;
    use chrono::Utc;

    fn client_one() -> ClientId {
        ClientId::new(1).unwrap()
    }

    fn list(id: i32) -> ContactList {
        let now = Utc::now().naive_utc();
        ContactList {
            id: ContactListId::new(id).unwrap(),
            client_id: client_one(),
            name: ListName::new("Buyers").unwrap(),
            description: String::new(),
            criteria: FilterCriteria::new(
                FilterLogic::And,
                vec![FilterCondition::new(
                    FilterField::Tags,
                    FilterOperator::Contains,
                    "buyer",
                )],
            ),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn list_in_use_cannot_be_deleted() {
        let mut repo = repo_with_users();
        repo.expect_get_contact_list()
            .returning(|id, _| Ok(Some(list(id.get()))));
        repo.expect_count_open_campaigns_for_list()
            .returning(|_| Ok(2));
        repo.expect_delete_contact_list().never();

        let result = delete_contact_list(
            &repo,
            &auth("admin"),
            client_one(),
            ContactListId::new(5).unwrap(),
        );
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn unused_list_is_deleted() {
        let mut repo = repo_with_users();
        repo.expect_get_contact_list()
            .returning(|id, _| Ok(Some(list(id.get()))));
        repo.expect_count_open_campaigns_for_list()
            .returning(|_| Ok(0));
        repo.expect_delete_contact_list()
            .times(1)
            .returning(|_| Ok(()));

        delete_contact_list(
            &repo,
            &auth("admin"),
            client_one(),
            ContactListId::new(5).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn views_carry_total_and_active_counts() {
        let mut repo = repo_with_users();
        repo.expect_get_contact_list()
            .returning(|id, _| Ok(Some(list(id.get()))));
        repo.expect_count_contacts()
            .returning(|q| Ok(if q.status.is_some() { 3 } else { 5 }));

        let view = get_contact_list(
            &repo,
            &auth("agent"),
            client_one(),
            ContactListId::new(5).unwrap(),
        )
        .unwrap();
        assert_eq!((view.contact_count, view.active_count), (5, 3));
    }

    #[test]
    fn preview_rejects_invalid_criteria() {
        let repo = repo_with_users();
        let criteria = FilterCriteria::new(
            FilterLogic::Or,
            vec![FilterCondition::new(
                FilterField::City,
                FilterOperator::StartsWith,
                "  ",
            )],
        );
        let result = preview_criteria(&repo, &auth("admin"), client_one(), criteria, 1);
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }
}
