use serde_json::json;

use crate::domain::activity_log::EntityType;
use crate::domain::client::Client;
use crate::domain::types::ClientId;
use crate::dto::clients::ClientsQuery;
use crate::forms::clients::ClientForm;
use crate::models::auth::AuthenticatedUser;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    ActivityLogWriter, ClientListQuery, ClientReader, ClientWriter, UserReader,
};
use crate::services::access::{
    current_user, page_or_first, record_activity, require_admin, require_client_access,
};
use crate::services::{ServiceError, ServiceResult};

/// Admins page through every client; client users see only their own.
pub fn list_clients<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    params: ClientsQuery,
) -> ServiceResult<Paginated<Client>>
where
    R: UserReader + ClientReader + ?Sized,
{
    let user = current_user(repo, auth)?;
    let page = page_or_first(params.page);

    if !user.is_admin() {
        let own: Vec<Client> = match user.client_id {
            Some(client_id) => repo.get_client_by_id(client_id)?.into_iter().collect(),
            None => Vec::new(),
        };
        let total = own.len();
        return Ok(Paginated::new(own, total, 1, DEFAULT_ITEMS_PER_PAGE));
    }

    let mut query = ClientListQuery::new().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(term) = params.search.filter(|s| !s.trim().is_empty()) {
        query = query.search(term);
    }
    let (total, clients) = repo.list_clients(query)?;

    Ok(Paginated::new(clients, total, page, DEFAULT_ITEMS_PER_PAGE))
}

pub fn get_client<R>(repo: &R, auth: &AuthenticatedUser, client_id: ClientId) -> ServiceResult<Client>
where
    R: UserReader + ClientReader + ?Sized,
{
    require_client_access(repo, auth, client_id)?;
    repo.get_client_by_id(client_id)?
        .ok_or(ServiceError::NotFound)
}

pub fn create_client<R>(repo: &R, auth: &AuthenticatedUser, form: &ClientForm) -> ServiceResult<Client>
where
    R: UserReader + ClientWriter + ActivityLogWriter + ?Sized,
{
    let user = require_admin(repo, auth)?;
    let new_client = form.to_new_client()?;

    let client = repo.create_client(&new_client).map_err(|err| {
        log::error!("Failed to create client: {err}");
        err
    })?;

    record_activity(
        repo,
        Some(&user),
        Some(client.id),
        "client.created",
        (EntityType::Client, Some(client.id.get())),
        json!({ "name": client.name }),
    );
    Ok(client)
}

pub fn update_client<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    form: &ClientForm,
) -> ServiceResult<Client>
where
    R: UserReader + ClientReader + ClientWriter + ActivityLogWriter + ?Sized,
{
    let user = require_admin(repo, auth)?;
    let updates = form.to_update_client()?;
    if repo.get_client_by_id(client_id)?.is_none() {
        return Err(ServiceError::NotFound);
    }

    let client = repo.update_client(client_id, &updates)?;

    record_activity(
        repo,
        Some(&user),
        Some(client_id),
        "client.updated",
        (EntityType::Client, Some(client_id.get())),
        json!({ "name": client.name }),
    );
    Ok(client)
}

/// Removes the client together with everything it owns.
pub fn delete_client<R>(repo: &R, auth: &AuthenticatedUser, client_id: ClientId) -> ServiceResult<()>
where
    R: UserReader + ClientWriter + ActivityLogWriter + ?Sized,
{
    let user = require_admin(repo, auth)?;
    repo.delete_client(client_id)?;

    // The client's own log entries went with it.
    record_activity(
        repo,
        Some(&user),
        None,
        "client.deleted",
        (EntityType::Client, Some(client_id.get())),
        json!({}),
    );
    Ok(())
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::types::{ClientName, EmailAddress};
    use crate::services::access::test_support::*;
    use chrono::Utc;

    fn client(id: i32) -> Client {
        let now = Utc::now().naive_utc();
        Client {
            id: ClientId::new(id).unwrap(),
            name: ClientName::new("Harbor Realty").unwrap(),
            email: EmailAddress::new("team@harbor.com").unwrap(),
            phone: None,
            company: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn client_user_lists_only_own_client() {
        let mut repo = repo_with_users();
        repo.expect_get_client_by_id()
            .returning(|id| Ok(Some(client(id.get()))));
        repo.expect_list_clients().never();

        let page = list_clients(&repo, &auth("agent"), ClientsQuery::default()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id.get(), 1);
    }

    #[test]
    fn admin_search_is_forwarded() {
        let mut repo = repo_with_users();
        repo.expect_list_clients()
            .withf(|q| q.search.as_deref() == Some("harbor"))
            .returning(|_| Ok((1, vec![client(3)])));

        let params = ClientsQuery {
            search: Some("harbor".into()),
            page: None,
        };
        let page = list_clients(&repo, &auth("admin"), params).unwrap();
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn client_users_cannot_create_clients() {
        let repo = repo_with_users();
        let form = ClientForm {
            name: "New".into(),
            email: "new@example.com".into(),
            phone: None,
            company: None,
        };
        assert!(matches!(
            create_client(&repo, &auth("agent"), &form),
            Err(ServiceError::Forbidden)
        ));
    }
}
