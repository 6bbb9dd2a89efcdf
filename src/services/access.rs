//! Authorization helpers shared by the services.

use serde_json::Value;

use crate::domain::activity_log::{EntityType, NewActivityLog};
use crate::domain::types::ClientId;
use crate::domain::user::User;
use crate::models::auth::AuthenticatedUser;
use crate::repository::{ActivityLogWriter, UserReader};
use crate::services::{ServiceError, ServiceResult};

/// Loads the provisioned user behind a verified token.
pub fn current_user<R>(repo: &R, auth: &AuthenticatedUser) -> ServiceResult<User>
where
    R: UserReader + ?Sized,
{
    match repo.get_user(&auth.id)? {
        Some(user) => Ok(user),
        None => {
            log::warn!("Valid token for unprovisioned user {}", auth.id);
            Err(ServiceError::Forbidden)
        }
    }
}

pub fn require_admin<R>(repo: &R, auth: &AuthenticatedUser) -> ServiceResult<User>
where
    R: UserReader + ?Sized,
{
    let user = current_user(repo, auth)?;
    if !user.is_admin() {
        return Err(ServiceError::Forbidden);
    }
    Ok(user)
}

/// Admins, or the client user bound to `client_id`.
pub fn require_client_access<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
) -> ServiceResult<User>
where
    R: UserReader + ?Sized,
{
    let user = current_user(repo, auth)?;
    if !user.can_access(client_id) {
        return Err(ServiceError::Forbidden);
    }
    Ok(user)
}

/// Writes an activity log entry. Failures are logged, never returned.
pub fn record_activity<R>(
    repo: &R,
    user: Option<&User>,
    client_id: Option<ClientId>,
    action: &str,
    entity: (EntityType, Option<i32>),
    details: Value,
) where
    R: ActivityLogWriter + ?Sized,
{
    let (entity_type, entity_id) = entity;
    let entry = NewActivityLog::new(
        client_id,
        user.map(|u| u.id.clone()),
        action,
        entity_type,
        entity_id,
        details,
    );
    if let Err(err) = repo.create_activity_log(&entry) {
        log::error!("Failed to record activity `{action}`: {err}");
    }
}

pub(crate) fn page_or_first(page: Option<usize>) -> usize {
    page.unwrap_or(1).max(1)
}

#[cfg(all(test, feature = "test-mocks"))]
pub(crate) mod test_support {
    //! Fixtures shared by the service tests.

    use chrono::Utc;

    use crate::domain::contact::Contact;
    use crate::domain::types::{
        ClientId, ContactId, ContactStatus, EmailAddress, Tags, UserId, UserRole,
    };
    use crate::domain::user::User;
    use crate::models::auth::AuthenticatedUser;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;

    pub fn auth(id: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            id: UserId::new(id).unwrap(),
            email: None,
        }
    }

    pub fn user(id: &str, role: UserRole, client_id: Option<i32>) -> User {
        let now = Utc::now().naive_utc();
        User {
            id: UserId::new(id).unwrap(),
            email: EmailAddress::new(format!("{}@example.com", id.replace('|', "_"))).unwrap(),
            name: id.to_string(),
            role,
            client_id: client_id.map(|id| ClientId::new(id).unwrap()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Active contact of client 1.
    pub fn contact(id: i32, email: &str) -> Contact {
        let now = Utc::now().naive_utc();
        Contact {
            id: ContactId::new(id).unwrap(),
            client_id: ClientId::new(1).unwrap(),
            email: EmailAddress::new(email).unwrap(),
            first_name: String::new(),
            last_name: String::new(),
            phone: None,
            city: String::new(),
            source: String::new(),
            tags: Tags::default(),
            notes: String::new(),
            status: ContactStatus::Active,
            unsubscribed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mock that resolves `admin` to an admin and `agent` to a client user
    /// of client 1.
    pub fn repo_with_users() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.expect_get_user().returning(|id| {
            Ok(match id.as_str() {
                "admin" => Some(user("admin", UserRole::Admin, None)),
                "agent" => Some(user("agent", UserRole::Client, Some(1))),
                _ => None,
            })
        });
        repo.expect_create_activity_log()
            .returning(|_| Err(RepositoryError::DatabaseError("log table offline".into())));
        repo
    }
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn unknown_users_are_forbidden() {
        let repo = repo_with_users();
        assert!(matches!(
            current_user(&repo, &auth("stranger")),
            Err(ServiceError::Forbidden)
        ));
    }

    #[test]
    fn client_users_only_reach_their_client() {
        let repo = repo_with_users();
        let own = ClientId::new(1).unwrap();
        let other = ClientId::new(2).unwrap();
        assert!(require_client_access(&repo, &auth("agent"), own).is_ok());
        assert!(matches!(
            require_client_access(&repo, &auth("agent"), other),
            Err(ServiceError::Forbidden)
        ));
        assert!(require_client_access(&repo, &auth("admin"), other).is_ok());
        assert!(matches!(
            require_admin(&repo, &auth("agent")),
            Err(ServiceError::Forbidden)
        ));
    }

    #[test]
    fn activity_failures_do_not_propagate() {
        let repo = repo_with_users();
        record_activity(
            &repo,
            None,
            None,
            "contact.created",
            (EntityType::Contact, Some(1)),
            Value::Null,
        );
    }
}
