//! Current user lookup and provisioning from the auth provider's webhook.

use serde_json::json;

use crate::domain::activity_log::EntityType;
use crate::domain::types::UserRole;
use crate::domain::user::User;
use crate::forms::webhook::{AuthWebhookEvent, WebhookEventType};
use crate::models::auth::AuthenticatedUser;
use crate::repository::{ActivityLogWriter, ClientReader, UserReader, UserWriter};
use crate::services::access::{current_user, record_activity};
use crate::services::{ServiceError, ServiceResult};

pub fn me<R>(repo: &R, auth: &AuthenticatedUser) -> ServiceResult<User>
where
    R: UserReader + ?Sized,
{
    current_user(repo, auth)
}

/// Compares secrets without short-circuiting on the first differing byte.
fn secrets_match(expected: &str, provided: &str) -> bool {
    let (a, b) = (expected.as_bytes(), provided.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Applies a provisioning event once its shared secret checks out.
///
/// Returns the stored user for create/update events and `None` for deletes.
pub fn handle_webhook<R>(
    repo: &R,
    expected_secret: &str,
    provided_secret: Option<&str>,
    event: &AuthWebhookEvent,
) -> ServiceResult<Option<User>>
where
    R: ClientReader + UserWriter + ActivityLogWriter + ?Sized,
{
    match provided_secret {
        Some(secret) if secrets_match(expected_secret, secret) => {}
        _ => {
            log::warn!("Rejected auth webhook with a missing or wrong secret");
            return Err(ServiceError::Unauthorized);
        }
    }

    match event.event {
        WebhookEventType::UserCreated | WebhookEventType::UserUpdated => {
            let new_user = event.data.to_new_user()?;
            if new_user.role == UserRole::Client
                && let Some(client_id) = new_user.client_id
                && repo.get_client_by_id(client_id)?.is_none()
            {
                return Err(ServiceError::Form(format!(
                    "client {client_id} does not exist"
                )));
            }

            let user = repo.upsert_user(&new_user).map_err(|err| {
                log::error!("Failed to provision user {}: {err}", new_user.id);
                err
            })?;
            log::info!("Provisioned user {} as {}", user.id, user.role);

            record_activity(
                repo,
                None,
                user.client_id,
                "user.provisioned",
                (EntityType::User, None),
                json!({ "user_id": user.id, "role": user.role }),
            );
            Ok(Some(user))
        }
        WebhookEventType::UserDeleted => {
            let user_id = event.data.user_id()?;
            repo.delete_user(&user_id)?;
            log::info!("Removed user {user_id}");

            record_activity(
                repo,
                None,
                None,
                "user.deleted",
                (EntityType::User, None),
                json!({ "user_id": user_id }),
            );
            Ok(None)
        }
    }
}
