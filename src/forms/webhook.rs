//! Account events pushed by the hosted auth provider.

use serde::Deserialize;

use crate::domain::types::{ClientId, EmailAddress, UserId, UserRole};
use crate::domain::user::NewUser;
use crate::forms::FormError;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum WebhookEventType {
    #[serde(rename = "user.created")]
    UserCreated,
    #[serde(rename = "user.updated")]
    UserUpdated,
    #[serde(rename = "user.deleted")]
    UserDeleted,
}

#[derive(Debug, Deserialize)]
pub struct WebhookUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub client_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct AuthWebhookEvent {
    #[serde(rename = "type")]
    pub event: WebhookEventType,
    pub data: WebhookUser,
}

impl WebhookUser {
    pub fn user_id(&self) -> Result<UserId, FormError> {
        Ok(UserId::new(self.id.as_str())?)
    }

    pub fn to_new_user(&self) -> Result<NewUser, FormError> {
        let email = self
            .email
            .as_deref()
            .ok_or_else(|| FormError::Invalid("email is required".to_string()))?;
        let role = self
            .role
            .ok_or_else(|| FormError::Invalid("role is required".to_string()))?;
        let client_id = self.client_id.map(ClientId::new).transpose()?;
        if role == UserRole::Client && client_id.is_none() {
            return Err(FormError::Invalid(
                "client users need a client_id".to_string(),
            ));
        }
        Ok(NewUser::new(
            self.user_id()?,
            EmailAddress::new(email)?,
            self.name.as_deref().unwrap_or_default(),
            role,
            client_id,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_payload() {
        let event: AuthWebhookEvent = serde_json::from_str(
            r#"{"type":"user.created","data":{"id":"u_1","email":"Agent@Example.com",
                "name":"Agent","role":"client","client_id":3}}"#,
        )
        .unwrap();
        assert_eq!(event.event, WebhookEventType::UserCreated);
        let user = event.data.to_new_user().unwrap();
        assert_eq!(user.client_id, ClientId::new(3).ok());
        assert_eq!(user.email.as_str(), "agent@example.com");
    }

    #[test]
    fn client_role_requires_client_id() {
        let data = WebhookUser {
            id: "u_2".into(),
            email: Some("a@b.com".into()),
            name: None,
            role: Some(UserRole::Client),
            client_id: None,
        };
        assert!(matches!(data.to_new_user(), Err(FormError::Invalid(_))));
    }
}
