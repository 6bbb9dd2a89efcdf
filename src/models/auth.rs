//! Bearer-token authentication for API requests.
//!
//! Access tokens are HS256 JWTs issued by the hosted auth provider. Only the
//! subject is trusted from the token; the role and client binding come from
//! the provisioned `users` row.

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, web};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::domain::types::UserId;
use crate::models::config::ServerConfig;
use crate::services::ServiceError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: u64,
}

/// Identity proven by a valid access token.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub email: Option<String>,
}

/// Verifies an access token signed with `secret`.
pub fn decode_access_token(token: &str, secret: &str) -> Result<AuthenticatedUser, ServiceError> {
    let data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|err| {
        log::debug!("Rejected access token: {err}");
        ServiceError::Unauthorized
    })?;

    let id = UserId::new(data.claims.sub).map_err(|_| ServiceError::Unauthorized)?;
    Ok(AuthenticatedUser {
        id,
        email: data.claims.email,
    })
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ServiceError> {
    let config = req
        .app_data::<web::Data<ServerConfig>>()
        .ok_or_else(|| ServiceError::Internal("server config is not registered".to_string()))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(ServiceError::Unauthorized)?;

    decode_access_token(token, &config.jwt_secret)
}

impl FromRequest for AuthenticatedUser {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn token(secret: &str, exp: u64) -> String {
        let claims = AccessClaims {
            sub: "auth0|42".into(),
            email: Some("agent@example.com".into()),
            exp,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn in_one_hour() -> u64 {
        (chrono::Utc::now().timestamp() + 3600) as u64
    }

    #[test]
    fn accepts_valid_token() {
        let user = decode_access_token(&token("s3cret", in_one_hour()), "s3cret").unwrap();
        assert_eq!(user.id.as_str(), "auth0|42");
    }

    #[test]
    fn rejects_wrong_secret_and_expired_tokens() {
        assert!(matches!(
            decode_access_token(&token("other", in_one_hour()), "s3cret"),
            Err(ServiceError::Unauthorized)
        ));
        assert!(matches!(
            decode_access_token(&token("s3cret", 1_000), "s3cret"),
            Err(ServiceError::Unauthorized)
        ));
    }
}
