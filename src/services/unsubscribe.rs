//! Signed one-click unsubscribe links.
//!
//! Each recipient of a dispatch gets an HS256 token naming the contact, its
//! client and the campaign. The token is the only credential the public
//! unsubscribe endpoint accepts.

use chrono::{Duration, NaiveDateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::activity_log::EntityType;
use crate::domain::analytics::AnalyticsMetric;
use crate::domain::types::{CampaignId, ClientId, ContactId, ContactStatus};
use crate::dto::unsubscribe::UnsubscribeOutcome;
use crate::models::config::ServerConfig;
use crate::repository::{ActivityLogWriter, AnalyticsWriter, ContactReader, ContactWriter};
use crate::services::access::record_activity;
use crate::services::{ServiceError, ServiceResult};

const PURPOSE: &str = "unsubscribe";

#[derive(Debug, Serialize, Deserialize)]
struct UnsubscribeClaims {
    sub: i32,
    client_id: i32,
    #[serde(default)]
    campaign_id: Option<i32>,
    purpose: String,
    exp: i64,
}

/// Verified content of an unsubscribe token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsubscribeTarget {
    pub contact_id: ContactId,
    pub client_id: ClientId,
    pub campaign_id: Option<CampaignId>,
}

#[derive(Clone)]
pub struct UnsubscribeTokens {
    secret: String,
    base_url: String,
    ttl: Duration,
}

impl UnsubscribeTokens {
    pub fn new(secret: impl Into<String>, base_url: impl Into<String>, ttl_days: i64) -> Self {
        Self {
            secret: secret.into(),
            base_url: base_url.into(),
            ttl: Duration::days(ttl_days.max(1)),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            config.unsubscribe_secret.as_str(),
            config.unsubscribe_base_url.as_str(),
            config.unsubscribe_token_ttl_days,
        )
    }

    pub fn issue(&self, target: &UnsubscribeTarget, now: NaiveDateTime) -> ServiceResult<String> {
        let claims = UnsubscribeClaims {
            sub: target.contact_id.get(),
            client_id: target.client_id.get(),
            campaign_id: target.campaign_id.map(CampaignId::get),
            purpose: PURPOSE.to_string(),
            exp: (now + self.ttl).and_utc().timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|err| ServiceError::Internal(format!("cannot sign unsubscribe token: {err}")))
    }

    /// Public link embedding a freshly issued token.
    pub fn url(&self, target: &UnsubscribeTarget, now: NaiveDateTime) -> ServiceResult<String> {
        let token = self.issue(target, now)?;
        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        Ok(format!("{}{separator}token={token}", self.base_url))
    }

    pub fn verify(&self, token: &str) -> ServiceResult<UnsubscribeTarget> {
        let data = decode::<UnsubscribeClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|err| {
            log::warn!("Rejected unsubscribe token: {err}");
            ServiceError::InvalidToken
        })?;

        let claims = data.claims;
        if claims.purpose != PURPOSE {
            log::warn!("Rejected token issued for `{}`", claims.purpose);
            return Err(ServiceError::InvalidToken);
        }

        Ok(UnsubscribeTarget {
            contact_id: ContactId::new(claims.sub).map_err(|_| ServiceError::InvalidToken)?,
            client_id: ClientId::new(claims.client_id).map_err(|_| ServiceError::InvalidToken)?,
            campaign_id: claims
                .campaign_id
                .map(CampaignId::new)
                .transpose()
                .map_err(|_| ServiceError::InvalidToken)?,
        })
    }
}

/// Marks the contact behind `token` as unsubscribed.
///
/// Repeating the request is harmless: the counter and the activity entry
/// are only written on the first change.
pub fn unsubscribe<R>(
    repo: &R,
    tokens: &UnsubscribeTokens,
    token: &str,
) -> ServiceResult<UnsubscribeOutcome>
where
    R: ContactReader + ContactWriter + AnalyticsWriter + ActivityLogWriter + ?Sized,
{
    let target = tokens.verify(token)?;

    // The contact may have been deleted or moved since the link was sent.
    let contact = repo
        .get_contact_by_id(target.contact_id, target.client_id)?
        .ok_or(ServiceError::InvalidToken)?;

    if contact.status == ContactStatus::Unsubscribed {
        return Ok(UnsubscribeOutcome {
            contact_id: contact.id,
            campaign_id: target.campaign_id,
            changed: false,
        });
    }

    let now = Utc::now().naive_utc();
    repo.set_contact_status(contact.id, ContactStatus::Unsubscribed, now)
        .map_err(|err| {
            log::error!("Failed to unsubscribe contact {}: {err}", contact.id);
            err
        })?;

    if let Some(campaign_id) = target.campaign_id
        && let Err(err) = repo.increment_metric(campaign_id, AnalyticsMetric::Unsubscribed)
    {
        log::error!("Failed to count unsubscribe for campaign {campaign_id}: {err}");
    }

    record_activity(
        repo,
        None,
        Some(target.client_id),
        "contact.unsubscribed",
        (EntityType::Contact, Some(contact.id.get())),
        json!({ "campaign_id": target.campaign_id }),
    );

    Ok(UnsubscribeOutcome {
        contact_id: contact.id,
        campaign_id: target.campaign_id,
        changed: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> UnsubscribeTokens {
        UnsubscribeTokens::new("unsub-secret", "https://mail.example.com/unsubscribe", 30)
    }

    fn target() -> UnsubscribeTarget {
        UnsubscribeTarget {
            contact_id: ContactId::new(11).unwrap(),
            client_id: ClientId::new(1).unwrap(),
            campaign_id: Some(CampaignId::new(3).unwrap()),
        }
    }

    fn now() -> NaiveDateTime {
        Utc::now().naive_utc()
    }

    #[test]
    fn issued_tokens_verify() {
        let token = tokens().issue(&target(), now()).unwrap();
        assert_eq!(tokens().verify(&token).unwrap(), target());
    }

    #[test]
    fn url_carries_the_token() {
        let url = tokens().url(&target(), now()).unwrap();
        assert!(url.starts_with("https://mail.example.com/unsubscribe?token="));
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let token = tokens().issue(&target(), now()).unwrap();
        let other = UnsubscribeTokens::new("another-secret", "https://x", 30);
        assert!(matches!(
            other.verify(&token),
            Err(ServiceError::InvalidToken)
        ));

        let (head, signature) = token.rsplit_once('.').unwrap();
        let flipped = if signature.starts_with('A') { 'B' } else { 'A' };
        let tampered = format!("{head}.{flipped}{}", &signature[1..]);
        assert!(matches!(
            tokens().verify(&tampered),
            Err(ServiceError::InvalidToken)
        ));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let issued = now() - Duration::days(31);
        let token = tokens().issue(&target(), issued).unwrap();
        assert!(matches!(
            tokens().verify(&token),
            Err(ServiceError::InvalidToken)
        ));
    }

    #[test]
    fn tokens_for_other_purposes_are_rejected() {
        let claims = UnsubscribeClaims {
            sub: 11,
            client_id: 1,
            campaign_id: None,
            purpose: "login".into(),
            exp: (now() + Duration::days(1)).and_utc().timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"unsub-secret"),
        )
        .unwrap();
        assert!(matches!(
            tokens().verify(&token),
            Err(ServiceError::InvalidToken)
        ));
    }

    #[cfg(feature = "test-mocks")]
    mod service {
        use super::*;
        use crate::repository::mock::MockRepository;
        use crate::services::access::test_support::contact;

        #[test]
        fn first_unsubscribe_changes_status_and_counts() {
            let mut repo = MockRepository::new();
            repo.expect_get_contact_by_id()
                .returning(|id, _| Ok(Some(contact(id.get(), "ann@example.com"))));
            repo.expect_set_contact_status()
                .withf(|_, status, _| *status == ContactStatus::Unsubscribed)
                .times(1)
                .returning(|id, status, at| {
                    let mut c = contact(id.get(), "ann@example.com");
                    c.status = status;
                    c.unsubscribed_at = Some(at);
                    Ok(c)
                });
            repo.expect_increment_metric()
                .withf(|id, metric| id.get() == 3 && *metric == AnalyticsMetric::Unsubscribed)
                .times(1)
                .returning(|_, _| Ok(()));
            repo.expect_create_activity_log()
                .times(1)
                .returning(|_| Err(crate::repository::errors::RepositoryError::NotFound));

            let token = tokens().issue(&target(), now()).unwrap();
            let outcome = unsubscribe(&repo, &tokens(), &token).unwrap();
            assert!(outcome.changed);
        }

        #[test]
        fn repeated_unsubscribe_is_a_no_op() {
            let mut repo = MockRepository::new();
            repo.expect_get_contact_by_id().returning(|id, _| {
                let mut c = contact(id.get(), "ann@example.com");
                c.status = ContactStatus::Unsubscribed;
                Ok(Some(c))
            });
            repo.expect_set_contact_status().never();
            repo.expect_increment_metric().never();

            let token = tokens().issue(&target(), now()).unwrap();
            let outcome = unsubscribe(&repo, &tokens(), &token).unwrap();
            assert!(!outcome.changed);
        }

        #[test]
        fn token_for_a_deleted_contact_is_rejected() {
            let mut repo = MockRepository::new();
            repo.expect_get_contact_by_id().returning(|_, _| Ok(None));

            let token = tokens().issue(&target(), now()).unwrap();
            assert!(matches!(
                unsubscribe(&repo, &tokens(), &token),
                Err(ServiceError::InvalidToken)
            ));
        }
    }
}
