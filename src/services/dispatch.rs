//! Hand-off of a campaign to the emailer.

use chrono::NaiveDateTime;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::campaign::{Campaign, CampaignAction, CampaignStatusChange};
use crate::domain::types::CampaignStatus;
use crate::models::zmq::{CampaignDispatch, DispatchRecipient};
use crate::repository::{AnalyticsWriter, CampaignWriter, ContactListReader, ContactReader};
use crate::services::audience::resolve_audience;
use crate::services::unsubscribe::{UnsubscribeTarget, UnsubscribeTokens};
use crate::services::{ServiceError, ServiceResult};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct DispatchError(pub String);

/// Transport delivering campaign messages to the emailer.
#[cfg_attr(feature = "test-mocks", mockall::automock)]
pub trait EmailDispatcher: Send + Sync {
    fn dispatch(&self, message: &CampaignDispatch) -> Result<(), DispatchError>;
}

fn build_dispatch(
    campaign: &Campaign,
    recipients: Vec<DispatchRecipient>,
) -> CampaignDispatch {
    CampaignDispatch {
        dispatch_id: Uuid::new_v4(),
        campaign_id: campaign.id.get(),
        client_id: campaign.client_id.get(),
        from_name: campaign.from_name.to_string(),
        from_email: campaign.from_email.to_string(),
        reply_to: campaign.reply_to.as_ref().map(ToString::to_string),
        subject: campaign.subject.clone(),
        preview_text: campaign.preview_text.clone(),
        html: campaign.html_content.clone(),
        recipients,
    }
}

/// Resolves the audience, moves the campaign to `sending` and publishes it.
///
/// Shared by the send endpoint and the scheduled dispatcher. When the
/// publish fails the campaign ends up `failed`.
pub fn send_campaign<R, D>(
    repo: &R,
    dispatcher: &D,
    tokens: &UnsubscribeTokens,
    campaign: &Campaign,
    now: NaiveDateTime,
) -> ServiceResult<Campaign>
where
    R: ContactReader + ContactListReader + CampaignWriter + AnalyticsWriter + ?Sized,
    D: EmailDispatcher + ?Sized,
{
    campaign.status.transition(CampaignAction::Send)?;

    let contacts = resolve_audience(repo, campaign.client_id, &campaign.audience)?;
    if contacts.is_empty() {
        return Err(ServiceError::Conflict(
            "campaign audience has no active contacts".to_string(),
        ));
    }

    let recipients = contacts
        .iter()
        .map(|contact| {
            let target = UnsubscribeTarget {
                contact_id: contact.id,
                client_id: campaign.client_id,
                campaign_id: Some(campaign.id),
            };
            Ok(DispatchRecipient {
                contact_id: contact.id.get(),
                email: contact.email.to_string(),
                name: contact.display_name(),
                unsubscribe_url: tokens.url(&target, now)?,
            })
        })
        .collect::<ServiceResult<Vec<_>>>()?;
    let message = build_dispatch(campaign, recipients);

    let total = i32::try_from(message.recipients.len()).unwrap_or(i32::MAX);
    repo.start_campaign_analytics(campaign.id, total)?;

    let change = CampaignStatusChange::from_campaign(campaign, CampaignStatus::Sending);
    let sending = repo
        .transition_campaign(campaign.id, campaign.status, &change)?
        .ok_or_else(|| {
            ServiceError::Conflict("campaign status changed while sending".to_string())
        })?;

    if let Err(err) = dispatcher.dispatch(&message) {
        log::error!("Failed to dispatch campaign {}: {err}", campaign.id);
        let failed = CampaignStatusChange::from_campaign(&sending, CampaignStatus::Failed);
        if let Err(mark_err) =
            repo.transition_campaign(sending.id, CampaignStatus::Sending, &failed)
        {
            log::error!("Failed to mark campaign {} failed: {mark_err}", sending.id);
        }
        return Err(ServiceError::Dispatch(err.to_string()));
    }

    log::info!(
        "Dispatched campaign {} to {} recipients",
        campaign.id,
        message.recipients.len()
    );
    Ok(sending)
}

#[cfg(all(test, feature = "test-mocks"))]
pub(crate) mod tests {
    use super::*;
    use crate::domain::analytics::{AnalyticsCounters, CampaignAnalytics};
    use crate::domain::campaign::Audience;
    use crate::domain::types::{
        CampaignId, CampaignName, ClientId, EmailAddress, SenderName, UserId,
    };
    use crate::repository::mock::MockRepository;
    use crate::services::access::test_support::contact;
    use chrono::Utc;

    pub(crate) fn campaign(id: i32, status: CampaignStatus) -> Campaign {
        let now = Utc::now().naive_utc();
        Campaign {
            id: CampaignId::new(id).unwrap(),
            client_id: ClientId::new(1).unwrap(),
            template_id: None,
            name: CampaignName::new("Spring listings").unwrap(),
            subject: "New homes this week".into(),
            preview_text: String::new(),
            from_name: SenderName::new("Harbor Realty").unwrap(),
            from_email: EmailAddress::new("news@harbor.com").unwrap(),
            reply_to: None,
            html_content: "<p>Hello</p>".into(),
            design_json: None,
            status,
            audience: Audience::All,
            scheduled_at: None,
            approved_at: Some(now),
            sent_at: None,
            created_by: UserId::new("admin").unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn tokens() -> UnsubscribeTokens {
        UnsubscribeTokens::new("unsub", "https://mail.example.com/unsubscribe", 30)
    }

    fn analytics(id: CampaignId, total: i32) -> CampaignAnalytics {
        CampaignAnalytics {
            campaign_id: id,
            counters: AnalyticsCounters {
                total_recipients: total,
                ..AnalyticsCounters::default()
            },
            updated_at: Utc::now().naive_utc(),
        }
    }

    fn repo_with_audience() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.expect_list_contacts().returning(|_| {
            Ok((
                2,
                vec![contact(1, "ann@example.com"), contact(2, "bob@example.com")],
            ))
        });
        repo.expect_start_campaign_analytics()
            .withf(|_, total| *total == 2)
            .returning(|id, total| Ok(analytics(id, total)));
        repo
    }

    #[test]
    fn approved_campaign_is_published() {
        let mut repo = repo_with_audience();
        repo.expect_transition_campaign()
            .withf(|_, from, change| {
                *from == CampaignStatus::Approved && change.status == CampaignStatus::Sending
            })
            .times(1)
            .returning(|id, _, change| Ok(Some(campaign(id.get(), change.status))));

        let mut dispatcher = MockEmailDispatcher::new();
        dispatcher
            .expect_dispatch()
            .withf(|msg| {
                msg.recipients.len() == 2
                    && msg.recipients[0].unsubscribe_url.contains("token=")
            })
            .times(1)
            .returning(|_| Ok(()));

        let sent = send_campaign(
            &repo,
            &dispatcher,
            &tokens(),
            &campaign(5, CampaignStatus::Approved),
            Utc::now().naive_utc(),
        )
        .unwrap();
        assert_eq!(sent.status, CampaignStatus::Sending);
    }

    #[test]
    fn publish_failure_marks_campaign_failed() {
        let mut repo = repo_with_audience();
        repo.expect_transition_campaign()
            .withf(|_, from, _| *from == CampaignStatus::Scheduled)
            .times(1)
            .returning(|id, _, change| Ok(Some(campaign(id.get(), change.status))));
        repo.expect_transition_campaign()
            .withf(|_, from, change| {
                *from == CampaignStatus::Sending && change.status == CampaignStatus::Failed
            })
            .times(1)
            .returning(|id, _, change| Ok(Some(campaign(id.get(), change.status))));

        let mut dispatcher = MockEmailDispatcher::new();
        dispatcher
            .expect_dispatch()
            .returning(|_| Err(DispatchError("socket closed".into())));

        let result = send_campaign(
            &repo,
            &dispatcher,
            &tokens(),
            &campaign(5, CampaignStatus::Scheduled),
            Utc::now().naive_utc(),
        );
        assert!(matches!(result, Err(ServiceError::Dispatch(_))));
    }

    #[test]
    fn empty_audience_is_a_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_list_contacts().returning(|_| Ok((0, vec![])));
        repo.expect_transition_campaign().never();
        let dispatcher = MockEmailDispatcher::new();

        let result = send_campaign(
            &repo,
            &dispatcher,
            &tokens(),
            &campaign(5, CampaignStatus::Approved),
            Utc::now().naive_utc(),
        );
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn drafts_cannot_be_sent() {
        let repo = MockRepository::new();
        let dispatcher = MockEmailDispatcher::new();
        let result = send_campaign(
            &repo,
            &dispatcher,
            &tokens(),
            &campaign(5, CampaignStatus::Draft),
            Utc::now().naive_utc(),
        );
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }
}
