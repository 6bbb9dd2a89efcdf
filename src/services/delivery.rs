//! Handling of delivery events reported by the emailer and of scheduled
//! sends. Both run in the `email_events` worker.

use chrono::{NaiveDateTime, Utc};
use serde_json::json;

use crate::domain::activity_log::EntityType;
use crate::domain::analytics::AnalyticsMetric;
use crate::domain::campaign::{Campaign, CampaignStatusChange};
use crate::domain::types::{CampaignId, CampaignStatus, ContactId, ContactStatus};
use crate::models::zmq::{DeliveryEvent, DeliveryEventKind};
use crate::repository::{
    ActivityLogWriter, AnalyticsWriter, CampaignReader, CampaignWriter, ContactListReader,
    ContactReader, ContactWriter,
};
use crate::services::ServiceResult;
use crate::services::access::record_activity;
use crate::services::dispatch::{EmailDispatcher, send_campaign};
use crate::services::unsubscribe::UnsubscribeTokens;

fn metric_for(kind: DeliveryEventKind) -> Option<AnalyticsMetric> {
    match kind {
        DeliveryEventKind::Delivered => Some(AnalyticsMetric::Delivered),
        DeliveryEventKind::Opened => Some(AnalyticsMetric::Opened),
        DeliveryEventKind::Clicked => Some(AnalyticsMetric::Clicked),
        DeliveryEventKind::Bounced => Some(AnalyticsMetric::Bounced),
        DeliveryEventKind::Complained => Some(AnalyticsMetric::Complained),
        DeliveryEventKind::Unsubscribed => Some(AnalyticsMetric::Unsubscribed),
        DeliveryEventKind::Completed | DeliveryEventKind::Failed => None,
    }
}

/// Contact status implied by an event, if any.
fn contact_status_for(kind: DeliveryEventKind) -> Option<ContactStatus> {
    match kind {
        DeliveryEventKind::Bounced => Some(ContactStatus::Bounced),
        DeliveryEventKind::Complained => Some(ContactStatus::Complained),
        DeliveryEventKind::Unsubscribed => Some(ContactStatus::Unsubscribed),
        _ => None,
    }
}

fn finish_campaign<R>(
    repo: &R,
    campaign: &Campaign,
    status: CampaignStatus,
    at: NaiveDateTime,
) -> ServiceResult<()>
where
    R: CampaignWriter + ?Sized,
{
    if campaign.status != CampaignStatus::Sending {
        log::warn!(
            "Ignoring `{status}` for campaign {} in status {}",
            campaign.id,
            campaign.status
        );
        return Ok(());
    }

    let mut change = CampaignStatusChange::from_campaign(campaign, status);
    if status == CampaignStatus::Sent {
        change.sent_at = Some(at);
    }
    match repo.transition_campaign(campaign.id, CampaignStatus::Sending, &change)? {
        Some(_) => log::info!("Campaign {} is now {status}", campaign.id),
        None => log::warn!("Campaign {} left `sending` concurrently", campaign.id),
    }
    Ok(())
}

fn record_contact_event<R>(
    repo: &R,
    campaign: &Campaign,
    contact_id: Option<i32>,
    kind: DeliveryEventKind,
    at: NaiveDateTime,
) -> ServiceResult<()>
where
    R: ContactReader + ContactWriter + AnalyticsWriter + ?Sized,
{
    let Some(metric) = metric_for(kind) else {
        return Ok(());
    };

    let contact = match contact_id.map(ContactId::new) {
        Some(Ok(id)) => repo.get_contact_by_id(id, campaign.client_id)?,
        Some(Err(_)) | None => None,
    };

    let Some(contact) = contact else {
        log::warn!(
            "Skipping `{metric:?}` for unknown contact {contact_id:?} of campaign {}",
            campaign.id
        );
        return Ok(());
    };

    if let Some(status) = contact_status_for(kind) {
        // Unsubscribes through our own link were already counted.
        if contact.status == status {
            return Ok(());
        }
        repo.set_contact_status(contact.id, status, at)?;
    }

    repo.increment_metric(campaign.id, metric)?;
    Ok(())
}

/// Applies one delivery event. Events for unknown campaigns or contacts are
/// logged and skipped.
pub fn process_delivery_event<R>(repo: &R, event: &DeliveryEvent) -> ServiceResult<()>
where
    R: CampaignReader
        + CampaignWriter
        + ContactReader
        + ContactWriter
        + AnalyticsWriter
        + ?Sized,
{
    let campaign = match CampaignId::new(event.campaign_id) {
        Ok(id) => repo.get_campaign_by_id(id)?,
        Err(_) => None,
    };
    let Some(campaign) = campaign else {
        log::warn!("Skipping event for unknown campaign {}", event.campaign_id);
        return Ok(());
    };

    let at = event.occurred_at.unwrap_or_else(|| Utc::now().naive_utc());
    match event.event {
        DeliveryEventKind::Completed => finish_campaign(repo, &campaign, CampaignStatus::Sent, at),
        DeliveryEventKind::Failed => {
            log::error!(
                "Emailer failed campaign {}: {}",
                campaign.id,
                event.reason.as_deref().unwrap_or("no reason given")
            );
            finish_campaign(repo, &campaign, CampaignStatus::Failed, at)
        }
        kind => record_contact_event(repo, &campaign, event.contact_id, kind, at),
    }
}

/// Sends every scheduled campaign that is due. Returns how many were sent.
pub fn dispatch_due_campaigns<R, D>(
    repo: &R,
    dispatcher: &D,
    tokens: &UnsubscribeTokens,
    now: NaiveDateTime,
) -> ServiceResult<usize>
where
    R: CampaignReader
        + CampaignWriter
        + ContactReader
        + ContactListReader
        + AnalyticsWriter
        + ActivityLogWriter
        + ?Sized,
    D: EmailDispatcher + ?Sized,
{
    let due = repo.list_due_campaigns(now)?;
    let mut sent = 0;

    for campaign in due {
        match send_campaign(repo, dispatcher, tokens, &campaign, now) {
            Ok(sending) => {
                sent += 1;
                record_activity(
                    repo,
                    None,
                    Some(sending.client_id),
                    "campaign.sent",
                    (EntityType::Campaign, Some(sending.id.get())),
                    json!({ "scheduled_at": campaign.scheduled_at }),
                );
            }
            Err(err) => {
                log::error!("Scheduled send of campaign {} failed: {err}", campaign.id);
            }
        }
    }
    Ok(sent)
}
