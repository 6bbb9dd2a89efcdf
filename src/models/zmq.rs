//! Messages exchanged with the emailer service over ZeroMQ.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One recipient of a dispatched campaign.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DispatchRecipient {
    pub contact_id: i32,
    pub email: String,
    pub name: String,
    pub unsubscribe_url: String,
}

/// Published once per campaign send.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CampaignDispatch {
    pub dispatch_id: Uuid,
    pub campaign_id: i32,
    pub client_id: i32,
    pub from_name: String,
    pub from_email: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub preview_text: String,
    pub html: String,
    pub recipients: Vec<DispatchRecipient>,
}

/// Outcome reported by the emailer.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryEventKind {
    Delivered,
    Opened,
    Clicked,
    Bounced,
    Complained,
    Unsubscribed,
    /// Every recipient of the campaign was handed off.
    Completed,
    /// The emailer gave up on the campaign.
    Failed,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DeliveryEvent {
    pub campaign_id: i32,
    #[serde(default)]
    pub contact_id: Option<i32>,
    pub event: DeliveryEventKind,
    #[serde(default)]
    pub occurred_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub reason: Option<String>,
}
