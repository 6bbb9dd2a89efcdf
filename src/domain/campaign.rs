//! Campaigns and their lifecycle rules.

use std::fmt::{Display, Formatter};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::types::{
    AudienceType, CampaignId, CampaignName, CampaignStatus, ClientId, ContactId, ContactListId,
    EmailAddress, SenderName, TemplateId, UserId,
};

/// Recipient selection for a campaign.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Audience {
    /// Every active contact of the client.
    All,
    /// Contacts matched by a saved contact list.
    List { list_id: ContactListId },
    /// An explicit set of contacts.
    Custom { contact_ids: Vec<ContactId> },
}

impl Audience {
    pub fn audience_type(&self) -> AudienceType {
        match self {
            Audience::All => AudienceType::All,
            Audience::List { .. } => AudienceType::List,
            Audience::Custom { .. } => AudienceType::Custom,
        }
    }

    /// Rebuilds the audience from its storage columns.
    ///
    /// A list audience whose list has since been deleted degrades to an empty
    /// explicit audience.
    pub fn from_parts(
        audience_type: AudienceType,
        list_id: Option<ContactListId>,
        contact_ids: Vec<ContactId>,
    ) -> Self {
        match (audience_type, list_id) {
            (AudienceType::All, _) => Audience::All,
            (AudienceType::List, Some(list_id)) => Audience::List { list_id },
            (AudienceType::List, None) => Audience::Custom {
                contact_ids: Vec::new(),
            },
            (AudienceType::Custom, _) => Audience::Custom { contact_ids },
        }
    }

    pub fn list_id(&self) -> Option<ContactListId> {
        match self {
            Audience::List { list_id } => Some(*list_id),
            _ => None,
        }
    }

    pub fn contact_ids(&self) -> &[ContactId] {
        match self {
            Audience::Custom { contact_ids } => contact_ids,
            _ => &[],
        }
    }
}

/// Operations that move a campaign between statuses.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CampaignAction {
    Submit,
    Approve,
    Reject,
    Schedule,
    Unschedule,
    Send,
    Cancel,
    Reopen,
    Complete,
    Fail,
}

impl Display for CampaignAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CampaignAction::Submit => "submit",
            CampaignAction::Approve => "approve",
            CampaignAction::Reject => "reject",
            CampaignAction::Schedule => "schedule",
            CampaignAction::Unschedule => "unschedule",
            CampaignAction::Send => "send",
            CampaignAction::Cancel => "cancel",
            CampaignAction::Reopen => "reopen",
            CampaignAction::Complete => "complete",
            CampaignAction::Fail => "fail",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot {action} a campaign that is {from}")]
pub struct TransitionError {
    pub from: CampaignStatus,
    pub action: CampaignAction,
}

impl CampaignStatus {
    /// Returns the status reached by applying `action`, if the move is legal.
    pub fn transition(self, action: CampaignAction) -> Result<CampaignStatus, TransitionError> {
        use CampaignAction as A;
        use CampaignStatus as S;

        let next = match (self, action) {
            (S::Draft, A::Submit) => S::PendingApproval,
            (S::PendingApproval, A::Approve) => S::Approved,
            (S::PendingApproval, A::Reject) => S::Draft,
            (S::Approved, A::Schedule) => S::Scheduled,
            (S::Scheduled, A::Unschedule) => S::Approved,
            (S::Approved | S::Scheduled, A::Send) => S::Sending,
            (S::Sending, A::Complete) => S::Sent,
            (S::Sending, A::Fail) => S::Failed,
            (S::Draft | S::PendingApproval | S::Approved | S::Scheduled, A::Cancel) => {
                S::Cancelled
            }
            (S::Failed | S::Cancelled, A::Reopen) => S::Draft,
            (from, action) => return Err(TransitionError { from, action }),
        };
        Ok(next)
    }

    /// Content and audience can only change while drafting.
    pub fn is_editable(self) -> bool {
        self == CampaignStatus::Draft
    }

    /// Campaigns that reached recipients (or are reaching them) are kept.
    pub fn is_deletable(self) -> bool {
        !matches!(self, CampaignStatus::Sending | CampaignStatus::Sent)
    }

    /// Statuses that still depend on their contact list.
    pub fn is_open(self) -> bool {
        !matches!(
            self,
            CampaignStatus::Sent | CampaignStatus::Failed | CampaignStatus::Cancelled
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Campaign {
    pub id: CampaignId,
    pub client_id: ClientId,
    pub template_id: Option<TemplateId>,
    pub name: CampaignName,
    pub subject: String,
    pub preview_text: String,
    pub from_name: SenderName,
    pub from_email: EmailAddress,
    pub reply_to: Option<EmailAddress>,
    pub html_content: String,
    pub design_json: Option<serde_json::Value>,
    pub status: CampaignStatus,
    pub audience: Audience,
    pub scheduled_at: Option<NaiveDateTime>,
    pub approved_at: Option<NaiveDateTime>,
    pub sent_at: Option<NaiveDateTime>,
    pub created_by: UserId,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Campaign {
    /// Lists what is still missing before the campaign can be submitted.
    pub fn submission_problems(&self) -> Vec<&'static str> {
        let mut problems = Vec::new();
        if self.subject.trim().is_empty() {
            problems.push("subject is required");
        }
        if self.html_content.trim().is_empty() {
            problems.push("email content is required");
        }
        if let Audience::Custom { contact_ids } = &self.audience
            && contact_ids.is_empty()
        {
            problems.push("custom audience needs at least one contact");
        }
        problems
    }
}

/// Content, sender and audience supplied when drafting a campaign.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CampaignDraft {
    pub template_id: Option<TemplateId>,
    pub name: CampaignName,
    pub subject: String,
    pub preview_text: String,
    pub from_name: SenderName,
    pub from_email: EmailAddress,
    pub reply_to: Option<EmailAddress>,
    pub html_content: String,
    pub design_json: Option<serde_json::Value>,
    pub audience: Audience,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewCampaign {
    pub client_id: ClientId,
    pub created_by: UserId,
    pub draft: CampaignDraft,
}

/// Status change persisted together with its timestamps.
#[derive(Clone, Debug, PartialEq)]
pub struct CampaignStatusChange {
    pub status: CampaignStatus,
    pub scheduled_at: Option<NaiveDateTime>,
    pub approved_at: Option<NaiveDateTime>,
    pub sent_at: Option<NaiveDateTime>,
}

impl CampaignStatusChange {
    /// Carries the existing timestamps of `campaign` over to `status`.
    pub fn from_campaign(campaign: &Campaign, status: CampaignStatus) -> Self {
        Self {
            status,
            scheduled_at: campaign.scheduled_at,
            approved_at: campaign.approved_at,
            sent_at: campaign.sent_at,
        }
    }
}
