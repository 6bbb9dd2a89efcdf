//! Diesel models for campaigns.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::campaign::{
    Audience, Campaign as DomainCampaign, CampaignDraft, CampaignStatusChange,
    NewCampaign as DomainNewCampaign,
};
use crate::domain::types::{
    AudienceType, CampaignId, CampaignName, CampaignStatus, ClientId, ContactId, ContactListId,
    EmailAddress, SenderName, TemplateId, TypeConstraintError, UserId,
};
use crate::models::template::parse_design;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::campaigns)]
/// Diesel model for [`crate::domain::campaign::Campaign`].
pub struct Campaign {
    pub id: i32,
    pub client_id: i32,
    pub template_id: Option<i32>,
    pub contact_list_id: Option<i32>,
    pub name: String,
    pub subject: String,
    pub preview_text: String,
    pub from_name: String,
    pub from_email: String,
    pub reply_to: Option<String>,
    pub html_content: String,
    pub design_json: Option<String>,
    pub status: String,
    pub audience_type: String,
    pub audience_contact_ids: String, // JSON array of ids
    pub scheduled_at: Option<NaiveDateTime>,
    pub approved_at: Option<NaiveDateTime>,
    pub sent_at: Option<NaiveDateTime>,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Columns written from a [`CampaignDraft`].
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::campaigns)]
#[diesel(treat_none_as_null = true)]
pub struct CampaignDraftColumns<'a> {
    pub template_id: Option<i32>,
    pub contact_list_id: Option<i32>,
    pub name: &'a str,
    pub subject: &'a str,
    pub preview_text: &'a str,
    pub from_name: &'a str,
    pub from_email: &'a str,
    pub reply_to: Option<&'a str>,
    pub html_content: &'a str,
    pub design_json: Option<String>,
    pub audience_type: &'static str,
    pub audience_contact_ids: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::campaigns)]
pub struct NewCampaign<'a> {
    pub client_id: i32,
    pub created_by: &'a str,
    pub status: &'static str,
    pub template_id: Option<i32>,
    pub contact_list_id: Option<i32>,
    pub name: &'a str,
    pub subject: &'a str,
    pub preview_text: &'a str,
    pub from_name: &'a str,
    pub from_email: &'a str,
    pub reply_to: Option<&'a str>,
    pub html_content: &'a str,
    pub design_json: Option<String>,
    pub audience_type: &'static str,
    pub audience_contact_ids: String,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::campaigns)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateCampaignStatus {
    pub status: &'static str,
    pub scheduled_at: Option<NaiveDateTime>,
    pub approved_at: Option<NaiveDateTime>,
    pub sent_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

fn encode_contact_ids(ids: &[ContactId]) -> String {
    let raw: Vec<i32> = ids.iter().map(|id| id.get()).collect();
    serde_json::to_string(&raw).unwrap_or_else(|_| "[]".to_string())
}

fn decode_contact_ids(raw: &str) -> Result<Vec<ContactId>, TypeConstraintError> {
    let ids: Vec<i32> = serde_json::from_str(raw)
        .map_err(|e| TypeConstraintError::InvalidValue(format!("audience contact ids: {e}")))?;
    ids.into_iter().map(ContactId::try_from).collect()
}

impl<'a> From<&'a CampaignDraft> for CampaignDraftColumns<'a> {
    fn from(draft: &'a CampaignDraft) -> Self {
        Self {
            template_id: draft.template_id.map(TemplateId::get),
            contact_list_id: draft.audience.list_id().map(ContactListId::get),
            name: draft.name.as_str(),
            subject: &draft.subject,
            preview_text: &draft.preview_text,
            from_name: draft.from_name.as_str(),
            from_email: draft.from_email.as_str(),
            reply_to: draft.reply_to.as_ref().map(EmailAddress::as_str),
            html_content: &draft.html_content,
            design_json: draft.design_json.as_ref().map(ToString::to_string),
            audience_type: draft.audience.audience_type().as_str(),
            audience_contact_ids: encode_contact_ids(draft.audience.contact_ids()),
        }
    }
}

impl<'a> From<&'a DomainNewCampaign> for NewCampaign<'a> {
    fn from(campaign: &'a DomainNewCampaign) -> Self {
        let columns = CampaignDraftColumns::from(&campaign.draft);
        Self {
            client_id: campaign.client_id.get(),
            created_by: campaign.created_by.as_str(),
            status: CampaignStatus::Draft.as_str(),
            template_id: columns.template_id,
            contact_list_id: columns.contact_list_id,
            name: columns.name,
            subject: columns.subject,
            preview_text: columns.preview_text,
            from_name: columns.from_name,
            from_email: columns.from_email,
            reply_to: columns.reply_to,
            html_content: columns.html_content,
            design_json: columns.design_json,
            audience_type: columns.audience_type,
            audience_contact_ids: columns.audience_contact_ids,
        }
    }
}

impl From<&CampaignStatusChange> for UpdateCampaignStatus {
    fn from(change: &CampaignStatusChange) -> Self {
        Self {
            status: change.status.as_str(),
            scheduled_at: change.scheduled_at,
            approved_at: change.approved_at,
            sent_at: change.sent_at,
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

impl TryFrom<Campaign> for DomainCampaign {
    type Error = TypeConstraintError;

    fn try_from(campaign: Campaign) -> Result<Self, Self::Error> {
        let audience = Audience::from_parts(
            campaign.audience_type.parse::<AudienceType>()?,
            campaign
                .contact_list_id
                .map(ContactListId::try_from)
                .transpose()?,
            decode_contact_ids(&campaign.audience_contact_ids)?,
        );

        Ok(Self {
            id: CampaignId::try_from(campaign.id)?,
            client_id: ClientId::try_from(campaign.client_id)?,
            template_id: campaign.template_id.map(TemplateId::try_from).transpose()?,
            name: CampaignName::new(campaign.name)?,
            subject: campaign.subject,
            preview_text: campaign.preview_text,
            from_name: SenderName::new(campaign.from_name)?,
            from_email: EmailAddress::new(campaign.from_email)?,
            reply_to: campaign.reply_to.map(EmailAddress::new).transpose()?,
            html_content: campaign.html_content,
            design_json: parse_design(campaign.design_json),
            status: campaign.status.parse::<CampaignStatus>()?,
            audience,
            scheduled_at: campaign.scheduled_at,
            approved_at: campaign.approved_at,
            sent_at: campaign.sent_at,
            created_by: UserId::new(campaign.created_by)?,
            created_at: campaign.created_at,
            updated_at: campaign.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(audience_type: &str, list_id: Option<i32>, ids: &str) -> Campaign {
        let now = Utc::now().naive_utc();
        Campaign {
            id: 1,
            client_id: 2,
            template_id: None,
            contact_list_id: list_id,
            name: "Spring listings".into(),
            subject: "New homes".into(),
            preview_text: String::new(),
            from_name: "Harbor Realty".into(),
            from_email: "news@harbor.com".into(),
            reply_to: None,
            html_content: "<p>Hi</p>".into(),
            design_json: Some("{\"rows\":[]}".into()),
            status: "approved".into(),
            audience_type: audience_type.into(),
            audience_contact_ids: ids.into(),
            scheduled_at: None,
            approved_at: Some(now),
            sent_at: None,
            created_by: "user-1".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn custom_audience_is_decoded() {
        let campaign = DomainCampaign::try_from(row("custom", None, "[3,4]")).unwrap();
        assert_eq!(
            campaign.audience,
            Audience::Custom {
                contact_ids: vec![ContactId::new(3).unwrap(), ContactId::new(4).unwrap()]
            }
        );
        assert_eq!(campaign.status, CampaignStatus::Approved);
        assert!(campaign.design_json.is_some());
    }

    #[test]
    fn list_audience_without_list_degrades() {
        let orphaned = DomainCampaign::try_from(row("list", None, "[]")).unwrap();
        assert_eq!(
            orphaned.audience,
            Audience::Custom {
                contact_ids: Vec::new()
            }
        );
        let campaign = DomainCampaign::try_from(row("list", Some(9), "[]")).unwrap();
        assert_eq!(campaign.audience.list_id(), ContactListId::new(9).ok());
    }

    #[test]
    fn draft_columns_follow_audience() {
        let campaign = DomainCampaign::try_from(row("custom", None, "[7]")).unwrap();
        let draft = CampaignDraft {
            template_id: None,
            name: campaign.name.clone(),
            subject: campaign.subject.clone(),
            preview_text: String::new(),
            from_name: campaign.from_name.clone(),
            from_email: campaign.from_email.clone(),
            reply_to: None,
            html_content: campaign.html_content.clone(),
            design_json: None,
            audience: campaign.audience.clone(),
        };
        let columns = CampaignDraftColumns::from(&draft);
        assert_eq!(columns.audience_type, "custom");
        assert_eq!(columns.audience_contact_ids, "[7]");
        assert_eq!(columns.contact_list_id, None);
    }
}
