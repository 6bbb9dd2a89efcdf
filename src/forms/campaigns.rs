use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::domain::campaign::{Audience, CampaignDraft};
use crate::domain::types::{CampaignName, ContactId, EmailAddress, SenderName, TemplateId};
use crate::forms::{FormError, non_blank};

fn default_audience() -> Audience {
    Audience::All
}

#[derive(Debug, Deserialize, Validate)]
/// Payload for creating or editing a draft campaign.
pub struct CampaignForm {
    #[serde(default)]
    pub template_id: Option<i32>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 998))]
    pub subject: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub preview_text: String,
    #[validate(length(min = 1, max = 200))]
    pub from_name: String,
    #[validate(email)]
    pub from_email: String,
    #[serde(default)]
    pub reply_to: Option<String>,
    #[serde(default)]
    pub html_content: String,
    #[serde(default)]
    pub design_json: Option<serde_json::Value>,
    #[serde(default = "default_audience")]
    pub audience: Audience,
}

impl CampaignForm {
    pub fn to_draft(&self) -> Result<CampaignDraft, FormError> {
        self.validate()?;

        let audience = match &self.audience {
            Audience::Custom { contact_ids } => {
                let mut ids = contact_ids
                    .iter()
                    .map(|id| ContactId::new(id.get()))
                    .collect::<Result<Vec<_>, _>>()?;
                ids.sort();
                ids.dedup();
                Audience::Custom { contact_ids: ids }
            }
            other => other.clone(),
        };

        Ok(CampaignDraft {
            template_id: self.template_id.map(TemplateId::new).transpose()?,
            name: CampaignName::new(self.name.as_str())?,
            subject: self.subject.trim().to_string(),
            preview_text: self.preview_text.trim().to_string(),
            from_name: SenderName::new(self.from_name.as_str())?,
            from_email: EmailAddress::new(self.from_email.as_str())?,
            reply_to: non_blank(self.reply_to.as_deref())
                .map(EmailAddress::new)
                .transpose()?,
            html_content: self.html_content.clone(),
            design_json: self.design_json.clone(),
            audience,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ScheduleForm {
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, Validate)]
/// Optional note attached to an approval decision.
pub struct ReviewForm {
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_ids_are_deduplicated() {
        let form: CampaignForm = serde_json::from_str(
            r#"{"name":"Open house","from_name":"Harbor","from_email":"news@harbor.com",
                "audience":{"type":"custom","contact_ids":[4,2,4]}}"#,
        )
        .unwrap();
        let draft = form.to_draft().unwrap();
        assert_eq!(
            draft.audience.contact_ids(),
            [ContactId::new(2).unwrap(), ContactId::new(4).unwrap()]
        );
    }

    #[test]
    fn audience_defaults_to_all() {
        let form: CampaignForm = serde_json::from_str(
            r#"{"name":"n","from_name":"f","from_email":"a@b.com","reply_to":" "}"#,
        )
        .unwrap();
        let draft = form.to_draft().unwrap();
        assert_eq!(draft.audience, Audience::All);
        assert_eq!(draft.reply_to, None);
    }

    #[test]
    fn non_positive_ids_are_rejected() {
        let form: CampaignForm = serde_json::from_str(
            r#"{"name":"n","from_name":"f","from_email":"a@b.com",
                "audience":{"type":"custom","contact_ids":[0]}}"#,
        )
        .unwrap();
        assert!(matches!(form.to_draft(), Err(FormError::TypeConstraint(_))));
    }
}
