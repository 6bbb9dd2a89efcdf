use serde::Deserialize;
use validator::Validate;

use crate::domain::template::{NewTemplate, UpdateTemplate};
use crate::domain::types::{ClientId, TemplateName};
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
/// Payload for creating or replacing an email template.
pub struct TemplateForm {
    /// Owning client; omitted for templates shared by every client.
    #[serde(default)]
    pub client_id: Option<i32>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 998))]
    pub subject: String,
    #[serde(default)]
    pub html_content: String,
    #[serde(default)]
    pub design_json: Option<serde_json::Value>,
}

impl TemplateForm {
    pub fn to_new_template(&self) -> Result<NewTemplate, FormError> {
        self.validate()?;
        Ok(NewTemplate {
            client_id: self.client_id.map(ClientId::new).transpose()?,
            name: TemplateName::new(self.name.as_str())?,
            subject: self.subject.trim().to_string(),
            html_content: self.html_content.clone(),
            design_json: self.design_json.clone(),
        })
    }

    pub fn to_update_template(&self) -> Result<UpdateTemplate, FormError> {
        self.to_new_template().map(UpdateTemplate::from)
    }
}
