//! Reusable email templates.
//!
//! A template without a client is shared across every client account.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ClientId, TemplateId, TemplateName};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Template {
    pub id: TemplateId,
    pub client_id: Option<ClientId>,
    pub name: TemplateName,
    pub subject: String,
    pub html_content: String,
    /// Opaque design document produced by the drag-and-drop editor.
    pub design_json: Option<serde_json::Value>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Template {
    /// Whether the template may be used by campaigns of `client_id`.
    pub fn is_available_to(&self, client_id: ClientId) -> bool {
        self.client_id.is_none_or(|owner| owner == client_id)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewTemplate {
    pub client_id: Option<ClientId>,
    pub name: TemplateName,
    pub subject: String,
    pub html_content: String,
    pub design_json: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UpdateTemplate {
    pub name: TemplateName,
    pub subject: String,
    pub html_content: String,
    pub design_json: Option<serde_json::Value>,
}

impl From<NewTemplate> for UpdateTemplate {
    fn from(value: NewTemplate) -> Self {
        Self {
            name: value.name,
            subject: value.subject,
            html_content: value.html_content,
            design_json: value.design_json,
        }
    }
}
