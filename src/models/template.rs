//! Diesel models for email templates.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::template::{
    NewTemplate as DomainNewTemplate, Template as DomainTemplate,
    UpdateTemplate as DomainUpdateTemplate,
};
use crate::domain::types::{ClientId, TemplateId, TemplateName, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::templates)]
pub struct Template {
    pub id: i32,
    pub client_id: Option<i32>,
    pub name: String,
    pub subject: String,
    pub html_content: String,
    pub design_json: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::templates)]
pub struct NewTemplate<'a> {
    pub client_id: Option<i32>,
    pub name: &'a str,
    pub subject: &'a str,
    pub html_content: &'a str,
    pub design_json: Option<String>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::templates)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateTemplate<'a> {
    pub name: &'a str,
    pub subject: &'a str,
    pub html_content: &'a str,
    pub design_json: Option<String>,
    pub updated_at: NaiveDateTime,
}

/// Parses stored editor JSON; unreadable documents are dropped.
pub(crate) fn parse_design(raw: Option<String>) -> Option<serde_json::Value> {
    raw.and_then(|raw| serde_json::from_str(&raw).ok())
}

impl TryFrom<Template> for DomainTemplate {
    type Error = TypeConstraintError;

    fn try_from(template: Template) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TemplateId::try_from(template.id)?,
            client_id: template.client_id.map(ClientId::try_from).transpose()?,
            name: TemplateName::new(template.name)?,
            subject: template.subject,
            html_content: template.html_content,
            design_json: parse_design(template.design_json),
            created_at: template.created_at,
            updated_at: template.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewTemplate> for NewTemplate<'a> {
    fn from(template: &'a DomainNewTemplate) -> Self {
        Self {
            client_id: template.client_id.map(ClientId::get),
            name: template.name.as_str(),
            subject: &template.subject,
            html_content: &template.html_content,
            design_json: template.design_json.as_ref().map(ToString::to_string),
        }
    }
}

impl<'a> From<&'a DomainUpdateTemplate> for UpdateTemplate<'a> {
    fn from(template: &'a DomainUpdateTemplate) -> Self {
        Self {
            name: template.name.as_str(),
            subject: &template.subject,
            html_content: &template.html_content,
            design_json: template.design_json.as_ref().map(ToString::to_string),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}
