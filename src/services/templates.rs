use serde_json::json;

use crate::domain::activity_log::EntityType;
use crate::domain::template::Template;
use crate::domain::types::{ClientId, TemplateId};
use crate::domain::user::User;
use crate::dto::templates::TemplatesQuery;
use crate::forms::templates::TemplateForm;
use crate::models::auth::AuthenticatedUser;
use crate::repository::{
    ActivityLogWriter, ClientReader, TemplateReader, TemplateWriter, UserReader,
};
use crate::services::access::{current_user, record_activity, require_admin};
use crate::services::{ServiceError, ServiceResult};

fn visible_to(user: &User, template: &Template) -> bool {
    match (user.is_admin(), user.client_id) {
        (true, _) => true,
        (false, Some(client_id)) => template.is_available_to(client_id),
        (false, None) => false,
    }
}

/// Admins may filter by client; client users always get shared templates
/// plus their own.
pub fn list_templates<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    params: TemplatesQuery,
) -> ServiceResult<Vec<Template>>
where
    R: UserReader + TemplateReader + ?Sized,
{
    let user = current_user(repo, auth)?;
    let scope = if user.is_admin() {
        params.client_id.map(ClientId::new).transpose()?
    } else {
        Some(user.client_id.ok_or(ServiceError::Forbidden)?)
    };
    Ok(repo.list_templates(scope)?)
}

pub fn get_template<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    template_id: TemplateId,
) -> ServiceResult<Template>
where
    R: UserReader + TemplateReader + ?Sized,
{
    let user = current_user(repo, auth)?;
    match repo.get_template(template_id)? {
        Some(template) if visible_to(&user, &template) => Ok(template),
        _ => Err(ServiceError::NotFound),
    }
}

fn ensure_owner_exists<R>(repo: &R, owner: Option<ClientId>) -> ServiceResult<()>
where
    R: ClientReader + ?Sized,
{
    if let Some(client_id) = owner
        && repo.get_client_by_id(client_id)?.is_none()
    {
        return Err(ServiceError::Form(format!("client {client_id} does not exist")));
    }
    Ok(())
}

pub fn create_template<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    form: &TemplateForm,
) -> ServiceResult<Template>
where
    R: UserReader + ClientReader + TemplateWriter + ActivityLogWriter + ?Sized,
{
    let user = require_admin(repo, auth)?;
    let new_template = form.to_new_template()?;
    ensure_owner_exists(repo, new_template.client_id)?;

    let template = repo.create_template(&new_template).map_err(|err| {
        log::error!("Failed to create template: {err}");
        err
    })?;

    record_activity(
        repo,
        Some(&user),
        template.client_id,
        "template.created",
        (EntityType::Template, Some(template.id.get())),
        json!({ "name": template.name }),
    );
    Ok(template)
}

/// Ownership is fixed at creation; only content changes.
pub fn update_template<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    template_id: TemplateId,
    form: &TemplateForm,
) -> ServiceResult<Template>
where
    R: UserReader + TemplateReader + TemplateWriter + ActivityLogWriter + ?Sized,
{
    let user = require_admin(repo, auth)?;
    repo.get_template(template_id)?
        .ok_or(ServiceError::NotFound)?;
    let updates = form.to_update_template()?;

    let template = repo.update_template(template_id, &updates)?;

    record_activity(
        repo,
        Some(&user),
        template.client_id,
        "template.updated",
        (EntityType::Template, Some(template_id.get())),
        json!({ "name": template.name }),
    );
    Ok(template)
}

pub fn delete_template<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    template_id: TemplateId,
) -> ServiceResult<()>
where
    R: UserReader + TemplateReader + TemplateWriter + ActivityLogWriter + ?Sized,
{
    let user = require_admin(repo, auth)?;
    let template = repo
        .get_template(template_id)?
        .ok_or(ServiceError::NotFound)?;

    repo.delete_template(template_id)?;

    record_activity(
        repo,
        Some(&user),
        template.client_id,
        "template.deleted",
        (EntityType::Template, Some(template_id.get())),
        json!({ "name": template.name }),
    );
    Ok(())
}
