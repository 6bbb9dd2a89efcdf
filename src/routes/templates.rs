use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::dto::templates::TemplatesQuery;
use crate::forms::templates::TemplateForm;
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::template_id;
use crate::services::{ServiceError, templates as service};

#[get("/templates")]
pub async fn list_templates(
    params: web::Query<TemplatesQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let templates = service::list_templates(repo.get_ref(), &user, params.into_inner())?;
    Ok(HttpResponse::Ok().json(templates))
}

#[post("/templates")]
pub async fn create_template(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<TemplateForm>,
) -> Result<HttpResponse, ServiceError> {
    let template = service::create_template(repo.get_ref(), &user, &form)?;
    Ok(HttpResponse::Created().json(template))
}

#[get("/templates/{template_id}")]
pub async fn get_template(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let template = service::get_template(repo.get_ref(), &user, template_id(path.into_inner())?)?;
    Ok(HttpResponse::Ok().json(template))
}

#[put("/templates/{template_id}")]
pub async fn update_template(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<TemplateForm>,
) -> Result<HttpResponse, ServiceError> {
    let template = service::update_template(
        repo.get_ref(),
        &user,
        template_id(path.into_inner())?,
        &form,
    )?;
    Ok(HttpResponse::Ok().json(template))
}

#[delete("/templates/{template_id}")]
pub async fn delete_template(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    service::delete_template(repo.get_ref(), &user, template_id(path.into_inner())?)?;
    Ok(HttpResponse::NoContent().finish())
}
