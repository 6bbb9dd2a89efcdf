use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::domain::filter::FilterCriteria;
use crate::dto::PageQuery;
use crate::forms::contact_lists::ContactListForm;
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::{client_id, list_id};
use crate::services::access::page_or_first;
use crate::services::{ServiceError, contact_lists as service};

#[get("/clients/{client_id}/lists")]
pub async fn list_contact_lists(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let lists = service::list_contact_lists(repo.get_ref(), &user, client_id(path.into_inner())?)?;
    Ok(HttpResponse::Ok().json(lists))
}

#[post("/clients/{client_id}/lists")]
pub async fn create_contact_list(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ContactListForm>,
) -> Result<HttpResponse, ServiceError> {
    let list =
        service::create_contact_list(repo.get_ref(), &user, client_id(path.into_inner())?, &form)?;
    Ok(HttpResponse::Created().json(list))
}

/// Evaluates criteria that have not been saved yet.
#[post("/clients/{client_id}/lists/preview")]
pub async fn preview_contact_list(
    path: web::Path<i32>,
    params: web::Query<PageQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(criteria): web::Json<FilterCriteria>,
) -> Result<HttpResponse, ServiceError> {
    let preview = service::preview_criteria(
        repo.get_ref(),
        &user,
        client_id(path.into_inner())?,
        criteria,
        page_or_first(params.page),
    )?;
    Ok(HttpResponse::Ok().json(preview))
}

#[get("/clients/{client_id}/lists/{list_id}")]
pub async fn get_contact_list(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let (client, list) = path.into_inner();
    let list = service::get_contact_list(repo.get_ref(), &user, client_id(client)?, list_id(list)?)?;
    Ok(HttpResponse::Ok().json(list))
}

#[put("/clients/{client_id}/lists/{list_id}")]
pub async fn update_contact_list(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ContactListForm>,
) -> Result<HttpResponse, ServiceError> {
    let (client, list) = path.into_inner();
    let list = service::update_contact_list(
        repo.get_ref(),
        &user,
        client_id(client)?,
        list_id(list)?,
        &form,
    )?;
    Ok(HttpResponse::Ok().json(list))
}

#[delete("/clients/{client_id}/lists/{list_id}")]
pub async fn delete_contact_list(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let (client, list) = path.into_inner();
    service::delete_contact_list(repo.get_ref(), &user, client_id(client)?, list_id(list)?)?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/clients/{client_id}/lists/{list_id}/contacts")]
pub async fn list_members(
    path: web::Path<(i32, i32)>,
    params: web::Query<PageQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let (client, list) = path.into_inner();
    let members = service::list_members(
        repo.get_ref(),
        &user,
        client_id(client)?,
        list_id(list)?,
        page_or_first(params.page),
    )?;
    Ok(HttpResponse::Ok().json(members))
}
