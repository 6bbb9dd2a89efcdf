use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::dto::contacts::ContactsQuery;
use crate::forms::contacts::{ContactForm, UploadContactsForm};
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::{client_id, contact_id};
use crate::services::{ServiceError, contacts as service};

#[get("/clients/{client_id}/contacts")]
pub async fn list_contacts(
    path: web::Path<i32>,
    params: web::Query<ContactsQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let page = service::list_contacts(
        repo.get_ref(),
        &user,
        client_id(path.into_inner())?,
        params.into_inner(),
    )?;
    Ok(HttpResponse::Ok().json(page))
}

#[post("/clients/{client_id}/contacts")]
pub async fn create_contact(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ContactForm>,
) -> Result<HttpResponse, ServiceError> {
    let contact =
        service::create_contact(repo.get_ref(), &user, client_id(path.into_inner())?, &form)?;
    Ok(HttpResponse::Created().json(contact))
}

#[post("/clients/{client_id}/contacts/upload")]
pub async fn upload_contacts(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(form): MultipartForm<UploadContactsForm>,
) -> Result<HttpResponse, ServiceError> {
    let summary = service::import_contacts(
        repo.get_ref(),
        &user,
        client_id(path.into_inner())?,
        form.reader()?,
    )?;
    Ok(HttpResponse::Ok().json(summary))
}

#[get("/clients/{client_id}/contacts/{contact_id}")]
pub async fn get_contact(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let (client, contact) = path.into_inner();
    let contact =
        service::get_contact(repo.get_ref(), &user, client_id(client)?, contact_id(contact)?)?;
    Ok(HttpResponse::Ok().json(contact))
}

#[put("/clients/{client_id}/contacts/{contact_id}")]
pub async fn update_contact(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ContactForm>,
) -> Result<HttpResponse, ServiceError> {
    let (client, contact) = path.into_inner();
    let contact = service::update_contact(
        repo.get_ref(),
        &user,
        client_id(client)?,
        contact_id(contact)?,
        &form,
    )?;
    Ok(HttpResponse::Ok().json(contact))
}

#[delete("/clients/{client_id}/contacts/{contact_id}")]
pub async fn delete_contact(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let (client, contact) = path.into_inner();
    service::delete_contact(repo.get_ref(), &user, client_id(client)?, contact_id(contact)?)?;
    Ok(HttpResponse::NoContent().finish())
}
