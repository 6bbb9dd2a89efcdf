use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::dto::clients::ClientsQuery;
use crate::forms::clients::ClientForm;
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::client_id;
use crate::services::{ServiceError, clients as service};

#[get("/clients")]
pub async fn list_clients(
    params: web::Query<ClientsQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let page = service::list_clients(repo.get_ref(), &user, params.into_inner())?;
    Ok(HttpResponse::Ok().json(page))
}

#[post("/clients")]
pub async fn create_client(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ClientForm>,
) -> Result<HttpResponse, ServiceError> {
    let client = service::create_client(repo.get_ref(), &user, &form)?;
    Ok(HttpResponse::Created().json(client))
}

#[get("/clients/{client_id}")]
pub async fn get_client(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let client = service::get_client(repo.get_ref(), &user, client_id(path.into_inner())?)?;
    Ok(HttpResponse::Ok().json(client))
}

#[put("/clients/{client_id}")]
pub async fn update_client(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ClientForm>,
) -> Result<HttpResponse, ServiceError> {
    let client = service::update_client(
        repo.get_ref(),
        &user,
        client_id(path.into_inner())?,
        &form,
    )?;
    Ok(HttpResponse::Ok().json(client))
}

#[delete("/clients/{client_id}")]
pub async fn delete_client(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    service::delete_client(repo.get_ref(), &user, client_id(path.into_inner())?)?;
    Ok(HttpResponse::NoContent().finish())
}
