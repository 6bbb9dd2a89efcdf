use actix_web::{HttpResponse, get, web};

use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::{campaign_id, client_id};
use crate::services::{ServiceError, analytics as service};

#[get("/clients/{client_id}/campaigns/{campaign_id}/analytics")]
pub async fn campaign_analytics(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let (client, campaign) = path.into_inner();
    let view = service::campaign_analytics(
        repo.get_ref(),
        &user,
        client_id(client)?,
        campaign_id(campaign)?,
    )?;
    Ok(HttpResponse::Ok().json(view))
}

#[get("/clients/{client_id}/dashboard")]
pub async fn dashboard(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let data = service::dashboard(repo.get_ref(), &user, client_id(path.into_inner())?)?;
    Ok(HttpResponse::Ok().json(data))
}
