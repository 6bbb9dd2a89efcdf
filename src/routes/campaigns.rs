use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::dto::PageQuery;
use crate::dto::campaigns::CampaignsQuery;
use crate::forms::campaigns::{CampaignForm, ReviewForm, ScheduleForm};
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::{campaign_id, client_id};
use crate::services::dispatch::EmailDispatcher;
use crate::services::unsubscribe::UnsubscribeTokens;
use crate::services::{ServiceError, campaigns as service};

#[get("/clients/{client_id}/campaigns")]
pub async fn list_campaigns(
    path: web::Path<i32>,
    params: web::Query<CampaignsQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let page = service::list_campaigns(
        repo.get_ref(),
        &user,
        client_id(path.into_inner())?,
        params.into_inner(),
    )?;
    Ok(HttpResponse::Ok().json(page))
}

#[post("/clients/{client_id}/campaigns")]
pub async fn create_campaign(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CampaignForm>,
) -> Result<HttpResponse, ServiceError> {
    let campaign =
        service::create_campaign(repo.get_ref(), &user, client_id(path.into_inner())?, &form)?;
    Ok(HttpResponse::Created().json(campaign))
}

#[get("/clients/{client_id}/campaigns/{campaign_id}")]
pub async fn get_campaign(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let (client, campaign) = path.into_inner();
    let report =
        service::get_campaign(repo.get_ref(), &user, client_id(client)?, campaign_id(campaign)?)?;
    Ok(HttpResponse::Ok().json(report))
}

#[put("/clients/{client_id}/campaigns/{campaign_id}")]
pub async fn update_campaign(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CampaignForm>,
) -> Result<HttpResponse, ServiceError> {
    let (client, campaign) = path.into_inner();
    let campaign = service::update_campaign(
        repo.get_ref(),
        &user,
        client_id(client)?,
        campaign_id(campaign)?,
        &form,
    )?;
    Ok(HttpResponse::Ok().json(campaign))
}

#[delete("/clients/{client_id}/campaigns/{campaign_id}")]
pub async fn delete_campaign(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let (client, campaign) = path.into_inner();
    service::delete_campaign(repo.get_ref(), &user, client_id(client)?, campaign_id(campaign)?)?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/clients/{client_id}/campaigns/{campaign_id}/submit")]
pub async fn submit_campaign(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let (client, campaign) = path.into_inner();
    let campaign =
        service::submit_campaign(repo.get_ref(), &user, client_id(client)?, campaign_id(campaign)?)?;
    Ok(HttpResponse::Ok().json(campaign))
}

#[post("/clients/{client_id}/campaigns/{campaign_id}/approve")]
pub async fn approve_campaign(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: Option<web::Json<ReviewForm>>,
) -> Result<HttpResponse, ServiceError> {
    let (client, campaign) = path.into_inner();
    let form = form.map(web::Json::into_inner).unwrap_or_default();
    let campaign = service::approve_campaign(
        repo.get_ref(),
        &user,
        client_id(client)?,
        campaign_id(campaign)?,
        &form,
    )?;
    Ok(HttpResponse::Ok().json(campaign))
}

#[post("/clients/{client_id}/campaigns/{campaign_id}/reject")]
pub async fn reject_campaign(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: Option<web::Json<ReviewForm>>,
) -> Result<HttpResponse, ServiceError> {
    let (client, campaign) = path.into_inner();
    let form = form.map(web::Json::into_inner).unwrap_or_default();
    let campaign = service::reject_campaign(
        repo.get_ref(),
        &user,
        client_id(client)?,
        campaign_id(campaign)?,
        &form,
    )?;
    Ok(HttpResponse::Ok().json(campaign))
}

#[post("/clients/{client_id}/campaigns/{campaign_id}/schedule")]
pub async fn schedule_campaign(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ScheduleForm>,
) -> Result<HttpResponse, ServiceError> {
    let (client, campaign) = path.into_inner();
    let campaign = service::schedule_campaign(
        repo.get_ref(),
        &user,
        client_id(client)?,
        campaign_id(campaign)?,
        &form,
    )?;
    Ok(HttpResponse::Ok().json(campaign))
}

#[post("/clients/{client_id}/campaigns/{campaign_id}/unschedule")]
pub async fn unschedule_campaign(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let (client, campaign) = path.into_inner();
    let campaign = service::unschedule_campaign(
        repo.get_ref(),
        &user,
        client_id(client)?,
        campaign_id(campaign)?,
    )?;
    Ok(HttpResponse::Ok().json(campaign))
}

#[post("/clients/{client_id}/campaigns/{campaign_id}/cancel")]
pub async fn cancel_campaign(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let (client, campaign) = path.into_inner();
    let campaign =
        service::cancel_campaign(repo.get_ref(), &user, client_id(client)?, campaign_id(campaign)?)?;
    Ok(HttpResponse::Ok().json(campaign))
}

#[post("/clients/{client_id}/campaigns/{campaign_id}/reopen")]
pub async fn reopen_campaign(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let (client, campaign) = path.into_inner();
    let campaign =
        service::reopen_campaign(repo.get_ref(), &user, client_id(client)?, campaign_id(campaign)?)?;
    Ok(HttpResponse::Ok().json(campaign))
}

#[post("/clients/{client_id}/campaigns/{campaign_id}/send")]
pub async fn send_campaign(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    dispatcher: web::Data<dyn EmailDispatcher>,
    tokens: web::Data<UnsubscribeTokens>,
) -> Result<HttpResponse, ServiceError> {
    let (client, campaign) = path.into_inner();
    let campaign = service::send_campaign(
        repo.get_ref(),
        dispatcher.get_ref(),
        tokens.get_ref(),
        &user,
        client_id(client)?,
        campaign_id(campaign)?,
    )?;
    Ok(HttpResponse::Accepted().json(campaign))
}

#[get("/clients/{client_id}/campaigns/{campaign_id}/audience")]
pub async fn campaign_audience(
    path: web::Path<(i32, i32)>,
    params: web::Query<PageQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let (client, campaign) = path.into_inner();
    let preview = service::campaign_audience(
        repo.get_ref(),
        &user,
        client_id(client)?,
        campaign_id(campaign)?,
        params.page,
    )?;
    Ok(HttpResponse::Ok().json(preview))
}
