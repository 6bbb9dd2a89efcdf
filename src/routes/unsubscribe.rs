use actix_web::{HttpResponse, get, post, web};

use crate::dto::unsubscribe::UnsubscribeQuery;
use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::unsubscribe::{UnsubscribeTokens, unsubscribe};

fn handle(
    repo: &DieselRepository,
    tokens: &UnsubscribeTokens,
    params: &UnsubscribeQuery,
) -> Result<HttpResponse, ServiceError> {
    let outcome = unsubscribe(repo, tokens, &params.token)?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Link followed from an email.
#[get("/unsubscribe")]
pub async fn unsubscribe_get(
    params: web::Query<UnsubscribeQuery>,
    repo: web::Data<DieselRepository>,
    tokens: web::Data<UnsubscribeTokens>,
) -> Result<HttpResponse, ServiceError> {
    handle(repo.get_ref(), tokens.get_ref(), &params)
}

/// One-click unsubscribe posted by mail clients (RFC 8058).
#[post("/unsubscribe")]
pub async fn unsubscribe_post(
    params: web::Query<UnsubscribeQuery>,
    repo: web::Data<DieselRepository>,
    tokens: web::Data<UnsubscribeTokens>,
) -> Result<HttpResponse, ServiceError> {
    handle(repo.get_ref(), tokens.get_ref(), &params)
}
