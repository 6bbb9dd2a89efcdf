use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde_json::json;

use crate::forms::webhook::AuthWebhookEvent;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::services::{ServiceError, users as service};

pub const WEBHOOK_SECRET_HEADER: &str = "X-Webhook-Secret";

#[get("/me")]
pub async fn me(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let user = service::me(repo.get_ref(), &user)?;
    Ok(HttpResponse::Ok().json(user))
}

/// Provisioning events from the hosted auth provider.
#[post("/webhooks/auth")]
pub async fn auth_webhook(
    req: HttpRequest,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Json(event): web::Json<AuthWebhookEvent>,
) -> Result<HttpResponse, ServiceError> {
    let provided = req
        .headers()
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|value| value.to_str().ok());

    let user = service::handle_webhook(
        repo.get_ref(),
        &server_config.webhook_secret,
        provided,
        &event,
    )?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true, "user": user })))
}
