//! HTTP handlers.
//!
//! Handlers are thin: they parse the request, call into [`crate::services`]
//! and serialize the result. Errors are rendered by the [`ResponseError`]
//! implementation below as `{"error": "..."}`.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, ResponseError, get, web};
use serde::Serialize;
use serde_json::json;

use crate::domain::types::{CampaignId, ClientId, ContactId, ContactListId, TemplateId};
use crate::services::ServiceError;

pub mod activity;
pub mod analytics;
pub mod campaigns;
pub mod clients;
pub mod contact_lists;
pub mod contacts;
pub mod templates;
pub mod unsubscribe;
pub mod users;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Form(_) | ServiceError::TypeConstraint(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden | ServiceError::InvalidToken => StatusCode::FORBIDDEN,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Dispatch(_) | ServiceError::Repository(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {self}");
        }
        // Storage details stay in the log.
        let message = match self {
            ServiceError::Repository(_) => "internal server error".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(status).json(ErrorResponse { error: message })
    }
}

pub(crate) fn client_id(raw: i32) -> Result<ClientId, ServiceError> {
    Ok(ClientId::new(raw)?)
}

pub(crate) fn contact_id(raw: i32) -> Result<ContactId, ServiceError> {
    Ok(ContactId::new(raw)?)
}

pub(crate) fn list_id(raw: i32) -> Result<ContactListId, ServiceError> {
    Ok(ContactListId::new(raw)?)
}

pub(crate) fn campaign_id(raw: i32) -> Result<CampaignId, ServiceError> {
    Ok(CampaignId::new(raw)?)
}

pub(crate) fn template_id(raw: i32) -> Result<TemplateId, ServiceError> {
    Ok(TemplateId::new(raw)?)
}

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Registers the authenticated JSON API. Mounted under `/api/v1`.
pub fn api_v1(cfg: &mut web::ServiceConfig) {
    cfg.service(users::me)
        .service(clients::list_clients)
        .service(clients::create_client)
        .service(clients::get_client)
        .service(clients::update_client)
        .service(clients::delete_client)
        .service(contacts::list_contacts)
        .service(contacts::create_contact)
        .service(contacts::upload_contacts)
        .service(contacts::get_contact)
        .service(contacts::update_contact)
        .service(contacts::delete_contact)
        .service(contact_lists::list_contact_lists)
        .service(contact_lists::create_contact_list)
        .service(contact_lists::preview_contact_list)
        .service(contact_lists::get_contact_list)
        .service(contact_lists::update_contact_list)
        .service(contact_lists::delete_contact_list)
        .service(contact_lists::list_members)
        .service(templates::list_templates)
        .service(templates::create_template)
        .service(templates::get_template)
        .service(templates::update_template)
        .service(templates::delete_template)
        .service(campaigns::list_campaigns)
        .service(campaigns::create_campaign)
        .service(campaigns::get_campaign)
        .service(campaigns::update_campaign)
        .service(campaigns::delete_campaign)
        .service(campaigns::submit_campaign)
        .service(campaigns::approve_campaign)
        .service(campaigns::reject_campaign)
        .service(campaigns::schedule_campaign)
        .service(campaigns::unschedule_campaign)
        .service(campaigns::cancel_campaign)
        .service(campaigns::reopen_campaign)
        .service(campaigns::send_campaign)
        .service(campaigns::campaign_audience)
        .service(analytics::campaign_analytics)
        .service(analytics::dashboard)
        .service(activity::list_activity);
}

/// Endpoints reachable without a bearer token.
pub fn public(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(unsubscribe::unsubscribe_get)
        .service(unsubscribe::unsubscribe_post)
        .service(users::auth_webhook);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn errors_render_as_json_with_status() {
        let response = ServiceError::Conflict("campaign is sent".into()).error_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = to_bytes(response.into_body()).await.unwrap();
        assert_eq!(body, r#"{"error":"campaign is sent"}"#);
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            ServiceError::InvalidToken.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ServiceError::Form("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Dispatch("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            client_id(0).unwrap_err().status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
