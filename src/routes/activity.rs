use actix_web::{HttpResponse, get, web};

use crate::dto::PageQuery;
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::client_id;
use crate::services::{ServiceError, activity as service};

#[get("/clients/{client_id}/activity")]
pub async fn list_activity(
    path: web::Path<i32>,
    params: web::Query<PageQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let page = service::list_activity(
        repo.get_ref(),
        &user,
        client_id(path.into_inner())?,
        params.into_inner(),
    )?;
    Ok(HttpResponse::Ok().json(page))
}
