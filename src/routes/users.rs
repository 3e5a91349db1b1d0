use crate::{
    auth::{AuthenticatedUser, MessageResponse},
    error::AppError,
    services::AccountService,
};
use actix_web::{route, web, HttpResponse, Responder};
use log::info;
use uuid::Uuid;

/// Promote a user to ADMIN
///
/// Mounted behind `RequireRole::admin()`. Promoting an existing admin
/// succeeds with "user is already an admin".
#[route("/promote/{id}", method = "PUT", method = "POST")]
pub async fn promote(
    accounts: web::Data<AccountService>,
    user_id: web::Path<String>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user_id = Uuid::parse_str(&user_id).map_err(|_| AppError::NotFound("user not found".into()))?;

    let outcome = accounts.promote(user_id).await?;
    info!("admin {} requested promotion of {}: {:?}", caller.0.id, user_id, outcome);

    Ok(HttpResponse::Ok().json(MessageResponse::new(outcome.message())))
}
