pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::{guard, web};
use log::debug;

use crate::auth::{AuthMiddleware, RequireRole};
use crate::error::AppError;

/// Answers unparsable JSON bodies with 400 `{"error":"invalid request"}`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| {
        debug!("rejected body for {}: {}", req.path(), err);
        AppError::BadRequest("invalid request".into()).into()
    })
}

/// Registers every route.
///
/// `/health`, `/register` and `/login` are public. Everything else passes
/// `AuthMiddleware`; reads are open to any role, mutations and promotion
/// additionally require ADMIN. Public services are registered first so the
/// catch-all scopes below never shadow them.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(health::health)
        .service(auth::register)
        .service(auth::login)
        .service(
            web::scope("")
                .wrap(AuthMiddleware)
                .service(
                    web::scope("")
                        .guard(guard::Get())
                        .service(tasks::get_tasks)
                        .service(tasks::get_task),
                )
                .service(
                    web::scope("")
                        .wrap(RequireRole::admin())
                        .service(users::promote)
                        .service(tasks::create_task)
                        .service(tasks::update_task)
                        .service(tasks::delete_task),
                ),
        );
}
