use crate::{
    auth::{AuthResponse, LoginRequest, MessageResponse, RegisterRequest},
    error::AppError,
    services::AccountService,
};
use actix_web::{post, web, HttpResponse, Responder};

/// Register a new user
///
/// Public. Responds `200 {"message":"user registered successfully"}`; rule
/// violations and duplicate emails are 406, store failures 500.
#[post("/register")]
pub async fn register(
    accounts: web::Data<AccountService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    accounts.register(register_data.into_inner()).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("user registered successfully")))
}

/// Login user
///
/// Public. Responds with a signed bearer token. Unknown email is a 404, a
/// wrong password a 401.
#[post("/login")]
pub async fn login(
    accounts: web::Data<AccountService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let token = accounts
        .login(&login_data.email, &login_data.password)
        .await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "user logged in successfully".into(),
        token,
    }))
}
