use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::fmt;
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::error::AppError;

/// Raised when a handler or gate asks for claims that were never attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimsError {
    Missing,
}

impl fmt::Display for ClaimsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClaimsError::Missing => write!(
                f,
                "no claims attached to request; AuthMiddleware must run before this point"
            ),
        }
    }
}

/// Reads the verified claims attached by `AuthMiddleware`.
///
/// This is the only place request extensions are consulted for identity.
pub fn claims_of<M: HttpMessage>(message: &M) -> Result<Claims, ClaimsError> {
    message
        .extensions()
        .get::<Claims>()
        .cloned()
        .ok_or(ClaimsError::Missing)
}

/// Extracts the authenticated caller's claims from request extensions.
///
/// Intended for routes behind `AuthMiddleware`. A missing value is reported as
/// an internal error since it indicates a misordered middleware chain.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            claims_of(req)
                .map(AuthenticatedUser)
                .map_err(|e| AppError::from(e).into()),
        )
    }
}
