//!
//! # Custom Error Handling
//!
//! This module defines `AppError`, the HTTP-facing error type returned by every handler.
//! Component errors (`PasswordError`, `TokenError`, `StoreError`, `AccountError`,
//! `ClaimsError`) are converted into it through `From` impls so handlers can use `?`.
//!
//! `AppError` implements `actix_web::error::ResponseError`, rendering a JSON body of the
//! form `{"error": <message>}`. Internal failures are logged here and always reach the
//! client as the generic `"internal server error"`.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use log::error;
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::extractors::ClaimsError;
use crate::auth::password::PasswordError;
use crate::auth::token::TokenError;
use crate::services::accounts::AccountError;
use crate::store::StoreError;

/// Message sent to clients for every 500 response.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Represents all errors a handler can return.
///
/// Each variant carries the message shown to the client, except
/// `InternalServerError` whose message is only logged.
#[derive(Debug)]
pub enum AppError {
    /// Missing, invalid or expired credentials, or a role mismatch (HTTP 401).
    Unauthorized(String),
    /// Malformed request, typically an unparsable body (HTTP 400).
    BadRequest(String),
    /// The requested user or task does not exist (HTTP 404).
    NotFound(String),
    /// Input rejected by a flow rule, or a conflict such as a duplicate email (HTTP 406).
    NotAcceptable(String),
    /// Field-level validation failure reported by `validator` (HTTP 406).
    ValidationError(String),
    /// Unexpected server-side failure (HTTP 500).
    InternalServerError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::NotAcceptable(msg) => write!(f, "Not Acceptable: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl AppError {
    /// Logs `detail` server-side and returns a generic internal error.
    pub fn internal(detail: impl fmt::Display) -> Self {
        error!("{}", detail);
        AppError::InternalServerError(detail.to_string())
    }

    /// The message exposed to the client.
    pub fn public_message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::NotAcceptable(msg)
            | AppError::ValidationError(msg) => msg,
            AppError::InternalServerError(_) => INTERNAL_ERROR_MESSAGE,
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::NotAcceptable(_) | AppError::ValidationError(_) => {
                StatusCode::NOT_ACCEPTABLE
            }
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.public_message()
        }))
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        AppError::internal(format!("store failure: {}", error))
    }
}

impl From<PasswordError> for AppError {
    fn from(error: PasswordError) -> AppError {
        match error {
            PasswordError::Mismatch => AppError::Unauthorized("incorrect password".into()),
            PasswordError::TooLong => AppError::NotAcceptable(error.to_string()),
            PasswordError::Hashing(_) => AppError::internal(error),
        }
    }
}

/// Token failures become 401s. Expiry gets its own message; every other
/// rejection is reported as "unauthorized user".
impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        match error {
            TokenError::Expired => AppError::Unauthorized("token has expired".into()),
            TokenError::Signing(_) => AppError::internal(error),
            TokenError::Malformed | TokenError::BadSignature | TokenError::UnexpectedAlgorithm => {
                AppError::Unauthorized("unauthorized user".into())
            }
        }
    }
}

/// A missing claims value means the authentication gate did not run before
/// the handler. That is a routing bug, not a client error.
impl From<ClaimsError> for AppError {
    fn from(error: ClaimsError) -> AppError {
        AppError::internal(error)
    }
}

impl From<AccountError> for AppError {
    fn from(error: AccountError) -> AppError {
        match error {
            AccountError::WeakPassword
            | AccountError::PasswordTooLong
            | AccountError::InvalidRole(_)
            | AccountError::EmptyName
            | AccountError::InvalidEmail
            | AccountError::AdminBootstrapViolation
            | AccountError::DuplicateUser => AppError::NotAcceptable(error.to_string()),
            AccountError::NoSuchUser | AccountError::UserNotFound => {
                AppError::NotFound(error.to_string())
            }
            AccountError::InvalidCredentials => AppError::Unauthorized(error.to_string()),
            AccountError::Store(e) => e.into(),
            AccountError::Password(e) => e.into(),
            AccountError::Token(e) => e.into(),
        }
    }
}
