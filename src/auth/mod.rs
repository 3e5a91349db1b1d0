pub mod extractors;
pub mod guard;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use extractors::{claims_of, AuthenticatedUser, ClaimsError};
pub use guard::RequireRole;
pub use middleware::AuthMiddleware;
pub use password::{PasswordError, PasswordHasher, MAX_PASSWORD_BYTES};
pub use token::{issue_token, verify_token, Claims, TokenError, TokenService};

/// Represents the payload for a user login request.
#[derive(Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Represents the payload for a new user registration request.
///
/// `role` is kept as a plain string so an unknown role reaches the
/// registration checks instead of failing deserialization.
#[derive(Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Response body after a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    /// The signed bearer token.
    pub token: String,
}

/// Response body carrying only a status message.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_accepts_any_role_string() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name":"A","email":"a@x.com","password":"secret1","role":"ROOT"}"#,
        )
        .unwrap();
        assert_eq!(req.role, "ROOT");
    }

    #[test]
    fn test_debug_output_redacts_passwords() {
        let login = LoginRequest {
            email: "a@x.com".into(),
            password: "hunter22".into(),
        };
        let register = RegisterRequest {
            name: "A".into(),
            email: "a@x.com".into(),
            password: "hunter22".into(),
            role: "USER".into(),
        };

        for rendered in [format!("{:?}", login), format!("{:?}", register)] {
            assert!(!rendered.contains("hunter22"), "{}", rendered);
            assert!(rendered.contains("a@x.com"));
        }
    }

    #[test]
    fn test_login_request_requires_both_fields() {
        assert!(serde_json::from_str::<LoginRequest>(r#"{"email":"a@x.com"}"#).is_err());
        assert!(serde_json::from_str::<LoginRequest>(r#"{"password":"secret1"}"#).is_err());
    }
}
