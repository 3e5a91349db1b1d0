use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::{Role, User};

/// HMAC algorithms accepted on verification. Tokens are always issued with HS256.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Represents the claims encoded within a signed token.
///
/// The role is a snapshot taken at issuance; a later promotion is not
/// reflected until the holder logs in again.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Identifier of the user the token was issued to.
    pub id: Uuid,
    /// Display name of the user at issuance.
    pub name: String,
    /// Role of the user at issuance.
    pub role: Role,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Reasons a token can be rejected or fail to be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not a well-formed token, or the payload is not a valid claims object.
    Malformed,
    /// The MAC does not match the configured secret.
    BadSignature,
    /// The expiration time is not in the future.
    Expired,
    /// The header declares an algorithm outside the HMAC family.
    UnexpectedAlgorithm,
    /// Encoding failed while issuing a token.
    Signing(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "malformed token"),
            TokenError::BadSignature => write!(f, "bad token signature"),
            TokenError::Expired => write!(f, "token has expired"),
            TokenError::UnexpectedAlgorithm => write!(f, "unexpected signing algorithm"),
            TokenError::Signing(msg) => write!(f, "failed to sign token: {}", msg),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(error: jsonwebtoken::errors::Error) -> TokenError {
        match error.kind() {
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                TokenError::UnexpectedAlgorithm
            }
            _ => TokenError::Malformed,
        }
    }
}

/// Issues a token for the given identity, valid for `validity_hours` from now.
///
/// A non-positive `validity_hours` produces a token that is already expired.
pub fn issue_token(
    user_id: Uuid,
    display_name: &str,
    role: Role,
    secret: &str,
    validity_hours: i64,
) -> Result<String, TokenError> {
    let exp = validity_hours
        .checked_mul(3600)
        .and_then(|secs| Utc::now().timestamp().checked_add(secs))
        .ok_or_else(|| TokenError::Signing("expiration out of range".into()))?;

    let claims = Claims {
        id: user_id,
        name: display_name.to_string(),
        role,
        exp,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))
}

/// Verifies a token's algorithm, signature and expiry, returning its claims.
///
/// A token is valid strictly before `exp`; at or after it, `Expired` is returned.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let header = decode_header(token)?;
    if !ACCEPTED_ALGORITHMS.contains(&header.alg) {
        return Err(TokenError::UnexpectedAlgorithm);
    }

    let mut validation = Validation::new(header.alg);
    validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
    validation.set_required_spec_claims(&["exp"]);
    // Expiry is checked below without leeway.
    validation.validate_exp = false;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?
    .claims;

    if claims.exp <= Utc::now().timestamp() {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}

/// Issues and verifies tokens with a fixed secret and validity window.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    validity_hours: i64,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"<redacted>")
            .field("validity_hours", &self.validity_hours)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: impl Into<String>, validity_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            validity_hours,
        }
    }

    /// Issues a token carrying the user's current id, name and role.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        issue_token(user.id, &user.name, user.role, &self.secret, self.validity_hours)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        verify_token(token, &self.secret)
    }
}
