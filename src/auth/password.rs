use bcrypt::{hash, verify, DEFAULT_COST};
use std::fmt;

/// bcrypt only reads this many bytes of input; anything past it is ignored.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Failure modes of password hashing and verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    /// bcrypt could not produce or parse a hash. Fatal for the calling flow.
    Hashing(String),
    /// The plaintext does not match the stored hash.
    Mismatch,
    /// The plaintext exceeds `MAX_PASSWORD_BYTES`.
    TooLong,
}

impl fmt::Display for PasswordError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PasswordError::Hashing(msg) => write!(f, "password hashing failed: {}", msg),
            PasswordError::Mismatch => write!(f, "password mismatch"),
            PasswordError::TooLong => write!(
                f,
                "password must be at most {} bytes long",
                MAX_PASSWORD_BYTES
            ),
        }
    }
}

impl From<bcrypt::BcryptError> for PasswordError {
    fn from(error: bcrypt::BcryptError) -> PasswordError {
        PasswordError::Hashing(error.to_string())
    }
}

/// Salted one-way password hashing backed by bcrypt.
///
/// The salt is embedded in the produced hash, so `verify` needs nothing but
/// the stored string.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    /// A hasher with a non-default bcrypt cost. Only tests should go below the default.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    /// Refuses input longer than `MAX_PASSWORD_BYTES` instead of letting
    /// bcrypt truncate it.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(PasswordError::TooLong);
        }
        Ok(hash(plaintext, self.cost)?)
    }

    /// Over-long input never matches: no stored hash can have been made from it.
    pub fn verify(&self, plaintext: &str, hashed: &str) -> Result<(), PasswordError> {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(PasswordError::Mismatch);
        }
        if verify(plaintext, hashed)? {
            Ok(())
        } else {
            Err(PasswordError::Mismatch)
        }
    }
}
