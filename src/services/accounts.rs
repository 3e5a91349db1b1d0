//! Registration, login and promotion flows.
//!
//! Every store call goes through [`with_timeout`]. The duplicate-email check
//! and the promotion read-modify-write are separate store operations and are
//! not atomic; concurrent requests can race.

use log::info;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use validator::validate_email;

use crate::auth::{
    PasswordError, PasswordHasher, RegisterRequest, TokenError, TokenService, MAX_PASSWORD_BYTES,
};
use crate::models::{NewUser, Role, UnknownRole, User};
use crate::store::{with_timeout, StoreError, UserRepository};

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    WeakPassword,
    /// Longer than bcrypt can hash without truncating.
    PasswordTooLong,
    InvalidRole(UnknownRole),
    EmptyName,
    InvalidEmail,
    /// ADMIN requested while the directory already holds users.
    AdminBootstrapViolation,
    DuplicateUser,
    /// Login with an email nobody registered.
    NoSuchUser,
    /// Login with the wrong password.
    InvalidCredentials,
    /// Promotion target does not exist.
    UserNotFound,
    Store(StoreError),
    Password(PasswordError),
    Token(TokenError),
}

impl fmt::Display for AccountError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AccountError::WeakPassword => write!(
                f,
                "password must be at least {} characters long",
                MIN_PASSWORD_LEN
            ),
            AccountError::PasswordTooLong => write!(
                f,
                "password must be at most {} bytes long",
                MAX_PASSWORD_BYTES
            ),
            AccountError::InvalidRole(_) => {
                write!(f, "invalid user role, user role is either 'USER' or 'ADMIN'")
            }
            AccountError::EmptyName => write!(f, "empty name field not allowed"),
            AccountError::InvalidEmail => write!(f, "invalid email address"),
            AccountError::AdminBootstrapViolation => {
                write!(f, "admin can only be registered if no users exist")
            }
            AccountError::DuplicateUser => write!(f, "user already exists"),
            AccountError::NoSuchUser => write!(f, "user doesn't exist"),
            AccountError::InvalidCredentials => write!(f, "incorrect password"),
            AccountError::UserNotFound => write!(f, "user not found"),
            AccountError::Store(e) => write!(f, "{}", e),
            AccountError::Password(e) => write!(f, "{}", e),
            AccountError::Token(e) => write!(f, "{}", e),
        }
    }
}

impl From<StoreError> for AccountError {
    fn from(error: StoreError) -> Self {
        AccountError::Store(error)
    }
}

impl From<PasswordError> for AccountError {
    fn from(error: PasswordError) -> Self {
        AccountError::Password(error)
    }
}

impl From<TokenError> for AccountError {
    fn from(error: TokenError) -> Self {
        AccountError::Token(error)
    }
}

/// Outcome of a promotion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion {
    Promoted,
    AlreadyAdmin,
}

impl Promotion {
    pub fn message(&self) -> &'static str {
        match self {
            Promotion::Promoted => "user promoted to admin status",
            Promotion::AlreadyAdmin => "user is already an admin",
        }
    }
}

/// Runs bcrypt off the async workers.
async fn blocking<T, F>(work: F) -> Result<T, PasswordError>
where
    F: FnOnce() -> Result<T, PasswordError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| PasswordError::Hashing(format!("hashing task failed: {}", e)))?
}

/// Runs the account flows against an injected user directory.
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    tokens: TokenService,
    timeout: Duration,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenService, timeout: Duration) -> Self {
        Self {
            users,
            hasher: PasswordHasher::default(),
            tokens,
            timeout,
        }
    }

    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Checks that need no store access, in fixed order.
    fn validate_registration(req: &RegisterRequest) -> Result<Role, AccountError> {
        if req.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountError::WeakPassword);
        }
        if req.password.len() > MAX_PASSWORD_BYTES {
            return Err(AccountError::PasswordTooLong);
        }
        let role: Role = req.role.parse().map_err(AccountError::InvalidRole)?;
        if req.name.is_empty() {
            return Err(AccountError::EmptyName);
        }
        if !validate_email(req.email.as_str()) {
            return Err(AccountError::InvalidEmail);
        }
        Ok(role)
    }

    /// Registers a new user.
    ///
    /// An ADMIN account can only be self-registered while the directory is
    /// empty. Later admins must be promoted.
    pub async fn register(&self, req: RegisterRequest) -> Result<User, AccountError> {
        let role = Self::validate_registration(&req)?;

        let existing = with_timeout(self.timeout, self.users.count_all()).await?;
        if role == Role::Admin && existing > 0 {
            return Err(AccountError::AdminBootstrapViolation);
        }

        if with_timeout(self.timeout, self.users.get_by_email(&req.email))
            .await?
            .is_some()
        {
            return Err(AccountError::DuplicateUser);
        }

        let hasher = self.hasher;
        let plaintext = req.password;
        let password_hash = blocking(move || hasher.hash(&plaintext)).await?;
        let user = with_timeout(
            self.timeout,
            self.users.create(NewUser {
                name: req.name,
                email: req.email,
                password_hash,
                role,
            }),
        )
        .await?;

        info!("registered user {} with role {}", user.id, user.role);
        Ok(user)
    }

    /// Verifies credentials and issues a token reflecting the user's current role.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AccountError> {
        let user = with_timeout(self.timeout, self.users.get_by_email(email))
            .await?
            .ok_or(AccountError::NoSuchUser)?;

        let hasher = self.hasher;
        let plaintext = password.to_string();
        let stored = user.password_hash.clone();
        blocking(move || hasher.verify(&plaintext, &stored))
            .await
            .map_err(|e| match e {
                PasswordError::Mismatch => AccountError::InvalidCredentials,
                other => AccountError::Password(other),
            })?;

        Ok(self.tokens.issue(&user)?)
    }

    /// Raises a user to ADMIN. Promoting an admin is a no-op.
    pub async fn promote(&self, user_id: Uuid) -> Result<Promotion, AccountError> {
        let mut user = with_timeout(self.timeout, self.users.get_by_id(user_id))
            .await?
            .ok_or(AccountError::UserNotFound)?;

        if user.is_admin() {
            return Ok(Promotion::AlreadyAdmin);
        }

        user.role = Role::Admin;
        with_timeout(self.timeout, self.users.update(&user)).await?;

        info!("promoted user {} to {}", user.id, user.role);
        Ok(Promotion::Promoted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_token;
    use crate::store::InMemoryUserStore;
    use async_trait::async_trait;

    const SECRET: &str = "accounts-test-secret";

    fn service_with(users: Arc<dyn UserRepository>) -> AccountService {
        AccountService::new(users, TokenService::new(SECRET, 1), Duration::from_secs(2))
            .with_hasher(PasswordHasher::with_cost(4))
    }

    fn service() -> AccountService {
        service_with(Arc::new(InMemoryUserStore::new()))
    }

    fn request(name: &str, email: &str, password: &str, role: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            role: role.into(),
        }
    }

    /// Fails every operation. Used to check that store errors surface.
    struct BrokenStore;

    #[async_trait]
    impl UserRepository for BrokenStore {
        async fn create(&self, _user: NewUser) -> Result<User, StoreError> {
            Err(StoreError::Backend("down".into()))
        }
        async fn get_by_id(&self, _id: Uuid) -> Result<Option<User>, StoreError> {
            Err(StoreError::Backend("down".into()))
        }
        async fn get_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
            Err(StoreError::Backend("down".into()))
        }
        async fn update(&self, _user: &User) -> Result<(), StoreError> {
            Err(StoreError::Backend("down".into()))
        }
        async fn count_all(&self) -> Result<u64, StoreError> {
            Err(StoreError::Backend("down".into()))
        }
    }

    /// Never answers within the flow timeout.
    struct StalledStore;

    #[async_trait]
    impl UserRepository for StalledStore {
        async fn create(&self, _user: NewUser) -> Result<User, StoreError> {
            std::future::pending().await
        }
        async fn get_by_id(&self, _id: Uuid) -> Result<Option<User>, StoreError> {
            std::future::pending().await
        }
        async fn get_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
            std::future::pending().await
        }
        async fn update(&self, _user: &User) -> Result<(), StoreError> {
            std::future::pending().await
        }
        async fn count_all(&self) -> Result<u64, StoreError> {
            std::future::pending().await
        }
    }

    #[actix_rt::test]
    async fn test_first_user_may_register_as_admin() {
        let accounts = service();
        let user = accounts
            .register(request("A", "a@x.com", "secret1", "ADMIN"))
            .await
            .unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_ne!(user.password_hash, "secret1");
    }

    #[actix_rt::test]
    async fn test_second_admin_is_rejected() {
        let accounts = service();
        accounts
            .register(request("A", "a@x.com", "secret1", "USER"))
            .await
            .unwrap();

        let err = accounts
            .register(request("B", "b@x.com", "secret2", "ADMIN"))
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::AdminBootstrapViolation);

        // USER registrations are still open.
        assert!(accounts
            .register(request("C", "c@x.com", "secret3", "USER"))
            .await
            .is_ok());
    }

    #[actix_rt::test]
    async fn test_local_checks_run_in_order_before_store_access() {
        // The broken store proves no store call happens for these.
        let accounts = service_with(Arc::new(BrokenStore));

        let cases = vec![
            (request("", "bad", "123", "ROOT"), AccountError::WeakPassword),
            (
                request("", "bad", "secret1", "ROOT"),
                AccountError::InvalidRole(UnknownRole("ROOT".into())),
            ),
            (request("", "bad", "secret1", "USER"), AccountError::EmptyName),
            (request("A", "bad", "secret1", "USER"), AccountError::InvalidEmail),
        ];
        for (req, expected) in cases {
            assert_eq!(accounts.register(req).await.unwrap_err(), expected);
        }
    }

    #[actix_rt::test]
    async fn test_password_length_counts_characters() {
        let accounts = service();
        // Six characters, more than six bytes.
        assert!(accounts
            .register(request("A", "a@x.com", "pässwö", "USER"))
            .await
            .is_ok());
        assert_eq!(
            accounts
                .register(request("B", "b@x.com", "12345", "USER"))
                .await
                .unwrap_err(),
            AccountError::WeakPassword
        );
    }

    #[actix_rt::test]
    async fn test_password_longer_than_bcrypt_input_is_rejected() {
        let accounts = service();
        let too_long = format!("{}CORRECT", "a".repeat(72));
        assert_eq!(
            accounts
                .register(request("A", "a@x.com", &too_long, "USER"))
                .await
                .unwrap_err(),
            AccountError::PasswordTooLong
        );

        // At the limit the whole password counts.
        let stored = "a".repeat(MAX_PASSWORD_BYTES);
        accounts
            .register(request("A", "a@x.com", &stored, "USER"))
            .await
            .unwrap();
        let longer = format!("{}-different", stored);
        assert_eq!(
            accounts.login("a@x.com", &longer).await.unwrap_err(),
            AccountError::InvalidCredentials
        );
        assert!(accounts.login("a@x.com", &stored).await.is_ok());
    }

    #[actix_rt::test]
    async fn test_duplicate_email_is_rejected() {
        let accounts = service();
        accounts
            .register(request("A", "a@x.com", "secret1", "USER"))
            .await
            .unwrap();
        assert_eq!(
            accounts
                .register(request("A2", "a@x.com", "secret2", "USER"))
                .await
                .unwrap_err(),
            AccountError::DuplicateUser
        );
    }

    #[actix_rt::test]
    async fn test_login_outcomes() {
        let accounts = service();
        let user = accounts
            .register(request("A", "a@x.com", "secret1", "ADMIN"))
            .await
            .unwrap();

        assert_eq!(
            accounts.login("nobody@x.com", "secret1").await.unwrap_err(),
            AccountError::NoSuchUser
        );
        assert_eq!(
            accounts.login("a@x.com", "wrong").await.unwrap_err(),
            AccountError::InvalidCredentials
        );

        let token = accounts.login("a@x.com", "secret1").await.unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.id, user.id);
        assert_eq!(claims.name, "A");
        assert_eq!(claims.role, Role::Admin);
    }

    #[actix_rt::test]
    async fn test_promotion() {
        let users = Arc::new(InMemoryUserStore::new());
        let accounts = service_with(users.clone());
        let user = accounts
            .register(request("A", "a@x.com", "secret1", "USER"))
            .await
            .unwrap();
        let stale_token = accounts.login("a@x.com", "secret1").await.unwrap();

        assert_eq!(accounts.promote(user.id).await.unwrap(), Promotion::Promoted);
        assert_eq!(
            users.get_by_id(user.id).await.unwrap().unwrap().role,
            Role::Admin
        );
        assert_eq!(
            accounts.promote(user.id).await.unwrap(),
            Promotion::AlreadyAdmin
        );

        // Tokens issued before the promotion keep the old role.
        assert_eq!(verify_token(&stale_token, SECRET).unwrap().role, Role::User);
        let fresh = accounts.login("a@x.com", "secret1").await.unwrap();
        assert_eq!(verify_token(&fresh, SECRET).unwrap().role, Role::Admin);
    }

    #[actix_rt::test]
    async fn test_promoting_unknown_user() {
        assert_eq!(
            service().promote(Uuid::new_v4()).await.unwrap_err(),
            AccountError::UserNotFound
        );
    }

    #[actix_rt::test]
    async fn test_store_failures_surface() {
        let accounts = service_with(Arc::new(BrokenStore));
        assert!(matches!(
            accounts
                .register(request("A", "a@x.com", "secret1", "USER"))
                .await,
            Err(AccountError::Store(StoreError::Backend(_)))
        ));
        assert!(matches!(
            accounts.login("a@x.com", "secret1").await,
            Err(AccountError::Store(_))
        ));
        assert!(matches!(
            accounts.promote(Uuid::new_v4()).await,
            Err(AccountError::Store(_))
        ));
    }

    #[actix_rt::test]
    async fn test_store_calls_are_bounded() {
        let limit = Duration::from_millis(20);
        let accounts = AccountService::new(
            Arc::new(StalledStore),
            TokenService::new(SECRET, 1),
            limit,
        );
        assert_eq!(
            accounts.login("a@x.com", "secret1").await.unwrap_err(),
            AccountError::Store(StoreError::Timeout(limit))
        );
    }
}
