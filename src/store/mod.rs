//! Record store capabilities used by the flows, plus the backends that provide them.
//!
//! Stores are plain CRUD. Business rules such as email uniqueness live in the
//! services that call them.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

use crate::models::{NewUser, Task, TaskInput, User};

pub use memory::{InMemoryTaskStore, InMemoryUserStore};
pub use postgres::{PgTaskStore, PgUserStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The operation did not finish within the configured limit.
    Timeout(Duration),
    /// The backend reported a failure.
    Backend(String),
    /// A stored record could not be turned back into a domain value.
    Corrupt(String),
    /// An update targeted a record that does not exist.
    NotFound,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::Timeout(limit) => write!(f, "store operation timed out after {:?}", limit),
            StoreError::Backend(msg) => write!(f, "store backend error: {}", msg),
            StoreError::Corrupt(msg) => write!(f, "corrupt record: {}", msg),
            StoreError::NotFound => write!(f, "record not found"),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> StoreError {
        match error {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            _ => StoreError::Backend(error.to_string()),
        }
    }
}

/// Persistent directory of user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user, assigning its id.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Overwrites the stored record that has `user.id`.
    async fn update(&self, user: &User) -> Result<(), StoreError>;

    async fn count_all(&self) -> Result<u64, StoreError>;
}

/// Persistent collection of tasks.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, input: TaskInput) -> Result<Task, StoreError>;

    async fn list(&self) -> Result<Vec<Task>, StoreError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError>;

    /// Replaces the task's fields. `None` if no task has that id.
    async fn update(&self, id: Uuid, input: TaskInput) -> Result<Option<Task>, StoreError>;

    /// Returns whether a task was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Runs a store operation, failing with `StoreError::Timeout` once `limit` elapses.
///
/// On timeout the future is dropped; the backend is left to finish or abandon
/// its own single operation.
pub async fn with_timeout<T, F>(limit: Duration, operation: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_with_timeout_passes_result_through() {
        let ok = with_timeout(Duration::from_secs(1), async { Ok::<_, StoreError>(7) }).await;
        assert_eq!(ok, Ok(7));

        let err = with_timeout(Duration::from_secs(1), async {
            Err::<u8, _>(StoreError::Backend("boom".into()))
        })
        .await;
        assert_eq!(err, Err(StoreError::Backend("boom".into())));
    }

    #[actix_rt::test]
    async fn test_with_timeout_expires() {
        let limit = Duration::from_millis(20);
        let result = with_timeout(limit, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, StoreError>(())
        })
        .await;
        assert_eq!(result, Err(StoreError::Timeout(limit)));
    }
}
