use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::models::{Task, TaskInput};
use crate::store::{with_timeout, StoreError, TaskRepository};

/// Thin pass-through to the task store with the same per-call timeout as the
/// account flows.
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    timeout: Duration,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskRepository>, timeout: Duration) -> Self {
        Self { tasks, timeout }
    }

    pub async fn create(&self, input: TaskInput) -> Result<Task, StoreError> {
        with_timeout(self.timeout, self.tasks.create(input)).await
    }

    pub async fn list(&self) -> Result<Vec<Task>, StoreError> {
        with_timeout(self.timeout, self.tasks.list()).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        with_timeout(self.timeout, self.tasks.get_by_id(id)).await
    }

    pub async fn update(&self, id: Uuid, input: TaskInput) -> Result<Option<Task>, StoreError> {
        with_timeout(self.timeout, self.tasks.update(id, input)).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        with_timeout(self.timeout, self.tasks.delete(id)).await
    }
}
