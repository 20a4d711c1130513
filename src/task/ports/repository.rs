//! Repository port for task aggregate persistence and lookup.

use crate::task::domain::{
    Application, ApplicationId, ApplicationStatus, Task, TaskAggregate, TaskId, TaskStatus, UserId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Persistence contract for task aggregates.
///
/// A task and its applications are written together. Implementations must
/// apply [`TaskRepository::commit`] atomically: either the task row and every
/// application row are written, or nothing is.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a newly created task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn insert(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Loads a task together with all of its applications.
    ///
    /// Returns `None` when the task does not exist.
    async fn load(&self, id: TaskId) -> TaskRepositoryResult<Option<TaskAggregate>>;

    /// Persists the aggregate if the stored task is still at
    /// `expected_version`. The stored version becomes the aggregate's.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task no longer
    /// exists, [`TaskRepositoryError::VersionConflict`] when another writer
    /// committed first, or [`TaskRepositoryError::DuplicateApplication`] when a
    /// new application collides with an existing (task, worker) pair.
    async fn commit(
        &self,
        aggregate: &TaskAggregate,
        expected_version: u64,
    ) -> TaskRepositoryResult<()>;

    /// Deletes a task and its applications if the stored task is still at
    /// `expected_version`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] or
    /// [`TaskRepositoryError::VersionConflict`].
    async fn delete(&self, id: TaskId, expected_version: u64) -> TaskRepositoryResult<()>;

    /// Finds a single application by identifier.
    async fn find_application(
        &self,
        id: ApplicationId,
    ) -> TaskRepositoryResult<Option<Application>>;

    /// Lists tasks matching `query`, newest first.
    async fn list_tasks(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>>;

    /// Lists the applications filed by `worker_id`, newest first, optionally
    /// restricted to one status.
    async fn list_applications_for_worker(
        &self,
        worker_id: UserId,
        status: Option<ApplicationStatus>,
    ) -> TaskRepositoryResult<Vec<Application>>;
}

/// Filter for task listings. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskQuery {
    status: Option<TaskStatus>,
    client_id: Option<UserId>,
    assigned_worker_id: Option<UserId>,
}

impl TaskQuery {
    /// Creates a filter that matches every task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to tasks in `status`.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts to tasks owned by `client_id`.
    #[must_use]
    pub const fn with_client(mut self, client_id: UserId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    /// Restricts to tasks assigned to `worker_id`.
    #[must_use]
    pub const fn with_assigned_worker(mut self, worker_id: UserId) -> Self {
        self.assigned_worker_id = Some(worker_id);
        self
    }

    /// Returns the status filter.
    #[must_use]
    pub const fn status(&self) -> Option<TaskStatus> {
        self.status
    }

    /// Returns the owner filter.
    #[must_use]
    pub const fn client_id(&self) -> Option<UserId> {
        self.client_id
    }

    /// Returns the assignment filter.
    #[must_use]
    pub const fn assigned_worker_id(&self) -> Option<UserId> {
        self.assigned_worker_id
    }

    /// Returns `true` when `task` satisfies every set filter.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|status| task.status() == status)
            && self.client_id.is_none_or(|client| task.client_id() == client)
            && self
                .assigned_worker_id
                .is_none_or(|worker| task.assigned_worker_id() == Some(worker))
    }
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The (task, worker) pair already has an application.
    #[error("worker {worker_id} has already applied to task {task_id}")]
    DuplicateApplication {
        /// Task applied to.
        task_id: TaskId,
        /// Applying worker.
        worker_id: UserId,
    },

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The stored task version differs from the expected one.
    #[error("task {task_id} is at version {actual}, expected {expected}")]
    VersionConflict {
        /// Task being written.
        task_id: TaskId,
        /// Version the writer read.
        expected: u64,
        /// Version found in the store.
        actual: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
