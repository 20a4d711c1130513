//! Optimistic load-apply-commit runner shared by the mutating services.

use super::error::{MarketplaceError, MarketplaceResult};
use crate::task::{
    domain::{TaskAggregate, TaskId},
    ports::{TaskRepository, TaskRepositoryError},
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default number of commit attempts before giving up on a contended task.
pub const DEFAULT_MAX_COMMIT_ATTEMPTS: u32 = 5;

/// Applies a change to a freshly loaded aggregate and commits it under an
/// expected-version guard, re-running the change when another writer wins.
#[derive(Debug)]
pub(crate) struct UnitOfWork<R> {
    repository: Arc<R>,
    max_attempts: u32,
}

impl<R> Clone for UnitOfWork<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            max_attempts: self.max_attempts,
        }
    }
}

impl<R> UnitOfWork<R>
where
    R: TaskRepository,
{
    pub(crate) fn new(repository: Arc<R>, max_attempts: u32) -> Self {
        Self {
            repository,
            max_attempts: max_attempts.max(1),
        }
    }

    pub(crate) const fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub(crate) const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Loads the aggregate or reports the task as missing.
    pub(crate) async fn load(&self, task_id: TaskId) -> MarketplaceResult<TaskAggregate> {
        self.repository
            .load(task_id)
            .await?
            .ok_or(MarketplaceError::TaskNotFound(task_id))
    }

    /// Runs `change` against the current aggregate and commits the result.
    ///
    /// `change` authorizes and applies one domain transition; it is re-run
    /// from a fresh load after each version conflict, so every guard is
    /// re-evaluated against the winner's state. Returns the value produced by
    /// the successful attempt together with the committed aggregate.
    pub(crate) async fn run<T, F>(
        &self,
        task_id: TaskId,
        mut change: F,
    ) -> MarketplaceResult<(T, TaskAggregate)>
    where
        F: FnMut(&mut TaskAggregate) -> MarketplaceResult<T> + Send,
        T: Send,
    {
        let mut attempt = 1;
        loop {
            let mut aggregate = self.load(task_id).await?;
            let output = change(&mut aggregate)?;
            let expected = aggregate.bump_version();
            match self.repository.commit(&aggregate, expected).await {
                Ok(()) => return Ok((output, aggregate)),
                Err(TaskRepositoryError::VersionConflict { actual, .. })
                    if attempt < self.max_attempts =>
                {
                    debug!(
                        task_id = %task_id,
                        attempt,
                        expected,
                        actual,
                        "task version moved during commit; retrying"
                    );
                    attempt += 1;
                }
                Err(TaskRepositoryError::VersionConflict { .. }) => {
                    warn!(
                        task_id = %task_id,
                        attempts = attempt,
                        "giving up after repeated version conflicts"
                    );
                    return Err(MarketplaceError::ConcurrentModification(task_id));
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
