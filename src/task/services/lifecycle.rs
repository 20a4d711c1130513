//! Service layer for posting, reading, editing, and deleting tasks.

use super::{
    error::{MarketplaceError, MarketplaceResult},
    requests::{CreateTaskRequest, UpdateTaskRequest},
    unit_of_work::UnitOfWork,
};
use crate::task::{
    domain::{Operation, Task, TaskId, UserId, authorize},
    ports::{TaskQuery, TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Task record orchestration service.
pub struct TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    unit_of_work: UnitOfWork<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            unit_of_work: self.unit_of_work.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    pub(crate) const fn from_parts(unit_of_work: UnitOfWork<R>, clock: Arc<C>) -> Self {
        Self {
            unit_of_work,
            clock,
        }
    }

    /// Posts a new open task owned by `client_id`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Domain`] when the title is blank or the
    /// budget is zero, or [`MarketplaceError::Repository`] when persistence
    /// fails.
    pub async fn create(
        &self,
        client_id: UserId,
        request: CreateTaskRequest,
    ) -> MarketplaceResult<Task> {
        let (attributes, deadline) = request.into_attributes()?;
        let task = Task::new(client_id, attributes, deadline, &*self.clock);
        self.unit_of_work.repository().insert(&task).await?;
        info!(task_id = %task.id(), actor = %client_id, "task created");
        Ok(task)
    }

    /// Retrieves a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::TaskNotFound`] when no such task exists.
    pub async fn find(&self, task_id: TaskId) -> MarketplaceResult<Task> {
        let aggregate = self.unit_of_work.load(task_id).await?;
        Ok(aggregate.into_parts().0)
    }

    /// Lists tasks matching `query`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Repository`] when the lookup fails.
    pub async fn list(&self, query: TaskQuery) -> MarketplaceResult<Vec<Task>> {
        Ok(self.unit_of_work.repository().list_tasks(&query).await?)
    }

    /// Edits the descriptive attributes of a task on behalf of its owner.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Access`] unless `actor` owns the task,
    /// [`MarketplaceError::Domain`] for invalid patch values, or
    /// [`MarketplaceError::TaskNotFound`].
    pub async fn update(
        &self,
        task_id: TaskId,
        actor: UserId,
        request: UpdateTaskRequest,
    ) -> MarketplaceResult<Task> {
        let patch = request.into_patch()?;
        let clock = &*self.clock;
        let ((), aggregate) = self
            .unit_of_work
            .run(task_id, |aggregate| {
                authorize(actor, Operation::UpdateTask, aggregate.task(), None)?;
                aggregate.task_mut().apply_patch(patch.clone(), clock);
                Ok(())
            })
            .await?;
        info!(task_id = %task_id, actor = %actor, "task updated");
        Ok(aggregate.into_parts().0)
    }

    /// Deletes a task and its applications on behalf of its owner.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Access`] unless `actor` owns the task,
    /// [`MarketplaceError::Domain`] while the task is in progress,
    /// [`MarketplaceError::TaskNotFound`], or
    /// [`MarketplaceError::ConcurrentModification`] when the task keeps
    /// changing underneath the request.
    pub async fn delete(&self, task_id: TaskId, actor: UserId) -> MarketplaceResult<()> {
        let repository = self.unit_of_work.repository();
        let max_attempts = self.unit_of_work.max_attempts();
        let mut attempt = 1;
        loop {
            let aggregate = self.unit_of_work.load(task_id).await?;
            let task = aggregate.task();
            authorize(actor, Operation::DeleteTask, task, None)?;
            task.ensure_deletable()?;
            match repository.delete(task_id, task.version()).await {
                Ok(()) => {
                    info!(task_id = %task_id, actor = %actor, "task deleted");
                    return Ok(());
                }
                Err(TaskRepositoryError::NotFound(_)) => {
                    return Err(MarketplaceError::TaskNotFound(task_id));
                }
                Err(TaskRepositoryError::VersionConflict { .. }) if attempt < max_attempts => {
                    debug!(task_id = %task_id, attempt, "task changed before delete; retrying");
                    attempt += 1;
                }
                Err(TaskRepositoryError::VersionConflict { .. }) => {
                    warn!(
                        task_id = %task_id,
                        attempts = attempt,
                        "giving up delete after repeated version conflicts"
                    );
                    return Err(MarketplaceError::ConcurrentModification(task_id));
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
