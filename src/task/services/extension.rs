//! Service layer for deadline extension negotiation.

use super::{
    error::MarketplaceResult,
    requests::{RequestExtensionRequest, RespondExtensionRequest},
    unit_of_work::UnitOfWork,
};
use crate::task::{
    domain::{Operation, Task, TaskId, UserId, authorize},
    ports::TaskRepository,
};
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// Deadline extension orchestration service.
pub struct ExtensionService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    unit_of_work: UnitOfWork<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for ExtensionService<R, C>
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

impl<R, C> ExtensionService<R, C>
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

    /// Installs a pending extension request from the assigned worker.
    ///
    /// # Errors
    ///
    /// Returns [`super::MarketplaceError::Access`] unless `actor` is the
    /// assigned worker, or [`super::MarketplaceError::Domain`] when the task
    /// is not in progress, a request is already pending, or the message is
    /// blank.
    pub async fn request(
        &self,
        task_id: TaskId,
        actor: UserId,
        request: RequestExtensionRequest,
    ) -> MarketplaceResult<Task> {
        let clock = &*self.clock;
        let ((), aggregate) = self
            .unit_of_work
            .run(task_id, |aggregate| {
                authorize(actor, Operation::RequestExtension, aggregate.task(), None)?;
                aggregate.task_mut().request_extension(
                    actor,
                    request.message(),
                    request.new_deadline(),
                    clock,
                )?;
                Ok(())
            })
            .await?;
        info!(task_id = %task_id, actor = %actor, "deadline extension requested");
        Ok(aggregate.into_parts().0)
    }

    /// Answers the pending extension request on behalf of the task owner.
    ///
    /// # Errors
    ///
    /// Returns [`super::MarketplaceError::Access`] unless `actor` owns the
    /// task, or [`super::MarketplaceError::Domain`] when the task is not in
    /// progress or nothing awaits an answer.
    pub async fn respond(
        &self,
        task_id: TaskId,
        actor: UserId,
        response: RespondExtensionRequest,
    ) -> MarketplaceResult<Task> {
        let clock = &*self.clock;
        let ((), aggregate) = self
            .unit_of_work
            .run(task_id, |aggregate| {
                authorize(actor, Operation::RespondExtension, aggregate.task(), None)?;
                aggregate.task_mut().respond_extension(
                    response.approved(),
                    response.response_message(),
                    clock,
                )?;
                Ok(())
            })
            .await?;
        info!(
            task_id = %task_id,
            actor = %actor,
            approved = response.approved(),
            "deadline extension answered"
        );
        Ok(aggregate.into_parts().0)
    }
}
