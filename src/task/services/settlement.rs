//! Service layer for the delivery, receipt, and payment pipeline.

use super::{error::MarketplaceResult, unit_of_work::UnitOfWork};
use crate::task::{
    domain::{Operation, Task, TaskAggregate, TaskId, UserId, authorize},
    ports::TaskRepository,
};
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// Delivery and settlement orchestration service.
pub struct SettlementService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    unit_of_work: UnitOfWork<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for SettlementService<R, C>
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

impl<R, C> SettlementService<R, C>
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

    /// Records delivered work from the assigned worker.
    ///
    /// # Errors
    ///
    /// Returns [`super::MarketplaceError::Access`] unless `actor` is the
    /// assigned worker, or [`super::MarketplaceError::Domain`] unless the
    /// task is in progress and receipt has not been confirmed.
    pub async fn deliver(
        &self,
        task_id: TaskId,
        actor: UserId,
        message: Option<String>,
    ) -> MarketplaceResult<Task> {
        let clock = &*self.clock;
        let ((), aggregate) = self
            .unit_of_work
            .run(task_id, |aggregate| {
                authorize(actor, Operation::Deliver, aggregate.task(), None)?;
                aggregate
                    .task_mut()
                    .deliver(actor, message.clone(), clock)?;
                Ok(())
            })
            .await?;
        Ok(committed(aggregate, actor, "task delivered"))
    }

    /// Confirms receipt of delivered work on behalf of the task owner.
    ///
    /// # Errors
    ///
    /// Returns [`super::MarketplaceError::Access`] unless `actor` owns the
    /// task, or [`super::MarketplaceError::Domain`] unless work has been
    /// delivered and not yet received.
    pub async fn mark_received(&self, task_id: TaskId, actor: UserId) -> MarketplaceResult<Task> {
        let clock = &*self.clock;
        let ((), aggregate) = self
            .unit_of_work
            .run(task_id, |aggregate| {
                authorize(actor, Operation::MarkReceived, aggregate.task(), None)?;
                aggregate.task_mut().mark_received(clock)?;
                Ok(())
            })
            .await?;
        Ok(committed(aggregate, actor, "task delivery received"))
    }

    /// Settles payment and completes the task on behalf of its owner.
    ///
    /// # Errors
    ///
    /// Returns [`super::MarketplaceError::Access`] unless `actor` owns the
    /// task, or [`super::MarketplaceError::Domain`] unless receipt has been
    /// confirmed and payment has not already been made.
    pub async fn make_payment(&self, task_id: TaskId, actor: UserId) -> MarketplaceResult<Task> {
        let clock = &*self.clock;
        let ((), aggregate) = self
            .unit_of_work
            .run(task_id, |aggregate| {
                authorize(actor, Operation::MakePayment, aggregate.task(), None)?;
                aggregate.task_mut().make_payment(clock)?;
                Ok(())
            })
            .await?;
        Ok(committed(aggregate, actor, "task paid"))
    }
}

fn committed(aggregate: TaskAggregate, actor: UserId, event: &'static str) -> Task {
    let (task, _) = aggregate.into_parts();
    info!(
        task_id = %task.id(),
        actor = %actor,
        delivery_status = %task.delivery_status(),
        payment_status = %task.payment_status(),
        "{event}"
    );
    task
}
