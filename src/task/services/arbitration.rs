//! Service layer for deciding on applications.

use super::{
    error::{MarketplaceError, MarketplaceResult},
    unit_of_work::UnitOfWork,
};
use crate::task::{
    domain::{ApplicationDecision, ApplicationId, DecisionOutcome, Task, UserId, authorize},
    ports::TaskRepository,
};
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// Outcome of a committed decision together with the task it left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArbitrationOutcome {
    /// The decided application and any siblings rejected alongside it.
    pub decision: DecisionOutcome,
    /// The task after the decision was committed.
    pub task: Task,
}

/// Arbitration orchestration service.
pub struct ArbitrationService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    unit_of_work: UnitOfWork<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for ArbitrationService<R, C>
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

impl<R, C> ArbitrationService<R, C>
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

    /// Applies `decision` to an application as a single atomic change to its
    /// task.
    ///
    /// Accepting assigns the task and rejects every other pending application
    /// in the same commit. Concurrent decisions on one task are serialized by
    /// the version guard; a loser is re-evaluated against the winner's state.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::ApplicationNotFound`],
    /// [`MarketplaceError::Access`] when `actor` lacks the capability the
    /// decision requires, [`MarketplaceError::Domain`] when the application
    /// is no longer pending or the task is no longer open, or
    /// [`MarketplaceError::ConcurrentModification`].
    pub async fn decide(
        &self,
        application_id: ApplicationId,
        decision: ApplicationDecision,
        actor: UserId,
    ) -> MarketplaceResult<ArbitrationOutcome> {
        let task_id = self
            .unit_of_work
            .repository()
            .find_application(application_id)
            .await?
            .map(|application| application.task_id())
            .ok_or(MarketplaceError::ApplicationNotFound(application_id))?;
        let clock = &*self.clock;
        let (outcome, aggregate) = self
            .unit_of_work
            .run(task_id, |aggregate| {
                let application = aggregate
                    .application(application_id)
                    .ok_or(MarketplaceError::ApplicationNotFound(application_id))?;
                authorize(
                    actor,
                    decision.operation(),
                    aggregate.task(),
                    Some(application),
                )?;
                Ok(aggregate.decide(application_id, decision, clock)?)
            })
            .await?;
        info!(
            task_id = %task_id,
            application_id = %application_id,
            actor = %actor,
            status = %outcome.application.status(),
            rejected_siblings = outcome.rejected_siblings.len(),
            "application decided"
        );
        Ok(ArbitrationOutcome {
            decision: outcome,
            task: aggregate.into_parts().0,
        })
    }
}
