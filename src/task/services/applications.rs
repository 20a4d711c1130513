//! Service layer for filing, withdrawing, and reading applications.

use super::{
    error::{MarketplaceError, MarketplaceResult},
    requests::SubmitApplicationRequest,
    unit_of_work::UnitOfWork,
};
use crate::task::{
    domain::{
        Application, ApplicationDecision, ApplicationId, ApplicationStatus, Operation, TaskId,
        UserId, authorize,
    },
    ports::TaskRepository,
};
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// Application record orchestration service.
pub struct ApplicationService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    unit_of_work: UnitOfWork<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for ApplicationService<R, C>
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

impl<R, C> ApplicationService<R, C>
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

    /// Files a pending application by `worker_id` against an open task.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Domain`] for a blank cover letter, a
    /// duplicate application, or a task that is not open;
    /// [`MarketplaceError::Access`] when the task owner applies to their own
    /// task; or [`MarketplaceError::TaskNotFound`].
    pub async fn submit(
        &self,
        task_id: TaskId,
        worker_id: UserId,
        request: SubmitApplicationRequest,
    ) -> MarketplaceResult<Application> {
        let proposal = request.into_proposal()?;
        let clock = &*self.clock;
        let (application, _) = self
            .unit_of_work
            .run(task_id, |aggregate| {
                authorize(worker_id, Operation::SubmitApplication, aggregate.task(), None)?;
                Ok(aggregate.submit_application(worker_id, proposal.clone(), clock)?)
            })
            .await?;
        info!(
            task_id = %task_id,
            application_id = %application.id(),
            actor = %worker_id,
            "application submitted"
        );
        Ok(application)
    }

    /// Withdraws a pending application on behalf of its applicant.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::ApplicationNotFound`],
    /// [`MarketplaceError::Access`] unless `actor` filed the application, or
    /// [`MarketplaceError::Domain`] when it is no longer pending.
    pub async fn withdraw(
        &self,
        application_id: ApplicationId,
        actor: UserId,
    ) -> MarketplaceResult<Application> {
        let task_id = self.task_of(application_id).await?;
        let clock = &*self.clock;
        let (outcome, _) = self
            .unit_of_work
            .run(task_id, |aggregate| {
                let application = aggregate
                    .application(application_id)
                    .ok_or(MarketplaceError::ApplicationNotFound(application_id))?;
                authorize(
                    actor,
                    Operation::WithdrawApplication,
                    aggregate.task(),
                    Some(application),
                )?;
                Ok(aggregate.decide(application_id, ApplicationDecision::Withdraw, clock)?)
            })
            .await?;
        info!(
            task_id = %task_id,
            application_id = %application_id,
            actor = %actor,
            "application withdrawn"
        );
        Ok(outcome.application)
    }

    /// Lists the applications on a task visible to `viewer`, oldest first.
    ///
    /// The task owner sees every application; anyone else sees only their
    /// own.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::TaskNotFound`] when the task is missing.
    pub async fn list_for_task(
        &self,
        task_id: TaskId,
        viewer: UserId,
    ) -> MarketplaceResult<Vec<Application>> {
        let (task, applications) = self.unit_of_work.load(task_id).await?.into_parts();
        if task.client_id() == viewer {
            return Ok(applications);
        }
        Ok(applications
            .into_iter()
            .filter(|application| application.worker_id() == viewer)
            .collect())
    }

    /// Lists the applications filed by `worker_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Repository`] when the lookup fails.
    pub async fn list_for_worker(
        &self,
        worker_id: UserId,
        status: Option<ApplicationStatus>,
    ) -> MarketplaceResult<Vec<Application>> {
        Ok(self
            .unit_of_work
            .repository()
            .list_applications_for_worker(worker_id, status)
            .await?)
    }

    /// Retrieves an application visible to `viewer`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::ApplicationNotFound`] when missing, or
    /// [`MarketplaceError::Access`] unless `viewer` is the applicant or the
    /// task owner.
    pub async fn find(
        &self,
        application_id: ApplicationId,
        viewer: UserId,
    ) -> MarketplaceResult<Application> {
        let task_id = self.task_of(application_id).await?;
        let aggregate = self.unit_of_work.load(task_id).await?;
        let application = aggregate
            .application(application_id)
            .ok_or(MarketplaceError::ApplicationNotFound(application_id))?;
        authorize(
            viewer,
            Operation::ViewApplication,
            aggregate.task(),
            Some(application),
        )?;
        Ok(application.clone())
    }

    async fn task_of(&self, application_id: ApplicationId) -> MarketplaceResult<TaskId> {
        self.unit_of_work
            .repository()
            .find_application(application_id)
            .await?
            .map(|application| application.task_id())
            .ok_or(MarketplaceError::ApplicationNotFound(application_id))
    }
}
