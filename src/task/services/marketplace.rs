//! Facade bundling every marketplace service over one repository and clock.

use super::{
    applications::ApplicationService, arbitration::ArbitrationService,
    extension::ExtensionService, lifecycle::TaskLifecycleService, settlement::SettlementService,
    unit_of_work::{DEFAULT_MAX_COMMIT_ATTEMPTS, UnitOfWork},
};
use crate::task::ports::TaskRepository;
use mockable::Clock;
use std::sync::Arc;

/// Every marketplace service, sharing one repository, clock, and commit
/// policy.
pub struct Marketplace<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    tasks: TaskLifecycleService<R, C>,
    applications: ApplicationService<R, C>,
    arbitration: ArbitrationService<R, C>,
    settlement: SettlementService<R, C>,
    extensions: ExtensionService<R, C>,
}

impl<R, C> Clone for Marketplace<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            tasks: self.tasks.clone(),
            applications: self.applications.clone(),
            arbitration: self.arbitration.clone(),
            settlement: self.settlement.clone(),
            extensions: self.extensions.clone(),
        }
    }
}

impl<R, C> Marketplace<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates the services with the default commit attempt limit.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self::with_max_commit_attempts(repository, clock, DEFAULT_MAX_COMMIT_ATTEMPTS)
    }

    /// Creates the services, giving up on a contended task after
    /// `max_commit_attempts` version conflicts. Zero is treated as one.
    #[must_use]
    pub fn with_max_commit_attempts(
        repository: Arc<R>,
        clock: Arc<C>,
        max_commit_attempts: u32,
    ) -> Self {
        let unit_of_work = UnitOfWork::new(repository, max_commit_attempts);
        Self {
            tasks: TaskLifecycleService::from_parts(unit_of_work.clone(), Arc::clone(&clock)),
            applications: ApplicationService::from_parts(
                unit_of_work.clone(),
                Arc::clone(&clock),
            ),
            arbitration: ArbitrationService::from_parts(unit_of_work.clone(), Arc::clone(&clock)),
            settlement: SettlementService::from_parts(unit_of_work.clone(), Arc::clone(&clock)),
            extensions: ExtensionService::from_parts(unit_of_work, clock),
        }
    }

    /// Task record operations.
    #[must_use]
    pub const fn tasks(&self) -> &TaskLifecycleService<R, C> {
        &self.tasks
    }

    /// Application record operations.
    #[must_use]
    pub const fn applications(&self) -> &ApplicationService<R, C> {
        &self.applications
    }

    /// Accept, reject, and withdraw decisions.
    #[must_use]
    pub const fn arbitration(&self) -> &ArbitrationService<R, C> {
        &self.arbitration
    }

    /// Delivery, receipt, and payment.
    #[must_use]
    pub const fn settlement(&self) -> &SettlementService<R, C> {
        &self.settlement
    }

    /// Deadline extension negotiation.
    #[must_use]
    pub const fn extensions(&self) -> &ExtensionService<R, C> {
        &self.extensions
    }
}
