//! The task aggregate: one task plus every application filed against it.
//!
//! All changes to a task and its applications go through this type and are
//! persisted together, so accepting one application and rejecting its
//! siblings is a single state change rather than a series of writes.

use super::{
    Application, ApplicationId, ApplicationProposal, ApplicationStatus, Operation, Task,
    TaskDomainError, UserId,
};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A decision applied to a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationDecision {
    /// The client chooses this worker.
    Accept,
    /// The client declines this worker.
    Reject,
    /// The applicant retracts the bid.
    Withdraw,
}

impl ApplicationDecision {
    /// Returns the application status this decision leads to.
    #[must_use]
    pub const fn target_status(self) -> ApplicationStatus {
        match self {
            Self::Accept => ApplicationStatus::Accepted,
            Self::Reject => ApplicationStatus::Rejected,
            Self::Withdraw => ApplicationStatus::Withdrawn,
        }
    }

    /// Returns the operation the acting user must be authorized for.
    #[must_use]
    pub const fn operation(self) -> Operation {
        match self {
            Self::Accept => Operation::AcceptApplication,
            Self::Reject => Operation::RejectApplication,
            Self::Withdraw => Operation::WithdrawApplication,
        }
    }

    /// Parses the target status of an application update.
    ///
    /// Returns `None` for `Pending`, which no decision leads to.
    #[must_use]
    pub const fn from_target_status(status: ApplicationStatus) -> Option<Self> {
        match status {
            ApplicationStatus::Accepted => Some(Self::Accept),
            ApplicationStatus::Rejected => Some(Self::Reject),
            ApplicationStatus::Withdrawn => Some(Self::Withdraw),
            ApplicationStatus::Pending => None,
        }
    }
}

/// Result of a successful decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionOutcome {
    /// The decided application after the change.
    pub application: Application,
    /// Sibling applications rejected because another was accepted.
    pub rejected_siblings: Vec<ApplicationId>,
}

/// Consistency boundary for a task and its applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAggregate {
    task: Task,
    applications: Vec<Application>,
}

impl TaskAggregate {
    /// Wraps a freshly created task with no applications.
    #[must_use]
    pub const fn new(task: Task) -> Self {
        Self {
            task,
            applications: Vec::new(),
        }
    }

    /// Reassembles an aggregate from stored parts.
    #[must_use]
    pub const fn from_parts(task: Task, applications: Vec<Application>) -> Self {
        Self { task, applications }
    }

    /// Splits the aggregate into its parts.
    #[must_use]
    pub fn into_parts(self) -> (Task, Vec<Application>) {
        (self.task, self.applications)
    }

    /// Returns the task.
    #[must_use]
    pub const fn task(&self) -> &Task {
        &self.task
    }

    /// Returns the task for task-level transitions.
    pub const fn task_mut(&mut self) -> &mut Task {
        &mut self.task
    }

    /// Returns every application, oldest first.
    #[must_use]
    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    /// Finds an application by identifier.
    #[must_use]
    pub fn application(&self, id: ApplicationId) -> Option<&Application> {
        self.applications.iter().find(|app| app.id() == id)
    }

    /// Finds the application filed by `worker_id`, if any.
    #[must_use]
    pub fn application_by_worker(&self, worker_id: UserId) -> Option<&Application> {
        self.applications
            .iter()
            .find(|app| app.worker_id() == worker_id)
    }

    /// Returns the accepted application, if one exists.
    #[must_use]
    pub fn accepted_application(&self) -> Option<&Application> {
        self.applications
            .iter()
            .find(|app| app.status() == ApplicationStatus::Accepted)
    }

    /// Files a new pending application for `worker_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::DuplicateApplication`] when the worker has
    /// already applied, or [`TaskDomainError::TaskNotOpen`] when the task no
    /// longer accepts applications.
    pub fn submit_application(
        &mut self,
        worker_id: UserId,
        proposal: ApplicationProposal,
        clock: &impl Clock,
    ) -> Result<Application, TaskDomainError> {
        if self.application_by_worker(worker_id).is_some() {
            return Err(TaskDomainError::DuplicateApplication {
                task_id: self.task.id(),
                worker_id,
            });
        }
        self.task.ensure_open()?;
        let application = Application::new(self.task.id(), worker_id, proposal, clock);
        self.task.touch_at(application.created_at());
        self.applications.push(application.clone());
        Ok(application)
    }

    /// Applies a decision to a pending application.
    ///
    /// Accepting assigns the task to the applicant, moves it to
    /// `InProgress`, and rejects every other pending application in the same
    /// step. Guards are evaluated before anything changes.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::UnknownApplication`] when the application is
    /// not part of this aggregate,
    /// [`TaskDomainError::InvalidApplicationTransition`] when it has already
    /// left `Pending`, or [`TaskDomainError::TaskNotOpen`] when accepting
    /// against a task that is no longer open.
    pub fn decide(
        &mut self,
        application_id: ApplicationId,
        decision: ApplicationDecision,
        clock: &impl Clock,
    ) -> Result<DecisionOutcome, TaskDomainError> {
        let target = decision.target_status();
        let candidate = self
            .application(application_id)
            .ok_or(TaskDomainError::UnknownApplication(application_id))?;
        candidate.ensure_pending(target)?;
        let worker_id = candidate.worker_id();
        if decision == ApplicationDecision::Accept {
            self.task.ensure_open()?;
        }

        let timestamp = clock.utc();
        let mut rejected_siblings = Vec::new();
        match decision {
            ApplicationDecision::Accept => {
                self.task.assign(worker_id, timestamp)?;
                for application in &mut self.applications {
                    if application.id() == application_id {
                        application.respond(ApplicationStatus::Accepted, timestamp)?;
                    } else if application.is_pending() {
                        application.respond(ApplicationStatus::Rejected, timestamp)?;
                        rejected_siblings.push(application.id());
                    }
                }
            }
            ApplicationDecision::Reject => {
                self.application_mut(application_id)?
                    .respond(ApplicationStatus::Rejected, timestamp)?;
                self.task.touch_at(timestamp);
            }
            ApplicationDecision::Withdraw => {
                self.application_mut(application_id)?.withdraw(timestamp)?;
                self.task.touch_at(timestamp);
            }
        }

        let application = self
            .application(application_id)
            .cloned()
            .ok_or(TaskDomainError::UnknownApplication(application_id))?;
        Ok(DecisionOutcome {
            application,
            rejected_siblings,
        })
    }

    /// Advances the task version ahead of a commit and returns the version
    /// the store is expected to hold.
    pub const fn bump_version(&mut self) -> u64 {
        self.task.bump_version()
    }

    fn application_mut(
        &mut self,
        application_id: ApplicationId,
    ) -> Result<&mut Application, TaskDomainError> {
        self.applications
            .iter_mut()
            .find(|app| app.id() == application_id)
            .ok_or(TaskDomainError::UnknownApplication(application_id))
    }
}
