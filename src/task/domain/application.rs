//! Worker applications and their per-record status transitions.

use super::{ApplicationId, ApplicationStatus, Budget, TaskDomainError, TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Validated content of a worker's bid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationProposal {
    cover_letter: String,
    proposed_budget: Option<Budget>,
    estimated_completion: Option<String>,
}

impl ApplicationProposal {
    /// Creates a proposal from a cover letter.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyCoverLetter`] when the cover letter is
    /// blank.
    pub fn new(cover_letter: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = cover_letter.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyCoverLetter);
        }
        Ok(Self {
            cover_letter: trimmed.to_owned(),
            proposed_budget: None,
            estimated_completion: None,
        })
    }

    /// Sets the worker's counter-offer.
    #[must_use]
    pub const fn with_proposed_budget(mut self, budget: Budget) -> Self {
        self.proposed_budget = Some(budget);
        self
    }

    /// Sets the worker's completion estimate, e.g. `"3 days"`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyEstimatedCompletion`] when the estimate
    /// is blank.
    pub fn with_estimated_completion(
        mut self,
        estimate: impl Into<String>,
    ) -> Result<Self, TaskDomainError> {
        let raw = estimate.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyEstimatedCompletion);
        }
        self.estimated_completion = Some(trimmed.to_owned());
        Ok(self)
    }
}

/// A worker's application to perform a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    id: ApplicationId,
    task_id: TaskId,
    worker_id: UserId,
    cover_letter: String,
    proposed_budget: Option<Budget>,
    estimated_completion_time: Option<String>,
    status: ApplicationStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    responded_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedApplicationData {
    /// Persisted application identifier.
    pub id: ApplicationId,
    /// Task applied to.
    pub task_id: TaskId,
    /// Applying worker.
    pub worker_id: UserId,
    /// Cover letter text.
    pub cover_letter: String,
    /// Counter-offer, if any.
    pub proposed_budget: Option<Budget>,
    /// Completion estimate, if any.
    pub estimated_completion_time: Option<String>,
    /// Persisted status.
    pub status: ApplicationStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest change timestamp.
    pub updated_at: DateTime<Utc>,
    /// Time of the client's decision, if any.
    pub responded_at: Option<DateTime<Utc>>,
}

impl Application {
    /// Creates a pending application.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        worker_id: UserId,
        proposal: ApplicationProposal,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        let ApplicationProposal {
            cover_letter,
            proposed_budget,
            estimated_completion,
        } = proposal;
        Self {
            id: ApplicationId::new(),
            task_id,
            worker_id,
            cover_letter,
            proposed_budget,
            estimated_completion_time: estimated_completion,
            status: ApplicationStatus::Pending,
            created_at: timestamp,
            updated_at: timestamp,
            responded_at: None,
        }
    }

    /// Reconstructs an application from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedApplicationData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            worker_id: data.worker_id,
            cover_letter: data.cover_letter,
            proposed_budget: data.proposed_budget,
            estimated_completion_time: data.estimated_completion_time,
            status: data.status,
            created_at: data.created_at,
            updated_at: data.updated_at,
            responded_at: data.responded_at,
        }
    }

    /// Returns the application identifier.
    #[must_use]
    pub const fn id(&self) -> ApplicationId {
        self.id
    }

    /// Returns the task applied to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the applying worker.
    #[must_use]
    pub const fn worker_id(&self) -> UserId {
        self.worker_id
    }

    /// Returns the cover letter.
    #[must_use]
    pub fn cover_letter(&self) -> &str {
        &self.cover_letter
    }

    /// Returns the counter-offer, if any.
    #[must_use]
    pub const fn proposed_budget(&self) -> Option<Budget> {
        self.proposed_budget
    }

    /// Returns the completion estimate, if any.
    #[must_use]
    pub fn estimated_completion_time(&self) -> Option<&str> {
        self.estimated_completion_time.as_deref()
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> ApplicationStatus {
        self.status
    }

    /// Returns `true` while awaiting a decision.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, ApplicationStatus::Pending)
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest change timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the decision timestamp, if decided by the client.
    #[must_use]
    pub const fn responded_at(&self) -> Option<DateTime<Utc>> {
        self.responded_at
    }

    /// Fails unless the application can still leave `Pending`.
    pub(crate) const fn ensure_pending(
        &self,
        target: ApplicationStatus,
    ) -> Result<(), TaskDomainError> {
        if self.is_pending() {
            return Ok(());
        }
        Err(TaskDomainError::InvalidApplicationTransition {
            application_id: self.id,
            from: self.status,
            to: target,
        })
    }

    /// Applies a client decision (`Accepted` or `Rejected`) and stamps
    /// `responded_at`.
    pub(crate) fn respond(
        &mut self,
        target: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<(), TaskDomainError> {
        self.ensure_pending(target)?;
        self.status = target;
        self.responded_at = Some(at);
        self.updated_at = at;
        Ok(())
    }

    /// Retracts the application on the applicant's behalf.
    pub(crate) fn withdraw(&mut self, at: DateTime<Utc>) -> Result<(), TaskDomainError> {
        self.ensure_pending(ApplicationStatus::Withdrawn)?;
        self.status = ApplicationStatus::Withdrawn;
        self.updated_at = at;
        Ok(())
    }
}
