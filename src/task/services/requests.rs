//! Request payloads accepted by the marketplace services.
//!
//! Payloads carry raw caller input; services validate them into domain
//! values before any store mutation.

use crate::task::domain::{
    ApplicationProposal, Budget, TaskAttributes, TaskDomainError, TaskPatch, TaskTitle,
};
use chrono::{DateTime, Utc};

/// Request payload for posting a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    budget: u64,
    description: Option<String>,
    category: Option<String>,
    required_skills: Vec<String>,
    deadline: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    /// Creates a request with the required task fields.
    #[must_use]
    pub fn new(title: impl Into<String>, budget: u64) -> Self {
        Self {
            title: title.into(),
            budget,
            description: None,
            category: None,
            required_skills: Vec::new(),
            deadline: None,
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the task category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the skills a worker needs.
    #[must_use]
    pub fn with_required_skills(mut self, skills: impl IntoIterator<Item = String>) -> Self {
        self.required_skills = skills.into_iter().collect();
        self
    }

    /// Sets the initial deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub(crate) fn into_attributes(
        self,
    ) -> Result<(TaskAttributes, Option<DateTime<Utc>>), TaskDomainError> {
        let mut attributes = TaskAttributes::new(TaskTitle::new(self.title)?, Budget::new(self.budget)?)
            .with_required_skills(self.required_skills);
        if let Some(description) = self.description {
            attributes = attributes.with_description(description);
        }
        if let Some(category) = self.category {
            attributes = attributes.with_category(category)?;
        }
        Ok((attributes, self.deadline))
    }
}

/// Request payload for editing a task's descriptive attributes.
///
/// Ownership, assignment, status, and deadline are not part of this payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    title: Option<String>,
    description: Option<String>,
    budget: Option<u64>,
    category: Option<String>,
    required_skills: Option<Vec<String>>,
}

impl UpdateTaskRequest {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the budget.
    #[must_use]
    pub const fn with_budget(mut self, budget: u64) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Replaces the category; blank clears it.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Replaces the required skills.
    #[must_use]
    pub fn with_required_skills(mut self, skills: impl IntoIterator<Item = String>) -> Self {
        self.required_skills = Some(skills.into_iter().collect());
        self
    }

    pub(crate) fn into_patch(self) -> Result<TaskPatch, TaskDomainError> {
        let mut patch = TaskPatch::new();
        if let Some(title) = self.title {
            patch = patch.with_title(TaskTitle::new(title)?);
        }
        if let Some(description) = self.description {
            patch = patch.with_description(description);
        }
        if let Some(budget) = self.budget {
            patch = patch.with_budget(Budget::new(budget)?);
        }
        if let Some(category) = self.category {
            patch = patch.with_category(category)?;
        }
        if let Some(skills) = self.required_skills {
            patch = patch.with_required_skills(skills);
        }
        Ok(patch)
    }
}

/// Request payload for applying to a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitApplicationRequest {
    cover_letter: String,
    proposed_budget: Option<u64>,
    estimated_completion_time: Option<String>,
}

impl SubmitApplicationRequest {
    /// Creates a request with the worker's cover letter.
    #[must_use]
    pub fn new(cover_letter: impl Into<String>) -> Self {
        Self {
            cover_letter: cover_letter.into(),
            proposed_budget: None,
            estimated_completion_time: None,
        }
    }

    /// Sets the worker's counter-offer.
    #[must_use]
    pub const fn with_proposed_budget(mut self, budget: u64) -> Self {
        self.proposed_budget = Some(budget);
        self
    }

    /// Sets the worker's completion estimate.
    #[must_use]
    pub fn with_estimated_completion_time(mut self, estimate: impl Into<String>) -> Self {
        self.estimated_completion_time = Some(estimate.into());
        self
    }

    pub(crate) fn into_proposal(self) -> Result<ApplicationProposal, TaskDomainError> {
        let mut proposal = ApplicationProposal::new(self.cover_letter)?;
        if let Some(budget) = self.proposed_budget {
            proposal = proposal.with_proposed_budget(Budget::new(budget)?);
        }
        if let Some(estimate) = self.estimated_completion_time {
            proposal = proposal.with_estimated_completion(estimate)?;
        }
        Ok(proposal)
    }
}

/// Request payload for asking to move the deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestExtensionRequest {
    message: String,
    new_deadline: Option<DateTime<Utc>>,
}

impl RequestExtensionRequest {
    /// Creates a request with the worker's justification.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            new_deadline: None,
        }
    }

    /// Sets the proposed deadline.
    #[must_use]
    pub const fn with_new_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.new_deadline = Some(deadline);
        self
    }

    pub(crate) fn message(&self) -> &str {
        &self.message
    }

    pub(crate) const fn new_deadline(&self) -> Option<DateTime<Utc>> {
        self.new_deadline
    }
}

/// Request payload for answering a pending extension request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RespondExtensionRequest {
    approved: bool,
    response_message: Option<String>,
}

impl RespondExtensionRequest {
    /// Approves the pending request.
    #[must_use]
    pub const fn approve() -> Self {
        Self {
            approved: true,
            response_message: None,
        }
    }

    /// Rejects the pending request.
    #[must_use]
    pub const fn reject() -> Self {
        Self {
            approved: false,
            response_message: None,
        }
    }

    /// Attaches the client's reply.
    #[must_use]
    pub fn with_response_message(mut self, message: impl Into<String>) -> Self {
        self.response_message = Some(message.into());
        self
    }

    pub(crate) const fn approved(&self) -> bool {
        self.approved
    }

    pub(crate) fn response_message(&self) -> Option<String> {
        self.response_message.clone()
    }
}
