//! Deadline extension requests negotiated while a task is in progress.

use super::{ExtensionStatus, TaskDomainError, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A worker's request to move the task deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionRequest {
    requested_by: UserId,
    message: String,
    requested_deadline: Option<DateTime<Utc>>,
    status: ExtensionStatus,
    response_message: Option<String>,
    requested_at: DateTime<Utc>,
    responded_at: Option<DateTime<Utc>>,
}

impl ExtensionRequest {
    /// Creates a pending request.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyExtensionMessage`] when the message is
    /// blank.
    pub fn new(
        requested_by: UserId,
        message: impl Into<String>,
        requested_deadline: Option<DateTime<Utc>>,
        requested_at: DateTime<Utc>,
    ) -> Result<Self, TaskDomainError> {
        let raw = message.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyExtensionMessage);
        }
        Ok(Self {
            requested_by,
            message: trimmed.to_owned(),
            requested_deadline,
            status: ExtensionStatus::Pending,
            response_message: None,
            requested_at,
            responded_at: None,
        })
    }

    /// Returns the requesting worker.
    #[must_use]
    pub const fn requested_by(&self) -> UserId {
        self.requested_by
    }

    /// Returns the worker's message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the proposed deadline, if any.
    #[must_use]
    pub const fn requested_deadline(&self) -> Option<DateTime<Utc>> {
        self.requested_deadline
    }

    /// Returns the negotiation status.
    #[must_use]
    pub const fn status(&self) -> ExtensionStatus {
        self.status
    }

    /// Returns `true` while the client has not answered.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, ExtensionStatus::Pending)
    }

    /// Returns the client's reply, if any.
    #[must_use]
    pub fn response_message(&self) -> Option<&str> {
        self.response_message.as_deref()
    }

    /// Returns the request timestamp.
    #[must_use]
    pub const fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }

    /// Returns the response timestamp, if answered.
    #[must_use]
    pub const fn responded_at(&self) -> Option<DateTime<Utc>> {
        self.responded_at
    }

    /// Records the client's answer. Callers check [`Self::is_pending`] first.
    pub(crate) fn resolve(
        &mut self,
        approved: bool,
        response_message: Option<String>,
        responded_at: DateTime<Utc>,
    ) {
        self.status = if approved {
            ExtensionStatus::Approved
        } else {
            ExtensionStatus::Rejected
        };
        self.response_message = response_message
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());
        self.responded_at = Some(responded_at);
    }
}
