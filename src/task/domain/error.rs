//! Error types for task domain validation and state transitions.

use super::{ApplicationId, ApplicationStatus, DeliveryStatus, TaskId, TaskStatus, UserId};
use std::fmt;
use thiserror::Error;

/// Task-level actions that can be refused by a state guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskAction {
    /// Deleting the task record.
    Delete,
    /// Submitting a delivery.
    Deliver,
    /// Confirming receipt of a delivery.
    MarkReceived,
    /// Settling payment.
    MakePayment,
    /// Asking for a deadline extension.
    RequestExtension,
    /// Answering a deadline extension.
    RespondExtension,
}

impl TaskAction {
    /// Returns a short human-readable verb phrase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Deliver => "deliver",
            Self::MarkReceived => "mark received",
            Self::MakePayment => "make payment for",
            Self::RequestExtension => "request an extension for",
            Self::RespondExtension => "respond to an extension for",
        }
    }
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned while validating input or applying a domain transition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title is longer than the stored limit.
    #[error("task title must be at most {max} characters")]
    TitleTooLong {
        /// Maximum number of characters.
        max: usize,
    },

    /// The category label is longer than the stored limit.
    #[error("category must be at most {max} characters")]
    CategoryTooLong {
        /// Maximum number of characters.
        max: usize,
    },

    /// The cover letter is empty after trimming.
    #[error("cover letter must not be empty")]
    EmptyCoverLetter,

    /// The estimated completion text was provided but is blank.
    #[error("estimated completion time must not be blank when provided")]
    EmptyEstimatedCompletion,

    /// The extension request message is empty after trimming.
    #[error("extension request message must not be empty")]
    EmptyExtensionMessage,

    /// A budget amount of zero was supplied.
    #[error("budget must be a positive amount")]
    InvalidBudget,

    /// A budget amount above the supported maximum was supplied.
    #[error("budget must not exceed {max}")]
    BudgetTooLarge {
        /// Largest accepted amount.
        max: u64,
    },

    /// The task no longer accepts applications or assignment.
    #[error("task {task_id} is not open (status: {status})")]
    TaskNotOpen {
        /// Task that was expected to be open.
        task_id: TaskId,
        /// Status observed at decision time.
        status: TaskStatus,
    },

    /// The worker already has an application on file for this task.
    #[error("worker {worker_id} has already applied to task {task_id}")]
    DuplicateApplication {
        /// Task that was applied to.
        task_id: TaskId,
        /// Worker who applied.
        worker_id: UserId,
    },

    /// The application does not belong to the loaded task.
    #[error("application {0} is not filed against this task")]
    UnknownApplication(ApplicationId),

    /// The application is not in a state that permits the change.
    #[error("application {application_id} cannot move from {from} to {to}")]
    InvalidApplicationTransition {
        /// Application being changed.
        application_id: ApplicationId,
        /// Current status.
        from: ApplicationStatus,
        /// Requested status.
        to: ApplicationStatus,
    },

    /// The action requires an in-progress task.
    #[error("cannot {action} task {task_id} while it is {status}")]
    TaskNotInProgress {
        /// Task being changed.
        task_id: TaskId,
        /// Current task status.
        status: TaskStatus,
        /// Refused action.
        action: TaskAction,
    },

    /// The task has an assigned worker and may not be deleted.
    #[error("cannot {action} task {task_id} while it is in progress")]
    TaskInProgress {
        /// Task being changed.
        task_id: TaskId,
        /// Refused action.
        action: TaskAction,
    },

    /// The delivery sub-state does not permit the action.
    #[error("cannot {action} task {task_id}: delivery is {actual}, expected {expected}")]
    DeliveryOutOfOrder {
        /// Task being changed.
        task_id: TaskId,
        /// Refused action.
        action: TaskAction,
        /// Delivery status required by the action.
        expected: DeliveryStatus,
        /// Delivery status observed.
        actual: DeliveryStatus,
    },

    /// The task has already been paid.
    #[error("task {0} has already been paid")]
    AlreadyPaid(TaskId),

    /// A deadline extension request is still awaiting a response.
    #[error("task {0} already has a pending extension request")]
    ExtensionAlreadyPending(TaskId),

    /// No extension request is awaiting a response.
    #[error("task {0} has no pending extension request")]
    NoPendingExtension(TaskId),
}

impl TaskDomainError {
    /// Returns `true` for errors caused by malformed caller input.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyTitle
                | Self::TitleTooLong { .. }
                | Self::CategoryTooLong { .. }
                | Self::BudgetTooLarge { .. }
                | Self::EmptyCoverLetter
                | Self::EmptyEstimatedCompletion
                | Self::EmptyExtensionMessage
                | Self::InvalidBudget
        )
    }
}

/// Error returned while parsing a lifecycle status from persistence or
/// request input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseStatusError {
    /// Status family that failed to parse.
    pub kind: &'static str,
    /// Rejected input.
    pub value: String,
}

impl ParseStatusError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}
