//! Capability-based authorization for task operations.
//!
//! Every operation declares the capabilities that permit it. A single
//! [`authorize`] call checks the acting user against that declaration before
//! any state guard runs, so authorization failures always take priority over
//! state conflicts.

use super::{Application, Task, UserId};
use std::fmt;
use thiserror::Error;

/// A relationship between a user and a task (or one of its applications).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// The user posted the task.
    TaskOwner,
    /// The user is the worker assigned to the task.
    AssignedWorker,
    /// The user filed the application in question.
    Applicant,
    /// The user did not post the task.
    NotTaskOwner,
}

impl Capability {
    /// Returns `true` when `actor` holds this capability.
    #[must_use]
    pub fn is_held_by(self, actor: UserId, task: &Task, application: Option<&Application>) -> bool {
        match self {
            Self::TaskOwner => task.client_id() == actor,
            Self::AssignedWorker => task.assigned_worker_id() == Some(actor),
            Self::Applicant => application.is_some_and(|app| app.worker_id() == actor),
            Self::NotTaskOwner => task.client_id() != actor,
        }
    }
}

/// Operations subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Edit descriptive task attributes.
    UpdateTask,
    /// Delete the task record.
    DeleteTask,
    /// File an application.
    SubmitApplication,
    /// Retract one's own application.
    WithdrawApplication,
    /// Accept an application.
    AcceptApplication,
    /// Reject an application.
    RejectApplication,
    /// Read a single application.
    ViewApplication,
    /// Submit delivered work.
    Deliver,
    /// Confirm receipt of delivered work.
    MarkReceived,
    /// Settle payment.
    MakePayment,
    /// Ask to move the deadline.
    RequestExtension,
    /// Answer a deadline request.
    RespondExtension,
}

impl Operation {
    /// Returns the capabilities that permit this operation; holding any one
    /// of them is sufficient.
    #[must_use]
    pub const fn required_capabilities(self) -> &'static [Capability] {
        match self {
            Self::UpdateTask
            | Self::DeleteTask
            | Self::AcceptApplication
            | Self::RejectApplication
            | Self::MarkReceived
            | Self::MakePayment
            | Self::RespondExtension => &[Capability::TaskOwner],
            Self::SubmitApplication => &[Capability::NotTaskOwner],
            Self::WithdrawApplication => &[Capability::Applicant],
            Self::ViewApplication => &[Capability::TaskOwner, Capability::Applicant],
            Self::Deliver | Self::RequestExtension => &[Capability::AssignedWorker],
        }
    }

    /// Returns a short description used in error messages and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UpdateTask => "update task",
            Self::DeleteTask => "delete task",
            Self::SubmitApplication => "submit application",
            Self::WithdrawApplication => "withdraw application",
            Self::AcceptApplication => "accept application",
            Self::RejectApplication => "reject application",
            Self::ViewApplication => "view application",
            Self::Deliver => "deliver task",
            Self::MarkReceived => "mark task received",
            Self::MakePayment => "make payment",
            Self::RequestExtension => "request extension",
            Self::RespondExtension => "respond to extension",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The acting user lacks every capability the operation requires.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("user {actor} is not permitted to {operation}")]
pub struct AccessDenied {
    /// Acting user.
    pub actor: UserId,
    /// Refused operation.
    pub operation: Operation,
}

/// Checks `actor` against the capabilities declared by `operation`.
///
/// # Errors
///
/// Returns [`AccessDenied`] when the actor holds none of them.
pub fn authorize(
    actor: UserId,
    operation: Operation,
    task: &Task,
    application: Option<&Application>,
) -> Result<(), AccessDenied> {
    let permitted = operation
        .required_capabilities()
        .iter()
        .any(|capability| capability.is_held_by(actor, task, application));
    if permitted {
        Ok(())
    } else {
        Err(AccessDenied { actor, operation })
    }
}
