//! Service-level errors for marketplace operations.

use crate::task::{
    domain::{AccessDenied, ApplicationId, TaskDomainError, TaskId},
    ports::TaskRepositoryError,
};
use std::fmt;
use thiserror::Error;

/// Service-level errors for task, application, settlement, and extension
/// operations.
#[derive(Debug, Error)]
pub enum MarketplaceError {
    /// Domain validation or a state guard failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// The acting user is not permitted to perform the operation.
    #[error(transparent)]
    Access(#[from] AccessDenied),
    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// The application does not exist or is not visible to the caller.
    #[error("application not found: {0}")]
    ApplicationNotFound(ApplicationId),
    /// Concurrent writers kept invalidating the operation.
    #[error("task {0} was modified concurrently; retry the request")]
    ConcurrentModification(TaskId),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

/// Result type for marketplace service operations.
pub type MarketplaceResult<T> = Result<T, MarketplaceError>;

/// Caller-facing error families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Malformed or missing input.
    Validation,
    /// The actor lacks rights over the entity.
    Forbidden,
    /// The entity does not resolve.
    NotFound,
    /// The entity's state does not permit the change.
    Conflict,
    /// Store or infrastructure failure.
    Internal,
}

impl ErrorClass {
    /// Returns a stable lower-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl MarketplaceError {
    /// Returns the error family used to pick a response status.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Domain(err) if err.is_validation() => ErrorClass::Validation,
            Self::Domain(TaskDomainError::UnknownApplication(_))
            | Self::TaskNotFound(_)
            | Self::ApplicationNotFound(_)
            | Self::Repository(TaskRepositoryError::NotFound(_)) => ErrorClass::NotFound,
            Self::Domain(_)
            | Self::ConcurrentModification(_)
            | Self::Repository(
                TaskRepositoryError::DuplicateApplication { .. }
                | TaskRepositoryError::DuplicateTask(_)
                | TaskRepositoryError::VersionConflict { .. },
            ) => ErrorClass::Conflict,
            Self::Access(_) => ErrorClass::Forbidden,
            Self::Repository(TaskRepositoryError::Persistence(_)) => ErrorClass::Internal,
        }
    }

    /// Returns a stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Domain(err) if err.is_validation() => "VALIDATION_ERROR",
            Self::Domain(TaskDomainError::TaskNotOpen { .. }) => "TASK_NOT_OPEN",
            Self::Domain(TaskDomainError::DuplicateApplication { .. })
            | Self::Repository(TaskRepositoryError::DuplicateApplication { .. }) => {
                "DUPLICATE_APPLICATION"
            }
            Self::Domain(TaskDomainError::AlreadyPaid(_)) => "ALREADY_PAID",
            Self::Domain(TaskDomainError::UnknownApplication(_)) | Self::ApplicationNotFound(_) => {
                "APPLICATION_NOT_FOUND"
            }
            Self::Domain(_) => "INVALID_TRANSITION",
            Self::Access(_) => "FORBIDDEN",
            Self::TaskNotFound(_) | Self::Repository(TaskRepositoryError::NotFound(_)) => {
                "TASK_NOT_FOUND"
            }
            Self::ConcurrentModification(_)
            | Self::Repository(
                TaskRepositoryError::VersionConflict { .. } | TaskRepositoryError::DuplicateTask(_),
            ) => "CONCURRENT_MODIFICATION",
            Self::Repository(TaskRepositoryError::Persistence(_)) => "INTERNAL_ERROR",
        }
    }
}
