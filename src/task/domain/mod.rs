//! Domain model for the task marketplace.
//!
//! The task domain models posted tasks, worker applications, arbitration
//! between competing applications, delivery and settlement, and deadline
//! extension negotiation, while keeping all infrastructure concerns outside
//! of the domain boundary.

mod access;
mod aggregate;
mod application;
mod attributes;
mod delivery;
mod error;
mod extension;
mod ids;
mod status;
mod task;

pub use access::{AccessDenied, Capability, Operation, authorize};
pub use aggregate::{ApplicationDecision, DecisionOutcome, TaskAggregate};
pub use application::{Application, ApplicationProposal, PersistedApplicationData};
pub use attributes::{Budget, TaskAttributes, TaskPatch, TaskTitle};
pub use delivery::DeliveryRecord;
pub use error::{ParseStatusError, TaskAction, TaskDomainError};
pub use extension::ExtensionRequest;
pub use ids::{ApplicationId, TaskId, UserId};
pub use status::{
    ApplicationStatus, DeliveryStatus, ExtensionStatus, PaymentStatus, TaskStatus,
};
pub use task::{PersistedTaskData, Task};
