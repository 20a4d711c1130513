//! Application services for task marketplace orchestration.
//!
//! Every mutating operation loads the task aggregate, authorizes the acting
//! user, applies one domain transition, and commits under a version guard.

mod applications;
mod arbitration;
mod error;
mod extension;
mod lifecycle;
mod marketplace;
mod requests;
mod settlement;
mod unit_of_work;

pub use applications::ApplicationService;
pub use arbitration::{ArbitrationOutcome, ArbitrationService};
pub use error::{ErrorClass, MarketplaceError, MarketplaceResult};
pub use extension::ExtensionService;
pub use lifecycle::TaskLifecycleService;
pub use marketplace::Marketplace;
pub use requests::{
    CreateTaskRequest, RequestExtensionRequest, RespondExtensionRequest,
    SubmitApplicationRequest, UpdateTaskRequest,
};
pub use settlement::SettlementService;
pub use unit_of_work::DEFAULT_MAX_COMMIT_ATTEMPTS;
