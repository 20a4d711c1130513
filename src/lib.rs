//! Atelier: task marketplace lifecycle and application arbitration.
//!
//! Clients post tasks, workers apply, and the client picks one application.
//! Accepting an application assigns the task and rejects every competing
//! application in one atomic change. The assigned worker then delivers, the
//! client confirms receipt and pays. While the work is in progress the
//! assigned worker may request a deadline extension, which only the client
//! can approve or reject.
//!
//! # Architecture
//!
//! Atelier follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, HTTP)
//!
//! # Modules
//!
//! - [`task`]: Task, application, settlement, and extension lifecycle
//! - [`api`]: HTTP surface over the task services
//! - [`config`]: Server configuration
//! - [`telemetry`]: Tracing subscriber setup

pub mod api;
pub mod config;
pub mod task;
pub mod telemetry;
