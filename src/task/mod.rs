//! Task marketplace lifecycle for Atelier.
//!
//! A task and every application filed against it form one aggregate, so
//! accepting an application and rejecting its siblings is a single guarded
//! commit. Delivery, receipt, and payment are a strictly ordered pipeline on
//! an in-progress task, and deadline extensions are negotiated through a
//! single pending request slot. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
