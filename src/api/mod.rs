//! HTTP surface for the task marketplace.
//!
//! Every route except `/health` requires a bearer credential, which an
//! [`ActorResolver`] maps to the acting user. Errors render as
//! `{ "error": ..., "code": ... }` with a status chosen by error class.

mod auth;
mod dto;
mod error;
mod extract;
mod handlers;
mod router;
mod state;

pub use auth::{Actor, ActorResolver, StaticTokenResolver, TokenBinding, TokenBindingError};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use router::create_router;
pub use state::ApiState;

#[cfg(test)]
mod tests;
