//! Shared state for request handlers.

use super::auth::ActorResolver;
use crate::task::{ports::TaskRepository, services::Marketplace};
use axum::extract::FromRef;
use mockable::Clock;
use std::sync::Arc;

/// Services and credential resolution shared by every handler.
pub struct ApiState<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    marketplace: Marketplace<R, C>,
    resolver: Arc<dyn ActorResolver>,
}

impl<R, C> ApiState<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates handler state.
    #[must_use]
    pub const fn new(marketplace: Marketplace<R, C>, resolver: Arc<dyn ActorResolver>) -> Self {
        Self {
            marketplace,
            resolver,
        }
    }

    /// Returns the marketplace services.
    #[must_use]
    pub const fn marketplace(&self) -> &Marketplace<R, C> {
        &self.marketplace
    }
}

impl<R, C> Clone for ApiState<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            marketplace: self.marketplace.clone(),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<R, C> FromRef<ApiState<R, C>> for Arc<dyn ActorResolver>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    fn from_ref(state: &ApiState<R, C>) -> Self {
        Arc::clone(&state.resolver)
    }
}
