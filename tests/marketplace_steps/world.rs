//! Shared world state for marketplace BDD scenarios.

use std::{collections::HashMap, sync::Arc};

use atelier::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{ApplicationId, Task, UserId},
    services::{Marketplace, MarketplaceError, MarketplaceResult},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Marketplace type used by the BDD world.
pub type TestMarketplace = Marketplace<InMemoryTaskRepository, DefaultClock>;

/// Scenario world for marketplace behaviour tests.
pub struct MarketplaceWorld {
    pub marketplace: TestMarketplace,
    pub users: HashMap<String, UserId>,
    pub applications: HashMap<String, ApplicationId>,
    pub task: Option<Task>,
    pub last_error: Option<MarketplaceError>,
}

impl MarketplaceWorld {
    /// Creates a world over an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            marketplace: Marketplace::new(
                Arc::new(InMemoryTaskRepository::new()),
                Arc::new(DefaultClock),
            ),
            users: HashMap::new(),
            applications: HashMap::new(),
            task: None,
            last_error: None,
        }
    }

    /// Returns the identifier for `name`, registering a new user on first use.
    pub fn user(&mut self, name: &str) -> UserId {
        *self.users.entry(name.to_owned()).or_insert_with(UserId::new)
    }

    /// Returns the identifier of a user already named in the scenario.
    pub fn known_user(&self, name: &str) -> Result<UserId, eyre::Report> {
        self.users
            .get(name)
            .copied()
            .ok_or_else(|| eyre::eyre!("user {name} has not appeared in the scenario"))
    }

    /// Returns the task under test.
    pub fn current_task(&self) -> Result<&Task, eyre::Report> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }

    /// Returns the application filed by `worker`.
    pub fn application_of(&self, worker: &str) -> Result<ApplicationId, eyre::Report> {
        self.applications
            .get(worker)
            .copied()
            .ok_or_else(|| eyre::eyre!("{worker} has not applied in this scenario"))
    }

    /// Records the outcome of an operation that returns the task.
    pub fn record(&mut self, result: MarketplaceResult<Task>) {
        if let Ok(ref updated) = result {
            self.task = Some(updated.clone());
        }
        self.last_error = result.err();
    }
}

impl Default for MarketplaceWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> MarketplaceWorld {
    MarketplaceWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
