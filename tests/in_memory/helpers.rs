//! Shared fixtures for in-memory marketplace integration tests.

use atelier::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{ApplicationId, Task, TaskId, UserId},
    services::{CreateTaskRequest, Marketplace, SubmitApplicationRequest},
};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;

/// Marketplace type used by the integration tests.
pub type TestMarketplace = Marketplace<InMemoryTaskRepository, DefaultClock>;

/// Provides a marketplace over a fresh in-memory store, plus the store.
#[fixture]
pub fn marketplace() -> (TestMarketplace, Arc<InMemoryTaskRepository>) {
    let repository = Arc::new(InMemoryTaskRepository::new());
    let marketplace = Marketplace::new(Arc::clone(&repository), Arc::new(DefaultClock));
    (marketplace, repository)
}

/// Posts an open task for `client`.
pub async fn post_task(marketplace: &TestMarketplace, client: UserId, title: &str) -> Task {
    marketplace
        .tasks()
        .create(client, CreateTaskRequest::new(title, 300))
        .await
        .expect("task creation should succeed")
}

/// Files an application by `worker` and returns its identifier.
pub async fn apply(
    marketplace: &TestMarketplace,
    task_id: TaskId,
    worker: UserId,
) -> ApplicationId {
    marketplace
        .applications()
        .submit(
            task_id,
            worker,
            SubmitApplicationRequest::new("Available this week").with_proposed_budget(280),
        )
        .await
        .expect("application should succeed")
        .id()
}
