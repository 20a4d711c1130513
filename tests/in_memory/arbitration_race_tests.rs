//! Concurrent arbitration against one shared in-memory store.

use crate::in_memory::helpers::{TestMarketplace, apply, marketplace, post_task};
use atelier::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{ApplicationDecision, ApplicationStatus, TaskId, TaskStatus, UserId},
    ports::TaskRepository,
    services::SubmitApplicationRequest,
};
use rstest::rstest;
use std::sync::Arc;
use tokio::sync::Barrier;

async fn statuses(repository: &InMemoryTaskRepository, task_id: TaskId) -> Vec<ApplicationStatus> {
    repository
        .load(task_id)
        .await
        .expect("load should succeed")
        .expect("task should exist")
        .applications()
        .iter()
        .map(|application| application.status())
        .collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_accepts_leave_exactly_one_winner(
    marketplace: (TestMarketplace, Arc<InMemoryTaskRepository>),
) {
    let (marketplace, repository) = marketplace;
    let client = UserId::new();
    let task = post_task(&marketplace, client, "Move a piano").await;
    let first = apply(&marketplace, task.id(), UserId::new()).await;
    let second = apply(&marketplace, task.id(), UserId::new()).await;
    let barrier = Arc::new(Barrier::new(2));

    let handles = [first, second].map(|application_id| {
        let service = marketplace.clone();
        let gate = Arc::clone(&barrier);
        tokio::spawn(async move {
            gate.wait().await;
            service
                .arbitration()
                .decide(application_id, ApplicationDecision::Accept, client)
                .await
        })
    });
    let mut successes = 0;
    let mut failure_codes = Vec::new();
    for handle in handles {
        match handle.await.expect("decision task should not panic") {
            Ok(_) => successes += 1,
            Err(err) => failure_codes.push(err.code()),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(failure_codes.len(), 1);
    assert!(
        failure_codes
            .iter()
            .all(|code| matches!(*code, "TASK_NOT_OPEN" | "INVALID_TRANSITION")),
        "unexpected loser error: {failure_codes:?}"
    );
    let final_statuses = statuses(&repository, task.id()).await;
    let accepted = final_statuses
        .iter()
        .filter(|status| **status == ApplicationStatus::Accepted)
        .count();
    let rejected = final_statuses
        .iter()
        .filter(|status| **status == ApplicationStatus::Rejected)
        .count();
    assert_eq!((accepted, rejected), (1, 1));
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn at_most_one_acceptance_per_task_under_contention(
    marketplace: (TestMarketplace, Arc<InMemoryTaskRepository>),
) {
    const TASKS: usize = 6;
    const APPLICANTS: usize = 5;

    let (marketplace, repository) = marketplace;
    let client = UserId::new();
    let mut task_ids = Vec::with_capacity(TASKS);
    let mut decisions = Vec::with_capacity(TASKS * APPLICANTS);
    for index in 0..TASKS {
        let task = post_task(&marketplace, client, &format!("Errand {index}")).await;
        for _ in 0..APPLICANTS {
            decisions.push(apply(&marketplace, task.id(), UserId::new()).await);
        }
        task_ids.push(task.id());
    }

    let barrier = Arc::new(Barrier::new(decisions.len()));
    let handles: Vec<_> = decisions
        .into_iter()
        .map(|application_id| {
            let service = marketplace.clone();
            let gate = Arc::clone(&barrier);
            tokio::spawn(async move {
                gate.wait().await;
                service
                    .arbitration()
                    .decide(application_id, ApplicationDecision::Accept, client)
                    .await
            })
        })
        .collect();
    let mut successes = 0;
    for handle in handles {
        if handle.await.expect("decision task should not panic").is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, TASKS);
    for task_id in task_ids {
        let final_statuses = statuses(&repository, task_id).await;
        let accepted = final_statuses
            .iter()
            .filter(|status| **status == ApplicationStatus::Accepted)
            .count();
        assert_eq!(accepted, 1, "task {task_id} has {accepted} accepted applications");
        assert!(
            final_statuses
                .iter()
                .all(|status| *status != ApplicationStatus::Pending)
        );
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn submission_racing_acceptance_never_leaves_pending_on_assigned_task(
    marketplace: (TestMarketplace, Arc<InMemoryTaskRepository>),
) {
    let (marketplace, repository) = marketplace;
    let client = UserId::new();
    let task = post_task(&marketplace, client, "Clean gutters").await;
    let chosen = apply(&marketplace, task.id(), UserId::new()).await;
    let barrier = Arc::new(Barrier::new(2));

    let accept = {
        let service = marketplace.clone();
        let gate = Arc::clone(&barrier);
        tokio::spawn(async move {
            gate.wait().await;
            service
                .arbitration()
                .decide(chosen, ApplicationDecision::Accept, client)
                .await
        })
    };
    let submit = {
        let service = marketplace.clone();
        let gate = Arc::clone(&barrier);
        let task_id = task.id();
        tokio::spawn(async move {
            gate.wait().await;
            service
                .applications()
                .submit(
                    task_id,
                    UserId::new(),
                    SubmitApplicationRequest::new("Just in time"),
                )
                .await
        })
    };
    accept
        .await
        .expect("decision task should not panic")
        .expect("acceptance should succeed");
    let submitted = submit.await.expect("submission task should not panic");

    let aggregate = repository
        .load(task.id())
        .await
        .expect("load should succeed")
        .expect("task should exist");
    assert_eq!(aggregate.task().status(), TaskStatus::InProgress);
    assert!(
        aggregate
            .applications()
            .iter()
            .all(|application| application.status() != ApplicationStatus::Pending)
    );
    if let Err(err) = submitted {
        assert_eq!(err.code(), "TASK_NOT_OPEN");
    }
}
