//! End-to-end marketplace flows over the in-memory store.

use crate::in_memory::helpers::{TestMarketplace, apply, marketplace, post_task};
use atelier::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{
        ApplicationDecision, ApplicationStatus, DeliveryStatus, ExtensionStatus, PaymentStatus,
        TaskStatus, UserId,
    },
    ports::TaskQuery,
    services::{ErrorClass, RequestExtensionRequest, RespondExtensionRequest},
};
use chrono::{TimeZone, Utc};
use rstest::rstest;
use std::sync::Arc;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_runs_from_posting_to_payment(
    marketplace: (TestMarketplace, Arc<InMemoryTaskRepository>),
) {
    let (market, _) = marketplace;
    let client = UserId::new();
    let worker = UserId::new();
    let rival = UserId::new();
    let task = post_task(&market, client, "Assemble a wardrobe").await;
    let chosen = apply(&market, task.id(), worker).await;
    let passed_over = apply(&market, task.id(), rival).await;

    let outcome = market
        .arbitration()
        .decide(chosen, ApplicationDecision::Accept, client)
        .await
        .expect("owner accepts");
    assert_eq!(outcome.decision.rejected_siblings, vec![passed_over]);
    assert_eq!(outcome.task.status(), TaskStatus::InProgress);
    assert_eq!(outcome.task.assigned_worker_id(), Some(worker));

    let delivered = market
        .settlement()
        .deliver(task.id(), worker, Some("Assembled and levelled".to_owned()))
        .await
        .expect("worker delivers");
    assert_eq!(delivered.delivery_status(), DeliveryStatus::Delivered);

    let received = market
        .settlement()
        .mark_received(task.id(), client)
        .await
        .expect("owner confirms receipt");
    assert_eq!(received.delivery_status(), DeliveryStatus::Received);

    let paid = market
        .settlement()
        .make_payment(task.id(), client)
        .await
        .expect("owner pays");
    assert_eq!(paid.payment_status(), PaymentStatus::Paid);
    assert_eq!(paid.status(), TaskStatus::Completed);
    assert!(paid.completed_at().is_some());
    assert!(paid.version() > task.version());

    let rival_view = market
        .applications()
        .find(passed_over, rival)
        .await
        .expect("rival sees their application");
    assert_eq!(rival_view.status(), ApplicationStatus::Rejected);

    let repeat = market
        .settlement()
        .make_payment(task.id(), client)
        .await
        .expect_err("payment is settled once");
    assert_eq!(repeat.code(), "ALREADY_PAID");
    assert_eq!(repeat.class(), ErrorClass::Conflict);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn assigned_work_is_listed_for_the_worker(
    marketplace: (TestMarketplace, Arc<InMemoryTaskRepository>),
) {
    let (market, _) = marketplace;
    let client = UserId::new();
    let worker = UserId::new();
    let won = post_task(&market, client, "Paint the fence").await;
    let lost = post_task(&market, client, "Clear the gutters").await;
    let winning = apply(&market, won.id(), worker).await;
    apply(&market, lost.id(), worker).await;
    market
        .arbitration()
        .decide(winning, ApplicationDecision::Accept, client)
        .await
        .expect("owner accepts");

    let assigned = market
        .tasks()
        .list(TaskQuery::new().with_assigned_worker(worker))
        .await
        .expect("listing");
    let open = market
        .tasks()
        .list(TaskQuery::new().with_status(TaskStatus::Open))
        .await
        .expect("listing");
    let accepted = market
        .applications()
        .list_for_worker(worker, Some(ApplicationStatus::Accepted))
        .await
        .expect("listing");

    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned.first().map(|task| task.id()), Some(won.id()));
    assert_eq!(open.len(), 1);
    assert_eq!(open.first().map(|task| task.id()), Some(lost.id()));
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted.first().map(|app| app.id()), Some(winning));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn extension_negotiation_moves_the_deadline(
    marketplace: (TestMarketplace, Arc<InMemoryTaskRepository>),
) {
    let (market, _) = marketplace;
    let client = UserId::new();
    let worker = UserId::new();
    let task = post_task(&market, client, "Rewire the shed").await;
    let application = apply(&market, task.id(), worker).await;
    market
        .arbitration()
        .decide(application, ApplicationDecision::Accept, client)
        .await
        .expect("owner accepts");
    let new_deadline = Utc
        .with_ymd_and_hms(2030, 2, 1, 9, 0, 0)
        .single()
        .expect("valid deadline");

    let requested = market
        .extensions()
        .request(
            task.id(),
            worker,
            RequestExtensionRequest::new("Parts are back-ordered").with_new_deadline(new_deadline),
        )
        .await
        .expect("worker requests");
    assert_eq!(
        requested.time_extension_request().map(|req| req.status()),
        Some(ExtensionStatus::Pending)
    );

    let refused = market
        .extensions()
        .respond(task.id(), worker, RespondExtensionRequest::approve())
        .await
        .expect_err("worker cannot answer");
    assert_eq!(refused.class(), ErrorClass::Forbidden);

    let approved = market
        .extensions()
        .respond(
            task.id(),
            client,
            RespondExtensionRequest::approve().with_response_message("Fine"),
        )
        .await
        .expect("owner approves");
    assert_eq!(approved.deadline(), Some(new_deadline));
    assert_eq!(
        approved
            .time_extension_request()
            .and_then(|req| req.response_message()),
        Some("Fine")
    );
}
