//! Route-level tests driving the router with in-process requests.

use super::{ApiState, StaticTokenResolver, create_router};
use crate::task::{
    adapters::memory::InMemoryTaskRepository, domain::UserId, services::Marketplace,
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

const CLIENT: &str = "client-token";
const WORKER: &str = "worker-token";
const RIVAL: &str = "rival-token";

struct Harness {
    router: Router,
    client: UserId,
    worker: UserId,
}

#[fixture]
fn harness() -> Harness {
    let client = UserId::new();
    let worker = UserId::new();
    let resolver = StaticTokenResolver::new()
        .with_token(CLIENT, client)
        .with_token(WORKER, worker)
        .with_token(RIVAL, UserId::new());
    let marketplace = Marketplace::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(DefaultClock),
    );
    Harness {
        router: create_router(ApiState::new(marketplace, Arc::new(resolver))),
        client,
        worker,
    }
}

impl Harness {
    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let payload = body.map(|json| json.to_string());
        if payload.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(payload.map_or_else(Body::empty, Body::from))
            .expect("request builds");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body is JSON")
        };
        (status, value)
    }

    async fn create_task(&self) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/tasks",
                Some(CLIENT),
                Some(json!({ "title": "Fix the roof", "budget": 500 })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["task"]["id"]
            .as_str()
            .expect("task id is a string")
            .to_owned()
    }

    async fn apply(&self, task_id: &str, token: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                &format!("/tasks/{task_id}/applications"),
                Some(token),
                Some(json!({ "coverLetter": "I have a ladder", "proposedBudget": 450 })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["application"]["id"]
            .as_str()
            .expect("application id is a string")
            .to_owned()
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn health_needs_no_credentials(harness: Harness) {
    let (status, body) = harness.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[rstest]
#[case(None)]
#[case(Some("unknown-token"))]
#[tokio::test(flavor = "multi_thread")]
async fn unauthenticated_requests_are_refused(harness: Harness, #[case] token: Option<&str>) {
    let (status, body) = harness.send(Method::GET, "/tasks", token, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_assigns_caller_as_owner(harness: Harness) {
    let (status, body) = harness
        .send(
            Method::POST,
            "/tasks",
            Some(CLIENT),
            Some(json!({
                "title": "  Paint the fence  ",
                "budget": 120,
                "category": "Garden",
                "requiredSkills": ["painting", "  "]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["task"]["title"], "Paint the fence");
    assert_eq!(body["task"]["status"], "OPEN");
    assert_eq!(body["task"]["category"], "Garden");
    assert_eq!(body["task"]["requiredSkills"], json!(["painting"]));
    assert_eq!(
        body["task"]["clientId"],
        json!(harness.client.into_inner().to_string())
    );
}

#[rstest]
#[case(json!({ "title": "x", "budget": 10, "clientId": "smuggled" }))]
#[case(json!({ "title": "   ", "budget": 10 }))]
#[case(json!({ "title": "x", "budget": 0 }))]
#[case(json!({ "budget": 10 }))]
#[case(json!({ "title": "x", "budget": u64::MAX }))]
#[case(json!({ "title": "x".repeat(256), "budget": 10 }))]
#[case(json!({ "title": "x", "budget": 10, "category": "c".repeat(101) }))]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_task_bodies_are_validation_errors(harness: Harness, #[case] body: Value) {
    let (status, response) = harness
        .send(Method::POST, "/tasks", Some(CLIENT), Some(body))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "VALIDATION_ERROR");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn oversized_values_are_refused_before_storage(harness: Harness) {
    let task_id = harness.create_task().await;

    let (patch_status, patch_body) = harness
        .send(
            Method::PATCH,
            &format!("/tasks/{task_id}"),
            Some(CLIENT),
            Some(json!({ "title": "t".repeat(300), "budget": u64::MAX })),
        )
        .await;
    let (apply_status, apply_body) = harness
        .send(
            Method::POST,
            &format!("/tasks/{task_id}/applications"),
            Some(WORKER),
            Some(json!({ "coverLetter": "Name your price", "proposedBudget": u64::MAX })),
        )
        .await;
    let (_, stored) = harness
        .send(Method::GET, &format!("/tasks/{task_id}"), Some(CLIENT), None)
        .await;

    assert_eq!(patch_status, StatusCode::BAD_REQUEST);
    assert_eq!(patch_body["code"], "VALIDATION_ERROR");
    assert_eq!(apply_status, StatusCode::BAD_REQUEST);
    assert_eq!(apply_body["code"], "VALIDATION_ERROR");
    assert_eq!(stored["task"]["budget"], 500);
    assert_eq!(stored["task"]["version"], 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn only_the_owner_may_update(harness: Harness) {
    let task_id = harness.create_task().await;

    let (status, body) = harness
        .send(
            Method::PATCH,
            &format!("/tasks/{task_id}"),
            Some(WORKER),
            Some(json!({ "budget": 1 })),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_task_is_not_found(harness: Harness) {
    let uri = format!("/tasks/{}", uuid::Uuid::new_v4());

    let (status, body) = harness.send(Method::GET, &uri, Some(CLIENT), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "TASK_NOT_FOUND");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_path_is_a_validation_error(harness: Harness) {
    let (status, body) = harness
        .send(Method::GET, "/tasks/not-a-uuid", Some(CLIENT), None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_status_filter_is_a_validation_error(harness: Harness) {
    let (status, body) = harness
        .send(Method::GET, "/tasks?status=archived", Some(CLIENT), None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn second_application_by_same_worker_conflicts(harness: Harness) {
    let task_id = harness.create_task().await;
    harness.apply(&task_id, WORKER).await;

    let (status, body) = harness
        .send(
            Method::POST,
            &format!("/tasks/{task_id}/applications"),
            Some(WORKER),
            Some(json!({ "coverLetter": "Again" })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_APPLICATION");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn owner_cannot_apply_to_own_task(harness: Harness) {
    let task_id = harness.create_task().await;

    let (status, _) = harness
        .send(
            Method::POST,
            &format!("/tasks/{task_id}/applications"),
            Some(CLIENT),
            Some(json!({ "coverLetter": "Me" })),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pending_is_not_a_decision(harness: Harness) {
    let task_id = harness.create_task().await;
    let application_id = harness.apply(&task_id, WORKER).await;

    let (status, body) = harness
        .send(
            Method::PATCH,
            &format!("/applications/{application_id}"),
            Some(CLIENT),
            Some(json!({ "status": "PENDING" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_lifecycle_over_http(harness: Harness) {
    let task_id = harness.create_task().await;
    let chosen = harness.apply(&task_id, WORKER).await;
    let rival = harness.apply(&task_id, RIVAL).await;

    let (status, decision) = harness
        .send(
            Method::PATCH,
            &format!("/applications/{chosen}"),
            Some(CLIENT),
            Some(json!({ "status": "ACCEPTED" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decision["application"]["status"], "ACCEPTED");
    assert_eq!(decision["task"]["status"], "IN_PROGRESS");
    assert_eq!(
        decision["task"]["assignedWorkerId"],
        json!(harness.worker.into_inner().to_string())
    );
    assert_eq!(decision["rejectedApplicationIds"], json!([rival]));

    let (status, _) = harness
        .send(
            Method::POST,
            &format!("/tasks/{task_id}/applications"),
            Some(RIVAL),
            Some(json!({ "coverLetter": "Late" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, delivered) = harness
        .send(
            Method::POST,
            &format!("/tasks/{task_id}/deliver"),
            Some(WORKER),
            Some(json!({ "message": "Done, see photos" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(delivered["task"]["deliveryStatus"], "DELIVERED");

    let (status, _) = harness
        .send(
            Method::POST,
            &format!("/tasks/{task_id}/make-payment"),
            Some(CLIENT),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, received) = harness
        .send(
            Method::POST,
            &format!("/tasks/{task_id}/mark-received"),
            Some(CLIENT),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(received["task"]["deliveryStatus"], "RECEIVED");

    let (status, paid) = harness
        .send(
            Method::POST,
            &format!("/tasks/{task_id}/make-payment"),
            Some(CLIENT),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["task"]["status"], "COMPLETED");
    assert_eq!(paid["task"]["paymentStatus"], "PAID");

    let (status, again) = harness
        .send(
            Method::POST,
            &format!("/tasks/{task_id}/make-payment"),
            Some(CLIENT),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(again["code"], "ALREADY_PAID");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn extension_round_trip_over_http(harness: Harness) {
    let task_id = harness.create_task().await;
    let application_id = harness.apply(&task_id, WORKER).await;
    harness
        .send(
            Method::PATCH,
            &format!("/applications/{application_id}"),
            Some(CLIENT),
            Some(json!({ "status": "ACCEPTED" })),
        )
        .await;

    let (status, requested) = harness
        .send(
            Method::POST,
            &format!("/tasks/{task_id}/request-extension"),
            Some(WORKER),
            Some(json!({
                "message": "Rain delayed the work",
                "newDeadline": "2030-01-15T12:00:00Z"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(requested["task"]["timeExtensionRequest"]["status"], "PENDING");

    let (status, _) = harness
        .send(
            Method::POST,
            &format!("/tasks/{task_id}/respond-extension"),
            Some(WORKER),
            Some(json!({ "approved": true })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, answered) = harness
        .send(
            Method::POST,
            &format!("/tasks/{task_id}/respond-extension"),
            Some(CLIENT),
            Some(json!({ "approved": true, "responseMessage": "Fine" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(answered["message"], "extension approved");
    assert_eq!(answered["task"]["deadline"], "2030-01-15T12:00:00Z");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn workers_list_their_own_applications(harness: Harness) {
    let task_id = harness.create_task().await;
    harness.apply(&task_id, WORKER).await;

    let (status, mine) = harness
        .send(Method::GET, "/applications?status=pending", Some(WORKER), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine["applications"].as_array().map(Vec::len), Some(1));

    let (status, theirs) = harness
        .send(Method::GET, "/applications", Some(RIVAL), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(theirs["applications"], json!([]));
}
