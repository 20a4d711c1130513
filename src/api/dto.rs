//! Request and response bodies.
//!
//! Request bodies reject unknown fields so ownership, assignment, and status
//! can never be smuggled into an update.

use crate::task::{
    domain::{Application, ApplicationId, ApplicationStatus, Task, UserId},
    services::{
        CreateTaskRequest, RequestExtensionRequest, RespondExtensionRequest,
        SubmitApplicationRequest, UpdateTaskRequest,
    },
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /tasks`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTaskBody {
    /// Task title.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Budget in whole currency units.
    pub budget: u64,
    /// Optional category label.
    #[serde(default)]
    pub category: Option<String>,
    /// Skills a worker needs.
    #[serde(default)]
    pub required_skills: Vec<String>,
    /// Initial deadline.
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

impl From<CreateTaskBody> for CreateTaskRequest {
    fn from(body: CreateTaskBody) -> Self {
        let mut request =
            Self::new(body.title, body.budget).with_required_skills(body.required_skills);
        if let Some(description) = body.description {
            request = request.with_description(description);
        }
        if let Some(category) = body.category {
            request = request.with_category(category);
        }
        if let Some(deadline) = body.deadline {
            request = request.with_deadline(deadline);
        }
        request
    }
}

/// Body of `PATCH /tasks/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateTaskBody {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New budget.
    #[serde(default)]
    pub budget: Option<u64>,
    /// New category; blank clears it.
    #[serde(default)]
    pub category: Option<String>,
    /// New required skills.
    #[serde(default)]
    pub required_skills: Option<Vec<String>>,
}

impl From<UpdateTaskBody> for UpdateTaskRequest {
    fn from(body: UpdateTaskBody) -> Self {
        let mut request = Self::new();
        if let Some(title) = body.title {
            request = request.with_title(title);
        }
        if let Some(description) = body.description {
            request = request.with_description(description);
        }
        if let Some(budget) = body.budget {
            request = request.with_budget(budget);
        }
        if let Some(category) = body.category {
            request = request.with_category(category);
        }
        if let Some(skills) = body.required_skills {
            request = request.with_required_skills(skills);
        }
        request
    }
}

/// Body of `POST /tasks/{id}/applications`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubmitApplicationBody {
    /// Cover letter.
    pub cover_letter: String,
    /// Counter-offer.
    #[serde(default)]
    pub proposed_budget: Option<u64>,
    /// Completion estimate.
    #[serde(default)]
    pub estimated_completion_time: Option<String>,
}

impl From<SubmitApplicationBody> for SubmitApplicationRequest {
    fn from(body: SubmitApplicationBody) -> Self {
        let mut request = Self::new(body.cover_letter);
        if let Some(budget) = body.proposed_budget {
            request = request.with_proposed_budget(budget);
        }
        if let Some(estimate) = body.estimated_completion_time {
            request = request.with_estimated_completion_time(estimate);
        }
        request
    }
}

/// Body of `PATCH /applications/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DecideApplicationBody {
    /// Target status: `ACCEPTED`, `REJECTED`, or `WITHDRAWN`.
    pub status: ApplicationStatus,
}

/// Body of `POST /tasks/{id}/deliver`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeliverBody {
    /// Note accompanying the delivered work.
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /tasks/{id}/request-extension`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RequestExtensionBody {
    /// Justification for the new deadline.
    pub message: String,
    /// Proposed deadline.
    #[serde(default)]
    pub new_deadline: Option<DateTime<Utc>>,
}

impl From<RequestExtensionBody> for RequestExtensionRequest {
    fn from(body: RequestExtensionBody) -> Self {
        let mut request = Self::new(body.message);
        if let Some(deadline) = body.new_deadline {
            request = request.with_new_deadline(deadline);
        }
        request
    }
}

/// Body of `POST /tasks/{id}/respond-extension`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RespondExtensionBody {
    /// Whether the client approves the request.
    pub approved: bool,
    /// Client's reply.
    #[serde(default)]
    pub response_message: Option<String>,
}

impl From<RespondExtensionBody> for RespondExtensionRequest {
    fn from(body: RespondExtensionBody) -> Self {
        let mut response = if body.approved {
            Self::approve()
        } else {
            Self::reject()
        };
        if let Some(message) = body.response_message {
            response = response.with_response_message(message);
        }
        response
    }
}

/// Query string of `GET /tasks`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskListParams {
    /// Status filter, e.g. `open`.
    #[serde(default)]
    pub status: Option<String>,
    /// Owner filter.
    #[serde(default)]
    pub client_id: Option<UserId>,
    /// Assignment filter.
    #[serde(default)]
    pub assigned_worker_id: Option<UserId>,
}

/// Query string of `GET /applications`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApplicationListParams {
    /// Status filter, e.g. `pending`.
    #[serde(default)]
    pub status: Option<String>,
}

/// A task plus a human-readable message.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    /// Outcome description.
    pub message: String,
    /// The task after the operation.
    pub task: Task,
}

/// An application plus a human-readable message.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    /// Outcome description.
    pub message: String,
    /// The application after the operation.
    pub application: Application,
}

/// Outcome of an application decision.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResponse {
    /// Outcome description.
    pub message: String,
    /// The decided application.
    pub application: Application,
    /// The task after the decision.
    pub task: Task,
    /// Siblings rejected by an acceptance.
    pub rejected_application_ids: Vec<ApplicationId>,
}

/// A list of tasks.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListResponse {
    /// Matching tasks, newest first.
    pub tasks: Vec<Task>,
}

/// A list of applications.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationListResponse {
    /// Matching applications.
    pub applications: Vec<Application>,
}

/// A bare human-readable message.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    /// Outcome description.
    pub message: String,
}

/// Liveness probe body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `healthy`.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
}
