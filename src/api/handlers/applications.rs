//! Application and arbitration handlers.

use crate::api::{
    auth::Actor,
    dto::{
        ApplicationListParams, ApplicationListResponse, ApplicationResponse,
        DecideApplicationBody, DecisionResponse,
    },
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    state::ApiState,
};
use crate::task::{
    domain::{ApplicationDecision, ApplicationId, ApplicationStatus},
    ports::TaskRepository,
};
use axum::{Json, extract::State};
use mockable::Clock;

/// Lists the caller's own applications, newest first.
pub async fn list_my_applications<R, C>(
    State(state): State<ApiState<R, C>>,
    Actor(actor): Actor,
    ApiQuery(params): ApiQuery<ApplicationListParams>,
) -> ApiResult<Json<ApplicationListResponse>>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let status = params
        .status
        .as_deref()
        .map(ApplicationStatus::try_from)
        .transpose()
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;
    let applications = state
        .marketplace()
        .applications()
        .list_for_worker(actor, status)
        .await?;
    Ok(Json(ApplicationListResponse { applications }))
}

/// Retrieves one application visible to the caller.
pub async fn get_application<R, C>(
    State(state): State<ApiState<R, C>>,
    Actor(actor): Actor,
    ApiPath(application_id): ApiPath<ApplicationId>,
) -> ApiResult<Json<ApplicationResponse>>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let application = state
        .marketplace()
        .applications()
        .find(application_id, actor)
        .await?;
    Ok(Json(ApplicationResponse {
        message: "application retrieved".to_owned(),
        application,
    }))
}

/// Accepts, rejects, or withdraws an application.
pub async fn decide_application<R, C>(
    State(state): State<ApiState<R, C>>,
    Actor(actor): Actor,
    ApiPath(application_id): ApiPath<ApplicationId>,
    ApiJson(body): ApiJson<DecideApplicationBody>,
) -> ApiResult<Json<DecisionResponse>>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let decision = ApplicationDecision::from_target_status(body.status).ok_or_else(|| {
        ApiError::BadRequest("status must be ACCEPTED, REJECTED, or WITHDRAWN".to_owned())
    })?;
    let outcome = state
        .marketplace()
        .arbitration()
        .decide(application_id, decision, actor)
        .await?;
    Ok(Json(DecisionResponse {
        message: format!("application {}", outcome.decision.application.status()),
        application: outcome.decision.application,
        task: outcome.task,
        rejected_application_ids: outcome.decision.rejected_siblings,
    }))
}

/// Withdraws the caller's pending application.
pub async fn withdraw_application<R, C>(
    State(state): State<ApiState<R, C>>,
    Actor(actor): Actor,
    ApiPath(application_id): ApiPath<ApplicationId>,
) -> ApiResult<Json<ApplicationResponse>>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let application = state
        .marketplace()
        .applications()
        .withdraw(application_id, actor)
        .await?;
    Ok(Json(ApplicationResponse {
        message: "application withdrawn".to_owned(),
        application,
    }))
}
