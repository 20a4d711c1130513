//! Task, settlement, and extension handlers.

use crate::api::{
    auth::Actor,
    dto::{
        ApplicationListResponse, ApplicationResponse, CreateTaskBody, DeliverBody,
        MessageResponse, RequestExtensionBody, RespondExtensionBody, SubmitApplicationBody,
        TaskListParams, TaskListResponse, TaskResponse, UpdateTaskBody,
    },
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    state::ApiState,
};
use crate::task::{
    domain::{TaskId, TaskStatus},
    ports::{TaskQuery, TaskRepository},
};
use axum::{Json, extract::State, http::StatusCode};
use mockable::Clock;

/// Lists tasks, newest first.
pub async fn list_tasks<R, C>(
    State(state): State<ApiState<R, C>>,
    Actor(_): Actor,
    ApiQuery(params): ApiQuery<TaskListParams>,
) -> ApiResult<Json<TaskListResponse>>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let mut query = TaskQuery::new();
    if let Some(raw) = params.status.as_deref() {
        let status =
            TaskStatus::try_from(raw).map_err(|err| ApiError::BadRequest(err.to_string()))?;
        query = query.with_status(status);
    }
    if let Some(client_id) = params.client_id {
        query = query.with_client(client_id);
    }
    if let Some(worker_id) = params.assigned_worker_id {
        query = query.with_assigned_worker(worker_id);
    }
    let tasks = state.marketplace().tasks().list(query).await?;
    Ok(Json(TaskListResponse { tasks }))
}

/// Retrieves one task.
pub async fn get_task<R, C>(
    State(state): State<ApiState<R, C>>,
    Actor(_): Actor,
    ApiPath(task_id): ApiPath<TaskId>,
) -> ApiResult<Json<TaskResponse>>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let task = state.marketplace().tasks().find(task_id).await?;
    Ok(Json(TaskResponse {
        message: "task retrieved".to_owned(),
        task,
    }))
}

/// Posts a task owned by the caller.
pub async fn create_task<R, C>(
    State(state): State<ApiState<R, C>>,
    Actor(actor): Actor,
    ApiJson(body): ApiJson<CreateTaskBody>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let task = state
        .marketplace()
        .tasks()
        .create(actor, body.into())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            message: "task created".to_owned(),
            task,
        }),
    ))
}

/// Edits the caller's task.
pub async fn update_task<R, C>(
    State(state): State<ApiState<R, C>>,
    Actor(actor): Actor,
    ApiPath(task_id): ApiPath<TaskId>,
    ApiJson(body): ApiJson<UpdateTaskBody>,
) -> ApiResult<Json<TaskResponse>>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let task = state
        .marketplace()
        .tasks()
        .update(task_id, actor, body.into())
        .await?;
    Ok(Json(TaskResponse {
        message: "task updated".to_owned(),
        task,
    }))
}

/// Deletes the caller's task.
pub async fn delete_task<R, C>(
    State(state): State<ApiState<R, C>>,
    Actor(actor): Actor,
    ApiPath(task_id): ApiPath<TaskId>,
) -> ApiResult<Json<MessageResponse>>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    state.marketplace().tasks().delete(task_id, actor).await?;
    Ok(Json(MessageResponse {
        message: "task deleted".to_owned(),
    }))
}

/// Files an application by the caller.
pub async fn submit_application<R, C>(
    State(state): State<ApiState<R, C>>,
    Actor(actor): Actor,
    ApiPath(task_id): ApiPath<TaskId>,
    ApiJson(body): ApiJson<SubmitApplicationBody>,
) -> ApiResult<(StatusCode, Json<ApplicationResponse>)>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let application = state
        .marketplace()
        .applications()
        .submit(task_id, actor, body.into())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse {
            message: "application submitted".to_owned(),
            application,
        }),
    ))
}

/// Lists the applications on a task visible to the caller.
pub async fn list_task_applications<R, C>(
    State(state): State<ApiState<R, C>>,
    Actor(actor): Actor,
    ApiPath(task_id): ApiPath<TaskId>,
) -> ApiResult<Json<ApplicationListResponse>>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let applications = state
        .marketplace()
        .applications()
        .list_for_task(task_id, actor)
        .await?;
    Ok(Json(ApplicationListResponse { applications }))
}

/// Records delivered work from the assigned worker.
pub async fn deliver<R, C>(
    State(state): State<ApiState<R, C>>,
    Actor(actor): Actor,
    ApiPath(task_id): ApiPath<TaskId>,
    ApiJson(body): ApiJson<DeliverBody>,
) -> ApiResult<Json<TaskResponse>>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let task = state
        .marketplace()
        .settlement()
        .deliver(task_id, actor, body.message)
        .await?;
    Ok(Json(TaskResponse {
        message: "task delivered".to_owned(),
        task,
    }))
}

/// Confirms receipt on behalf of the task owner.
pub async fn mark_received<R, C>(
    State(state): State<ApiState<R, C>>,
    Actor(actor): Actor,
    ApiPath(task_id): ApiPath<TaskId>,
) -> ApiResult<Json<TaskResponse>>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let task = state
        .marketplace()
        .settlement()
        .mark_received(task_id, actor)
        .await?;
    Ok(Json(TaskResponse {
        message: "delivery marked as received".to_owned(),
        task,
    }))
}

/// Settles payment on behalf of the task owner.
pub async fn make_payment<R, C>(
    State(state): State<ApiState<R, C>>,
    Actor(actor): Actor,
    ApiPath(task_id): ApiPath<TaskId>,
) -> ApiResult<Json<TaskResponse>>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let task = state
        .marketplace()
        .settlement()
        .make_payment(task_id, actor)
        .await?;
    Ok(Json(TaskResponse {
        message: "payment completed".to_owned(),
        task,
    }))
}

/// Asks the task owner to move the deadline.
pub async fn request_extension<R, C>(
    State(state): State<ApiState<R, C>>,
    Actor(actor): Actor,
    ApiPath(task_id): ApiPath<TaskId>,
    ApiJson(body): ApiJson<RequestExtensionBody>,
) -> ApiResult<Json<TaskResponse>>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let task = state
        .marketplace()
        .extensions()
        .request(task_id, actor, body.into())
        .await?;
    Ok(Json(TaskResponse {
        message: "extension requested".to_owned(),
        task,
    }))
}

/// Answers the pending extension request.
pub async fn respond_extension<R, C>(
    State(state): State<ApiState<R, C>>,
    Actor(actor): Actor,
    ApiPath(task_id): ApiPath<TaskId>,
    ApiJson(body): ApiJson<RespondExtensionBody>,
) -> ApiResult<Json<TaskResponse>>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let approved = body.approved;
    let task = state
        .marketplace()
        .extensions()
        .respond(task_id, actor, body.into())
        .await?;
    let message = if approved {
        "extension approved"
    } else {
        "extension rejected"
    };
    Ok(Json(TaskResponse {
        message: message.to_owned(),
        task,
    }))
}
