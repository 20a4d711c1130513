//! HTTP route table.

use super::{handlers, state::ApiState};
use crate::task::ports::TaskRepository;
use axum::{
    Router,
    routing::{get, post},
};
use mockable::Clock;
use tower_http::trace::TraceLayer;

/// Creates the router exposing the marketplace operations.
#[must_use]
pub fn create_router<R, C>(state: ApiState<R, C>) -> Router
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(handlers::health_check))
        // Tasks
        .route(
            "/tasks",
            get(handlers::list_tasks::<R, C>).post(handlers::create_task::<R, C>),
        )
        .route(
            "/tasks/:id",
            get(handlers::get_task::<R, C>)
                .patch(handlers::update_task::<R, C>)
                .delete(handlers::delete_task::<R, C>),
        )
        .route(
            "/tasks/:id/applications",
            get(handlers::list_task_applications::<R, C>)
                .post(handlers::submit_application::<R, C>),
        )
        // Settlement
        .route("/tasks/:id/deliver", post(handlers::deliver::<R, C>))
        .route(
            "/tasks/:id/mark-received",
            post(handlers::mark_received::<R, C>),
        )
        .route("/tasks/:id/make-payment", post(handlers::make_payment::<R, C>))
        // Extensions
        .route(
            "/tasks/:id/request-extension",
            post(handlers::request_extension::<R, C>),
        )
        .route(
            "/tasks/:id/respond-extension",
            post(handlers::respond_extension::<R, C>),
        )
        // Applications
        .route(
            "/applications",
            get(handlers::list_my_applications::<R, C>),
        )
        .route(
            "/applications/:id",
            get(handlers::get_application::<R, C>).patch(handlers::decide_application::<R, C>),
        )
        .route(
            "/applications/:id/withdraw",
            post(handlers::withdraw_application::<R, C>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
