//! Diesel row models for task and application persistence, with the
//! conversions between rows and domain types.

use super::schema::{applications, tasks};
use crate::task::{
    domain::{
        Application, ApplicationId, ApplicationStatus, Budget, DeliveryRecord, DeliveryStatus,
        ExtensionRequest, PaymentStatus, PersistedApplicationData, PersistedTaskData, Task,
        TaskAttributes, TaskId, TaskStatus, TaskTitle, UserId,
    },
    ports::{TaskRepositoryError, TaskRepositoryResult},
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Owning client.
    pub client_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Budget in whole currency units.
    pub budget: i64,
    /// Optional category label.
    pub category: Option<String>,
    /// Required skills JSON array.
    pub required_skills: Value,
    /// Current deadline.
    pub deadline: Option<DateTime<Utc>>,
    /// Lifecycle status.
    pub status: String,
    /// Assigned worker.
    pub assigned_worker_id: Option<uuid::Uuid>,
    /// Delivery sub-state.
    pub delivery_status: String,
    /// Delivery submissions JSON array.
    pub deliveries: Value,
    /// Latest delivery timestamp.
    pub delivered_at: Option<DateTime<Utc>>,
    /// Receipt confirmation timestamp.
    pub received_at: Option<DateTime<Utc>>,
    /// Payment sub-state.
    pub payment_status: String,
    /// Payment timestamp.
    pub paid_at: Option<DateTime<Utc>>,
    /// Current extension request JSON.
    pub extension_request: Option<Value>,
    /// Superseded extension requests JSON array.
    pub extension_history: Value,
    /// Optimistic concurrency version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Insert and update model for task records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskRecord {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Owning client.
    pub client_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Budget in whole currency units.
    pub budget: i64,
    /// Optional category label.
    pub category: Option<String>,
    /// Required skills JSON array.
    pub required_skills: Value,
    /// Current deadline.
    pub deadline: Option<DateTime<Utc>>,
    /// Lifecycle status.
    pub status: String,
    /// Assigned worker.
    pub assigned_worker_id: Option<uuid::Uuid>,
    /// Delivery sub-state.
    pub delivery_status: String,
    /// Delivery submissions JSON array.
    pub deliveries: Value,
    /// Latest delivery timestamp.
    pub delivered_at: Option<DateTime<Utc>>,
    /// Receipt confirmation timestamp.
    pub received_at: Option<DateTime<Utc>>,
    /// Payment sub-state.
    pub payment_status: String,
    /// Payment timestamp.
    pub paid_at: Option<DateTime<Utc>>,
    /// Current extension request JSON.
    pub extension_request: Option<Value>,
    /// Superseded extension requests JSON array.
    pub extension_history: Value,
    /// Optimistic concurrency version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Query result row for application records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ApplicationRow {
    /// Internal application identifier.
    pub id: uuid::Uuid,
    /// Task applied to.
    pub task_id: uuid::Uuid,
    /// Applying worker.
    pub worker_id: uuid::Uuid,
    /// Cover letter text.
    pub cover_letter: String,
    /// Counter-offer.
    pub proposed_budget: Option<i64>,
    /// Completion estimate.
    pub estimated_completion_time: Option<String>,
    /// Application status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Client decision timestamp.
    pub responded_at: Option<DateTime<Utc>>,
}

/// Insert and update model for application records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = applications)]
#[diesel(treat_none_as_null = true)]
pub struct ApplicationRecord {
    /// Internal application identifier.
    pub id: uuid::Uuid,
    /// Task applied to.
    pub task_id: uuid::Uuid,
    /// Applying worker.
    pub worker_id: uuid::Uuid,
    /// Cover letter text.
    pub cover_letter: String,
    /// Counter-offer.
    pub proposed_budget: Option<i64>,
    /// Completion estimate.
    pub estimated_completion_time: Option<String>,
    /// Application status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Client decision timestamp.
    pub responded_at: Option<DateTime<Utc>>,
}

/// Converts a domain task into a row for insert or update.
pub fn to_task_record(task: &Task) -> TaskRepositoryResult<TaskRecord> {
    let attributes = task.attributes();
    Ok(TaskRecord {
        id: task.id().into_inner(),
        client_id: task.client_id().into_inner(),
        title: attributes.title().as_str().to_owned(),
        description: attributes.description().to_owned(),
        budget: amount_to_column(task.budget())?,
        category: attributes.category().map(str::to_owned),
        required_skills: to_json(attributes.required_skills())?,
        deadline: task.deadline(),
        status: task.status().as_str().to_owned(),
        assigned_worker_id: task.assigned_worker_id().map(UserId::into_inner),
        delivery_status: task.delivery_status().as_str().to_owned(),
        deliveries: to_json(task.deliveries())?,
        delivered_at: task.delivered_at(),
        received_at: task.received_at(),
        payment_status: task.payment_status().as_str().to_owned(),
        paid_at: task.paid_at(),
        extension_request: task.time_extension_request().map(to_json).transpose()?,
        extension_history: to_json(task.extension_history())?,
        version: i64::try_from(task.version()).map_err(TaskRepositoryError::persistence)?,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
        completed_at: task.completed_at(),
    })
}

/// Reconstructs a domain task from a stored row.
pub fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        client_id,
        title,
        description,
        budget,
        category,
        required_skills,
        deadline,
        status,
        assigned_worker_id,
        delivery_status,
        deliveries,
        delivered_at,
        received_at,
        payment_status,
        paid_at,
        extension_request,
        extension_history,
        version,
        created_at,
        updated_at,
        completed_at,
    } = row;

    let skills: Vec<String> = from_json(required_skills)?;
    let mut attributes = TaskAttributes::new(
        TaskTitle::new(title).map_err(TaskRepositoryError::persistence)?,
        column_to_amount(budget)?,
    )
    .with_description(description)
    .with_required_skills(skills);
    if let Some(label) = category {
        attributes = attributes
            .with_category(label)
            .map_err(TaskRepositoryError::persistence)?;
    }

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        client_id: UserId::from_uuid(client_id),
        attributes,
        deadline,
        status: TaskStatus::try_from(status.as_str()).map_err(TaskRepositoryError::persistence)?,
        assigned_worker_id: assigned_worker_id.map(UserId::from_uuid),
        delivery_status: DeliveryStatus::try_from(delivery_status.as_str())
            .map_err(TaskRepositoryError::persistence)?,
        deliveries: from_json::<Vec<DeliveryRecord>>(deliveries)?,
        delivered_at,
        received_at,
        payment_status: PaymentStatus::try_from(payment_status.as_str())
            .map_err(TaskRepositoryError::persistence)?,
        paid_at,
        time_extension_request: extension_request
            .map(from_json::<ExtensionRequest>)
            .transpose()?,
        extension_history: from_json(extension_history)?,
        version: u64::try_from(version).map_err(TaskRepositoryError::persistence)?,
        created_at,
        updated_at,
        completed_at,
    };
    Ok(Task::from_persisted(data))
}

/// Converts a domain application into a row for insert or update.
pub fn to_application_record(application: &Application) -> TaskRepositoryResult<ApplicationRecord> {
    Ok(ApplicationRecord {
        id: application.id().into_inner(),
        task_id: application.task_id().into_inner(),
        worker_id: application.worker_id().into_inner(),
        cover_letter: application.cover_letter().to_owned(),
        proposed_budget: application
            .proposed_budget()
            .map(amount_to_column)
            .transpose()?,
        estimated_completion_time: application.estimated_completion_time().map(str::to_owned),
        status: application.status().as_str().to_owned(),
        created_at: application.created_at(),
        updated_at: application.updated_at(),
        responded_at: application.responded_at(),
    })
}

/// Reconstructs a domain application from a stored row.
pub fn row_to_application(row: ApplicationRow) -> TaskRepositoryResult<Application> {
    let data = PersistedApplicationData {
        id: ApplicationId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        worker_id: UserId::from_uuid(row.worker_id),
        cover_letter: row.cover_letter,
        proposed_budget: row.proposed_budget.map(column_to_amount).transpose()?,
        estimated_completion_time: row.estimated_completion_time,
        status: ApplicationStatus::try_from(row.status.as_str())
            .map_err(TaskRepositoryError::persistence)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
        responded_at: row.responded_at,
    };
    Ok(Application::from_persisted(data))
}

fn amount_to_column(budget: Budget) -> TaskRepositoryResult<i64> {
    i64::try_from(budget.amount()).map_err(TaskRepositoryError::persistence)
}

fn column_to_amount(value: i64) -> TaskRepositoryResult<Budget> {
    let amount = u64::try_from(value).map_err(TaskRepositoryError::persistence)?;
    Budget::new(amount).map_err(TaskRepositoryError::persistence)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> TaskRepositoryResult<Value> {
    serde_json::to_value(value).map_err(TaskRepositoryError::persistence)
}

fn from_json<T: serde::de::DeserializeOwned>(value: Value) -> TaskRepositoryResult<T> {
    serde_json::from_value(value).map_err(TaskRepositoryError::persistence)
}
