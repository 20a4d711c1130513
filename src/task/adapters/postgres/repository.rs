//! `PostgreSQL` repository implementation for task marketplace storage.

use super::{
    models::{
        ApplicationRow, TaskRow, row_to_application, row_to_task, to_application_record,
        to_task_record,
    },
    schema::{applications, tasks},
};
use crate::task::{
    domain::{
        Application, ApplicationId, ApplicationStatus, Task, TaskAggregate, TaskId, UserId,
    },
    ports::{TaskQuery, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

const APPLICATION_UNIQUE_CONSTRAINT: &str = "applications_task_worker_key";

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

/// Error carried out of a Diesel transaction closure.
enum TxError {
    Diesel(DieselError),
    Repository(TaskRepositoryError),
}

impl From<DieselError> for TxError {
    fn from(err: DieselError) -> Self {
        Self::Diesel(err)
    }
}

impl From<TaskRepositoryError> for TxError {
    fn from(err: TaskRepositoryError) -> Self {
        Self::Repository(err)
    }
}

impl From<TxError> for TaskRepositoryError {
    fn from(err: TxError) -> Self {
        match err {
            TxError::Diesel(inner) => Self::persistence(inner),
            TxError::Repository(inner) => inner,
        }
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn insert(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let record = to_task_record(task)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&record)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn load(&self, id: TaskId) -> TaskRepositoryResult<Option<TaskAggregate>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            let Some(task_row) = row else {
                return Ok(None);
            };
            let application_rows = applications::table
                .filter(applications::task_id.eq(id.into_inner()))
                .order((applications::created_at.asc(), applications::id.asc()))
                .select(ApplicationRow::as_select())
                .load::<ApplicationRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;

            let task = row_to_task(task_row)?;
            let applications = application_rows
                .into_iter()
                .map(row_to_application)
                .collect::<TaskRepositoryResult<Vec<_>>>()?;
            Ok(Some(TaskAggregate::from_parts(task, applications)))
        })
        .await
    }

    async fn commit(
        &self,
        aggregate: &TaskAggregate,
        expected_version: u64,
    ) -> TaskRepositoryResult<()> {
        let task_id = aggregate.task().id();
        let task_record = to_task_record(aggregate.task())?;
        let application_records = aggregate
            .applications()
            .iter()
            .map(to_application_record)
            .collect::<TaskRepositoryResult<Vec<_>>>()?;
        let expected = i64::try_from(expected_version).map_err(TaskRepositoryError::persistence)?;

        self.run_blocking(move |connection| {
            connection
                .transaction::<(), TxError, _>(|tx| {
                    let updated = diesel::update(
                        tasks::table
                            .filter(tasks::id.eq(task_id.into_inner()))
                            .filter(tasks::version.eq(expected)),
                    )
                    .set(&task_record)
                    .execute(tx)?;
                    if updated == 0 {
                        return Err(stale_write(tx, task_id, expected_version)?.into());
                    }

                    for record in &application_records {
                        diesel::insert_into(applications::table)
                            .values(record)
                            .on_conflict(applications::id)
                            .do_update()
                            .set(record)
                            .execute(tx)
                            .map_err(|err| match err {
                                DieselError::DatabaseError(
                                    DatabaseErrorKind::UniqueViolation,
                                    ref info,
                                ) if is_application_unique_violation(info.as_ref()) => {
                                    TxError::Repository(TaskRepositoryError::DuplicateApplication {
                                        task_id,
                                        worker_id: UserId::from_uuid(record.worker_id),
                                    })
                                }
                                _ => TxError::Diesel(err),
                            })?;
                    }
                    Ok(())
                })
                .map_err(TaskRepositoryError::from)
        })
        .await
    }

    async fn delete(&self, id: TaskId, expected_version: u64) -> TaskRepositoryResult<()> {
        let expected = i64::try_from(expected_version).map_err(TaskRepositoryError::persistence)?;

        self.run_blocking(move |connection| {
            connection
                .transaction::<(), TxError, _>(|tx| {
                    let deleted = diesel::delete(
                        tasks::table
                            .filter(tasks::id.eq(id.into_inner()))
                            .filter(tasks::version.eq(expected)),
                    )
                    .execute(tx)?;
                    if deleted == 0 {
                        return Err(stale_write(tx, id, expected_version)?.into());
                    }
                    Ok(())
                })
                .map_err(TaskRepositoryError::from)
        })
        .await
    }

    async fn find_application(
        &self,
        id: ApplicationId,
    ) -> TaskRepositoryResult<Option<Application>> {
        self.run_blocking(move |connection| {
            let row = applications::table
                .filter(applications::id.eq(id.into_inner()))
                .select(ApplicationRow::as_select())
                .first::<ApplicationRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_application).transpose()
        })
        .await
    }

    async fn list_tasks(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>> {
        let filter = *query;
        self.run_blocking(move |connection| {
            let mut statement = tasks::table
                .select(TaskRow::as_select())
                .order((tasks::created_at.desc(), tasks::id.asc()))
                .into_boxed();
            if let Some(status) = filter.status() {
                statement = statement.filter(tasks::status.eq(status.as_str()));
            }
            if let Some(client_id) = filter.client_id() {
                statement = statement.filter(tasks::client_id.eq(client_id.into_inner()));
            }
            if let Some(worker_id) = filter.assigned_worker_id() {
                statement =
                    statement.filter(tasks::assigned_worker_id.eq(worker_id.into_inner()));
            }
            statement
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?
                .into_iter()
                .map(row_to_task)
                .collect()
        })
        .await
    }

    async fn list_applications_for_worker(
        &self,
        worker_id: UserId,
        status: Option<ApplicationStatus>,
    ) -> TaskRepositoryResult<Vec<Application>> {
        self.run_blocking(move |connection| {
            let mut statement = applications::table
                .filter(applications::worker_id.eq(worker_id.into_inner()))
                .select(ApplicationRow::as_select())
                .order((applications::created_at.desc(), applications::id.asc()))
                .into_boxed();
            if let Some(wanted) = status {
                statement = statement.filter(applications::status.eq(wanted.as_str()));
            }
            statement
                .load::<ApplicationRow>(connection)
                .map_err(TaskRepositoryError::persistence)?
                .into_iter()
                .map(row_to_application)
                .collect()
        })
        .await
    }
}

/// Classifies a guarded write that touched no rows.
fn stale_write(
    connection: &mut PgConnection,
    task_id: TaskId,
    expected: u64,
) -> Result<TaskRepositoryError, DieselError> {
    let stored = tasks::table
        .filter(tasks::id.eq(task_id.into_inner()))
        .select(tasks::version)
        .first::<i64>(connection)
        .optional()?;
    Ok(stored.map_or(TaskRepositoryError::NotFound(task_id), |column| {
        u64::try_from(column).map_or_else(TaskRepositoryError::persistence, |actual| {
            TaskRepositoryError::VersionConflict {
                task_id,
                expected,
                actual,
            }
        })
    }))
}

fn is_application_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == APPLICATION_UNIQUE_CONSTRAINT)
}
