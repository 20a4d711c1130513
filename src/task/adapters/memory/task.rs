//! In-memory repository for task aggregates.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{
        Application, ApplicationId, ApplicationStatus, Task, TaskAggregate, TaskId, UserId,
    },
    ports::{TaskQuery, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Every write takes the single state lock, which makes
/// [`TaskRepository::commit`] atomic across the task and its applications.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    applications: HashMap<ApplicationId, Application>,
    task_index: HashMap<TaskId, Vec<ApplicationId>>,
    applicant_index: HashSet<(TaskId, UserId)>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

fn check_version(
    state: &InMemoryTaskState,
    id: TaskId,
    expected: u64,
) -> TaskRepositoryResult<()> {
    let stored = state.tasks.get(&id).ok_or(TaskRepositoryError::NotFound(id))?;
    if stored.version() != expected {
        return Err(TaskRepositoryError::VersionConflict {
            task_id: id,
            expected,
            actual: stored.version(),
        });
    }
    Ok(())
}

/// Rejects new applications whose (task, worker) pair is already taken.
fn check_new_applications(
    state: &InMemoryTaskState,
    applications: &[Application],
) -> TaskRepositoryResult<()> {
    let colliding = applications.iter().find(|app| {
        !state.applications.contains_key(&app.id())
            && state
                .applicant_index
                .contains(&(app.task_id(), app.worker_id()))
    });
    colliding.map_or(Ok(()), |app| {
        Err(TaskRepositoryError::DuplicateApplication {
            task_id: app.task_id(),
            worker_id: app.worker_id(),
        })
    })
}

fn remove_task(state: &mut InMemoryTaskState, id: TaskId) {
    state.tasks.remove(&id);
    for application_id in state.task_index.remove(&id).unwrap_or_default() {
        if let Some(application) = state.applications.remove(&application_id) {
            state
                .applicant_index
                .remove(&(application.task_id(), application.worker_id()));
        }
    }
}

fn newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> chrono::DateTime<chrono::Utc>) {
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn insert(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.task_index.insert(task.id(), Vec::new());
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn load(&self, id: TaskId) -> TaskRepositoryResult<Option<TaskAggregate>> {
        let state = self.state.read().map_err(lock_error)?;
        let Some(task) = state.tasks.get(&id) else {
            return Ok(None);
        };
        let applications = state
            .task_index
            .get(&id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|app_id| state.applications.get(app_id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(Some(TaskAggregate::from_parts(task.clone(), applications)))
    }

    async fn commit(
        &self,
        aggregate: &TaskAggregate,
        expected_version: u64,
    ) -> TaskRepositoryResult<()> {
        let task = aggregate.task();
        let mut state = self.state.write().map_err(lock_error)?;
        check_version(&state, task.id(), expected_version)?;
        check_new_applications(&state, aggregate.applications())?;

        for application in aggregate.applications() {
            let is_new = state
                .applications
                .insert(application.id(), application.clone())
                .is_none();
            if is_new {
                state
                    .applicant_index
                    .insert((application.task_id(), application.worker_id()));
                state
                    .task_index
                    .entry(task.id())
                    .or_default()
                    .push(application.id());
            }
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn delete(&self, id: TaskId, expected_version: u64) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        check_version(&state, id, expected_version)?;
        remove_task(&mut state, id);
        Ok(())
    }

    async fn find_application(
        &self,
        id: ApplicationId,
    ) -> TaskRepositoryResult<Option<Application>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.applications.get(&id).cloned())
    }

    async fn list_tasks(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| query.matches(task))
            .cloned()
            .collect();
        newest_first(&mut tasks, Task::created_at);
        Ok(tasks)
    }

    async fn list_applications_for_worker(
        &self,
        worker_id: UserId,
        status: Option<ApplicationStatus>,
    ) -> TaskRepositoryResult<Vec<Application>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut applications: Vec<Application> = state
            .applications
            .values()
            .filter(|app| app.worker_id() == worker_id)
            .filter(|app| status.is_none_or(|wanted| app.status() == wanted))
            .cloned()
            .collect();
        newest_first(&mut applications, Application::created_at);
        Ok(applications)
    }
}
