//! Contract tests for [`InMemoryTaskRepository`].

use atelier::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{
        ApplicationProposal, ApplicationStatus, Budget, Task, TaskAggregate, TaskAttributes,
        TaskStatus, TaskTitle, UserId,
    },
    ports::{TaskQuery, TaskRepository, TaskRepositoryError},
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn repository() -> InMemoryTaskRepository {
    InMemoryTaskRepository::new()
}

fn task(client: UserId) -> Task {
    let attributes = TaskAttributes::new(
        TaskTitle::new("Replace a tap").expect("valid title"),
        Budget::new(90).expect("valid budget"),
    );
    Task::new(client, attributes, None, &DefaultClock)
}

fn proposal() -> ApplicationProposal {
    ApplicationProposal::new("Qualified plumber").expect("valid proposal")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn insert_rejects_duplicate_identifier(repository: InMemoryTaskRepository) {
    let created = task(UserId::new());
    repository.insert(&created).await.expect("first insert");

    let result = repository.insert(&created).await;

    assert!(matches!(result, Err(TaskRepositoryError::DuplicateTask(id)) if id == created.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn commit_persists_task_and_applications_together(repository: InMemoryTaskRepository) {
    let created = task(UserId::new());
    repository.insert(&created).await.expect("insert");
    let worker = UserId::new();
    let mut aggregate = TaskAggregate::new(created.clone());
    let application = aggregate
        .submit_application(worker, proposal(), &DefaultClock)
        .expect("submission");
    let expected = aggregate.bump_version();

    repository
        .commit(&aggregate, expected)
        .await
        .expect("commit at the read version");

    let stored = repository
        .load(created.id())
        .await
        .expect("load")
        .expect("task exists");
    assert_eq!(stored, aggregate);
    let found = repository
        .find_application(application.id())
        .await
        .expect("lookup");
    assert_eq!(found, Some(application));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_commit_is_a_version_conflict(repository: InMemoryTaskRepository) {
    let created = task(UserId::new());
    repository.insert(&created).await.expect("insert");
    let mut winner = TaskAggregate::new(created.clone());
    let mut loser = TaskAggregate::new(created.clone());
    let winner_expected = winner.bump_version();
    repository
        .commit(&winner, winner_expected)
        .await
        .expect("winner commits");

    let loser_expected = loser.bump_version();
    let result = repository.commit(&loser, loser_expected).await;

    assert!(matches!(
        result,
        Err(TaskRepositoryError::VersionConflict {
            expected: 0,
            actual: 1,
            ..
        })
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn colliding_application_is_rejected_by_store(repository: InMemoryTaskRepository) {
    let created = task(UserId::new());
    repository.insert(&created).await.expect("insert");
    let worker = UserId::new();
    let mut first = TaskAggregate::new(created.clone());
    first
        .submit_application(worker, proposal(), &DefaultClock)
        .expect("submission");
    let first_expected = first.bump_version();
    repository
        .commit(&first, first_expected)
        .await
        .expect("first commit");

    let reloaded = repository
        .load(created.id())
        .await
        .expect("load")
        .expect("task exists");
    let (reloaded_task, _) = reloaded.into_parts();
    let mut second = TaskAggregate::new(reloaded_task);
    second
        .submit_application(worker, proposal(), &DefaultClock)
        .expect("aggregate without history accepts the bid");
    let second_expected = second.bump_version();

    let result = repository.commit(&second, second_expected).await;

    assert!(matches!(
        result,
        Err(TaskRepositoryError::DuplicateApplication { worker_id, .. }) if worker_id == worker
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_cascades_and_checks_version(repository: InMemoryTaskRepository) {
    let created = task(UserId::new());
    repository.insert(&created).await.expect("insert");
    let mut aggregate = TaskAggregate::new(created.clone());
    let application = aggregate
        .submit_application(UserId::new(), proposal(), &DefaultClock)
        .expect("submission");
    let expected = aggregate.bump_version();
    repository.commit(&aggregate, expected).await.expect("commit");

    let stale = repository.delete(created.id(), 0).await;
    assert!(matches!(
        stale,
        Err(TaskRepositoryError::VersionConflict { .. })
    ));

    repository.delete(created.id(), 1).await.expect("delete");

    assert_eq!(repository.load(created.id()).await.expect("load"), None);
    assert_eq!(
        repository
            .find_application(application.id())
            .await
            .expect("lookup"),
        None
    );
    assert!(matches!(
        repository.delete(created.id(), 1).await,
        Err(TaskRepositoryError::NotFound(_))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listings_filter_and_order_newest_first(repository: InMemoryTaskRepository) {
    let client = UserId::new();
    let older = task(client);
    std::thread::sleep(std::time::Duration::from_millis(5));
    let newer = task(client);
    let foreign = task(UserId::new());
    for item in [&older, &newer, &foreign] {
        repository.insert(item).await.expect("insert");
    }

    let mine = repository
        .list_tasks(&TaskQuery::new().with_client(client))
        .await
        .expect("listing");
    let in_progress = repository
        .list_tasks(&TaskQuery::new().with_status(TaskStatus::InProgress))
        .await
        .expect("listing");

    let ids: Vec<_> = mine.iter().map(Task::id).collect();
    assert_eq!(ids, vec![newer.id(), older.id()]);
    assert!(in_progress.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn worker_listing_filters_by_status(repository: InMemoryTaskRepository) {
    let created = task(UserId::new());
    repository.insert(&created).await.expect("insert");
    let worker = UserId::new();
    let mut aggregate = TaskAggregate::new(created);
    aggregate
        .submit_application(worker, proposal(), &DefaultClock)
        .expect("submission");
    aggregate
        .submit_application(UserId::new(), proposal(), &DefaultClock)
        .expect("submission");
    let expected = aggregate.bump_version();
    repository.commit(&aggregate, expected).await.expect("commit");

    let pending = repository
        .list_applications_for_worker(worker, Some(ApplicationStatus::Pending))
        .await
        .expect("listing");
    let accepted = repository
        .list_applications_for_worker(worker, Some(ApplicationStatus::Accepted))
        .await
        .expect("listing");

    assert_eq!(pending.len(), 1);
    assert!(accepted.is_empty());
}
