//! Given steps for marketplace BDD scenarios.

use super::world::{MarketplaceWorld, run_async};
use atelier::task::{
    domain::{ApplicationDecision, TaskId, UserId},
    services::{CreateTaskRequest, SubmitApplicationRequest},
};
use eyre::WrapErr;
use rstest_bdd_macros::given;

fn post(
    world: &mut MarketplaceWorld,
    client: UserId,
    title: String,
    budget: u64,
) -> Result<TaskId, eyre::Report> {
    let task = run_async(
        world
            .marketplace
            .tasks()
            .create(client, CreateTaskRequest::new(title, budget)),
    )
    .wrap_err("post task in scenario setup")?;
    let task_id = task.id();
    world.task = Some(task);
    Ok(task_id)
}

fn file_application(
    world: &mut MarketplaceWorld,
    task_id: TaskId,
    worker: &str,
) -> Result<(), eyre::Report> {
    let worker_id = world.user(worker);
    let application = run_async(world.marketplace.applications().submit(
        task_id,
        worker_id,
        SubmitApplicationRequest::new(format!("{worker} can start tomorrow")),
    ))
    .wrap_err_with(|| format!("file application for {worker}"))?;
    world.applications.insert(worker.to_owned(), application.id());
    Ok(())
}

fn accept(world: &mut MarketplaceWorld, client: &str, worker: &str) -> Result<(), eyre::Report> {
    let client_id = world.known_user(client)?;
    let application_id = world.application_of(worker)?;
    let outcome = run_async(world.marketplace.arbitration().decide(
        application_id,
        ApplicationDecision::Accept,
        client_id,
    ))
    .wrap_err("accept application in scenario setup")?;
    world.task = Some(outcome.task);
    Ok(())
}

#[given(r#"client "{client}" has posted a task "{title}" with budget {budget:u64}"#)]
fn posted_task(
    world: &mut MarketplaceWorld,
    client: String,
    title: String,
    budget: u64,
) -> Result<(), eyre::Report> {
    let client_id = world.user(&client);
    post(world, client_id, title, budget)?;
    Ok(())
}

#[given(r#"worker "{worker}" has applied to the task"#)]
fn worker_has_applied(world: &mut MarketplaceWorld, worker: String) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    file_application(world, task_id, &worker)
}

#[given(r#""{client}" has accepted the application from "{worker}""#)]
fn application_accepted(
    world: &mut MarketplaceWorld,
    client: String,
    worker: String,
) -> Result<(), eyre::Report> {
    accept(world, &client, &worker)
}

#[given(r#"client "{client}" has assigned a task "{title}" to worker "{worker}""#)]
fn assigned_task(
    world: &mut MarketplaceWorld,
    client: String,
    title: String,
    worker: String,
) -> Result<(), eyre::Report> {
    let client_id = world.user(&client);
    let task_id = post(world, client_id, title, 500)?;
    file_application(world, task_id, &worker)?;
    accept(world, &client, &worker)
}
