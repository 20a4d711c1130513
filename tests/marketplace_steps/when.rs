//! When steps for marketplace BDD scenarios.

use super::world::{MarketplaceWorld, run_async};
use atelier::task::{
    domain::ApplicationDecision,
    services::{RequestExtensionRequest, RespondExtensionRequest, SubmitApplicationRequest},
};
use chrono::{DateTime, Utc};
use eyre::WrapErr;
use rstest_bdd_macros::when;

#[when(r#""{client}" accepts the application from "{worker}""#)]
fn accept_application(
    world: &mut MarketplaceWorld,
    client: String,
    worker: String,
) -> Result<(), eyre::Report> {
    let client_id = world.known_user(&client)?;
    let application_id = world.application_of(&worker)?;
    let result = run_async(world.marketplace.arbitration().decide(
        application_id,
        ApplicationDecision::Accept,
        client_id,
    ));
    world.record(result.map(|outcome| outcome.task));
    Ok(())
}

#[when(r#""{worker}" applies to the task"#)]
fn apply_to_task(world: &mut MarketplaceWorld, worker: String) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    let worker_id = world.user(&worker);
    let result = run_async(world.marketplace.applications().submit(
        task_id,
        worker_id,
        SubmitApplicationRequest::new("Let me have a go"),
    ));
    world.last_error = result.err();
    Ok(())
}

#[when(r#""{worker}" delivers the work"#)]
fn deliver_work(world: &mut MarketplaceWorld, worker: String) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    let worker_id = world.known_user(&worker)?;
    let result = run_async(world.marketplace.settlement().deliver(
        task_id,
        worker_id,
        Some("Work is finished".to_owned()),
    ));
    world.record(result);
    Ok(())
}

#[when(r#""{client}" confirms receipt"#)]
fn confirm_receipt(world: &mut MarketplaceWorld, client: String) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    let client_id = world.known_user(&client)?;
    let result = run_async(
        world
            .marketplace
            .settlement()
            .mark_received(task_id, client_id),
    );
    world.record(result);
    Ok(())
}

#[when(r#""{actor}" pays for the task"#)]
fn pay_for_task(world: &mut MarketplaceWorld, actor: String) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    let actor_id = world.known_user(&actor)?;
    let result = run_async(world.marketplace.settlement().make_payment(task_id, actor_id));
    world.record(result);
    Ok(())
}

#[when(r#""{worker}" requests an extension to "{deadline}" because "{reason}""#)]
fn request_extension(
    world: &mut MarketplaceWorld,
    worker: String,
    deadline: String,
    reason: String,
) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    let worker_id = world.known_user(&worker)?;
    let new_deadline = DateTime::parse_from_rfc3339(&deadline)
        .wrap_err_with(|| format!("parse scenario deadline {deadline}"))?
        .with_timezone(&Utc);
    let result = run_async(world.marketplace.extensions().request(
        task_id,
        worker_id,
        RequestExtensionRequest::new(reason).with_new_deadline(new_deadline),
    ));
    world.record(result);
    Ok(())
}

fn respond(
    world: &mut MarketplaceWorld,
    actor: &str,
    response: RespondExtensionRequest,
) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    let actor_id = world.known_user(actor)?;
    let result = run_async(
        world
            .marketplace
            .extensions()
            .respond(task_id, actor_id, response),
    );
    world.record(result);
    Ok(())
}

#[when(r#""{actor}" approves the extension"#)]
fn approve_extension(world: &mut MarketplaceWorld, actor: String) -> Result<(), eyre::Report> {
    respond(world, &actor, RespondExtensionRequest::approve())
}

#[when(r#""{actor}" rejects the extension"#)]
fn reject_extension(world: &mut MarketplaceWorld, actor: String) -> Result<(), eyre::Report> {
    respond(
        world,
        &actor,
        RespondExtensionRequest::reject().with_response_message("The date stands"),
    )
}
