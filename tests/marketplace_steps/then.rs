//! Then steps for marketplace BDD scenarios.

use super::world::{MarketplaceWorld, run_async};
use chrono::{DateTime, Utc};
use eyre::WrapErr;
use rstest_bdd_macros::then;

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &MarketplaceWorld, status: String) -> Result<(), eyre::Report> {
    let actual = world.current_task()?.status();
    if actual.as_str() != status {
        return Err(eyre::eyre!("expected task status {status}, found {actual}"));
    }
    Ok(())
}

#[then(r#"the payment status is "{status}""#)]
fn payment_status_is(world: &MarketplaceWorld, status: String) -> Result<(), eyre::Report> {
    let actual = world.current_task()?.payment_status();
    if actual.as_str() != status {
        return Err(eyre::eyre!("expected payment status {status}, found {actual}"));
    }
    Ok(())
}

#[then(r#"the task is assigned to "{worker}""#)]
fn task_is_assigned_to(world: &MarketplaceWorld, worker: String) -> Result<(), eyre::Report> {
    let expected = world.known_user(&worker)?;
    let assigned = world.current_task()?.assigned_worker_id();
    if assigned != Some(expected) {
        return Err(eyre::eyre!("expected {worker} to be assigned, found {assigned:?}"));
    }
    Ok(())
}

#[then(r#"the application from "{worker}" is "{status}""#)]
fn application_status_is(
    world: &MarketplaceWorld,
    worker: String,
    status: String,
) -> Result<(), eyre::Report> {
    let application_id = world.application_of(&worker)?;
    let owner = world.current_task()?.client_id();
    let application = run_async(world.marketplace.applications().find(application_id, owner))
        .wrap_err_with(|| format!("load application from {worker}"))?;
    if application.status().as_str() != status {
        return Err(eyre::eyre!(
            "expected application from {worker} to be {status}, found {}",
            application.status()
        ));
    }
    Ok(())
}

#[then(r#"the operation fails with code "{code}""#)]
fn operation_fails_with_code(world: &MarketplaceWorld, code: String) -> Result<(), eyre::Report> {
    let err = world
        .last_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("expected the last operation to fail"))?;
    if err.code() != code {
        return Err(eyre::eyre!("expected code {code}, got {} ({err})", err.code()));
    }
    Ok(())
}

#[then(r#"the extension request is "{status}""#)]
fn extension_request_is(world: &MarketplaceWorld, status: String) -> Result<(), eyre::Report> {
    let request = world
        .current_task()?
        .time_extension_request()
        .ok_or_else(|| eyre::eyre!("task carries no extension request"))?;
    if request.status().as_str() != status {
        return Err(eyre::eyre!(
            "expected extension request to be {status}, found {}",
            request.status()
        ));
    }
    Ok(())
}

#[then(r#"the task deadline is "{deadline}""#)]
fn task_deadline_is(world: &MarketplaceWorld, deadline: String) -> Result<(), eyre::Report> {
    let expected = DateTime::parse_from_rfc3339(&deadline)
        .wrap_err_with(|| format!("parse scenario deadline {deadline}"))?
        .with_timezone(&Utc);
    let actual = world.current_task()?.deadline();
    if actual != Some(expected) {
        return Err(eyre::eyre!("expected deadline {expected}, found {actual:?}"));
    }
    Ok(())
}

#[then("the task has no deadline")]
fn task_has_no_deadline(world: &MarketplaceWorld) -> Result<(), eyre::Report> {
    let actual = world.current_task()?.deadline();
    if actual.is_some() {
        return Err(eyre::eyre!("expected no deadline, found {actual:?}"));
    }
    Ok(())
}
