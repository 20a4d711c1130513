//! Shared fixtures for task unit tests.

use crate::task::domain::{
    ApplicationDecision, ApplicationProposal, Budget, Task, TaskAggregate, TaskAttributes,
    TaskTitle, UserId,
};
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use rstest::fixture;
use std::sync::atomic::{AtomicI64, Ordering};

/// Clock that advances one second on every read.
#[derive(Debug)]
pub struct SteppingClock {
    start: DateTime<Utc>,
    ticks: AtomicI64,
}

impl SteppingClock {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            start,
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + TimeDelta::seconds(tick)
    }
}

#[fixture]
pub fn clock() -> SteppingClock {
    SteppingClock::starting_at(
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .expect("valid start instant"),
    )
}

pub fn attributes(title: &str, budget: u64) -> TaskAttributes {
    TaskAttributes::new(
        TaskTitle::new(title).expect("valid title"),
        Budget::new(budget).expect("valid budget"),
    )
}

pub fn proposal(cover_letter: &str) -> ApplicationProposal {
    ApplicationProposal::new(cover_letter).expect("valid proposal")
}

pub fn open_aggregate(client: UserId, clock: &SteppingClock) -> TaskAggregate {
    TaskAggregate::new(Task::new(client, attributes("Tile the bathroom", 800), None, clock))
}

/// A task with one accepted application by `worker`.
pub fn assigned_aggregate(client: UserId, worker: UserId, clock: &SteppingClock) -> TaskAggregate {
    let mut aggregate = open_aggregate(client, clock);
    let application = aggregate
        .submit_application(worker, proposal("Ten years of tiling"), clock)
        .expect("submission succeeds");
    aggregate
        .decide(application.id(), ApplicationDecision::Accept, clock)
        .expect("acceptance succeeds");
    aggregate
}
