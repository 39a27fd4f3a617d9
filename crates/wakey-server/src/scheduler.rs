//! Background loop that turns alarm definitions into `trigger` calls.

use chrono::{DateTime, Local, TimeZone, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use wakey_core::clock::Clock;
use wakey_core::schedule;
use wakey_core::types::AlarmDefinition;
use wakey_core::Orchestrator;

/// Picks the next trigger for a set of alarms, in a fixed time zone.
type Planner =
    dyn Fn(&[AlarmDefinition], DateTime<Utc>) -> Option<(AlarmDefinition, DateTime<Utc>)> + Send + Sync;

/// Handle to the scheduling task. Cloning shares the same plan.
#[derive(Clone)]
pub struct Scheduler {
    plan: Arc<watch::Sender<Vec<AlarmDefinition>>>,
    clock: Arc<dyn Clock>,
    next: Arc<Planner>,
    token: CancellationToken,
}

impl Scheduler {
    /// Start scheduling in the host's local time zone.
    pub fn start(orchestrator: Orchestrator, clock: Arc<dyn Clock>) -> Self {
        Self::start_in(orchestrator, clock, Local)
    }

    /// Start scheduling with alarm wall times interpreted in `tz`.
    pub fn start_in<Tz>(orchestrator: Orchestrator, clock: Arc<dyn Clock>, tz: Tz) -> Self
    where
        Tz: TimeZone + Send + Sync + 'static,
    {
        let (tx, rx) = watch::channel(Vec::new());
        let token = CancellationToken::new();
        let next: Arc<Planner> = Arc::new(move |alarms: &[AlarmDefinition], now: DateTime<Utc>| {
            let local = now.with_timezone(&tz);
            schedule::next_fire_time(alarms, &local)
                .map(|(alarm, at)| (alarm.clone(), at.with_timezone(&Utc)))
        });

        let scheduler = Self {
            plan: Arc::new(tx),
            clock,
            next,
            token,
        };
        tokio::spawn(scheduler.clone().run(orchestrator, rx));
        scheduler
    }

    /// Replace the set of alarms being planned for.
    pub fn sync(&self, alarms: Vec<AlarmDefinition>) {
        debug!(count = alarms.len(), "scheduler plan updated");
        self.plan.send_replace(alarms);
    }

    pub fn find(&self, id: &str) -> Option<AlarmDefinition> {
        self.plan.borrow().iter().find(|a| a.id == id).cloned()
    }

    /// Next planned trigger and the alarm it belongs to.
    pub fn next_fire_time(&self) -> Option<(AlarmDefinition, DateTime<Utc>)> {
        (self.next)(self.plan.borrow().as_slice(), self.clock.now())
    }

    pub fn shutdown(&self) {
        self.token.cancel();
    }

    async fn run(self, orchestrator: Orchestrator, mut plan: watch::Receiver<Vec<AlarmDefinition>>) {
        loop {
            let now = self.clock.now();
            let next = {
                let alarms = plan.borrow_and_update();
                (self.next)(alarms.as_slice(), now)
            };

            let (alarm, at) = match next {
                Some(next) => next,
                None => {
                    debug!("no enabled alarms, waiting for changes");
                    tokio::select! {
                        biased;
                        _ = self.token.cancelled() => break,
                        changed = plan.changed() => {
                            if changed.is_err() {
                                break;
                            }
                        }
                    }
                    continue;
                }
            };

            let wait = (at - now).to_std().unwrap_or_default();
            info!(alarm_id = %alarm.id, at = %at, wait_secs = wait.as_secs(), "next alarm scheduled");
            tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                changed = plan.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = self.clock.sleep(wait) => {
                    info!(alarm_id = %alarm.id, "alarm due");
                    orchestrator.trigger(alarm).await;
                }
            }
        }
        debug!("scheduler stopped");
    }
}
