//! Alarm lifecycle state machine and phase-task supervisor.
//!
//! One [`Orchestrator`] runs at most one alarm cycle at a time. A cycle fans
//! out into up to three cancellable tasks held in a `PhaseTaskSet`:
//!
//! ```text
//! trigger ─┬─ lighting: sunrise ramp for `offset` minutes      (optional)
//!          ├─ audio:    sleep `offset`, → Active, start source, ramp volume
//!          └─ deadline: sleep `offset + auto_stop`, → dismiss
//!
//! snooze  ─┬─ audio:    sleep `snooze`, → Active, start source, ramp volume
//!          └─ deadline: sleep `snooze + auto_stop`, → dismiss
//! ```
//!
//! Entry points serialize on the task-set lock. Every entry point cancels
//! and joins the tasks it replaces before issuing new adapter commands, so a
//! task that was just cancelled can never race a fresh stop/start. State
//! writes from task bodies happen under the state lock and are skipped once
//! the task's token has been cancelled.

mod playback;
mod tasks;

#[cfg(test)]
mod fakes;

use crate::adapters::{AudioAdapter, LightingAdapter};
use crate::clock::Clock;
use crate::error::{Result, WakeyError};
use crate::lighting;
use crate::types::{AlarmDefinition, OrchestratorState, Phase};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tasks::{join_all, PhaseTask, PhaseTaskSet, TaskSlot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    lighting: Arc<dyn LightingAdapter>,
    audio: Arc<dyn AudioAdapter>,
    clock: Arc<dyn Clock>,
    state: Mutex<OrchestratorState>,
    tasks: tokio::sync::Mutex<PhaseTaskSet>,
}

fn minutes(m: u32) -> Duration {
    Duration::from_secs(u64::from(m) * 60)
}

impl Orchestrator {
    pub fn new(
        lighting: Arc<dyn LightingAdapter>,
        audio: Arc<dyn AudioAdapter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                lighting,
                audio,
                clock,
                state: Mutex::new(OrchestratorState::default()),
                tasks: tokio::sync::Mutex::new(PhaseTaskSet::default()),
            }),
        }
    }

    /// Copy of the current state; never a live reference.
    pub fn state(&self) -> OrchestratorState {
        self.inner.with_state(|s| s.clone())
    }

    pub fn phase(&self) -> Phase {
        self.inner.with_state(|s| s.phase)
    }

    /// Number of phase tasks still running.
    pub async fn running_tasks(&self) -> usize {
        self.inner.tasks.lock().await.running()
    }

    /// Start a new alarm cycle. Only legal from `Idle`; otherwise the request
    /// is logged and dropped. Returns whether a cycle was started.
    pub async fn trigger(&self, alarm: AlarmDefinition) -> bool {
        let mut tasks = self.inner.tasks.lock().await;

        let phase = self.phase();
        if phase != Phase::Idle {
            warn!(alarm_id = %alarm.id, %phase, "alarm already active, ignoring trigger");
            return false;
        }
        join_all(tasks.cancel_all()).await;

        let offset = alarm.lighting.effective_offset_minutes();
        let now = self.inner.clock.now();
        info!(alarm_id = %alarm.id, time = %alarm.time.format("%H:%M"), offset, "triggering alarm");

        self.inner.with_state(|s| {
            s.active_alarm_id = Some(alarm.id.clone());
            if offset > 0 {
                s.phase = Phase::Sunrise;
                s.sunrise_start = Some(now);
            } else {
                s.phase = Phase::Active;
                s.audio_start = Some(now);
            }
        });

        let alarm = Arc::new(alarm);
        if offset > 0 {
            tasks.lighting = Some(self.spawn_lighting(alarm.clone(), offset));
        }
        tasks.audio = Some(self.spawn_audio(alarm.clone(), minutes(offset)));
        tasks.deadline = Some(self.spawn_deadline(minutes(offset) + minutes(alarm.auto_stop_minutes)));
        true
    }

    /// End the current cycle from any phase: cancel every task, stop both
    /// audio backends, and return to `Idle`.
    pub async fn dismiss(&self) {
        let mut tasks = self.inner.tasks.lock().await;
        info!(phase = %self.phase(), "dismissing alarm");
        self.dismiss_locked(&mut tasks).await;
    }

    /// Pause audio for `alarm.snooze_minutes`, then restart it. Accepted only
    /// from `Active` or `Sunrise`; a running light ramp keeps going.
    pub async fn snooze(&self, alarm: &AlarmDefinition) -> Result<()> {
        let mut tasks = self.inner.tasks.lock().await;

        let state = self.state();
        if !state.phase.can_snooze() {
            warn!(alarm_id = %alarm.id, phase = %state.phase, "rejecting snooze");
            return Err(WakeyError::InvalidTransition {
                from: state.phase,
                action: "snooze",
            });
        }
        if state.active_alarm_id.as_deref() != Some(alarm.id.as_str()) {
            warn!(alarm_id = %alarm.id, active = ?state.active_alarm_id, "rejecting snooze for inactive alarm");
            return Err(WakeyError::InvalidAlarm(format!(
                "alarm {} is not the active alarm",
                alarm.id
            )));
        }

        info!(alarm_id = %alarm.id, minutes = alarm.snooze_minutes, "snoozing alarm");
        join_all(tasks.cancel_audio_and_deadline()).await;
        self.inner.audio.stop().await;
        self.inner.with_state(|s| s.phase = Phase::Snoozed);

        let alarm = Arc::new(alarm.clone());
        let snooze = minutes(alarm.snooze_minutes);
        tasks.audio = Some(self.spawn_audio(alarm.clone(), snooze));
        tasks.deadline = Some(self.spawn_deadline(snooze + minutes(alarm.auto_stop_minutes)));
        Ok(())
    }

    /// Cancel everything at process exit. Leaves the orchestrator `Idle`.
    pub async fn shutdown(&self) {
        let mut tasks = self.inner.tasks.lock().await;
        info!("orchestrator shutting down");
        self.dismiss_locked(&mut tasks).await;
    }

    async fn dismiss_locked(&self, tasks: &mut PhaseTaskSet) {
        join_all(tasks.cancel_all()).await;
        self.inner.audio.stop().await;
        self.inner.with_state(OrchestratorState::reset);
    }

    /// Deadline expiry. The deadline task detaches itself from its slot
    /// before dismissing so the dismissal does not cancel its own caller.
    async fn expire(&self, token: &CancellationToken) {
        let mut tasks = self.inner.tasks.lock().await;
        if token.is_cancelled() {
            // Superseded by a snooze or dismiss while waiting for the lock.
            return;
        }
        drop(tasks.deadline.take());
        info!(phase = %self.phase(), "auto-stop reached, dismissing alarm");
        self.dismiss_locked(&mut tasks).await;
    }

    // -----------------------------------------------------------------------
    // Task bodies
    // -----------------------------------------------------------------------

    fn spawn_lighting(&self, alarm: Arc<AlarmDefinition>, offset: u32) -> PhaseTask {
        let inner = self.inner.clone();
        let token = CancellationToken::new();
        let body_token = token.clone();
        PhaseTask::spawn(TaskSlot::Lighting, token, async move {
            let outcome = lighting::sunrise_ramp(
                inner.lighting.as_ref(),
                inner.clock.as_ref(),
                &body_token,
                &alarm.lighting,
                offset,
            )
            .await;
            debug!(alarm_id = %alarm.id, ?outcome, "sunrise task done");
        })
    }

    fn spawn_audio(&self, alarm: Arc<AlarmDefinition>, delay: Duration) -> PhaseTask {
        let inner = self.inner.clone();
        let token = CancellationToken::new();
        let body_token = token.clone();
        PhaseTask::spawn(TaskSlot::Audio, token, async move {
            if !delay.is_zero() {
                inner.clock.sleep(delay).await;
            }

            let now = inner.clock.now();
            let entered = inner.with_state(|s| {
                if body_token.is_cancelled() {
                    return false;
                }
                s.phase = Phase::Active;
                s.audio_start = Some(now);
                true
            });
            if !entered {
                return;
            }

            if !alarm.audio.enabled {
                info!(alarm_id = %alarm.id, "audio disabled for alarm, staying silent");
                return;
            }

            let audio = inner.audio.as_ref();
            if playback::start_source(audio, &alarm.audio).await.is_some() {
                playback::volume_ramp(
                    audio,
                    inner.clock.as_ref(),
                    alarm.audio.volume,
                    alarm.audio.ramp_seconds,
                )
                .await;
            }
        })
    }

    fn spawn_deadline(&self, timeout: Duration) -> PhaseTask {
        let this = self.clone();
        let token = CancellationToken::new();
        let body_token = token.clone();
        debug!(seconds = timeout.as_secs(), "arming auto-stop");
        PhaseTask::spawn(TaskSlot::Deadline, token, async move {
            this.inner.clock.sleep(timeout).await;
            info!(seconds = timeout.as_secs(), "auto-stop timer fired");
            this.expire(&body_token).await;
        })
    }
}

impl Inner {
    fn with_state<R>(&self, f: impl FnOnce(&mut OrchestratorState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}
