//! Owned handles for the three concurrently running phase tasks.

use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskSlot {
    Lighting,
    Audio,
    Deadline,
}

impl TaskSlot {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            TaskSlot::Lighting => "lighting",
            TaskSlot::Audio => "audio",
            TaskSlot::Deadline => "deadline",
        }
    }
}

/// A spawned phase task and the token that cancels it.
///
/// Every suspension point of the body is a cancellation point: the body runs
/// inside a biased `select!` against the token, so once cancellation is
/// requested the body is dropped the next time the task is polled. A panic in
/// the body is caught and logged; it never tears down the orchestrator.
pub(crate) struct PhaseTask {
    slot: TaskSlot,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl PhaseTask {
    pub(crate) fn spawn<F>(slot: TaskSlot, token: CancellationToken, body: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let watch = token.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = watch.cancelled() => {
                    debug!(task = slot.as_str(), "phase task cancelled");
                }
                outcome = AssertUnwindSafe(body).catch_unwind() => {
                    match outcome {
                        Ok(()) => debug!(task = slot.as_str(), "phase task finished"),
                        Err(panic) => error!(
                            task = slot.as_str(),
                            reason = %panic_message(panic.as_ref()),
                            "phase task failed"
                        ),
                    }
                }
            }
        });
        Self {
            slot,
            token,
            handle,
        }
    }

    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task to unwind. Call after [`cancel`](Self::cancel); the
    /// body stops at its next suspension point.
    pub(crate) async fn join(self) {
        if let Err(e) = self.handle.await {
            if e.is_panic() {
                error!(task = self.slot.as_str(), "phase task panicked outside its body");
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// The three task slots of one alarm cycle.
#[derive(Default)]
pub(crate) struct PhaseTaskSet {
    pub(crate) lighting: Option<PhaseTask>,
    pub(crate) audio: Option<PhaseTask>,
    pub(crate) deadline: Option<PhaseTask>,
}

impl PhaseTaskSet {
    /// Cancel every slot and empty the set. The returned tasks should be
    /// joined before issuing new adapter commands.
    pub(crate) fn cancel_all(&mut self) -> Vec<PhaseTask> {
        let mut cancelled = self.cancel_audio_and_deadline();
        if let Some(task) = self.lighting.take() {
            task.cancel();
            cancelled.push(task);
        }
        cancelled
    }

    /// Cancel the audio and deadline slots, leaving a running light ramp alone.
    pub(crate) fn cancel_audio_and_deadline(&mut self) -> Vec<PhaseTask> {
        let mut cancelled = Vec::with_capacity(3);
        for task in [self.audio.take(), self.deadline.take()].into_iter().flatten() {
            task.cancel();
            cancelled.push(task);
        }
        cancelled
    }

    /// Number of slots holding a task that has not finished yet.
    pub(crate) fn running(&self) -> usize {
        [&self.lighting, &self.audio, &self.deadline]
            .into_iter()
            .flatten()
            .filter(|t| !t.is_finished())
            .count()
    }
}

pub(crate) async fn join_all(tasks: Vec<PhaseTask>) {
    for task in tasks {
        task.join().await;
    }
}
