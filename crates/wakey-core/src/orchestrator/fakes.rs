//! Recording collaborators for orchestrator tests.

use crate::adapters::{
    AdapterError, AdapterResult, AudioAdapter, LightLevel, LightingAdapter,
};
use crate::types::{AudioConfig, RoomTarget};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AudioCall {
    StartDefault(String),
    StartAlternate(String),
    SetVolume(u8),
    Stop,
}

#[derive(Default)]
pub(crate) struct FakeAudio {
    calls: Mutex<Vec<(Instant, AudioCall)>>,
    pub(crate) alternate_fails: AtomicBool,
    pub(crate) default_fails: AtomicBool,
}

impl FakeAudio {
    fn record(&self, call: AudioCall) {
        self.calls.lock().unwrap().push((Instant::now(), call));
    }

    pub(crate) fn calls(&self) -> Vec<AudioCall> {
        self.calls.lock().unwrap().iter().map(|(_, c)| c.clone()).collect()
    }

    pub(crate) fn timed_calls(&self) -> Vec<(Instant, AudioCall)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn volumes(&self) -> Vec<u8> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                AudioCall::SetVolume(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn count(&self, wanted: &AudioCall) -> usize {
        self.calls().iter().filter(|c| *c == wanted).count()
    }
}

#[async_trait]
impl AudioAdapter for FakeAudio {
    async fn start_default(&self, config: &AudioConfig) -> AdapterResult<()> {
        self.record(AudioCall::StartDefault(config.station.clone()));
        if self.default_fails.load(Ordering::SeqCst) {
            return Err(AdapterError::Spawn("no player installed".into()));
        }
        Ok(())
    }

    async fn start_alternate(&self, reference: &str) -> AdapterResult<()> {
        self.record(AudioCall::StartAlternate(reference.to_string()));
        if self.alternate_fails.load(Ordering::SeqCst) {
            return Err(AdapterError::Unavailable("no active device".into()));
        }
        Ok(())
    }

    async fn set_volume(&self, percent: u8) -> AdapterResult<()> {
        self.record(AudioCall::SetVolume(percent));
        Ok(())
    }

    async fn stop(&self) {
        self.record(AudioCall::Stop);
    }
}

#[derive(Default)]
pub(crate) struct FakeLighting {
    applied: Mutex<Vec<(Instant, String, LightLevel)>>,
    pub(crate) failing: AtomicBool,
}

impl FakeLighting {
    pub(crate) fn applied(&self) -> Vec<(Instant, String, LightLevel)> {
        self.applied.lock().unwrap().clone()
    }

    pub(crate) fn count(&self) -> usize {
        self.applied.lock().unwrap().len()
    }
}

#[async_trait]
impl LightingAdapter for FakeLighting {
    async fn apply(&self, room: &RoomTarget, level: LightLevel) -> AdapterResult<()> {
        self.applied
            .lock()
            .unwrap()
            .push((Instant::now(), room.id.clone(), level));
        if self.failing.load(Ordering::SeqCst) {
            return Err(AdapterError::Http("bridge unreachable".into()));
        }
        Ok(())
    }
}
