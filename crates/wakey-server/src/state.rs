use crate::hue::HueBridge;
use crate::radio::RadioPlayer;
use crate::scheduler::Scheduler;
use std::path::PathBuf;
use std::sync::Arc;
use wakey_core::clock::Clock;
use wakey_core::config::Config;
use wakey_core::store::AlarmStore;
use wakey_core::Orchestrator;

/// Hardware the settings page drives directly, outside an alarm cycle.
/// The radio is the same player the alarm audio uses.
#[derive(Clone)]
pub struct Devices {
    pub radio: Arc<RadioPlayer>,
    pub hue: Arc<HueBridge>,
}

impl Devices {
    pub fn new(radio: Arc<RadioPlayer>, hue: Arc<HueBridge>) -> Self {
        Self { radio, hue }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(RadioPlayer::new(&config.player)),
            Arc::new(HueBridge::new(&config.hue)),
        )
    }
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub store: AlarmStore,
    pub orchestrator: Orchestrator,
    pub scheduler: Scheduler,
    pub devices: Devices,
}

impl AppState {
    /// Wire the store to a running scheduler and load the current alarms
    /// into it. Must be called inside a Tokio runtime.
    pub fn new(
        root: PathBuf,
        orchestrator: Orchestrator,
        scheduler: Scheduler,
        devices: Devices,
    ) -> wakey_core::Result<Self> {
        let store = AlarmStore::new(root.clone());
        scheduler.sync(store.list()?);
        Ok(Self {
            root,
            store,
            orchestrator,
            scheduler,
            devices,
        })
    }

    /// Convenience constructor that starts a scheduler on `clock` in local time.
    pub fn start(
        root: PathBuf,
        orchestrator: Orchestrator,
        clock: Arc<dyn Clock>,
        devices: Devices,
    ) -> wakey_core::Result<Self> {
        let scheduler = Scheduler::start(orchestrator.clone(), clock);
        Self::new(root, orchestrator, scheduler, devices)
    }

    /// Push the stored alarm list into the scheduler after a mutation.
    pub fn resync(&self, alarms: Vec<wakey_core::types::AlarmDefinition>) {
        self.scheduler.sync(alarms);
    }
}
