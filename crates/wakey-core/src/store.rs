//! Alarm definitions persisted as `.wakey/alarms.yaml`.
//!
//! The store is plain structured storage: every call re-reads the file, and
//! every mutation rewrites it atomically. Mutations through clones of one
//! store are serialised, so concurrent writers never drop each other's
//! changes. Callers that schedule alarms are expected to re-sync from the
//! returned list after a mutation.

use crate::error::{Result, WakeyError};
use crate::types::{generate_alarm_id, AlarmDefinition, AlarmUpdate};
use crate::{io, paths};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default, Serialize, Deserialize)]
struct AlarmsFile {
    #[serde(default)]
    alarms: Vec<AlarmDefinition>,
}

#[derive(Debug, Clone)]
pub struct AlarmStore {
    root: PathBuf,
    /// Held for the whole read-modify-write of a mutation.
    write_lock: Arc<Mutex<()>>,
}

impl AlarmStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn list(&self) -> Result<Vec<AlarmDefinition>> {
        let file: AlarmsFile = io::read_yaml_or_default(&paths::alarms_path(&self.root))?;
        Ok(file.alarms)
    }

    pub fn get(&self, id: &str) -> Result<AlarmDefinition> {
        self.list()?
            .into_iter()
            .find(|a| a.id == id)
            .ok_or_else(|| WakeyError::AlarmNotFound(id.to_string()))
    }

    /// Rewrite the whole file. Callers hold the write lock.
    fn write(&self, alarms: &[AlarmDefinition]) -> Result<()> {
        let file = AlarmsFile {
            alarms: alarms.to_vec(),
        };
        io::write_yaml(&paths::alarms_path(&self.root), &file)
    }

    /// Insert a new alarm under a freshly generated id, ignoring any id the
    /// caller supplied. Returns the stored definition.
    pub fn create(&self, mut alarm: AlarmDefinition) -> Result<AlarmDefinition> {
        let _guard = self.lock();
        let mut alarms = self.list()?;
        alarm.id = generate_alarm_id();
        while alarms.iter().any(|a| a.id == alarm.id) {
            alarm.id = generate_alarm_id();
        }
        alarm.validate()?;
        alarms.push(alarm.clone());
        self.write(&alarms)?;
        Ok(alarm)
    }

    pub fn update(&self, id: &str, update: AlarmUpdate) -> Result<AlarmDefinition> {
        let _guard = self.lock();
        let mut alarms = self.list()?;
        let alarm = alarms
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| WakeyError::AlarmNotFound(id.to_string()))?;
        update.apply(alarm);
        alarm.validate()?;
        let updated = alarm.clone();
        self.write(&alarms)?;
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.lock();
        let mut alarms = self.list()?;
        let before = alarms.len();
        alarms.retain(|a| a.id != id);
        if alarms.len() == before {
            return Err(WakeyError::AlarmNotFound(id.to_string()));
        }
        self.write(&alarms)
    }
}
