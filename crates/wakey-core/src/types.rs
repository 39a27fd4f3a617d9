use crate::error::{Result, WakeyError};
use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Lifecycle phase of the single alarm cycle a process can run.
///
/// `Idle → Sunrise → Active ⇄ Snoozed → Idle`, with `Idle → Active` directly
/// when there is no light ramp. There is no terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Sunrise,
    Active,
    Snoozed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Sunrise => "sunrise",
            Phase::Active => "active",
            Phase::Snoozed => "snoozed",
        }
    }

    /// Phases from which a snooze request is accepted.
    pub fn can_snooze(&self) -> bool {
        matches!(self, Phase::Sunrise | Phase::Active)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// OrchestratorState
// ---------------------------------------------------------------------------

/// Snapshot of the orchestrator's mutable state.
///
/// `active_alarm_id` is `Some` exactly when `phase != Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrchestratorState {
    pub phase: Phase,
    pub active_alarm_id: Option<String>,
    pub sunrise_start: Option<DateTime<Utc>>,
    pub audio_start: Option<DateTime<Utc>>,
}

impl OrchestratorState {
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// LightingConfig
// ---------------------------------------------------------------------------

/// A light group on the bridge (a Hue "room" or "zone").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomTarget {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl RoomTarget {
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightingConfig {
    #[serde(default)]
    pub rooms: Vec<RoomTarget>,
    /// Minutes before the wake time at which the light ramp starts.
    #[serde(default = "default_offset_minutes")]
    pub offset_minutes: u32,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_offset_minutes() -> u32 {
    20
}

fn default_true() -> bool {
    true
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            rooms: Vec::new(),
            offset_minutes: default_offset_minutes(),
            enabled: true,
        }
    }
}

impl LightingConfig {
    /// Offset actually used for scheduling: zero when the ramp is skipped.
    pub fn effective_offset_minutes(&self) -> u32 {
        if self.enabled {
            self.offset_minutes
        } else {
            0
        }
    }
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioSource {
    /// Internet radio through the local player; also the fallback.
    #[default]
    Radio,
    /// Spotify Connect playback of `spotify_uri`.
    Spotify,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default)]
    pub source: AudioSource,
    #[serde(default = "default_station")]
    pub station: String,
    #[serde(default)]
    pub spotify_uri: Option<String>,
    /// Target volume in percent.
    #[serde(default = "default_volume")]
    pub volume: u8,
    #[serde(default = "default_ramp_seconds")]
    pub ramp_seconds: u32,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_station() -> String {
    "npo_radio_1".to_string()
}

fn default_volume() -> u8 {
    70
}

fn default_ramp_seconds() -> u32 {
    30
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            source: AudioSource::Radio,
            station: default_station(),
            spotify_uri: None,
            volume: default_volume(),
            ramp_seconds: default_ramp_seconds(),
            enabled: true,
        }
    }
}

impl AudioConfig {
    /// The alternate-source reference to try first, if the config selects one.
    pub fn alternate_reference(&self) -> Option<&str> {
        match self.source {
            AudioSource::Spotify => self
                .spotify_uri
                .as_deref()
                .map(str::trim)
                .filter(|uri| !uri.is_empty()),
            AudioSource::Radio => None,
        }
    }
}

// ---------------------------------------------------------------------------
// AlarmDefinition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmDefinition {
    pub id: String,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    #[serde(default = "default_days")]
    pub days: Vec<Weekday>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub lighting: LightingConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default = "default_snooze_minutes")]
    pub snooze_minutes: u32,
    #[serde(default = "default_auto_stop_minutes")]
    pub auto_stop_minutes: u32,
}

fn default_days() -> Vec<Weekday> {
    vec![
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ]
}

fn default_snooze_minutes() -> u32 {
    9
}

fn default_auto_stop_minutes() -> u32 {
    30
}

pub fn generate_alarm_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

impl Default for AlarmDefinition {
    fn default() -> Self {
        Self {
            id: generate_alarm_id(),
            time: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or(NaiveTime::MIN),
            days: default_days(),
            enabled: true,
            label: String::new(),
            lighting: LightingConfig::default(),
            audio: AudioConfig::default(),
            snooze_minutes: default_snooze_minutes(),
            auto_stop_minutes: default_auto_stop_minutes(),
        }
    }
}

impl AlarmDefinition {
    pub fn new(time: NaiveTime) -> Self {
        Self {
            time,
            ..Self::default()
        }
    }

    /// Reject definitions the orchestrator cannot act on sensibly.
    pub fn validate(&self) -> Result<()> {
        if self.audio.volume > 100 {
            return Err(WakeyError::InvalidAlarm(format!(
                "volume {} exceeds 100",
                self.audio.volume
            )));
        }
        for (i, day) in self.days.iter().enumerate() {
            if self.days[..i].contains(day) {
                return Err(WakeyError::InvalidAlarm(format!("duplicate day {day}")));
            }
        }
        if self.id.trim().is_empty() {
            return Err(WakeyError::InvalidAlarm("empty id".into()));
        }
        if self.audio.source == AudioSource::Spotify && self.audio.alternate_reference().is_none() {
            tracing::warn!(alarm_id = %self.id, "spotify selected without a uri, radio will play");
        }
        Ok(())
    }

    pub fn display_name(&self) -> String {
        if self.label.is_empty() {
            format!("{} ({})", self.id, self.time.format("%H:%M"))
        } else {
            format!("{} ({})", self.label, self.time.format("%H:%M"))
        }
    }
}

// ---------------------------------------------------------------------------
// AlarmUpdate
// ---------------------------------------------------------------------------

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlarmUpdate {
    #[serde(default, with = "hhmm_opt")]
    pub time: Option<NaiveTime>,
    pub days: Option<Vec<Weekday>>,
    pub enabled: Option<bool>,
    pub label: Option<String>,
    pub lighting: Option<LightingConfig>,
    pub audio: Option<AudioConfig>,
    pub snooze_minutes: Option<u32>,
    pub auto_stop_minutes: Option<u32>,
}

impl AlarmUpdate {
    pub fn apply(self, alarm: &mut AlarmDefinition) {
        if let Some(time) = self.time {
            alarm.time = time;
        }
        if let Some(days) = self.days {
            alarm.days = days;
        }
        if let Some(enabled) = self.enabled {
            alarm.enabled = enabled;
        }
        if let Some(label) = self.label {
            alarm.label = label;
        }
        if let Some(lighting) = self.lighting {
            alarm.lighting = lighting;
        }
        if let Some(audio) = self.audio {
            alarm.audio = audio;
        }
        if let Some(snooze) = self.snooze_minutes {
            alarm.snooze_minutes = snooze;
        }
        if let Some(auto_stop) = self.auto_stop_minutes {
            alarm.auto_stop_minutes = auto_stop;
        }
    }
}

// ---------------------------------------------------------------------------
// Time-of-day parsing
// ---------------------------------------------------------------------------

/// Parse a strict `HH:MM` wake time.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    let valid_shape = s.len() == 5 && s.as_bytes()[2] == b':';
    if !valid_shape {
        return Err(WakeyError::InvalidTime(s.to_string()));
    }
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| WakeyError::InvalidTime(s.to_string()))
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_time_of_day(&raw).map_err(serde::de::Error::custom)
    }
}

mod hhmm_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => s.serialize_some(&t.format("%H:%M").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.map(|r| super::parse_time_of_day(&r).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_round_trips_as_hhmm() {
        let alarm = AlarmDefinition::new(parse_time_of_day("06:45").unwrap());
        let yaml = serde_yaml::to_string(&alarm).unwrap();
        assert!(yaml.contains("time: 06:45"), "got: {yaml}");
        let back: AlarmDefinition = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, alarm);
    }

    #[test]
    fn parse_time_rejects_malformed() {
        assert!(parse_time_of_day("7:00").is_err());
        assert!(parse_time_of_day("24:00").is_err());
        assert!(parse_time_of_day("07:60").is_err());
        assert!(parse_time_of_day("07-00").is_err());
        assert!(parse_time_of_day("07:00").is_ok());
    }

    #[test]
    fn sparse_yaml_fills_defaults() {
        let alarm: AlarmDefinition = serde_yaml::from_str("id: abc\ntime: \"05:30\"\n").unwrap();
        assert_eq!(alarm.days.len(), 5);
        assert_eq!(alarm.snooze_minutes, 9);
        assert_eq!(alarm.auto_stop_minutes, 30);
        assert_eq!(alarm.lighting.offset_minutes, 20);
        assert_eq!(alarm.audio.volume, 70);
        assert_eq!(alarm.audio.source, AudioSource::Radio);
    }

    #[test]
    fn generated_ids_are_eight_hex_chars() {
        let id = generate_alarm_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn alternate_reference_requires_spotify_and_uri() {
        let mut audio = AudioConfig::default();
        assert_eq!(audio.alternate_reference(), None);
        audio.source = AudioSource::Spotify;
        assert_eq!(audio.alternate_reference(), None);
        audio.spotify_uri = Some("  ".into());
        assert_eq!(audio.alternate_reference(), None);
        audio.spotify_uri = Some("spotify:playlist:abc".into());
        assert_eq!(audio.alternate_reference(), Some("spotify:playlist:abc"));
        audio.source = AudioSource::Radio;
        assert_eq!(audio.alternate_reference(), None);
    }

    #[test]
    fn disabled_lighting_has_zero_offset() {
        let mut lighting = LightingConfig::default();
        assert_eq!(lighting.effective_offset_minutes(), 20);
        lighting.enabled = false;
        assert_eq!(lighting.effective_offset_minutes(), 0);
    }

    #[test]
    fn validate_rejects_loud_and_duplicate_days() {
        let mut alarm = AlarmDefinition::default();
        assert!(alarm.validate().is_ok());
        alarm.audio.volume = 101;
        assert!(alarm.validate().is_err());
        alarm.audio.volume = 50;
        alarm.days = vec![Weekday::Mon, Weekday::Mon];
        assert!(alarm.validate().is_err());
    }

    #[test]
    fn update_touches_only_given_fields() {
        let mut alarm = AlarmDefinition::default();
        let before = alarm.clone();
        AlarmUpdate {
            label: Some("weekend".into()),
            snooze_minutes: Some(5),
            ..Default::default()
        }
        .apply(&mut alarm);
        assert_eq!(alarm.label, "weekend");
        assert_eq!(alarm.snooze_minutes, 5);
        assert_eq!(alarm.time, before.time);
        assert_eq!(alarm.audio, before.audio);
    }

    #[test]
    fn update_parses_time_from_json() {
        let update: AlarmUpdate = serde_json::from_str(r#"{"time":"08:15"}"#).unwrap();
        assert_eq!(update.time, NaiveTime::from_hms_opt(8, 15, 0));
        let empty: AlarmUpdate = serde_json::from_str("{}").unwrap();
        assert!(empty.time.is_none());
    }

    #[test]
    fn phase_snooze_guard() {
        assert!(Phase::Active.can_snooze());
        assert!(Phase::Sunrise.can_snooze());
        assert!(!Phase::Idle.can_snooze());
        assert!(!Phase::Snoozed.can_snooze());
    }
}
