use crate::output::{print_json, print_table};
use anyhow::{bail, Result};
use chrono::{NaiveTime, Weekday};
use clap::Subcommand;
use std::path::Path;
use wakey_core::store::AlarmStore;
use wakey_core::types::{parse_time_of_day, AlarmDefinition, AlarmUpdate, AudioSource, RoomTarget};

// ---------------------------------------------------------------------------
// Subcommand definition
// ---------------------------------------------------------------------------

#[derive(Subcommand, Debug)]
pub enum AlarmSubcommand {
    /// List all alarms
    List,
    /// Show one alarm in full
    Show { id: String },
    /// Add an alarm
    Add {
        /// Wake time, HH:MM
        #[arg(value_parser = parse_time_of_day)]
        time: NaiveTime,
        /// Comma-separated weekdays (default: mon-fri)
        #[arg(long, value_delimiter = ',')]
        days: Vec<Weekday>,
        #[arg(long)]
        label: Option<String>,
        /// Radio station id (see `wakey stations`)
        #[arg(long)]
        station: Option<String>,
        /// Spotify URI to play instead of the radio
        #[arg(long)]
        spotify: Option<String>,
        /// Target volume, 0-100
        #[arg(long)]
        volume: Option<u8>,
        /// Minutes of sunrise before the wake time; 0 disables lighting
        #[arg(long)]
        offset: Option<u32>,
        /// Hue room (group) id; repeatable
        #[arg(long = "room")]
        rooms: Vec<String>,
    },
    /// Delete an alarm
    Remove { id: String },
    /// Enable an alarm
    Enable { id: String },
    /// Disable an alarm without deleting it
    Disable { id: String },
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcommand: AlarmSubcommand, json: bool) -> Result<()> {
    let store = AlarmStore::new(root);
    match subcommand {
        AlarmSubcommand::List => list(&store, json),
        AlarmSubcommand::Show { id } => show(&store, &id),
        AlarmSubcommand::Add {
            time,
            days,
            label,
            station,
            spotify,
            volume,
            offset,
            rooms,
        } => {
            let mut alarm = AlarmDefinition::new(time);
            if !days.is_empty() {
                alarm.days = days;
            }
            if let Some(label) = label {
                alarm.label = label;
            }
            if let Some(station) = station {
                if wakey_server::radio::station(&station).is_none() {
                    bail!("unknown station '{station}' (see `wakey stations`)");
                }
                alarm.audio.station = station;
            }
            if let Some(uri) = spotify {
                alarm.audio.source = AudioSource::Spotify;
                alarm.audio.spotify_uri = Some(uri);
            }
            if let Some(volume) = volume {
                alarm.audio.volume = volume;
            }
            if let Some(offset) = offset {
                alarm.lighting.offset_minutes = offset;
                alarm.lighting.enabled = offset > 0;
            }
            alarm.lighting.rooms = rooms
                .into_iter()
                .map(|id| RoomTarget {
                    id,
                    name: String::new(),
                })
                .collect();
            add(&store, alarm, json)
        }
        AlarmSubcommand::Remove { id } => {
            store.delete(&id)?;
            println!("Removed alarm {id}");
            Ok(())
        }
        AlarmSubcommand::Enable { id } => set_enabled(&store, &id, true),
        AlarmSubcommand::Disable { id } => set_enabled(&store, &id, false),
    }
}

// ---------------------------------------------------------------------------
// Implementations
// ---------------------------------------------------------------------------

fn list(store: &AlarmStore, json: bool) -> Result<()> {
    let alarms = store.list()?;
    if json {
        return print_json(&alarms);
    }
    if alarms.is_empty() {
        println!("No alarms. Add one with `wakey alarm add HH:MM`.");
        return Ok(());
    }

    let rows = alarms
        .iter()
        .map(|a| {
            vec![
                a.id.clone(),
                a.time.format("%H:%M").to_string(),
                format_days(&a.days),
                if a.enabled { "on" } else { "off" }.to_string(),
                sunrise_column(a),
                audio_column(a),
                a.label.clone(),
            ]
        })
        .collect();
    print_table(
        &["ID", "TIME", "DAYS", "STATE", "SUNRISE", "AUDIO", "LABEL"],
        rows,
    );
    Ok(())
}

fn show(store: &AlarmStore, id: &str) -> Result<()> {
    print_json(&store.get(id)?)
}

fn add(store: &AlarmStore, alarm: AlarmDefinition, json: bool) -> Result<()> {
    let created = store.create(alarm)?;
    if json {
        return print_json(&created);
    }
    println!(
        "Added alarm {} at {} ({})",
        created.id,
        created.time.format("%H:%M"),
        format_days(&created.days)
    );
    Ok(())
}

fn set_enabled(store: &AlarmStore, id: &str, enabled: bool) -> Result<()> {
    let update = AlarmUpdate {
        enabled: Some(enabled),
        ..AlarmUpdate::default()
    };
    let alarm = store.update(id, update)?;
    println!(
        "{} {}",
        if enabled { "Enabled" } else { "Disabled" },
        alarm.display_name()
    );
    Ok(())
}

fn format_days(days: &[Weekday]) -> String {
    const WEEKDAYS: [Weekday; 5] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ];
    if days.len() == 7 {
        return "daily".into();
    }
    if days.len() == 5 && WEEKDAYS.iter().all(|d| days.contains(d)) {
        return "weekdays".into();
    }
    days.iter()
        .map(|d| d.to_string().to_lowercase())
        .collect::<Vec<_>>()
        .join(",")
}

fn sunrise_column(alarm: &AlarmDefinition) -> String {
    match alarm.lighting.effective_offset_minutes() {
        0 => "-".into(),
        m => format!("{m}m"),
    }
}

fn audio_column(alarm: &AlarmDefinition) -> String {
    if !alarm.audio.enabled {
        return "-".into();
    }
    let source = match alarm.audio.alternate_reference() {
        Some(_) => "spotify",
        None => alarm.audio.station.as_str(),
    };
    format!("{source} @{}%", alarm.audio.volume)
}
