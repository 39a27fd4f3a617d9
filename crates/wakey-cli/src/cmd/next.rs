use crate::output::{print_json, print_table};
use anyhow::Result;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::Path;
use wakey_core::schedule::next_trigger;
use wakey_core::store::AlarmStore;

#[derive(Debug, Serialize)]
struct Upcoming {
    id: String,
    label: String,
    wake: String,
    trigger_at: DateTime<Local>,
    sunrise_minutes: u32,
}

/// Show upcoming triggers for every enabled alarm, soonest first.
pub fn run(root: &Path, json: bool) -> Result<()> {
    let now = Local::now();
    let alarms = AlarmStore::new(root).list()?;

    let mut upcoming: Vec<Upcoming> = alarms
        .iter()
        .filter_map(|a| {
            next_trigger(a, &now).map(|at| Upcoming {
                id: a.id.clone(),
                label: a.label.clone(),
                wake: a.time.format("%H:%M").to_string(),
                trigger_at: at,
                sunrise_minutes: a.lighting.effective_offset_minutes(),
            })
        })
        .collect();
    upcoming.sort_by_key(|u| u.trigger_at);

    if json {
        return print_json(&upcoming);
    }
    if upcoming.is_empty() {
        println!("No enabled alarms.");
        return Ok(());
    }

    let rows = upcoming
        .iter()
        .map(|u| {
            vec![
                u.id.clone(),
                u.trigger_at.format("%a %Y-%m-%d %H:%M").to_string(),
                u.wake.clone(),
                in_words(u.trigger_at - now),
                u.label.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "TRIGGER", "WAKE", "IN", "LABEL"], rows);
    Ok(())
}

fn in_words(delta: chrono::Duration) -> String {
    let minutes = delta.num_minutes().max(0);
    let (days, hours, mins) = (minutes / 1440, (minutes % 1440) / 60, minutes % 60);
    match (days, hours) {
        (0, 0) => format!("{mins}m"),
        (0, _) => format!("{hours}h {mins}m"),
        _ => format!("{days}d {hours}h"),
    }
}
