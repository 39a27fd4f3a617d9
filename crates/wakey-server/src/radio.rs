//! Internet radio through a local stream player subprocess.

use serde::Serialize;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info};
use wakey_core::adapters::{AdapterError, AdapterResult};
use wakey_core::config::PlayerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Station {
    pub id: &'static str,
    pub name: &'static str,
    pub url: &'static str,
}

pub const STATIONS: &[Station] = &[
    Station { id: "npo_radio_1", name: "NPO Radio 1", url: "https://icecast.omroep.nl/radio1-bb-mp3" },
    Station { id: "npo_radio_2", name: "NPO Radio 2", url: "https://icecast.omroep.nl/radio2-bb-mp3" },
    Station { id: "npo_3fm", name: "NPO 3FM", url: "https://icecast.omroep.nl/3fm-bb-mp3" },
    Station { id: "npo_radio_4", name: "NPO Radio 4", url: "https://icecast.omroep.nl/radio4-bb-mp3" },
    Station { id: "npo_radio_5", name: "NPO Radio 5", url: "https://icecast.omroep.nl/radio5-bb-mp3" },
    Station { id: "radio_538", name: "Radio 538", url: "https://25293.live.streamtheworld.com/RADIO538.mp3" },
    Station { id: "radio_10", name: "Radio 10", url: "https://25293.live.streamtheworld.com/RADIO10.mp3" },
    Station { id: "sky_radio", name: "Sky Radio", url: "https://25293.live.streamtheworld.com/SKYRADIO.mp3" },
    Station { id: "radio_veronica", name: "Radio Veronica", url: "https://25293.live.streamtheworld.com/VERONICA.mp3" },
    Station { id: "100p_nl", name: "100% NL", url: "https://stream.100p.nl/100pctnl.mp3" },
    Station { id: "slam", name: "SLAM!", url: "https://25293.live.streamtheworld.com/SLAM.mp3" },
    Station { id: "bnr", name: "BNR Nieuwsradio", url: "https://25293.live.streamtheworld.com/BNR_NIEUWSRADIO.mp3" },
    Station { id: "sublime_fm", name: "Sublime FM", url: "https://25293.live.streamtheworld.com/SUBLIMEFM.mp3" },
    Station { id: "qmusic", name: "Qmusic", url: "https://25293.live.streamtheworld.com/QMUSIC.mp3" },
];

pub fn station(id: &str) -> Option<&'static Station> {
    STATIONS.iter().find(|s| s.id == id)
}

const VOLUME_COMMAND_TIMEOUT: Duration = Duration::from_secs(3);

/// Arguments placed before the stream URL for each known player.
fn player_args(binary: &str) -> &'static [&'static str] {
    match binary {
        "mpv" => &["--no-video", "--no-terminal"],
        "ffplay" => &["-nodisp", "-loglevel", "quiet"],
        "vlc" | "cvlc" => &["--intf", "dummy", "--no-video"],
        _ => &[],
    }
}

/// One stream at a time, played by the first configured binary on `PATH`.
pub struct RadioPlayer {
    binaries: Vec<String>,
    child: Mutex<Option<Child>>,
}

impl RadioPlayer {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            binaries: config.binaries.clone(),
            child: Mutex::new(None),
        }
    }

    fn find_player(&self) -> Option<(&str, PathBuf)> {
        self.binaries
            .iter()
            .find_map(|b| which::which(b).ok().map(|path| (b.as_str(), path)))
    }

    /// Replace whatever is playing with `station_id`.
    pub async fn play(&self, station_id: &str) -> AdapterResult<()> {
        let station = station(station_id)
            .ok_or_else(|| AdapterError::Rejected(format!("unknown station: {station_id}")))?;
        self.stop().await;

        let (binary, path) = self.find_player().ok_or_else(|| {
            AdapterError::Unavailable(format!(
                "no audio player found (tried {})",
                self.binaries.join(", ")
            ))
        })?;

        let child = Command::new(&path)
            .args(player_args(binary))
            .arg(station.url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AdapterError::Spawn(format!("{binary}: {e}")))?;

        info!(station = station.name, player = binary, "radio stream started");
        *self.child.lock().await = Some(child);
        Ok(())
    }

    /// Kill the player if one is running. Safe to call repeatedly.
    pub async fn stop(&self) {
        let Some(mut child) = self.child.lock().await.take() else {
            return;
        };
        if let Err(e) = child.kill().await {
            debug!(error = %e, "player already exited");
        }
        info!("radio stopped");
    }

    pub async fn is_playing(&self) -> bool {
        match self.child.lock().await.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }
}

/// Set the system output volume through the platform mixer.
pub async fn set_system_volume(percent: u8) -> AdapterResult<()> {
    let mut cmd = if cfg!(target_os = "macos") {
        let mut c = Command::new("osascript");
        c.arg("-e").arg(format!("set volume output volume {percent}"));
        c
    } else {
        let mut c = Command::new("pactl");
        c.args(["set-sink-volume", "@DEFAULT_SINK@"])
            .arg(format!("{percent}%"));
        c
    };
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let status = tokio::time::timeout(VOLUME_COMMAND_TIMEOUT, cmd.status())
        .await
        .map_err(|_| AdapterError::Unavailable("mixer command timed out".into()))?
        .map_err(|e| AdapterError::Spawn(e.to_string()))?;
    if !status.success() {
        return Err(AdapterError::Rejected(format!("mixer exited with {status}")));
    }
    Ok(())
}
