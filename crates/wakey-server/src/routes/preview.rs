use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::AppError;
use crate::hue::FLASH_HOLD;
use crate::radio;
use crate::state::AppState;

fn default_station() -> String {
    wakey_core::types::AudioConfig::default().station
}

fn default_volume() -> u8 {
    50
}

fn check_volume(volume: u8) -> Result<(), AppError> {
    if volume > 100 {
        return Err(AppError::bad_request(format!(
            "volume {volume} is out of range 0-100"
        )));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct RadioPreviewBody {
    #[serde(default = "default_station")]
    pub station: String,
    #[serde(default = "default_volume")]
    pub volume: u8,
}

#[derive(Debug, Deserialize)]
pub struct VolumeBody {
    #[serde(default = "default_volume")]
    pub volume: u8,
}

#[derive(Debug, Deserialize)]
pub struct FlashBody {
    #[serde(default)]
    pub room_id: String,
}

/// POST /api/config/test-radio: play a station outside an alarm cycle.
/// Refused while an alarm is running, since both share the player.
pub async fn play_station(
    State(app): State<AppState>,
    Json(body): Json<RadioPreviewBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_volume(body.volume)?;
    let station = radio::station(&body.station)
        .ok_or_else(|| AppError::bad_request(format!("unknown station '{}'", body.station)))?;
    if !app.orchestrator.state().is_idle() {
        return Err(AppError::conflict("an alarm is playing"));
    }

    app.devices.radio.play(station.id).await?;
    if let Err(e) = radio::set_system_volume(body.volume).await {
        warn!(error = %e, "preview volume not applied");
    }
    info!(station = station.name, "station preview started");
    Ok(Json(serde_json::json!({
        "ok": true,
        "station": station.name,
    })))
}

/// POST /api/config/test-radio/stop
pub async fn stop_station(State(app): State<AppState>) -> Json<serde_json::Value> {
    app.devices.radio.stop().await;
    Json(serde_json::json!({ "ok": true }))
}

/// GET /api/config/test-radio/status
pub async fn station_status(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "playing": app.devices.radio.is_playing().await,
    }))
}

/// POST /api/config/test-radio/volume
pub async fn set_volume(Json(body): Json<VolumeBody>) -> Result<Json<serde_json::Value>, AppError> {
    check_volume(body.volume)?;
    radio::set_system_volume(body.volume).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// POST /api/hue/test: briefly light a room to confirm the bridge reaches it.
pub async fn flash_room(
    State(app): State<AppState>,
    Json(body): Json<FlashBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let room_id = body.room_id.trim();
    if room_id.is_empty() {
        return Err(AppError::bad_request("room_id is required"));
    }
    app.devices.hue.flash(room_id, FLASH_HOLD).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
