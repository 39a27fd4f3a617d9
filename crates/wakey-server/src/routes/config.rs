use axum::extract::State;
use axum::Json;
use tracing::info;
use wakey_core::config::{Config, WarnLevel};
use wakey_core::error::WakeyError;

use crate::error::AppError;
use crate::radio::{Station, STATIONS};
use crate::state::AppState;

/// GET /api/config: the parsed `.wakey/config.yaml` with validation warnings.
pub async fn get_config(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let config = tokio::task::spawn_blocking(move || Config::load(&root))
        .await
        .map_err(AppError::join)??;
    let warnings = config.validate();
    Ok(Json(serde_json::json!({
        "config": config,
        "warnings": warnings,
    })))
}

/// Sections a config update may touch.
const SECTIONS: [&str; 4] = ["hue", "spotify", "player", "server"];

/// Overlay the fields present in `update` onto `current`, section by section.
/// Sections and fields the update leaves out keep their saved values.
fn merge_update(current: &Config, update: &serde_json::Value) -> Result<Config, AppError> {
    let update = update
        .as_object()
        .ok_or_else(|| AppError::bad_request("config update must be a JSON object"))?;
    let mut merged = serde_json::to_value(current)?;

    for (section, fields) in update {
        if !SECTIONS.contains(&section.as_str()) {
            return Err(AppError::bad_request(format!(
                "unknown config section '{section}'"
            )));
        }
        let fields = fields.as_object().ok_or_else(|| {
            AppError::bad_request(format!("config section '{section}' must be an object"))
        })?;
        if let Some(target) = merged.get_mut(section).and_then(|v| v.as_object_mut()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
    }

    serde_json::from_value(merged)
        .map_err(|e| AppError::bad_request(format!("invalid config: {e}")))
}

/// PUT /api/config: merge the given sections into the saved config. Rejected
/// when validation reports an error. Collaborators pick up the new settings
/// on restart.
pub async fn put_config(
    State(app): State<AppState>,
    Json(update): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let current = tokio::task::spawn_blocking(move || Config::load(&root))
        .await
        .map_err(AppError::join)??;

    let config = merge_update(&current, &update)?;
    let warnings = config.validate();
    if let Some(err) = warnings.iter().find(|w| w.level == WarnLevel::Error) {
        return Err(AppError::bad_request(err.message.clone()));
    }

    let root = app.root.clone();
    let saved = config.clone();
    tokio::task::spawn_blocking(move || {
        saved.save(&root)?;
        Ok::<_, WakeyError>(())
    })
    .await
    .map_err(AppError::join)??;

    info!(warnings = warnings.len(), "config updated");
    Ok(Json(serde_json::json!({
        "config": config,
        "warnings": warnings,
    })))
}

/// GET /api/stations: the built-in radio catalog.
pub async fn list_stations() -> Json<&'static [Station]> {
    Json(STATIONS)
}
