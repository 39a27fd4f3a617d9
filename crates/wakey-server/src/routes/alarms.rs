use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;
use wakey_core::error::WakeyError;
use wakey_core::types::{AlarmDefinition, AlarmUpdate};

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/alarms: every stored alarm definition.
pub async fn list_alarms(
    State(app): State<AppState>,
) -> Result<Json<Vec<AlarmDefinition>>, AppError> {
    let store = app.store.clone();
    let alarms = tokio::task::spawn_blocking(move || store.list())
        .await
        .map_err(AppError::join)??;
    Ok(Json(alarms))
}

/// GET /api/alarms/{id}
pub async fn get_alarm(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AlarmDefinition>, AppError> {
    let store = app.store.clone();
    let alarm = tokio::task::spawn_blocking(move || store.get(&id))
        .await
        .map_err(AppError::join)??;
    Ok(Json(alarm))
}

/// POST /api/alarms: create from defaults overlaid with the body. `time`
/// is required; the id is always generated.
pub async fn create_alarm(
    State(app): State<AppState>,
    Json(body): Json<AlarmUpdate>,
) -> Result<(StatusCode, Json<AlarmDefinition>), AppError> {
    if body.time.is_none() {
        return Err(AppError::bad_request("time is required"));
    }
    let store = app.store.clone();
    let (created, alarms) = tokio::task::spawn_blocking(move || {
        let mut alarm = AlarmDefinition::default();
        body.apply(&mut alarm);
        let created = store.create(alarm)?;
        Ok::<_, WakeyError>((created, store.list()?))
    })
    .await
    .map_err(AppError::join)??;

    app.resync(alarms);
    info!(alarm_id = %created.id, time = %created.time.format("%H:%M"), "alarm created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/alarms/{id}: partial update.
pub async fn update_alarm(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AlarmUpdate>,
) -> Result<Json<AlarmDefinition>, AppError> {
    let store = app.store.clone();
    let (updated, alarms) = tokio::task::spawn_blocking(move || {
        let updated = store.update(&id, body)?;
        Ok::<_, WakeyError>((updated, store.list()?))
    })
    .await
    .map_err(AppError::join)??;

    app.resync(alarms);
    info!(alarm_id = %updated.id, "alarm updated");
    Ok(Json(updated))
}

/// DELETE /api/alarms/{id}
pub async fn delete_alarm(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let deleted = id.clone();
    let alarms = tokio::task::spawn_blocking(move || {
        store.delete(&id)?;
        store.list()
    })
    .await
    .map_err(AppError::join)??;

    app.resync(alarms);
    info!(alarm_id = %deleted, "alarm deleted");
    Ok(Json(serde_json::json!({ "ok": true })))
}
