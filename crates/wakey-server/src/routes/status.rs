use axum::extract::State;
use axum::Json;
use tracing::info;
use wakey_core::error::WakeyError;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/status: orchestrator snapshot plus the next planned trigger.
pub async fn get_status(State(app): State<AppState>) -> Json<serde_json::Value> {
    let state = app.orchestrator.state();
    let active_alarm = state
        .active_alarm_id
        .as_deref()
        .and_then(|id| app.scheduler.find(id));
    let next = app.scheduler.next_fire_time();

    Json(serde_json::json!({
        "state": state.phase,
        "active_alarm_id": state.active_alarm_id,
        "active_alarm": active_alarm,
        "sunrise_start": state.sunrise_start,
        "audio_start": state.audio_start,
        "next_fire_time": next.as_ref().map(|(_, at)| at),
        "next_alarm_id": next.as_ref().map(|(alarm, _)| alarm.id.as_str()),
    }))
}

/// POST /api/dismiss: stop the running alarm cycle.
pub async fn dismiss(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    if app.orchestrator.state().is_idle() {
        return Err(AppError::conflict("no alarm is active"));
    }
    app.orchestrator.dismiss().await;
    info!("alarm dismissed via api");
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// POST /api/snooze: pause audio of the active alarm for its snooze period.
pub async fn snooze(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let state = app.orchestrator.state();
    if !state.phase.can_snooze() {
        return Err(WakeyError::InvalidTransition {
            from: state.phase,
            action: "snooze",
        }
        .into());
    }
    let id = state
        .active_alarm_id
        .ok_or_else(|| AppError::conflict("no alarm is active"))?;

    let store = app.store.clone();
    let alarm = tokio::task::spawn_blocking(move || store.get(&id))
        .await
        .map_err(AppError::join)??;

    app.orchestrator.snooze(&alarm).await?;
    Ok(Json(serde_json::json!({
        "ok": true,
        "snooze_minutes": alarm.snooze_minutes,
    })))
}
