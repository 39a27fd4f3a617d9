pub mod error;
pub mod hue;
pub mod radio;
pub mod routes;
pub mod scheduler;
pub mod speakers;
pub mod spotify;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use wakey_core::adapters::LightingAdapter;
use wakey_core::clock::{Clock, TokioClock};
use wakey_core::config::Config;
use wakey_core::Orchestrator;

use crate::speakers::Speakers;
use crate::spotify::SpotifyClient;
use crate::state::{AppState, Devices};

/// Build the axum Router with all API routes and middleware.
/// Used by `serve_on()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Orchestrator
        .route("/api/status", get(routes::status::get_status))
        .route("/api/dismiss", post(routes::status::dismiss))
        .route("/api/snooze", post(routes::status::snooze))
        // Alarms
        .route(
            "/api/alarms",
            get(routes::alarms::list_alarms).post(routes::alarms::create_alarm),
        )
        .route(
            "/api/alarms/{id}",
            get(routes::alarms::get_alarm)
                .put(routes::alarms::update_alarm)
                .delete(routes::alarms::delete_alarm),
        )
        // Config
        .route(
            "/api/config",
            get(routes::config::get_config).put(routes::config::put_config),
        )
        .route("/api/stations", get(routes::config::list_stations))
        // Previews
        .route("/api/config/test-radio", post(routes::preview::play_station))
        .route(
            "/api/config/test-radio/stop",
            post(routes::preview::stop_station),
        )
        .route(
            "/api/config/test-radio/status",
            get(routes::preview::station_status),
        )
        .route(
            "/api/config/test-radio/volume",
            post(routes::preview::set_volume),
        )
        .route("/api/hue/test", post(routes::preview::flash_room))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the alarm server on `port`, with hardware collaborators built
/// from `.wakey/config.yaml`.
pub async fn serve(root: PathBuf, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(root, listener).await
}

/// Start the alarm server on a pre-bound listener. Returns after Ctrl-C, once
/// the scheduler has stopped and any running alarm has been shut down.
pub async fn serve_on(root: PathBuf, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let port = listener.local_addr()?.port();

    let config = Config::load(&root)?;
    for w in config.validate() {
        warn!(level = ?w.level, "{}", w.message);
    }

    let clock: Arc<dyn Clock> = Arc::new(TokioClock::new());
    let devices = Devices::from_config(&config);
    if !devices.hue.is_configured() {
        warn!("hue bridge not configured, sunrise ramps will be skipped");
    }
    let audio = Arc::new(Speakers::new(
        devices.radio.clone(),
        SpotifyClient::new(&config.spotify),
    ));
    let orchestrator = Orchestrator::new(devices.hue.clone(), audio, clock.clone());

    let app_state = AppState::start(root, orchestrator.clone(), clock, devices)?;
    let scheduler = app_state.scheduler.clone();
    let devices_radio = app_state.devices.radio.clone();
    if let Some((alarm, at)) = scheduler.next_fire_time() {
        info!(alarm_id = %alarm.id, at = %at, "next alarm");
    }
    let app = build_router(app_state);

    info!("wakey listening on http://localhost:{port}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    orchestrator.shutdown().await;
    devices_radio.stop().await;
    info!("wakey stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c, running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
