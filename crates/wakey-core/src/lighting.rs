use crate::adapters::{LightLevel, LightingAdapter};
use crate::clock::Clock;
use crate::ramp::{LinearRamp, RampStep};
use crate::types::LightingConfig;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Brightness bounds of the sunrise ramp (Hue scale).
pub const SUNRISE_BRIGHTNESS: (i64, i64) = (1, 254);

/// Colour temperature bounds of the sunrise ramp, warm to cold (mired).
pub const SUNRISE_COLOR_TEMP: (i64, i64) = (500, 153);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampOutcome {
    /// Every step was attempted; `failed_steps` deliveries reported an error.
    Completed { failed_steps: u32 },
    /// Nothing to drive: lighting unconfigured or no rooms.
    Skipped,
    Cancelled,
}

pub fn sunrise_level(step: RampStep) -> LightLevel {
    let (bri_lo, bri_hi) = SUNRISE_BRIGHTNESS;
    let (ct_warm, ct_cold) = SUNRISE_COLOR_TEMP;
    LightLevel {
        brightness: step.interpolate(bri_lo, bri_hi).clamp(0, 254) as u8,
        color_temp: step.interpolate(ct_warm, ct_cold).clamp(153, 500) as u16,
    }
}

/// Drive the sunrise ramp for `duration_minutes`, one step every 30 seconds.
///
/// A failed delivery is logged and the ramp moves on to the next step. Every
/// wait and every adapter call is abandoned as soon as `token` is cancelled.
pub async fn sunrise_ramp(
    adapter: &dyn LightingAdapter,
    clock: &dyn Clock,
    token: &CancellationToken,
    lighting: &LightingConfig,
    duration_minutes: u32,
) -> RampOutcome {
    if !adapter.is_configured() || lighting.rooms.is_empty() {
        warn!("lighting not configured, skipping sunrise ramp");
        return RampOutcome::Skipped;
    }

    let ramp = LinearRamp::sunrise(duration_minutes);
    let rooms: Vec<&str> = lighting.rooms.iter().map(|r| r.label()).collect();
    info!(
        steps = ramp.steps(),
        duration_minutes,
        rooms = ?rooms,
        "starting sunrise ramp"
    );

    let mut failed_steps = 0;
    for step in ramp.iter() {
        let level = sunrise_level(step);
        let mut step_failed = false;
        for room in &lighting.rooms {
            if token.is_cancelled() {
                return RampOutcome::Cancelled;
            }
            let delivered = tokio::select! {
                biased;
                _ = token.cancelled() => return RampOutcome::Cancelled,
                res = adapter.apply(room, level) => res,
            };
            match delivered {
                Ok(()) => debug!(
                    step = step.index,
                    steps = step.steps,
                    room = room.label(),
                    brightness = level.brightness,
                    color_temp = level.color_temp,
                    "sunrise step"
                ),
                Err(e) => {
                    step_failed = true;
                    warn!(step = step.index, room = room.label(), error = %e, "sunrise step failed, continuing");
                }
            }
        }
        if step_failed {
            failed_steps += 1;
        }

        if !step.is_last() {
            tokio::select! {
                biased;
                _ = token.cancelled() => return RampOutcome::Cancelled,
                _ = clock.sleep(ramp.interval()) => {}
            }
        }
    }

    info!(failed_steps, "sunrise ramp complete");
    RampOutcome::Completed { failed_steps }
}
