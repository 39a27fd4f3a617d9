//! Body of the audio phase: start a source (with fallback) and ramp volume.

use crate::adapters::AudioAdapter;
use crate::clock::Clock;
use crate::ramp::{LinearRamp, RAMP_START_VOLUME};
use crate::types::AudioConfig;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Backend {
    Alternate,
    Default,
}

/// Start playback, preferring the alternate music service when the config
/// selects it with a usable reference. Any alternate failure falls back to
/// the default stream; the reverse never happens.
pub(crate) async fn start_source(audio: &dyn AudioAdapter, config: &AudioConfig) -> Option<Backend> {
    if let Some(reference) = config.alternate_reference() {
        match audio.start_alternate(reference).await {
            Ok(()) => {
                info!(reference, "alternate source playing");
                return Some(Backend::Alternate);
            }
            Err(e) => warn!(reference, error = %e, "alternate source failed, falling back to radio"),
        }
    }

    match audio.start_default(config).await {
        Ok(()) => {
            info!(station = %config.station, "radio playing");
            Some(Backend::Default)
        }
        Err(e) => {
            error!(station = %config.station, error = %e, "radio failed to start");
            None
        }
    }
}

/// Ramp volume from [`RAMP_START_VOLUME`] to `target` over `ramp_seconds`,
/// one step every three seconds. A failed step is logged and skipped.
pub(crate) async fn volume_ramp(
    audio: &dyn AudioAdapter,
    clock: &dyn Clock,
    target: u8,
    ramp_seconds: u32,
) {
    let ramp = LinearRamp::volume(ramp_seconds);
    debug!(target, ramp_seconds, steps = ramp.steps(), "volume ramp");
    for step in ramp.iter() {
        let value = step.interpolate(i64::from(RAMP_START_VOLUME), i64::from(target));
        let percent = value.clamp(0, 100) as u8;
        if let Err(e) = audio.set_volume(percent).await {
            debug!(step = step.index, percent, error = %e, "volume step failed");
        }
        if !step.is_last() {
            clock.sleep(ramp.interval()).await;
        }
    }
}
