//! Narrow interfaces to the lighting and audio collaborators.
//!
//! The orchestrator only ever talks to hardware and services through these
//! traits. Implementations report failures as [`AdapterError`] values; the
//! orchestrator decides whether a failure means "skip this step" (lighting)
//! or "fall back to the default backend" (audio).

use crate::types::{AudioConfig, RoomTarget};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("not configured: {0}")]
    NotConfigured(String),

    #[error("request failed: {0}")]
    Http(String),

    #[error("rejected by backend: {0}")]
    Rejected(String),

    #[error("failed to spawn player: {0}")]
    Spawn(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

/// Brightness and colour temperature for one sunrise step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightLevel {
    /// Hue brightness, 1..=254.
    pub brightness: u8,
    /// Colour temperature in mired, 153 (cold) ..= 500 (warm).
    pub color_temp: u16,
}

#[async_trait]
pub trait LightingAdapter: Send + Sync {
    /// Whether the adapter can reach the lights at all. A ramp against an
    /// unconfigured adapter is skipped entirely.
    fn is_configured(&self) -> bool {
        true
    }

    /// Deliver one ramp step to a room.
    async fn apply(&self, room: &RoomTarget, level: LightLevel) -> AdapterResult<()>;
}

#[async_trait]
pub trait AudioAdapter: Send + Sync {
    /// Start the default streaming source (radio) described by `config`.
    async fn start_default(&self, config: &AudioConfig) -> AdapterResult<()>;

    /// Start the alternate music service with a content reference
    /// (for Spotify, a playlist, album, or track URI).
    async fn start_alternate(&self, reference: &str) -> AdapterResult<()>;

    /// Set output volume in percent on whichever backend is playing.
    async fn set_volume(&self, percent: u8) -> AdapterResult<()>;

    /// Stop every backend. Must be safe to call when nothing is playing.
    async fn stop(&self);
}
