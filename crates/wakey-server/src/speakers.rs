use crate::radio::{self, RadioPlayer};
use crate::spotify::SpotifyClient;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::debug;
use wakey_core::adapters::{AdapterError, AdapterResult, AudioAdapter};
use wakey_core::types::AudioConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Playing {
    Radio,
    Spotify,
}

/// The audio collaborator: local radio as the default source, Spotify as the
/// alternate. Volume goes to whichever source started last.
pub struct Speakers {
    radio: Arc<RadioPlayer>,
    spotify: SpotifyClient,
    playing: Mutex<Option<Playing>>,
}

impl Speakers {
    /// `radio` may be shared with the station preview, so a preview and an
    /// alarm never play over each other.
    pub fn new(radio: Arc<RadioPlayer>, spotify: SpotifyClient) -> Self {
        Self {
            radio,
            spotify,
            playing: Mutex::new(None),
        }
    }

    fn set_playing(&self, value: Option<Playing>) {
        *self.playing.lock().unwrap_or_else(|e| e.into_inner()) = value;
    }

    fn playing(&self) -> Option<Playing> {
        *self.playing.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl AudioAdapter for Speakers {
    async fn start_default(&self, config: &AudioConfig) -> AdapterResult<()> {
        self.radio.play(&config.station).await?;
        self.set_playing(Some(Playing::Radio));
        Ok(())
    }

    async fn start_alternate(&self, reference: &str) -> AdapterResult<()> {
        if !self.spotify.is_connected() {
            return Err(AdapterError::NotConfigured("spotify".into()));
        }
        self.spotify.play(reference).await?;
        self.set_playing(Some(Playing::Spotify));
        Ok(())
    }

    async fn set_volume(&self, percent: u8) -> AdapterResult<()> {
        match self.playing() {
            Some(Playing::Spotify) => self.spotify.set_volume(percent).await,
            _ => radio::set_system_volume(percent).await,
        }
    }

    async fn stop(&self) {
        self.radio.stop().await;
        if self.spotify.is_connected() {
            if let Err(e) = self.spotify.pause().await {
                debug!(error = %e, "spotify pause failed");
            }
        }
        self.set_playing(None);
    }
}
