use crate::error::Result;
use crate::{io, paths};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// HueConfig
// ---------------------------------------------------------------------------

/// Connection details for the Hue bridge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HueConfig {
    #[serde(default)]
    pub bridge_ip: String,
    #[serde(default)]
    pub username: String,
}

impl HueConfig {
    pub fn is_configured(&self) -> bool {
        !self.bridge_ip.is_empty() && !self.username.is_empty()
    }
}

// ---------------------------------------------------------------------------
// SpotifyConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotifyConfig {
    #[serde(default = "default_spotify_api")]
    pub api_base: String,
    #[serde(default)]
    pub access_token: String,
    /// Spotify Connect device to play on; the active device when unset.
    #[serde(default)]
    pub device_id: Option<String>,
}

fn default_spotify_api() -> String {
    "https://api.spotify.com/v1".to_string()
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            api_base: default_spotify_api(),
            access_token: String::new(),
            device_id: None,
        }
    }
}

impl SpotifyConfig {
    pub fn is_connected(&self) -> bool {
        !self.access_token.is_empty()
    }
}

// ---------------------------------------------------------------------------
// PlayerConfig
// ---------------------------------------------------------------------------

/// Local stream players, tried in order; the first one on `PATH` wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_player_binaries")]
    pub binaries: Vec<String>,
}

fn default_player_binaries() -> Vec<String> {
    vec!["mpv".into(), "ffplay".into(), "vlc".into()]
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            binaries: default_player_binaries(),
        }
    }
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Global configuration stored at `.wakey/config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub hue: HueConfig,
    #[serde(default)]
    pub spotify: SpotifyConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load the config, falling back to defaults when the file is absent.
    pub fn load(root: &Path) -> Result<Self> {
        io::read_yaml_or_default(&paths::config_path(root))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        io::write_yaml(&paths::config_path(root), self)
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.hue.bridge_ip.is_empty() != self.hue.username.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "hue needs both bridge_ip and username; sunrise ramps will be skipped"
                    .into(),
            });
        }

        if self.player.binaries.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "player.binaries is empty; radio playback cannot start".into(),
            });
        }

        if !self.spotify.api_base.starts_with("http") {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("spotify.api_base '{}' is not a URL", self.spotify.api_base),
            });
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_missing_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.player.binaries, vec!["mpv", "ffplay", "vlc"]);
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.hue.bridge_ip = "192.168.1.20".into();
        cfg.hue.username = "abc".into();
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert!(loaded.hue.is_configured());
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let cfg: Config = serde_yaml::from_str("hue:\n  bridge_ip: 10.0.0.2\n").unwrap();
        assert_eq!(cfg.hue.bridge_ip, "10.0.0.2");
        assert!(!cfg.hue.is_configured());
        assert_eq!(cfg.spotify.api_base, "https://api.spotify.com/v1");
    }

    #[test]
    fn validate_flags_half_configured_hue() {
        let mut cfg = Config::default();
        assert!(cfg.validate().is_empty());
        cfg.hue.bridge_ip = "10.0.0.2".into();
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Warning);
    }

    #[test]
    fn validate_flags_missing_players() {
        let mut cfg = Config::default();
        cfg.player.binaries.clear();
        assert!(cfg
            .validate()
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("player")));
    }
}
