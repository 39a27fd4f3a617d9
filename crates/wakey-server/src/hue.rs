//! Philips Hue bridge client for the sunrise ramp and room checks.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};
use wakey_core::adapters::{AdapterError, AdapterResult, LightLevel, LightingAdapter};
use wakey_core::config::HueConfig;
use wakey_core::types::RoomTarget;

/// Bridge-side fade between steps, in 100 ms units (30 s).
pub const TRANSITION_TIME: u16 = 300;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// How long a room stays lit when flashed from the settings page.
pub const FLASH_HOLD: Duration = Duration::from_secs(2);

const FLASH_LEVEL: LightLevel = LightLevel {
    brightness: 80,
    color_temp: 400,
};

pub struct HueBridge {
    client: reqwest::Client,
    /// `http://{ip}/api/{username}`; `None` until the bridge is paired.
    base_url: Option<String>,
}

impl HueBridge {
    pub fn new(config: &HueConfig) -> Self {
        let base_url = config
            .is_configured()
            .then(|| format!("http://{}/api/{}", config.bridge_ip, config.username));
        Self {
            client: http_client(),
            base_url,
        }
    }

    /// Point at an arbitrary API root, e.g. a local mock bridge.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: Some(base_url.into()),
        }
    }

    fn action_url(&self, room_id: &str) -> Option<String> {
        self.base_url
            .as_ref()
            .map(|base| format!("{base}/groups/{room_id}/action"))
    }

    /// Light a room dim and warm for `hold`, then switch it off.
    pub async fn flash(&self, room_id: &str, hold: Duration) -> AdapterResult<()> {
        let url = self
            .action_url(room_id)
            .ok_or_else(|| AdapterError::NotConfigured("hue bridge".into()))?;
        self.put_action(
            &url,
            serde_json::json!({
                "on": true,
                "bri": FLASH_LEVEL.brightness,
                "ct": FLASH_LEVEL.color_temp,
                "transitiontime": 5,
            }),
        )
        .await?;
        tokio::time::sleep(hold).await;
        self.put_action(&url, serde_json::json!({ "on": false, "transitiontime": 10 }))
            .await?;
        info!(room = room_id, "hue room flashed");
        Ok(())
    }

    async fn put_action(&self, url: &str, body: serde_json::Value) -> AdapterResult<()> {
        let response = self
            .client
            .put(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AdapterError::Http(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Rejected(format!("bridge returned {status}")));
        }

        // The bridge answers 200 with a list of per-attribute results, any of
        // which may be an error object.
        let results: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AdapterError::Http(e.to_string()))?;
        match first_error(&results) {
            Some(err) => Err(AdapterError::Rejected(err)),
            None => Ok(()),
        }
    }
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[async_trait]
impl LightingAdapter for HueBridge {
    fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    async fn apply(&self, room: &RoomTarget, level: LightLevel) -> AdapterResult<()> {
        let url = self
            .action_url(&room.id)
            .ok_or_else(|| AdapterError::NotConfigured("hue bridge".into()))?;
        self.put_action(
            &url,
            serde_json::json!({
                "on": true,
                "bri": level.brightness,
                "ct": level.color_temp,
                "transitiontime": TRANSITION_TIME,
            }),
        )
        .await?;
        debug!(room = room.label(), bri = level.brightness, ct = level.color_temp, "hue action applied");
        Ok(())
    }
}

fn first_error(results: &serde_json::Value) -> Option<String> {
    results.as_array()?.iter().find_map(|entry| {
        let err = entry.get("error")?;
        Some(
            err.get("description")
                .and_then(|d| d.as_str())
                .unwrap_or("unknown bridge error")
                .to_string(),
        )
    })
}
