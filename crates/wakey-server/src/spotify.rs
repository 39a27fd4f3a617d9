//! Spotify Web API playback control.
//!
//! Only the player endpoints are used. The access token is read from config
//! as-is; obtaining or refreshing it happens outside this process.

use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;
use wakey_core::adapters::{AdapterError, AdapterResult};
use wakey_core::config::SpotifyConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct SpotifyClient {
    client: reqwest::Client,
    api_base: String,
    access_token: String,
    device_id: Option<String>,
}

/// Request body for `PUT /me/player/play`. Playlists, albums and artists
/// are contexts; anything else is played as a single-item queue.
pub fn play_body(uri: &str) -> serde_json::Value {
    let is_context = ["spotify:playlist:", "spotify:album:", "spotify:artist:"]
        .iter()
        .any(|prefix| uri.starts_with(prefix));
    if is_context {
        serde_json::json!({ "context_uri": uri })
    } else {
        serde_json::json!({ "uris": [uri] })
    }
}

impl SpotifyClient {
    pub fn new(config: &SpotifyConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            device_id: config.device_id.clone().filter(|d| !d.is_empty()),
        }
    }

    pub fn is_connected(&self) -> bool {
        !self.access_token.is_empty()
    }

    pub async fn play(&self, uri: &str) -> AdapterResult<()> {
        self.put("play", &[], Some(play_body(uri))).await
    }

    pub async fn pause(&self) -> AdapterResult<()> {
        self.put("pause", &[], None).await
    }

    pub async fn set_volume(&self, percent: u8) -> AdapterResult<()> {
        self.put("volume", &[("volume_percent", percent.to_string())], None)
            .await
    }

    async fn put(
        &self,
        action: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> AdapterResult<()> {
        if !self.is_connected() {
            return Err(AdapterError::NotConfigured("spotify access token".into()));
        }

        let url = format!("{}/me/player/{action}", self.api_base);
        let mut req = self
            .client
            .put(&url)
            .bearer_auth(&self.access_token)
            .query(query);
        if let Some(device) = &self.device_id {
            req = req.query(&[("device_id", device)]);
        }
        req = match body {
            Some(body) => req.json(&body),
            None => req.header(reqwest::header::CONTENT_LENGTH, 0),
        };

        let response = req
            .send()
            .await
            .map_err(|e| AdapterError::Http(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            debug!(action, %status, "spotify player call ok");
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        let detail: String = detail.chars().take(200).collect();
        Err(match status {
            StatusCode::NOT_FOUND => {
                AdapterError::Unavailable(format!("no active spotify device: {detail}"))
            }
            _ => AdapterError::Rejected(format!("spotify {action} returned {status}: {detail}")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(server: &mockito::Server, device: Option<&str>) -> SpotifyClient {
        SpotifyClient::new(&SpotifyConfig {
            api_base: format!("{}/v1", server.url()),
            access_token: "tok".into(),
            device_id: device.map(str::to_string),
        })
    }

    #[test]
    fn playlist_uri_is_a_context() {
        assert_eq!(
            play_body("spotify:playlist:37i9dQZF1DXcBWIGoYBM5M"),
            serde_json::json!({ "context_uri": "spotify:playlist:37i9dQZF1DXcBWIGoYBM5M" })
        );
        assert_eq!(
            play_body("spotify:album:4aawyAB9vmqN3uQ7FjRGTy"),
            serde_json::json!({ "context_uri": "spotify:album:4aawyAB9vmqN3uQ7FjRGTy" })
        );
    }

    #[test]
    fn track_uri_is_queued() {
        assert_eq!(
            play_body("spotify:track:4uLU6hMCjMI75M1A2tKUQC"),
            serde_json::json!({ "uris": ["spotify:track:4uLU6hMCjMI75M1A2tKUQC"] })
        );
    }

    #[tokio::test]
    async fn play_sends_bearer_token_and_device() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/v1/me/player/play")
            .match_header("authorization", "Bearer tok")
            .match_query(Matcher::UrlEncoded("device_id".into(), "kitchen".into()))
            .match_body(Matcher::Json(serde_json::json!({
                "context_uri": "spotify:playlist:abc"
            })))
            .with_status(204)
            .create_async()
            .await;

        client(&server, Some("kitchen"))
            .play("spotify:playlist:abc")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn volume_uses_query_parameter() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/v1/me/player/volume")
            .match_query(Matcher::UrlEncoded("volume_percent".into(), "40".into()))
            .with_status(204)
            .create_async()
            .await;

        client(&server, None).set_volume(40).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_device_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/v1/me/player/play")
            .with_status(404)
            .with_body(r#"{"error":{"status":404,"message":"Player command failed: No active device found"}}"#)
            .create_async()
            .await;

        let err = client(&server, None)
            .play("spotify:track:x")
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::Unavailable(_)));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/v1/me/player/pause")
            .with_status(401)
            .create_async()
            .await;

        let err = client(&server, None).pause().await.unwrap_err();
        assert!(matches!(err, AdapterError::Rejected(_)));
    }

    #[tokio::test]
    async fn without_token_nothing_is_sent() {
        let c = SpotifyClient::new(&SpotifyConfig::default());
        assert!(!c.is_connected());
        let err = c.play("spotify:playlist:abc").await.unwrap_err();
        assert!(matches!(err, AdapterError::NotConfigured(_)));
    }
}
