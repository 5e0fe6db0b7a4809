use std::process::{Child, Command};

use anyhow::{Context, Result};
use reelgen_contracts::error::MEDIA_LOAD_FAILURE_REASON;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{CONTENT_TYPE, RANGE};
use url::Url;

use crate::config::{resolve_reference, EngineConfig};

/// The playback element. `load` blocks until the media is ready to play or
/// has failed to load; it cannot be cancelled.
pub trait MediaSurface {
    fn load(&mut self, source: &str) -> Result<(), String>;
    fn play(&mut self) -> Result<(), String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedMedia {
    pub url: Url,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
}

/// Media surface backed by HTTP: a source is ready once the server starts
/// streaming it with a media content type. Playback hands the URL to an
/// external player when one is configured. Player processes are kept and
/// reaped once they exit.
#[derive(Debug)]
pub struct HttpMediaSurface {
    server: Url,
    http: HttpClient,
    player: Option<String>,
    loaded: Option<LoadedMedia>,
    players: Vec<Child>,
}

impl HttpMediaSurface {
    pub fn new(server: Url, player: Option<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(None)
            .build()
            .context("failed building HTTP client")?;
        Ok(Self {
            server,
            http,
            player,
            loaded: None,
            players: Vec::new(),
        })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Self::new(config.server.clone(), config.player.clone())
    }

    pub fn loaded(&self) -> Option<&LoadedMedia> {
        self.loaded.as_ref()
    }

    /// Player processes started by `play` that have not exited yet.
    pub fn running_players(&self) -> usize {
        self.players.len()
    }

    /// Collects exit status of finished players; returns how many are still
    /// running.
    pub fn reap_players(&mut self) -> usize {
        self.players.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                tracing::debug!(pid = child.id(), %status, "player exited");
                false
            }
            Ok(None) => true,
            Err(err) => {
                tracing::warn!(pid = child.id(), error = %err, "failed polling player");
                false
            }
        });
        self.players.len()
    }

    fn fetch_head(&self, url: &Url) -> Result<LoadedMedia, String> {
        let response = self
            .http
            .get(url.clone())
            .header(RANGE, "bytes=0-")
            .send()
            .map_err(|err| {
                tracing::warn!(url = %url, error = %err, "media request failed");
                MEDIA_LOAD_FAILURE_REASON.to_string()
            })?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "media not available");
            return Err(MEDIA_LOAD_FAILURE_REASON.to_string());
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_ascii_lowercase());
        if content_type.as_deref().map(is_unplayable_type).unwrap_or(false) {
            tracing::warn!(url = %url, content_type = ?content_type, "media has unplayable type");
            return Err(MEDIA_LOAD_FAILURE_REASON.to_string());
        }
        Ok(LoadedMedia {
            url: url.clone(),
            content_type,
            content_length: response.content_length(),
        })
    }
}

impl MediaSurface for HttpMediaSurface {
    fn load(&mut self, source: &str) -> Result<(), String> {
        self.reap_players();
        self.loaded = None;
        let url = resolve_reference(&self.server, source)
            .map_err(|_| MEDIA_LOAD_FAILURE_REASON.to_string())?;
        let media = self.fetch_head(&url)?;
        tracing::info!(url = %media.url, bytes = ?media.content_length, "media ready");
        self.loaded = Some(media);
        Ok(())
    }

    fn play(&mut self) -> Result<(), String> {
        self.reap_players();
        let Some(media) = self.loaded.as_ref() else {
            return Err("no media loaded".to_string());
        };
        let Some(player) = self.player.as_deref() else {
            tracing::debug!(url = %media.url, "no player configured; skipping autoplay");
            return Ok(());
        };
        let child = Command::new(player)
            .arg(media.url.as_str())
            .spawn()
            .map_err(|err| format!("failed starting {player}: {err}"))?;
        tracing::info!(pid = child.id(), player, url = %media.url, "player started");
        self.players.push(child);
        Ok(())
    }
}

fn is_unplayable_type(content_type: &str) -> bool {
    content_type.starts_with("text/") || content_type.contains("json")
}

#[cfg(test)]
mod tests {
    use reelgen_contracts::error::MEDIA_LOAD_FAILURE_REASON;

    use super::{is_unplayable_type, HttpMediaSurface, MediaSurface};
    use crate::test_support::{serve_once, StubResponse};

    #[test]
    fn relative_media_is_resolved_and_loaded() -> anyhow::Result<()> {
        let (base, captured) = serve_once(StubResponse::bytes(200, "video/mp4", b"\0\0\0 ftypmp42"));
        let mut surface = HttpMediaSurface::new(base.clone(), None)?;

        surface.load("/media/v1.mp4").map_err(anyhow::Error::msg)?;
        let loaded = surface.loaded().cloned().unwrap();
        assert_eq!(loaded.url, base.join("/media/v1.mp4")?);
        assert_eq!(loaded.content_type.as_deref(), Some("video/mp4"));
        assert!(surface.play().is_ok());

        let raw = captured.recv_timeout(std::time::Duration::from_secs(5))?;
        assert!(raw.starts_with("GET /media/v1.mp4 "));
        Ok(())
    }

    #[test]
    fn missing_media_fails_to_load() -> anyhow::Result<()> {
        let (base, _captured) = serve_once(StubResponse::json(404, r#"{"error": "gone"}"#));
        let mut surface = HttpMediaSurface::new(base, None)?;
        assert_eq!(
            surface.load("/media/missing.mp4"),
            Err(MEDIA_LOAD_FAILURE_REASON.to_string())
        );
        assert!(surface.loaded().is_none());
        assert!(surface.play().is_err());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn finished_players_are_reaped() -> anyhow::Result<()> {
        let (base, _captured) = serve_once(StubResponse::bytes(200, "video/mp4", b"\0\0\0 ftypmp42"));
        let mut surface = HttpMediaSurface::new(base, Some("true".to_string()))?;
        surface.load("/media/v1.mp4").map_err(anyhow::Error::msg)?;
        surface.play().map_err(anyhow::Error::msg)?;
        assert_eq!(surface.running_players(), 1);

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while surface.reap_players() > 0 {
            assert!(std::time::Instant::now() < deadline, "player never exited");
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert_eq!(surface.running_players(), 0);
        Ok(())
    }

    #[test]
    fn missing_player_is_a_playback_error() -> anyhow::Result<()> {
        let (base, _captured) = serve_once(StubResponse::bytes(200, "video/mp4", b"\0\0\0 ftypmp42"));
        let mut surface =
            HttpMediaSurface::new(base, Some("/nonexistent/reelgen-player".to_string()))?;
        surface.load("/media/v1.mp4").map_err(anyhow::Error::msg)?;
        let err = surface.play().unwrap_err();
        assert!(err.starts_with("failed starting /nonexistent/reelgen-player"));
        assert_eq!(surface.running_players(), 0);
        Ok(())
    }

    #[test]
    fn html_pages_are_not_media() {
        assert!(is_unplayable_type("text/html; charset=utf-8"));
        assert!(is_unplayable_type("application/json"));
        assert!(!is_unplayable_type("video/mp4"));
        assert!(!is_unplayable_type("application/octet-stream"));
    }
}
