use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";
pub const GENERATE_PATH: &str = "generate_video";
pub const DEFAULT_REVEAL_DELAY_MS: u64 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Base URL of the generation server, always ending in `/`.
    pub server: Url,
    pub preferences_path: PathBuf,
    /// External command handed the media URL for autoplay.
    pub player: Option<String>,
    pub reveal_delay: Duration,
}

impl EngineConfig {
    /// Reads `REELGEN_SERVER`, `REELGEN_PREFS`, `REELGEN_PLAYER` and
    /// `REELGEN_REVEAL_DELAY_MS`, falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] with an arbitrary variable source.
    /// Blank values count as unset; an unparsable reveal delay uses the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let server = var("REELGEN_SERVER").unwrap_or_else(|| DEFAULT_SERVER.to_string());
        let reveal_delay = var("REELGEN_REVEAL_DELAY_MS")
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REVEAL_DELAY_MS);
        Ok(Self {
            server: parse_server(&server)?,
            preferences_path: var("REELGEN_PREFS")
                .map(PathBuf::from)
                .unwrap_or_else(default_preferences_path),
            player: var("REELGEN_PLAYER"),
            reveal_delay: Duration::from_millis(reveal_delay),
        })
    }

    pub fn with_server(mut self, raw: &str) -> Result<Self> {
        self.server = parse_server(raw)?;
        Ok(self)
    }

    pub fn generate_endpoint(&self) -> Result<Url> {
        self.server
            .join(GENERATE_PATH)
            .with_context(|| format!("invalid generate endpoint under {}", self.server))
    }

    pub fn resolve_media(&self, reference: &str) -> Result<Url> {
        resolve_reference(&self.server, reference)
    }
}

pub fn parse_server(raw: &str) -> Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    Url::parse(&format!("{trimmed}/")).with_context(|| format!("invalid server URL '{raw}'"))
}

/// Resolves a media reference the way a page would: absolute URLs pass
/// through, anything else is joined onto the server base.
pub fn resolve_reference(base: &Url, reference: &str) -> Result<Url> {
    let trimmed = reference.trim();
    if let Ok(absolute) = Url::parse(trimmed) {
        return Ok(absolute);
    }
    base.join(trimmed)
        .with_context(|| format!("invalid media reference '{reference}'"))
}

fn default_preferences_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".reelgen")
        .join("preferences.json")
}
