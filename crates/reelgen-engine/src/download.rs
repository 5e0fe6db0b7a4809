use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use reelgen_contracts::ui::DownloadLinks;
use reqwest::blocking::Client as HttpClient;
use url::Url;

use crate::config::{resolve_reference, EngineConfig};
use crate::truncate_text;

pub const DOWNLOADING_LABEL: &str = "Downloading...";

/// Fetches armed download affordances to local files.
#[derive(Debug, Clone)]
pub struct MediaDownloader {
    server: Url,
    http: HttpClient,
}

impl MediaDownloader {
    pub fn new(server: Url) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(None)
            .build()
            .context("failed building HTTP client")?;
        Ok(Self { server, http })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Self::new(config.server.clone())
    }

    pub fn download(&self, reference: &str, out_dir: &Path, fallback_name: &str) -> Result<PathBuf> {
        let url = resolve_reference(&self.server, reference)?;
        tracing::info!(url = %url, "downloading media");
        let response = self
            .http
            .get(url.clone())
            .send()
            .with_context(|| format!("failed downloading {url}"))?;
        if !response.status().is_success() {
            let code = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            bail!("download failed ({code}): {}", truncate_text(&body, 512));
        }
        let bytes = response
            .bytes()
            .with_context(|| format!("failed reading {url}"))?;

        fs::create_dir_all(out_dir)
            .with_context(|| format!("failed creating {}", out_dir.display()))?;
        let path = out_dir.join(file_name_for(&url, fallback_name));
        fs::write(&path, &bytes).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Downloads every armed affordance, combined video first.
    pub fn download_all(&self, links: &DownloadLinks, out_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut saved = Vec::new();
        if let Some(combined) = links.combined.as_deref() {
            saved.push(self.download(combined, out_dir, "combined_video.mp4")?);
        }
        if let Some(audio) = links.audio.as_deref() {
            saved.push(self.download(audio, out_dir, "separate_audio.mp3")?);
        }
        Ok(saved)
    }
}

fn file_name_for(url: &Url, fallback: &str) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}
