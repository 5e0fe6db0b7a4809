use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use reelgen_contracts::error::GenerationError;
use reelgen_contracts::submission::{failure_reason, GenerationRequest, GenerationResult};
use reqwest::blocking::multipart::{Form as MultipartForm, Part as MultipartPart};
use reqwest::blocking::Client as HttpClient;
use serde_json::Value;
use url::Url;

use crate::config::EngineConfig;
use crate::{error_chain_text, truncate_text};

pub const INVALID_RESPONSE_REASON: &str = "invalid response from generation server";

/// Sends one generation request and blocks until the server answers or the
/// transport fails. There is no timeout and no way to abort a send.
pub trait GenerationTransport {
    fn send(&self, request: &GenerationRequest) -> Result<GenerationResult, GenerationError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: Url,
    http: HttpClient,
}

impl HttpTransport {
    pub fn new(endpoint: Url) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(None)
            .build()
            .context("failed building HTTP client")?;
        Ok(Self { endpoint, http })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Self::new(config.generate_endpoint()?)
    }

    fn build_form(request: &GenerationRequest) -> Result<MultipartForm> {
        let mut form = MultipartForm::new();
        for (name, value) in request.text_fields() {
            form = form.text(name, value);
        }
        for (name, path) in request.file_fields() {
            form = form.part(name, file_part(path, name)?);
        }
        Ok(form)
    }
}

impl GenerationTransport for HttpTransport {
    fn send(&self, request: &GenerationRequest) -> Result<GenerationResult, GenerationError> {
        let form = Self::build_form(request)
            .map_err(|err| GenerationError::transport(error_chain_text(&err, 512)))?;
        tracing::info!(
            endpoint = %self.endpoint,
            input_type = request.mode.as_str(),
            fields = ?request.field_names(),
            "sending generation request"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .with_context(|| format!("generation request failed ({})", self.endpoint))
            .map_err(|err| GenerationError::transport(error_chain_text(&err, 512)))?;
        let status = response.status();
        let body = response
            .text()
            .context("generation response body read failed")
            .map_err(|err| GenerationError::transport(error_chain_text(&err, 512)))?;

        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                body = %truncate_text(&body, 512),
                "generation request rejected"
            );
            return Err(GenerationError::transport(failure_reason(&body)));
        }

        let parsed: Value = serde_json::from_str(&body)
            .map_err(|_| GenerationError::transport(INVALID_RESPONSE_REASON))?;
        GenerationResult::from_value(&parsed)
            .ok_or_else(|| GenerationError::transport(INVALID_RESPONSE_REASON))
    }
}

fn file_part(path: &Path, field: &str) -> Result<MultipartPart> {
    let bytes = fs::read(path).with_context(|| format!("failed reading {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or(field)
        .to_string();
    let mime = mime_for_path(path).unwrap_or("application/octet-stream");
    MultipartPart::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime)
        .with_context(|| format!("invalid mime '{mime}' for {}", path.display()))
}

fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use reelgen_contracts::error::GenerationError;
    use reelgen_contracts::modes::InputMode;
    use reelgen_contracts::submission::{FormState, GenerationRequest};

    use super::{mime_for_path, GenerationTransport, HttpTransport, INVALID_RESPONSE_REASON};
    use crate::test_support::{serve_once, StubResponse};

    fn transport_for(base: &url::Url) -> HttpTransport {
        HttpTransport::new(base.join("generate_video").unwrap()).unwrap()
    }

    #[test]
    fn image_request_posts_multipart_fields() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let image = temp.path().join("cat.png");
        std::fs::write(&image, b"\x89PNG fake")?;
        let form = FormState {
            prompt: "a cat on a skateboard".to_string(),
            initial_image: Some(image),
            ..FormState::new(InputMode::ImageAndText)
        };
        let request = GenerationRequest::from_form(&form, true)?;

        let (base, captured) = serve_once(StubResponse::json(
            200,
            r#"{"combined_video_url": "/media/v1.mp4"}"#,
        ));
        let result = transport_for(&base).send(&request)?;
        assert_eq!(result.combined_video_url, "/media/v1.mp4");
        assert_eq!(result.separate_audio_url, None);

        let raw = captured.recv_timeout(Duration::from_secs(5))?;
        assert!(raw.starts_with("POST /generate_video "));
        assert!(raw.contains("name=\"prompt\"\r\n\r\na cat on a skateboard"));
        assert!(raw.contains("name=\"input_type\"\r\n\r\nimage_and_text"));
        assert!(raw.contains("name=\"sound_effect_enabled\"\r\n\r\ntrue"));
        assert!(raw.contains("name=\"initial_image\"; filename=\"cat.png\""));
        assert!(raw.contains("Content-Type: image/png"));
        assert!(!raw.contains("name=\"url\""));
        Ok(())
    }

    #[test]
    fn server_error_reason_is_surfaced() -> anyhow::Result<()> {
        let form = FormState {
            url: "http://example.com/clip".to_string(),
            ..FormState::new(InputMode::Url)
        };
        let request = GenerationRequest::from_form(&form, false)?;
        let (base, captured) = serve_once(StubResponse::json(500, r#"{"error": "unreachable URL"}"#));

        let err = transport_for(&base).send(&request).unwrap_err();
        assert_eq!(
            err,
            GenerationError::Transport {
                reason: "unreachable URL".to_string()
            }
        );
        let raw = captured.recv_timeout(Duration::from_secs(5))?;
        assert!(raw.contains("name=\"url\"\r\n\r\nhttp://example.com/clip"));
        assert!(raw.contains("name=\"prompt\"\r\n\r\n\r\n"));
        Ok(())
    }

    #[test]
    fn success_without_combined_reference_is_invalid() -> anyhow::Result<()> {
        let form = FormState {
            prompt: "waves".to_string(),
            ..FormState::new(InputMode::TextOnly)
        };
        let request = GenerationRequest::from_form(&form, true)?;
        let (base, _captured) = serve_once(StubResponse::json(200, r#"{"status": "ok"}"#));

        let err = transport_for(&base).send(&request).unwrap_err();
        assert_eq!(err, GenerationError::transport(INVALID_RESPONSE_REASON));
        Ok(())
    }

    #[test]
    fn unreadable_attachment_fails_before_sending() {
        let form = FormState {
            prompt: "dusk".to_string(),
            first_frame: Some(PathBuf::from("/missing/first.png")),
            last_frame: Some(PathBuf::from("/missing/last.png")),
            ..FormState::new(InputMode::FirstLastFrame)
        };
        let request = GenerationRequest::from_form(&form, true).unwrap();
        let transport = HttpTransport::new(url::Url::parse("http://127.0.0.1:9/generate_video").unwrap()).unwrap();
        let err = transport.send(&request).unwrap_err();
        assert_eq!(err.kind(), "transport");
        assert!(err.to_string().contains("failed reading /missing/first.png"));
    }

    #[test]
    fn refused_connection_is_a_transport_failure() -> anyhow::Result<()> {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
            listener.local_addr()?.port()
        };
        let form = FormState {
            prompt: "storm over the bay".to_string(),
            ..FormState::new(InputMode::TextOnly)
        };
        let request = GenerationRequest::from_form(&form, true)?;
        let transport =
            HttpTransport::new(url::Url::parse(&format!("http://127.0.0.1:{port}/generate_video"))?)?;

        let err = transport.send(&request).unwrap_err();
        assert_eq!(err.kind(), "transport");
        assert!(err.to_string().starts_with("generation request failed"));
        Ok(())
    }

    #[test]
    fn frame_pair_posts_both_files() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let first = temp.path().join("first.png");
        let last = temp.path().join("last.png");
        std::fs::write(&first, b"first frame")?;
        std::fs::write(&last, b"last frame")?;
        let form = FormState {
            prompt: "day to night".to_string(),
            first_frame: Some(first),
            last_frame: Some(last),
            ..FormState::new(InputMode::FirstLastFrame)
        };
        let request = GenerationRequest::from_form(&form, false)?;

        let (base, captured) = serve_once(StubResponse::json(
            200,
            r#"{"combined_video_url": "/media/v2.mp4", "separate_audio_url": "/media/v2.wav"}"#,
        ));
        let result = transport_for(&base).send(&request)?;
        assert_eq!(result.separate_audio_url.as_deref(), Some("/media/v2.wav"));

        let raw = captured.recv_timeout(Duration::from_secs(5))?;
        assert!(raw.contains("name=\"input_type\"\r\n\r\nfirst_last_frame"));
        assert!(raw.contains("name=\"sound_effect_enabled\"\r\n\r\nfalse"));
        assert!(raw.contains("name=\"first_frame\"; filename=\"first.png\""));
        assert!(raw.contains("name=\"last_frame\"; filename=\"last.png\""));
        assert!(raw.contains("last frame"));
        assert!(!raw.contains("name=\"initial_image\""));
        Ok(())
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for_path(Path::new("a.JPG")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("a.webp")), Some("image/webp"));
        assert_eq!(mime_for_path(Path::new("a.tiff")), None);
    }
}
