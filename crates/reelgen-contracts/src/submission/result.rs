use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GENERIC_FAILURE_REASON;

/// Media references returned by a successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub combined_video_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separate_audio_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawResult {
    combined_video_url: Option<String>,
    video_url: Option<String>,
    separate_audio_url: Option<String>,
}

impl GenerationResult {
    /// Parses a success body. The minimal `{video_url}` shape is accepted as
    /// the combined reference. Returns `None` when no combined reference is
    /// present.
    pub fn from_value(value: &Value) -> Option<Self> {
        let raw: RawResult = serde_json::from_value(value.clone()).ok()?;
        let combined = non_empty(raw.combined_video_url).or_else(|| non_empty(raw.video_url))?;
        Some(Self {
            combined_video_url: combined,
            separate_audio_url: non_empty(raw.separate_audio_url),
        })
    }
}

/// Reason extracted from a non-success body, falling back to the generic
/// failure text when the body has no usable `error` field.
pub fn failure_reason(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|reason| !reason.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| GENERIC_FAILURE_REASON.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}
