pub mod visibility;

pub use visibility::{FieldGroup, FieldVisibility};

use serde::{Deserialize, Serialize};

/// The mutually exclusive input selection that drives which form fields
/// are shown and which of them are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    #[default]
    TextOnly,
    ImageAndText,
    Url,
    FirstLastFrame,
}

impl InputMode {
    pub const ALL: [InputMode; 4] = [
        InputMode::TextOnly,
        InputMode::ImageAndText,
        InputMode::Url,
        InputMode::FirstLastFrame,
    ];

    /// Wire identifier sent as `input_type`.
    pub fn as_str(self) -> &'static str {
        match self {
            InputMode::TextOnly => "text_only",
            InputMode::ImageAndText => "image_and_text",
            InputMode::Url => "url",
            InputMode::FirstLastFrame => "first_last_frame",
        }
    }

    /// Maps a selector value to a mode. Anything unrecognised falls back to
    /// text-only, the same as the selector's default branch.
    pub fn from_identifier(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "image_and_text" | "image_text" | "image" => InputMode::ImageAndText,
            "url" => InputMode::Url,
            "first_last_frame" | "frames" => InputMode::FirstLastFrame,
            _ => InputMode::TextOnly,
        }
    }

    pub fn requires_prompt(self) -> bool {
        self != InputMode::Url
    }

    pub fn visibility(self) -> FieldVisibility {
        FieldVisibility::for_mode(self)
    }
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
