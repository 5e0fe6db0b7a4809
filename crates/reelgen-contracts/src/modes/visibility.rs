use serde::{Deserialize, Serialize};

use super::InputMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    Prompt,
    ImageUpload,
    UrlInput,
    FirstLastFrameUpload,
}

impl FieldGroup {
    pub const ALL: [FieldGroup; 4] = [
        FieldGroup::Prompt,
        FieldGroup::ImageUpload,
        FieldGroup::UrlInput,
        FieldGroup::FirstLastFrameUpload,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldGroup::Prompt => "prompt",
            FieldGroup::ImageUpload => "image_upload",
            FieldGroup::UrlInput => "url_input",
            FieldGroup::FirstLastFrameUpload => "first_last_frame_upload",
        }
    }
}

/// Visibility vector over the four field groups. Only ever built from an
/// `InputMode`, so at most one mode-specific group is shown at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldVisibility {
    pub prompt: bool,
    pub image_upload: bool,
    pub url_input: bool,
    pub first_last_frame: bool,
}

impl FieldVisibility {
    pub fn for_mode(mode: InputMode) -> Self {
        let hidden = Self {
            prompt: true,
            image_upload: false,
            url_input: false,
            first_last_frame: false,
        };
        match mode {
            InputMode::ImageAndText => Self {
                image_upload: true,
                ..hidden
            },
            InputMode::Url => Self {
                url_input: true,
                ..hidden
            },
            InputMode::FirstLastFrame => Self {
                first_last_frame: true,
                ..hidden
            },
            InputMode::TextOnly => hidden,
        }
    }

    pub fn is_visible(&self, group: FieldGroup) -> bool {
        match group {
            FieldGroup::Prompt => self.prompt,
            FieldGroup::ImageUpload => self.image_upload,
            FieldGroup::UrlInput => self.url_input,
            FieldGroup::FirstLastFrameUpload => self.first_last_frame,
        }
    }

    pub fn visible_groups(&self) -> Vec<FieldGroup> {
        FieldGroup::ALL
            .into_iter()
            .filter(|group| self.is_visible(*group))
            .collect()
    }
}

impl Default for FieldVisibility {
    fn default() -> Self {
        Self::for_mode(InputMode::default())
    }
}
