use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};

use super::form::FormState;
use crate::error::ValidationError;
use crate::modes::InputMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    InitialImage(PathBuf),
    Url(String),
    FramePair { first: PathBuf, last: PathBuf },
}

/// One submission's payload, built fresh from the form and discarded once
/// the request resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub mode: InputMode,
    pub sound_effect_enabled: bool,
    pub attachment: Option<Attachment>,
}

impl GenerationRequest {
    /// Validates the form and collects only the active mode's fields.
    pub fn from_form(
        form: &FormState,
        sound_effect_enabled: bool,
    ) -> Result<Self, ValidationError> {
        form.validate()?;
        let attachment = match form.mode {
            InputMode::ImageAndText => form.initial_image.clone().map(Attachment::InitialImage),
            InputMode::Url => Some(Attachment::Url(form.trimmed_url().to_string())),
            InputMode::FirstLastFrame => match (&form.first_frame, &form.last_frame) {
                (Some(first), Some(last)) => Some(Attachment::FramePair {
                    first: first.clone(),
                    last: last.clone(),
                }),
                _ => None,
            },
            InputMode::TextOnly => None,
        };
        Ok(Self {
            prompt: form.trimmed_prompt().to_string(),
            mode: form.mode,
            sound_effect_enabled,
            attachment,
        })
    }

    /// Text parts of the multipart body, in send order.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("prompt", self.prompt.clone()),
            ("input_type", self.mode.as_str().to_string()),
            ("sound_effect_enabled", self.sound_effect_enabled.to_string()),
        ];
        if let Some(Attachment::Url(url)) = &self.attachment {
            fields.push(("url", url.clone()));
        }
        fields
    }

    /// File parts of the multipart body, in send order.
    pub fn file_fields(&self) -> Vec<(&'static str, &Path)> {
        match &self.attachment {
            Some(Attachment::InitialImage(path)) => vec![("initial_image", path.as_path())],
            Some(Attachment::FramePair { first, last }) => vec![
                ("first_frame", first.as_path()),
                ("last_frame", last.as_path()),
            ],
            _ => Vec::new(),
        }
    }

    /// Field names only, useful for logging what was sent.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.text_fields()
            .into_iter()
            .map(|(name, _)| name)
            .chain(self.file_fields().into_iter().map(|(name, _)| name))
            .collect()
    }

    pub fn manifest(&self) -> Map<String, Value> {
        let files: Map<String, Value> = self
            .file_fields()
            .into_iter()
            .map(|(name, path)| {
                (
                    name.to_string(),
                    Value::String(path.to_string_lossy().to_string()),
                )
            })
            .collect();
        let mut manifest = Map::new();
        manifest.insert("prompt".to_string(), json!(self.prompt));
        manifest.insert("input_type".to_string(), json!(self.mode.as_str()));
        manifest.insert(
            "sound_effect_enabled".to_string(),
            json!(self.sound_effect_enabled),
        );
        if let Some(Attachment::Url(url)) = &self.attachment {
            manifest.insert("url".to_string(), json!(url));
        }
        if !files.is_empty() {
            manifest.insert("files".to_string(), Value::Object(files));
        }
        manifest
    }
}
