use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::modes::{FieldVisibility, InputMode};
use crate::submission::GenerationResult;

pub const IDLE_LABEL: &str = "Generate Video";
pub const BUSY_LABEL: &str = "Generating...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Busy,
    ShowingResult,
}

/// Result container visibility. `Revealing` is the short window between
/// un-hiding the container and applying the visible transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultVisibility {
    Hidden,
    Revealing,
    Visible,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadLinks {
    pub combined: Option<String>,
    pub audio: Option<String>,
}

impl DownloadLinks {
    pub fn from_result(result: &GenerationResult) -> Self {
        Self {
            combined: Some(result.combined_video_url.clone()),
            audio: result.separate_audio_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("a generation request is already in flight")]
    AlreadyBusy,
    #[error("no generation request is in flight")]
    NotBusy,
    #[error("result container is not in the expected state ({0:?})")]
    UnexpectedVisibility(ResultVisibility),
}

/// Everything a surface needs to render the generator. Mutated only through
/// the transition methods below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    phase: Phase,
    mode: InputMode,
    fields: FieldVisibility,
    trigger_label: &'static str,
    spinner_visible: bool,
    result: ResultVisibility,
    media_source: Option<String>,
    downloads: DownloadLinks,
    dark_mode: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            mode: InputMode::default(),
            fields: FieldVisibility::default(),
            trigger_label: IDLE_LABEL,
            spinner_visible: false,
            result: ResultVisibility::Hidden,
            media_source: None,
            downloads: DownloadLinks::default(),
            dark_mode: false,
        }
    }
}

impl UiState {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase == Phase::Busy
    }

    /// The trigger is interactable exactly when nothing is in flight.
    pub fn trigger_enabled(&self) -> bool {
        !self.is_busy()
    }

    pub fn trigger_label(&self) -> &'static str {
        self.trigger_label
    }

    pub fn spinner_visible(&self) -> bool {
        self.spinner_visible
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn fields(&self) -> FieldVisibility {
        self.fields
    }

    pub fn result_visibility(&self) -> ResultVisibility {
        self.result
    }

    pub fn media_source(&self) -> Option<&str> {
        self.media_source.as_deref()
    }

    pub fn downloads(&self) -> &DownloadLinks {
        &self.downloads
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn set_dark_mode(&mut self, enabled: bool) {
        self.dark_mode = enabled;
    }

    /// Mode and field visibility always change together.
    pub fn select_mode(&mut self, mode: InputMode) -> FieldVisibility {
        self.mode = mode;
        self.fields = mode.visibility();
        self.fields
    }

    /// Idle/ShowingResult -> Busy. Disables the trigger, shows the spinner
    /// and hides any previous result.
    pub fn begin_request(&mut self) -> Result<(), TransitionError> {
        if self.is_busy() {
            return Err(TransitionError::AlreadyBusy);
        }
        self.phase = Phase::Busy;
        self.trigger_label = BUSY_LABEL;
        self.spinner_visible = true;
        self.result = ResultVisibility::Hidden;
        Ok(())
    }

    pub fn assign_media(&mut self, source: &str) -> Result<(), TransitionError> {
        if !self.is_busy() {
            return Err(TransitionError::NotBusy);
        }
        self.media_source = Some(source.to_string());
        Ok(())
    }

    /// The combined affordance is armed iff a combined reference exists,
    /// the audio affordance iff a separate audio reference exists.
    pub fn arm_downloads(&mut self, result: &GenerationResult) {
        self.downloads = DownloadLinks::from_result(result);
    }

    pub fn reveal_result(&mut self) -> Result<(), TransitionError> {
        if self.result != ResultVisibility::Hidden {
            return Err(TransitionError::UnexpectedVisibility(self.result));
        }
        self.result = ResultVisibility::Revealing;
        Ok(())
    }

    pub fn complete_reveal(&mut self) -> Result<(), TransitionError> {
        if self.result != ResultVisibility::Revealing {
            return Err(TransitionError::UnexpectedVisibility(self.result));
        }
        self.result = ResultVisibility::Visible;
        Ok(())
    }

    /// Busy -> ShowingResult when a result was revealed, Busy -> Idle
    /// otherwise. Always re-enables the trigger.
    pub fn end_request(&mut self) {
        self.trigger_label = IDLE_LABEL;
        self.spinner_visible = false;
        self.phase = if self.result == ResultVisibility::Hidden {
            Phase::Idle
        } else {
            Phase::ShowingResult
        };
    }

    pub fn snapshot(&self) -> Value {
        json!({
            "phase": self.phase,
            "busy": self.is_busy(),
            "trigger_enabled": self.trigger_enabled(),
            "trigger_label": self.trigger_label,
            "spinner_visible": self.spinner_visible,
            "result": self.result,
            "mode": self.mode,
        })
    }
}
