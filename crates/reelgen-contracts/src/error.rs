use thiserror::Error;

pub const GENERIC_FAILURE_REASON: &str = "Failed to generate video";
pub const MEDIA_LOAD_FAILURE_REASON: &str = "Failed to load video";
pub const PLAYBACK_FAILURE_MESSAGE: &str = "Error playing video. Please try again.";

/// Missing input for the active mode. Never reaches the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing prompt: please enter a prompt before generating a video")]
    MissingPrompt,
    #[error("missing URL: please enter a URL before generating a video")]
    MissingUrl,
    #[error("missing initial image: please upload an initial image")]
    MissingInitialImage,
    #[error("missing first/last frame image(s): please upload both first and last frame images")]
    MissingFrameImages,
}

impl ValidationError {
    pub fn reason(self) -> &'static str {
        match self {
            ValidationError::MissingPrompt => "missing prompt",
            ValidationError::MissingUrl => "missing URL",
            ValidationError::MissingInitialImage => "missing initial image",
            ValidationError::MissingFrameImages => "missing first/last frame image(s)",
        }
    }
}

/// Everything that can end a generation attempt. All variants are terminal
/// for the attempt and leave the controller idle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{reason}")]
    Transport { reason: String },
    #[error("{reason}")]
    Media { reason: String },
}

impl GenerationError {
    pub fn transport(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        if reason.trim().is_empty() {
            return GenerationError::Transport {
                reason: GENERIC_FAILURE_REASON.to_string(),
            };
        }
        GenerationError::Transport { reason }
    }

    pub fn media(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        if reason.trim().is_empty() {
            return GenerationError::Media {
                reason: MEDIA_LOAD_FAILURE_REASON.to_string(),
            };
        }
        GenerationError::Media { reason }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Validation(_) => "validation",
            GenerationError::Transport { .. } => "transport",
            GenerationError::Media { .. } => "media",
        }
    }

    /// Text shown through the transient notification surface.
    pub fn notification_text(&self) -> String {
        match self {
            GenerationError::Validation(err) => err.to_string(),
            GenerationError::Transport { reason } | GenerationError::Media { reason } => {
                format!("An error occurred: {reason}. Please try again.")
            }
        }
    }
}
