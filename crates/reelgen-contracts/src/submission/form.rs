use std::path::PathBuf;

use crate::error::ValidationError;
use crate::modes::InputMode;

/// Raw contents of every form field. Switching modes leaves values of
/// hidden fields in place; only the active mode's fields are ever read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub mode: InputMode,
    pub prompt: String,
    pub url: String,
    pub initial_image: Option<PathBuf>,
    pub first_frame: Option<PathBuf>,
    pub last_frame: Option<PathBuf>,
}

impl FormState {
    pub fn new(mode: InputMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn trimmed_prompt(&self) -> &str {
        self.prompt.trim()
    }

    pub fn trimmed_url(&self) -> &str {
        self.url.trim()
    }

    /// Checks the fields the active mode requires, first failure wins.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.mode.requires_prompt() && self.trimmed_prompt().is_empty() {
            return Err(ValidationError::MissingPrompt);
        }
        match self.mode {
            InputMode::Url if self.trimmed_url().is_empty() => Err(ValidationError::MissingUrl),
            InputMode::ImageAndText if self.initial_image.is_none() => {
                Err(ValidationError::MissingInitialImage)
            }
            InputMode::FirstLastFrame
                if self.first_frame.is_none() || self.last_frame.is_none() =>
            {
                Err(ValidationError::MissingFrameImages)
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::FormState;
    use crate::error::ValidationError;
    use crate::modes::InputMode;

    fn form(mode: InputMode, prompt: &str) -> FormState {
        FormState {
            prompt: prompt.to_string(),
            ..FormState::new(mode)
        }
    }

    #[test]
    fn whitespace_prompt_is_missing_outside_url_mode() {
        for mode in [
            InputMode::TextOnly,
            InputMode::ImageAndText,
            InputMode::FirstLastFrame,
        ] {
            assert_eq!(
                form(mode, "   \n").validate(),
                Err(ValidationError::MissingPrompt)
            );
        }
    }

    #[test]
    fn url_mode_needs_url_but_not_prompt() {
        let mut state = form(InputMode::Url, "");
        assert_eq!(state.validate(), Err(ValidationError::MissingUrl));
        state.url = "  http://example.com/clip ".to_string();
        assert_eq!(state.validate(), Ok(()));
        assert_eq!(state.trimmed_url(), "http://example.com/clip");
    }

    #[test]
    fn image_mode_needs_initial_image() {
        let mut state = form(InputMode::ImageAndText, "a cat on a skateboard");
        assert_eq!(state.validate(), Err(ValidationError::MissingInitialImage));
        state.initial_image = Some(PathBuf::from("cat.png"));
        assert_eq!(state.validate(), Ok(()));
    }

    #[test]
    fn frame_mode_needs_both_frames() {
        let mut state = form(InputMode::FirstLastFrame, "sunrise");
        state.first_frame = Some(PathBuf::from("first.png"));
        assert_eq!(state.validate(), Err(ValidationError::MissingFrameImages));
        state.first_frame = None;
        state.last_frame = Some(PathBuf::from("last.png"));
        assert_eq!(state.validate(), Err(ValidationError::MissingFrameImages));
        state.first_frame = Some(PathBuf::from("first.png"));
        assert_eq!(state.validate(), Ok(()));
    }

    #[test]
    fn stale_hidden_fields_do_not_satisfy_active_mode() {
        let mut state = form(InputMode::ImageAndText, "cat");
        state.first_frame = Some(PathBuf::from("first.png"));
        state.last_frame = Some(PathBuf::from("last.png"));
        state.url = "http://example.com".to_string();
        assert_eq!(state.validate(), Err(ValidationError::MissingInitialImage));

        state.mode = InputMode::TextOnly;
        assert_eq!(state.validate(), Ok(()));
    }
}
