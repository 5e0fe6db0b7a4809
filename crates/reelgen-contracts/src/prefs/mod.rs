pub mod store;

pub use store::PreferenceStore;

pub const DARK_MODE_KEY: &str = "darkMode";
pub const SOUND_EFFECT_KEY: &str = "soundEffectEnabled";

/// Flags persisted across sessions. Sound effects stay on unless the
/// store explicitly says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub dark_mode: bool,
    pub sound_effect_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dark_mode: false,
            sound_effect_enabled: true,
        }
    }
}

impl Preferences {
    pub fn load(store: &mut PreferenceStore) -> Self {
        let defaults = Self::default();
        Self {
            dark_mode: store.get_flag(DARK_MODE_KEY).unwrap_or(defaults.dark_mode),
            sound_effect_enabled: store
                .get_flag(SOUND_EFFECT_KEY)
                .unwrap_or(defaults.sound_effect_enabled),
        }
    }
}
