use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use reelgen_contracts::error::{GenerationError, PLAYBACK_FAILURE_MESSAGE};
use reelgen_contracts::events::{payload, EventPayload, EventWriter};
use reelgen_contracts::modes::{FieldVisibility, InputMode};
use reelgen_contracts::prefs::{PreferenceStore, Preferences, DARK_MODE_KEY, SOUND_EFFECT_KEY};
use reelgen_contracts::submission::{FormState, GenerationRequest, GenerationResult};
use reelgen_contracts::ui::{Notification, NotificationQueue, UiState};
use serde_json::{json, Value};

use crate::config::DEFAULT_REVEAL_DELAY_MS;
use crate::media::MediaSurface;
use crate::notifier::Notifier;
use crate::transport::GenerationTransport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The trigger was not interactable; nothing happened.
    Ignored,
    Presented(GenerationResult),
    Failed(GenerationError),
}

/// Owns the form, the UI state and the preference flags, and runs one
/// generation attempt at a time:
///
/// Idle -> Busy -> ShowingResult on success, Busy -> Idle on any failure,
/// Idle -> Idle when validation fails. Every path ends with the trigger
/// enabled again.
pub struct RequestLifecycleController<T, M, N> {
    form: FormState,
    ui: UiState,
    preferences: Preferences,
    store: PreferenceStore,
    notifications: NotificationQueue,
    transport: T,
    media: M,
    notifier: N,
    events: EventWriter,
    reveal_delay: Duration,
}

impl<T, M, N> RequestLifecycleController<T, M, N>
where
    T: GenerationTransport,
    M: MediaSurface,
    N: Notifier,
{
    pub fn new(
        transport: T,
        media: M,
        notifier: N,
        mut store: PreferenceStore,
        events: EventWriter,
    ) -> Self {
        let preferences = Preferences::load(&mut store);
        let mut ui = UiState::default();
        ui.set_dark_mode(preferences.dark_mode);
        let controller = Self {
            form: FormState::default(),
            ui,
            preferences,
            store,
            notifications: NotificationQueue::new(),
            transport,
            media,
            notifier,
            events,
            reveal_delay: Duration::from_millis(DEFAULT_REVEAL_DELAY_MS),
        };
        controller.record(
            "session_started",
            payload(json!({
                "dark_mode": controller.preferences.dark_mode,
                "sound_effect_enabled": controller.preferences.sound_effect_enabled,
                "preferences_path": controller.store.path().to_string_lossy().to_string(),
            })),
        );
        controller
    }

    pub fn with_reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal_delay = delay;
        self
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationQueue {
        &mut self.notifications
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    pub fn events(&self) -> &EventWriter {
        &self.events
    }

    /// Switches the active mode. Field contents are left untouched.
    pub fn select_mode(&mut self, mode: InputMode) -> FieldVisibility {
        self.form.mode = mode;
        let fields = self.ui.select_mode(mode);
        let visible: Vec<&str> = fields
            .visible_groups()
            .into_iter()
            .map(|group| group.as_str())
            .collect();
        self.record(
            "mode_changed",
            payload(json!({"mode": mode.as_str(), "visible": visible})),
        );
        fields
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.form.prompt = prompt.into();
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.form.url = url.into();
    }

    pub fn set_initial_image(&mut self, path: Option<PathBuf>) {
        self.form.initial_image = path;
    }

    pub fn set_first_frame(&mut self, path: Option<PathBuf>) {
        self.form.first_frame = path;
    }

    pub fn set_last_frame(&mut self, path: Option<PathBuf>) {
        self.form.last_frame = path;
    }

    /// Applies immediately; the write to the store is fire-and-forget.
    pub fn set_dark_mode(&mut self, enabled: bool) {
        self.preferences.dark_mode = enabled;
        self.ui.set_dark_mode(enabled);
        self.persist_flag(DARK_MODE_KEY, enabled);
    }

    pub fn set_sound_effect(&mut self, enabled: bool) {
        self.preferences.sound_effect_enabled = enabled;
        self.persist_flag(SOUND_EFFECT_KEY, enabled);
    }

    /// The trigger action. Validates, dispatches one request and presents
    /// whatever comes back.
    pub fn submit(&mut self) -> SubmitOutcome {
        if !self.ui.trigger_enabled() {
            self.record("trigger_ignored", EventPayload::new());
            return SubmitOutcome::Ignored;
        }

        let request =
            match GenerationRequest::from_form(&self.form, self.preferences.sound_effect_enabled) {
                Ok(request) => request,
                Err(err) => {
                    self.record(
                        "validation_failed",
                        payload(json!({
                            "mode": self.form.mode.as_str(),
                            "reason": err.reason(),
                        })),
                    );
                    let err = GenerationError::from(err);
                    self.present_failure(&err);
                    return SubmitOutcome::Failed(err);
                }
            };

        if let Err(err) = self.ui.begin_request() {
            tracing::warn!(error = %err, "trigger fired while busy");
            return SubmitOutcome::Ignored;
        }
        self.record_ui_state();
        self.record(
            "request_started",
            payload(Value::Object(request.manifest())),
        );

        let outcome = self.dispatch(&request);

        self.ui.end_request();
        self.record_ui_state();
        outcome
    }

    fn dispatch(&mut self, request: &GenerationRequest) -> SubmitOutcome {
        let result = match self.transport.send(request) {
            Ok(result) => result,
            Err(err) => {
                self.record(
                    "request_failed",
                    payload(json!({"kind": err.kind(), "reason": err.to_string()})),
                );
                self.present_failure(&err);
                return SubmitOutcome::Failed(err);
            }
        };
        match self.present_success(&result) {
            Ok(()) => SubmitOutcome::Presented(result),
            Err(err) => {
                self.record(
                    "request_failed",
                    payload(json!({"kind": err.kind(), "reason": err.to_string()})),
                );
                self.present_failure(&err);
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Loads the combined media, waits for it to be ready, reveals the
    /// result container, starts playback and arms the downloads. Expects a
    /// request to be in flight.
    pub fn present_success(&mut self, result: &GenerationResult) -> Result<(), GenerationError> {
        self.ui
            .assign_media(&result.combined_video_url)
            .map_err(|err| GenerationError::media(err.to_string()))?;
        self.media
            .load(&result.combined_video_url)
            .map_err(GenerationError::media)?;

        self.ui.arm_downloads(result);
        self.ui
            .reveal_result()
            .map_err(|err| GenerationError::media(err.to_string()))?;
        thread::sleep(self.reveal_delay);
        self.ui
            .complete_reveal()
            .map_err(|err| GenerationError::media(err.to_string()))?;

        if let Err(reason) = self.media.play() {
            tracing::warn!(reason = %reason, "autoplay failed");
            self.notify(PLAYBACK_FAILURE_MESSAGE);
        }

        self.record(
            "result_presented",
            payload(json!({
                "combined_video_url": result.combined_video_url,
                "separate_audio_url": result.separate_audio_url,
                "downloads": self.ui.downloads(),
            })),
        );
        Ok(())
    }

    /// Surfaces a failure. The result container is left as it is.
    pub fn present_failure(&mut self, err: &GenerationError) {
        tracing::warn!(kind = err.kind(), reason = %err, "generation attempt failed");
        self.notify(err.notification_text());
    }

    /// Shows a transient message through the shared notification surface.
    pub fn notify(&mut self, message: impl Into<String>) {
        let notification = Notification::transient(message);
        self.record(
            "notification",
            payload(json!({"message": notification.message})),
        );
        self.notifier.notify(&notification);
        self.notifications.prune(notification.created_at);
        self.notifications.push(notification);
    }

    fn persist_flag(&mut self, key: &str, value: bool) {
        self.record(
            "preference_changed",
            payload(json!({"key": key, "value": value})),
        );
        if let Err(err) = self.store.set_flag(key, value) {
            tracing::warn!(key, error = %err, "failed saving preference");
            self.notify(format!("Could not save preference {key}: {err:#}"));
        }
    }

    fn record_ui_state(&self) {
        self.record("ui_state", payload(self.ui.snapshot()));
    }

    fn record(&self, event_type: &str, event: EventPayload) {
        if let Err(err) = self.events.emit(event_type, event) {
            tracing::warn!(event_type, error = %err, "failed writing event");
        }
    }
}
