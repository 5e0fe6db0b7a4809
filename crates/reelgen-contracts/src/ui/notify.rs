use chrono::{DateTime, Duration, Utc};

pub const DISPLAY_MILLIS: i64 = 3000;
pub const FADE_MILLIS: i64 = 500;

/// A transient on-screen message. Shown for a fixed interval, then fades
/// out and is removed. Validation, transport and media failures all go
/// through this one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub display_for: Duration,
    pub fade_for: Duration,
}

impl Notification {
    pub fn transient(message: impl Into<String>) -> Self {
        Self::at(message, Utc::now())
    }

    pub fn at(message: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            message: message.into(),
            created_at,
            display_for: Duration::milliseconds(DISPLAY_MILLIS),
            fade_for: Duration::milliseconds(FADE_MILLIS),
        }
    }

    pub fn fade_starts_at(&self) -> DateTime<Utc> {
        self.created_at + self.display_for
    }

    pub fn dismissed_at(&self) -> DateTime<Utc> {
        self.fade_starts_at() + self.fade_for
    }

    pub fn is_fading(&self, now: DateTime<Utc>) -> bool {
        now >= self.fade_starts_at() && now < self.dismissed_at()
    }

    pub fn is_dismissed(&self, now: DateTime<Utc>) -> bool {
        now >= self.dismissed_at()
    }

    /// 1.0 while displayed, linear fade to 0.0, then 0.0.
    pub fn opacity(&self, now: DateTime<Utc>) -> f32 {
        if now < self.fade_starts_at() {
            return 1.0;
        }
        if self.is_dismissed(now) {
            return 0.0;
        }
        let elapsed = (now - self.fade_starts_at()).num_milliseconds() as f32;
        let total = self.fade_for.num_milliseconds().max(1) as f32;
        (1.0 - elapsed / total).clamp(0.0, 1.0)
    }
}

/// Notifications currently on screen, oldest first.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    items: Vec<Notification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notification: Notification) {
        self.items.push(notification);
    }

    /// Drops dismissed notifications and returns how many were removed.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !item.is_dismissed(now));
        before - self.items.len()
    }

    pub fn active(&self, now: DateTime<Utc>) -> Vec<&Notification> {
        self.items
            .iter()
            .filter(|item| !item.is_dismissed(now))
            .collect()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
