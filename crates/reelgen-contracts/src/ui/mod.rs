pub mod notify;
pub mod state;

pub use notify::{Notification, NotificationQueue};
pub use state::{DownloadLinks, Phase, ResultVisibility, TransitionError, UiState};
