pub mod error;
pub mod events;
pub mod modes;
pub mod prefs;
pub mod submission;
pub mod ui;
