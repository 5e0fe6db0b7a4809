pub mod config;
pub mod controller;
pub mod download;
pub mod media;
pub mod notifier;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use config::EngineConfig;
pub use controller::{RequestLifecycleController, SubmitOutcome};
pub use download::MediaDownloader;
pub use media::{HttpMediaSurface, MediaSurface};
pub use notifier::Notifier;
pub use transport::{GenerationTransport, HttpTransport};

pub(crate) fn error_chain_text(err: &anyhow::Error, max_chars: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    for cause in err.chain() {
        let text = cause.to_string();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        if parts.last().map(|existing| existing == trimmed).unwrap_or(false) {
            continue;
        }
        parts.push(trimmed.to_string());
    }
    if parts.is_empty() {
        return truncate_text(&err.to_string(), max_chars);
    }
    truncate_text(&parts.join(" | caused by: "), max_chars)
}

pub(crate) fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}
