use std::path::PathBuf;

use reelgen_contracts::modes::InputMode;

pub const SESSION_HELP: &[&str] = &[
    "/mode <text_only|image_and_text|url|first_last_frame>",
    "/prompt <text>",
    "/url <address>",
    "/image <path>",
    "/first <path>",
    "/last <path>",
    "/generate",
    "/status",
    "/download <dir>",
    "/dark <on|off>",
    "/sound <on|off>",
    "/help",
    "/quit",
];

/// One line of interactive input. Bare text sets the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Noop,
    Help,
    Quit,
    Mode(InputMode),
    Prompt(String),
    Url(String),
    Image(Option<PathBuf>),
    FirstFrame(Option<PathBuf>),
    LastFrame(Option<PathBuf>),
    Generate,
    Status,
    Download(PathBuf),
    DarkMode(bool),
    SoundEffect(bool),
    Unknown(String),
}

pub fn parse_command(line: &str) -> SessionCommand {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return SessionCommand::Noop;
    }
    let Some(rest) = trimmed.strip_prefix('/') else {
        return SessionCommand::Prompt(trimmed.to_string());
    };
    let (command, arg) = match rest.split_once(char::is_whitespace) {
        Some((command, arg)) => (command.to_ascii_lowercase(), arg.trim()),
        None => (rest.to_ascii_lowercase(), ""),
    };
    match command.as_str() {
        "help" => SessionCommand::Help,
        "quit" | "exit" => SessionCommand::Quit,
        "mode" => SessionCommand::Mode(InputMode::from_identifier(arg)),
        "prompt" => SessionCommand::Prompt(arg.to_string()),
        "url" => SessionCommand::Url(arg.to_string()),
        "image" => SessionCommand::Image(parse_path_arg(arg)),
        "first" => SessionCommand::FirstFrame(parse_path_arg(arg)),
        "last" => SessionCommand::LastFrame(parse_path_arg(arg)),
        "generate" | "go" => SessionCommand::Generate,
        "status" => SessionCommand::Status,
        "download" => SessionCommand::Download(
            parse_path_arg(arg).unwrap_or_else(|| PathBuf::from(".")),
        ),
        "dark" => match parse_toggle(arg) {
            Some(value) => SessionCommand::DarkMode(value),
            None => SessionCommand::Unknown(trimmed.to_string()),
        },
        "sound" => match parse_toggle(arg) {
            Some(value) => SessionCommand::SoundEffect(value),
            None => SessionCommand::Unknown(trimmed.to_string()),
        },
        _ => SessionCommand::Unknown(trimmed.to_string()),
    }
}

/// A single path, allowing shell-style quoting. Empty clears the field.
fn parse_path_arg(arg: &str) -> Option<PathBuf> {
    if arg.trim().is_empty() {
        return None;
    }
    let parts = shell_words::split(arg).unwrap_or_else(|_| vec![arg.trim().to_string()]);
    match parts.len() {
        0 => None,
        1 => parts.into_iter().next().map(PathBuf::from),
        _ => Some(PathBuf::from(parts.join(" "))),
    }
}

pub fn parse_toggle(arg: &str) -> Option<bool> {
    match arg.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
