mod commands;

use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use reelgen_contracts::events::EventWriter;
use reelgen_contracts::modes::InputMode;
use reelgen_contracts::prefs::{PreferenceStore, Preferences, DARK_MODE_KEY, SOUND_EFFECT_KEY};
use reelgen_contracts::ui::state::BUSY_LABEL;
use reelgen_contracts::ui::{Notification, NotificationQueue, Phase};
use reelgen_engine::download::DOWNLOADING_LABEL;
use reelgen_engine::{
    EngineConfig, HttpMediaSurface, HttpTransport, MediaDownloader, Notifier,
    RequestLifecycleController, SubmitOutcome,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::{parse_command, parse_toggle, SessionCommand, SESSION_HELP};

#[derive(Debug, Parser)]
#[command(name = "reelgen", version, about = "Terminal front end for a video generation server")]
struct Cli {
    /// Generation server base URL (overrides REELGEN_SERVER).
    #[arg(long, global = true)]
    server: Option<String>,
    /// Preference file (overrides REELGEN_PREFS).
    #[arg(long, global = true)]
    prefs: Option<PathBuf>,
    /// Session event log; defaults to events.jsonl next to the preference file.
    #[arg(long, global = true)]
    events: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Generate(GenerateArgs),
    Session,
    Prefs(PrefsArgs),
}

#[derive(Debug, Parser)]
struct GenerateArgs {
    #[arg(long, default_value = "text_only")]
    mode: String,
    #[arg(long, default_value = "")]
    prompt: String,
    #[arg(long)]
    url: Option<String>,
    #[arg(long)]
    image: Option<PathBuf>,
    #[arg(long)]
    first_frame: Option<PathBuf>,
    #[arg(long)]
    last_frame: Option<PathBuf>,
    /// Override the stored sound-effect preference for this run and persist it.
    #[arg(long)]
    sound_effect: Option<String>,
    /// Save the armed downloads here after a successful run.
    #[arg(long)]
    download_dir: Option<PathBuf>,
}

#[derive(Debug, Parser)]
struct PrefsArgs {
    #[arg(long)]
    dark_mode: Option<String>,
    #[arg(long)]
    sound_effect: Option<String>,
}

/// Prints notifications to stderr; dark mode switches to a bright palette.
struct TerminalNotifier {
    dark_mode: bool,
}

impl Notifier for TerminalNotifier {
    fn notify(&mut self, notification: &Notification) {
        if self.dark_mode {
            eprintln!("\x1b[1;97;40m {} \x1b[0m", notification.message);
        } else {
            eprintln!("[notice] {}", notification.message);
        }
    }
}

type TerminalController = RequestLifecycleController<HttpTransport, HttpMediaSurface, TerminalNotifier>;

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("reelgen error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let mut config = EngineConfig::from_env()?;
    if let Some(server) = cli.server.as_deref() {
        config = config.with_server(server)?;
    }
    if let Some(prefs) = cli.prefs.clone() {
        config.preferences_path = prefs;
    }
    let events_path = cli.events.clone().unwrap_or_else(|| {
        config
            .preferences_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("events.jsonl")
    });

    match cli.command {
        Command::Generate(args) => run_generate(&config, &events_path, args),
        Command::Session => run_session(&config, &events_path),
        Command::Prefs(args) => run_prefs(&config, args),
    }
}

fn build_controller(config: &EngineConfig, events_path: &Path) -> Result<TerminalController> {
    let mut store = PreferenceStore::new(&config.preferences_path);
    let dark_mode = Preferences::load(&mut store).dark_mode;
    let events = EventWriter::new(events_path, session_id());
    Ok(RequestLifecycleController::new(
        HttpTransport::from_config(config)?,
        HttpMediaSurface::from_config(config)?,
        TerminalNotifier { dark_mode },
        store,
        events,
    )
    .with_reveal_delay(config.reveal_delay))
}

fn run_generate(config: &EngineConfig, events_path: &Path, args: GenerateArgs) -> Result<i32> {
    let mut controller = build_controller(config, events_path)?;
    if let Some(raw) = args.sound_effect.as_deref() {
        let enabled = parse_toggle(raw)
            .with_context(|| format!("--sound-effect expects on/off, got '{raw}'"))?;
        controller.set_sound_effect(enabled);
    }

    controller.select_mode(InputMode::from_identifier(&args.mode));
    controller.set_prompt(args.prompt);
    controller.set_url(args.url.unwrap_or_default());
    controller.set_initial_image(args.image);
    controller.set_first_frame(args.first_frame);
    controller.set_last_frame(args.last_frame);

    println!("{BUSY_LABEL}");
    match controller.submit() {
        SubmitOutcome::Presented(_) => {
            print_result(&controller);
            if let Some(dir) = args.download_dir.as_deref() {
                download_armed(config, &controller, dir)?;
            }
            Ok(0)
        }
        SubmitOutcome::Failed(_) | SubmitOutcome::Ignored => Ok(1),
    }
}

fn run_session(config: &EngineConfig, events_path: &Path) -> Result<i32> {
    let mut controller = build_controller(config, events_path)?;
    let stdin = io::stdin();
    let mut line = String::new();

    println!("Reelgen session started. Type /help for commands.");
    print_fields(&controller);

    loop {
        print!("[{}] > ", controller.form().mode);
        io::stdout().flush()?;

        line.clear();
        let read = match stdin.read_line(&mut line) {
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        if read == 0 {
            break;
        }

        match parse_command(&line) {
            SessionCommand::Noop => {}
            SessionCommand::Help => println!("Commands: {}", SESSION_HELP.join("  ")),
            SessionCommand::Quit => break,
            SessionCommand::Mode(mode) => {
                controller.select_mode(mode);
                print_fields(&controller);
            }
            SessionCommand::Prompt(prompt) => controller.set_prompt(prompt),
            SessionCommand::Url(url) => controller.set_url(url),
            SessionCommand::Image(path) => controller.set_initial_image(path),
            SessionCommand::FirstFrame(path) => controller.set_first_frame(path),
            SessionCommand::LastFrame(path) => controller.set_last_frame(path),
            SessionCommand::Generate => {
                println!("{BUSY_LABEL}");
                if let SubmitOutcome::Presented(_) = controller.submit() {
                    print_result(&controller);
                }
            }
            SessionCommand::Status => {
                let now = Utc::now();
                controller.notifications_mut().prune(now);
                print_status(&controller, now);
            }
            SessionCommand::Download(dir) => {
                if controller.ui().phase() != Phase::ShowingResult {
                    controller.notify("Nothing to download yet.");
                    continue;
                }
                if let Err(err) = download_armed(config, &controller, &dir) {
                    controller.notify(format!("Download failed: {err:#}"));
                }
            }
            SessionCommand::DarkMode(enabled) => {
                controller.set_dark_mode(enabled);
                controller.notifier_mut().dark_mode = enabled;
                println!("Dark mode {}", on_off(enabled));
            }
            SessionCommand::SoundEffect(enabled) => {
                controller.set_sound_effect(enabled);
                println!("Sound effect {}", on_off(enabled));
            }
            SessionCommand::Unknown(raw) => println!("Unknown command: {raw} (try /help)"),
        }
    }
    Ok(0)
}

fn run_prefs(config: &EngineConfig, args: PrefsArgs) -> Result<i32> {
    let mut store = PreferenceStore::new(&config.preferences_path);
    for (flag, key, raw) in [
        ("--dark-mode", DARK_MODE_KEY, args.dark_mode.as_deref()),
        ("--sound-effect", SOUND_EFFECT_KEY, args.sound_effect.as_deref()),
    ] {
        let Some(raw) = raw else {
            continue;
        };
        let value = parse_toggle(raw).with_context(|| format!("{flag} expects on/off, got '{raw}'"))?;
        store.set_flag(key, value)?;
    }
    let prefs = Preferences::load(&mut store);
    println!("preferences: {}", config.preferences_path.display());
    println!("dark mode: {}", on_off(prefs.dark_mode));
    println!("sound effect: {}", on_off(prefs.sound_effect_enabled));
    Ok(0)
}

fn download_armed(config: &EngineConfig, controller: &TerminalController, dir: &Path) -> Result<()> {
    println!("{DOWNLOADING_LABEL}");
    let downloader = MediaDownloader::from_config(config)?;
    for path in downloader.download_all(controller.ui().downloads(), dir)? {
        println!("saved {}", path.display());
    }
    Ok(())
}

fn print_fields(controller: &TerminalController) {
    let visible: Vec<&str> = controller
        .ui()
        .fields()
        .visible_groups()
        .into_iter()
        .map(|group| group.as_str())
        .collect();
    println!("Mode {}: showing {}", controller.ui().mode(), visible.join(", "));
}

fn print_status(controller: &TerminalController, now: DateTime<Utc>) {
    let ui = controller.ui();
    let form = controller.form();
    println!("phase: {:?}", ui.phase());
    println!("mode: {}", ui.mode());
    println!("prompt: {:?}", form.prompt);
    if ui.fields().url_input {
        println!("url: {:?}", form.url);
    }
    if ui.fields().image_upload {
        println!("image: {}", display_path(form.initial_image.as_deref()));
    }
    if ui.fields().first_last_frame {
        println!("first frame: {}", display_path(form.first_frame.as_deref()));
        println!("last frame: {}", display_path(form.last_frame.as_deref()));
    }
    println!(
        "sound effect: {}",
        on_off(controller.preferences().sound_effect_enabled)
    );
    if ui.phase() == Phase::ShowingResult {
        print_result(controller);
    }
    for line in notice_lines(controller.notifications(), now) {
        println!("{line}");
    }
}

fn notice_lines(queue: &NotificationQueue, now: DateTime<Utc>) -> Vec<String> {
    queue
        .active(now)
        .into_iter()
        .map(|note| {
            if note.is_fading(now) {
                format!("notice: {} (fading, {:.0}%)", note.message, note.opacity(now) * 100.0)
            } else {
                format!("notice: {}", note.message)
            }
        })
        .collect()
}

fn print_result(controller: &TerminalController) {
    let ui = controller.ui();
    if let Some(source) = ui.media_source() {
        println!("video: {source}");
    }
    if let Some(combined) = ui.downloads().combined.as_deref() {
        println!("download combined video: {combined}");
    }
    if let Some(audio) = ui.downloads().audio.as_deref() {
        println!("download separate audio: {audio}");
    }
}

fn display_path(path: Option<&Path>) -> String {
    path.map(|value| value.display().to_string())
        .unwrap_or_else(|| "(none)".to_string())
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn session_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis();
    format!("session-{millis}")
}
