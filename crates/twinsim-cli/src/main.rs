//! CLI for device automation on iOS Simulators and Android emulators.
//!
//! Every subcommand maps to one platform-agnostic action; `--platform` picks
//! which platform's tools run it.
//!
//! # Usage
//!
//! ```bash
//! # Tap at coordinates on the booted iOS simulator
//! twinsim -p ios tap 120 340
//!
//! # Type text on an Android emulator
//! twinsim -p android input "hello world"
//!
//! # Press the Android back key
//! twinsim -p android press-key 4
//!
//! # Boot a simulator (iOS: kill, boot, connect, open Simulator)
//! twinsim -p ios boot A1B2C3D4-E5F6-7890-ABCD-EF1234567890
//!
//! # Show the command that would run, without running it
//! twinsim -p ios --dry-run boot A1B2C3D4-E5F6-7890-ABCD-EF1234567890
//!
//! # Boolean queries print true or false
//! twinsim -p android is-installed com.example.app
//!
//! # JSON output
//! twinsim -p ios --format json available
//! ```

mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use twinsim_core::action::{Action, ActionKind};
use twinsim_core::config::{config_path, TwinsimConfig};
use twinsim_core::device::Device;
use twinsim_core::platform::Platform;

use output::OutputFormat;

/// Run device automation actions on an iOS Simulator or Android emulator.
#[derive(Parser)]
#[command(name = "twinsim")]
#[command(about = "Run device automation actions on an iOS Simulator or Android emulator")]
#[command(version)]
struct Cli {
    /// Target platform: ios or android
    #[arg(short, long, env = "TWINSIM_PLATFORM")]
    platform: Option<String>,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Print the resolved command instead of running it
    #[arg(long)]
    dry_run: bool,

    /// Per-command timeout in milliseconds (0 disables the timeout)
    #[arg(long, env = "TWINSIM_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Capture the screen into a PNG file
    Screenshot {
        /// Destination file on the host
        path: String,
    },

    /// Force-stop an app
    TerminateApp {
        /// Bundle identifier (iOS) or package name (Android)
        app_id: String,
    },

    /// Launch an app
    StartApp {
        /// Bundle identifier (iOS) or package name (Android)
        app_id: String,
    },

    /// Tap at screen coordinates
    Tap {
        /// X coordinate
        x: u32,
        /// Y coordinate
        y: u32,
    },

    /// Type text into the focused field
    Input {
        /// Text to type
        text: String,
    },

    /// Print the identifier of the first booted simulator or emulator
    OpenSimulator,

    /// Print whether a simulator or emulator is booted
    IsBooted {
        /// Simulator UDID or emulator identifier
        id: String,
    },

    /// Boot a simulator or start an emulator in the background
    Boot {
        /// Simulator UDID (iOS) or AVD name (Android)
        id: String,
    },

    /// Connect the control session to a simulator
    Connect {
        /// Simulator UDID
        id: String,
    },

    /// List simulators or emulators that are not running
    Available,

    /// Print whether an app is installed
    IsInstalled {
        /// Bundle identifier (iOS) or package name (Android)
        app_id: String,
    },

    /// Send a key event
    PressKey {
        /// Platform key code
        code: u32,
    },

    /// List every supported action
    Actions,

    /// Show the effective configuration
    Config {
        /// Write the default configuration file if none exists
        #[arg(long)]
        init: bool,
    },
}

impl Command {
    /// The action this subcommand runs, if it runs one.
    fn action(&self) -> Option<Action> {
        let action = match self {
            Command::Screenshot { path } => Action::Screenshot { path: path.clone() },
            Command::TerminateApp { app_id } => Action::TerminateApp { app_id: app_id.clone() },
            Command::StartApp { app_id } => Action::StartApp { app_id: app_id.clone() },
            Command::Tap { x, y } => Action::Tap { x: *x, y: *y },
            Command::Input { text } => Action::Input { text: text.clone() },
            Command::OpenSimulator => Action::GetOpenSimulatorId,
            Command::IsBooted { id } => Action::IsSimulatorBooted { id: id.clone() },
            Command::Boot { id } => Action::BootSimulator { id: id.clone() },
            Command::Connect { id } => Action::ConnectSimulator { id: id.clone() },
            Command::Available => Action::GetAvailableSimulators,
            Command::IsInstalled { app_id } => Action::IsAppInstalled { app_id: app_id.clone() },
            Command::PressKey { code } => Action::PressKey { code: *code },
            Command::Actions | Command::Config { .. } => return None,
        };
        Some(action)
    }
}

#[derive(Debug)]
enum CliError {
    Validation(String),
    ActionFailed(String),
    Config(String),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::ActionFailed(_) => ExitCode::from(1),
            CliError::Validation(_) => ExitCode::from(2),
            CliError::Config(_) => ExitCode::from(3),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Validation(msg) => write!(f, "Invalid input: {}", msg),
            CliError::ActionFailed(msg) => write!(f, "Action failed: {}", msg),
            CliError::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl From<twinsim_core::Error> for CliError {
    fn from(e: twinsim_core::Error) -> Self {
        if e.is_validation() {
            CliError::Validation(e.to_string())
        } else {
            CliError::ActionFailed(e.to_string())
        }
    }
}

/// Installs the stderr subscriber and, with `--log-file`, a file sink.
///
/// The returned guard must stay alive for file logs to be flushed.
fn init_logging(log_file: Option<&Path>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "twinsim.log".into());
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_file.as_deref());

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.format == OutputFormat::Json {
                println!("{}", output::error_json(&e.to_string()));
            } else {
                eprintln!("Error: {}", e);
            }
            e.exit_code()
        }
    }
}

fn effective_config(cli: &Cli) -> TwinsimConfig {
    let mut config = TwinsimConfig::load();
    if let Some(ms) = cli.timeout_ms {
        config.command_timeout_ms = (ms > 0).then_some(ms);
    }
    config
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let config = effective_config(cli);

    // Commands that don't run an action
    match cli.command {
        Command::Actions => {
            list_actions(cli);
            return Ok(());
        }
        Command::Config { init } => return show_config(cli, &config, init),
        _ => {}
    }

    let Some(action) = cli.command.action() else {
        return Ok(());
    };
    let platform = parse_platform(cli.platform.as_deref())?;
    let kind = action.kind();
    let device = Device::from_config(&config);

    if cli.dry_run {
        let plan = device.plan(&action, platform)?;
        if cli.format == OutputFormat::Json {
            println!("{}", output::plan_json(kind, platform, &plan));
        } else {
            for step in plan.steps() {
                println!("{}", step);
            }
        }
        return Ok(());
    }

    let token = device.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received SIGINT, cancelling");
            token.cancel();
        }
    });

    debug!(action = %kind, %platform, "running");
    let started = std::time::Instant::now();
    let result = device.execute(&action, platform).await?;

    if cli.format == OutputFormat::Json {
        println!("{}", output::result_json(kind, platform, &result));
    } else {
        for line in output::text_lines(&result) {
            println!("{}", line);
        }
        if !cli.quiet {
            let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3fZ");
            eprintln!(
                "[{}] {} on {} ok ({}ms)",
                now,
                kind,
                platform,
                started.elapsed().as_millis()
            );
        }
    }

    Ok(())
}

fn parse_platform(platform: Option<&str>) -> Result<Platform, CliError> {
    let name = platform.ok_or_else(|| {
        CliError::Validation("--platform (or TWINSIM_PLATFORM) is required: ios or android".to_string())
    })?;
    name.parse().map_err(|e: twinsim_core::platform::PlatformError| CliError::Validation(e.to_string()))
}

fn list_actions(cli: &Cli) {
    if cli.format == OutputFormat::Json {
        let actions: Vec<_> = ActionKind::ALL
            .iter()
            .map(|kind| {
                serde_json::json!({
                    "action": kind.name(),
                    "ios": kind.shape(Platform::Ios),
                    "android": kind.shape(Platform::Android),
                })
            })
            .collect();
        println!("{}", serde_json::json!({ "actions": actions }));
    } else {
        for kind in ActionKind::ALL {
            println!("{}", kind);
        }
    }
}

fn show_config(cli: &Cli, config: &TwinsimConfig, init: bool) -> Result<(), CliError> {
    let path = config_path();
    if init {
        if path.exists() {
            if !cli.quiet {
                eprintln!("Config already exists at {}", path.display());
            }
        } else {
            TwinsimConfig::default()
                .save()
                .map_err(|e| CliError::Config(format!("Failed to write {}: {}", path.display(), e)))?;
            if !cli.quiet {
                eprintln!("Wrote {}", path.display());
            }
        }
    }

    let json = serde_json::to_string_pretty(config).map_err(|e| CliError::Config(e.to_string()))?;
    println!("{}", json);
    Ok(())
}
