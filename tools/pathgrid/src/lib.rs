pub mod config;
pub mod errors;
pub mod facts;
pub mod hotkeys;
pub mod logging;
pub mod notation;
pub mod recorder;
pub mod runtime;
pub mod session;
pub mod sketch;
pub mod tui;
pub mod types;

use clap::{error::ErrorKind, CommandFactory, Parser};
use config::{load_config, AppConfig, CliOverrides};
use errors::PathgridError;
use hotkeys::parse_script;
use logging::{structured_fallback_line, JsonlLogger};
use runtime::{CrosstermKeys, ProductionRuntime, ScreenGuard};
use session::{run_interactive, run_script, Session, SessionSummary};
use tui::render_screen;
use types::Mode;

#[derive(Debug, Clone, Parser)]
#[command(name = "pathgrid", version)]
#[command(about = "Draw on a grid with the arrow keys")]
pub struct Cli {
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,
    #[arg(long)]
    pub cols: Option<u32>,
    #[arg(long)]
    pub rows: Option<u32>,
    #[arg(long)]
    pub log: Option<std::path::PathBuf>,
    /// Apply actions without a terminal, e.g. "2↑2→ reset 1↓ stamp clear".
    #[arg(long)]
    pub replay: Option<String>,
    #[arg(long, default_value_t = false)]
    pub print_expected: bool,
    /// Write the default configuration to this path and exit.
    #[arg(long)]
    pub init_config: Option<std::path::PathBuf>,
    #[arg(long, default_value_t = 80)]
    pub width: u16,
    #[arg(long, default_value_t = 32)]
    pub height: u16,
}

pub fn run() -> Result<i32, PathgridError> {
    let args = std::env::args_os().collect::<Vec<_>>();
    let cwd = std::env::current_dir().map_err(|e| PathgridError::Io(e.to_string()))?;
    let runtime = ProductionRuntime::new();
    run_with_runtime(&args, &cwd, &runtime)
}

pub fn run_with_runtime(
    args: &[std::ffi::OsString],
    cwd: &std::path::Path,
    runtime: &ProductionRuntime,
) -> Result<i32, PathgridError> {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{error}");
                return Ok(0);
            }
            _ => return Err(PathgridError::Cli(error.to_string())),
        },
    };

    if let Some(path) = &cli.init_config {
        let path = if path.is_absolute() {
            path.clone()
        } else {
            cwd.join(path)
        };
        write_default_config(runtime, &path)?;
        runtime
            .terminal
            .write_line(&format!("wrote default config to {}", path.display()))?;
        return Ok(0);
    }

    let overrides = CliOverrides {
        config_path: cli.config.as_ref().map(|path| {
            if path.is_absolute() {
                path.clone()
            } else {
                cwd.join(path)
            }
        }),
        mode: cli.mode,
        cols: cli.cols,
        rows: cli.rows,
        log_path: cli.log.clone(),
    };
    let cfg = load_config(&overrides, cwd, runtime.file_system.as_ref())?;

    let logger = match &cfg.logging.path {
        Some(path) => {
            let mut logger = JsonlLogger::new(path);
            logger.max_payload_bytes = cfg.logging.max_payload_bytes;
            logger
        }
        None => JsonlLogger::disabled(),
    };
    let mut session = Session::from_config(&cfg)?;

    if cli.print_expected {
        let notation = session.expected_notation().ok_or_else(|| {
            PathgridError::Cli("--print-expected requires --mode trace".to_string())
        })?;
        let points = cfg
            .expected_trace()?
            .iter()
            .map(|point| format!("({},{})", point.x, point.y))
            .collect::<Vec<_>>()
            .join(" ");
        runtime.terminal.write_line(&notation)?;
        runtime.terminal.write_line(&points)?;
        return Ok(0);
    }

    if let Some(script) = &cli.replay {
        let summary = run_script(&mut session, parse_script(script), &logger)?;
        let frame = render_screen(&session.view(), cli.width, cli.height)?;
        runtime.terminal.write_line(frame.trim_end_matches('\n'))?;
        runtime.terminal.write_line(&summary_line(&summary))?;
        return Ok(0);
    }

    if !runtime.terminal.stdin_is_tty() {
        return Err(PathgridError::Cli(
            "interactive mode requires a terminal; pass --replay to run headless".to_string(),
        ));
    }

    let summary = {
        let _screen = ScreenGuard::enter()?;
        run_interactive(
            &mut session,
            runtime.terminal.as_ref(),
            &mut CrosstermKeys,
            &logger,
        )?
    };
    runtime.terminal.write_line(&summary_line(&summary))?;
    Ok(0)
}

fn summary_line(summary: &SessionSummary) -> String {
    let state = match (summary.mode, summary.complete) {
        (Mode::Trace, true) => "complete",
        (Mode::Trace, false) => "incomplete",
        _ => "done",
    };
    structured_fallback_line(
        summary.mode.as_str(),
        state,
        &format!(
            "moves={} blocked={} visited={} anchors={}",
            summary.moves, summary.blocked, summary.visited, summary.anchors
        ),
    )
}

fn write_default_config(
    runtime: &ProductionRuntime,
    path: &std::path::Path,
) -> Result<(), PathgridError> {
    if runtime.file_system.exists(path) {
        return Err(PathgridError::Cli(format!(
            "refusing to overwrite existing config {}",
            path.display()
        )));
    }
    let output = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| PathgridError::ConfigParse(e.to_string()))?;
    runtime.file_system.write_string(path, &output)
}

pub fn render_help() -> String {
    let mut cmd = Cli::command();
    cmd.render_long_help().to_string()
}
