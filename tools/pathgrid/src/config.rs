use crate::errors::PathgridError;
use crate::notation::bounded_path;
use crate::runtime::FileSystem;
use crate::types::{Bounds, GridPoint, Mode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_TRACE_NOTATION: &[&str] = &["2↑2→1↑1→", "1↓3→2↓"];

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub mode: Option<Mode>,
    pub cols: Option<u32>,
    pub rows: Option<u32>,
    pub log_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub board: BoardConfig,
    pub trace: TraceConfig,
    pub sketch: SketchConfig,
    pub logging: LoggingConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardConfig {
    pub cols: u32,
    pub rows: u32,
    pub start: GridPoint,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraceConfig {
    pub notation: Vec<String>,
    pub start: GridPoint,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SketchConfig {
    pub facts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    pub path: Option<PathBuf>,
    pub max_payload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UiConfig {
    pub mode: Mode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig {
                cols: 16,
                rows: 12,
                start: GridPoint::new(2, 2),
            },
            trace: TraceConfig {
                notation: DEFAULT_TRACE_NOTATION
                    .iter()
                    .map(|line| line.to_string())
                    .collect(),
                start: GridPoint::new(2, 5),
            },
            sketch: SketchConfig { facts: Vec::new() },
            logging: LoggingConfig {
                path: None,
                max_payload_bytes: 4096,
            },
            ui: UiConfig { mode: Mode::Trace },
        }
    }
}

impl AppConfig {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.board.cols, self.board.rows)
    }

    /// Target path for trace mode; fails at the first step off the board.
    pub fn expected_trace(&self) -> Result<Vec<GridPoint>, PathgridError> {
        bounded_path(self.trace.start, &self.trace.notation, self.bounds()).map_err(|off| {
            PathgridError::InvalidConfig(format!(
                "trace.notation leaves the board at step {}: ({}, {})",
                off.step, off.point.x, off.point.y
            ))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialAppConfig {
    board: Option<PartialBoardConfig>,
    trace: Option<PartialTraceConfig>,
    sketch: Option<PartialSketchConfig>,
    logging: Option<PartialLoggingConfig>,
    ui: Option<PartialUiConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialBoardConfig {
    cols: Option<u32>,
    rows: Option<u32>,
    start: Option<GridPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialTraceConfig {
    start: Option<GridPoint>,
    notation: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialSketchConfig {
    facts: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialLoggingConfig {
    path: Option<PathBuf>,
    max_payload_bytes: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialUiConfig {
    mode: Option<Mode>,
}

pub fn load_config(
    overrides: &CliOverrides,
    process_cwd: &Path,
    fs: &dyn FileSystem,
) -> Result<AppConfig, PathgridError> {
    let mut cfg = AppConfig::default();

    if let Some(path) = &overrides.config_path {
        let file_contents = fs.read_to_string(path)?;
        let partial: PartialAppConfig = toml::from_str(&file_contents)
            .map_err(|e| PathgridError::ConfigParse(e.to_string()))?;
        merge_partial_config(&mut cfg, partial);
    }

    apply_cli_overrides(&mut cfg, overrides);

    if let Some(path) = cfg.logging.path.take() {
        cfg.logging.path = Some(absolutize_path(process_cwd, &path));
    }

    validate_config(&cfg)?;
    Ok(cfg)
}

fn merge_partial_config(cfg: &mut AppConfig, partial: PartialAppConfig) {
    if let Some(board) = partial.board {
        if let Some(cols) = board.cols {
            cfg.board.cols = cols;
        }
        if let Some(rows) = board.rows {
            cfg.board.rows = rows;
        }
        if let Some(start) = board.start {
            cfg.board.start = start;
        }
    }

    if let Some(trace) = partial.trace {
        if let Some(start) = trace.start {
            cfg.trace.start = start;
        }
        if let Some(notation) = trace.notation {
            cfg.trace.notation = notation;
        }
    }

    if let Some(sketch) = partial.sketch {
        if let Some(facts) = sketch.facts {
            cfg.sketch.facts = facts;
        }
    }

    if let Some(logging) = partial.logging {
        if let Some(path) = logging.path {
            cfg.logging.path = Some(path);
        }
        if let Some(value) = logging.max_payload_bytes {
            cfg.logging.max_payload_bytes = value;
        }
    }

    if let Some(ui) = partial.ui {
        if let Some(mode) = ui.mode {
            cfg.ui.mode = mode;
        }
    }
}

fn apply_cli_overrides(cfg: &mut AppConfig, overrides: &CliOverrides) {
    if let Some(mode) = overrides.mode {
        cfg.ui.mode = mode;
    }
    if let Some(cols) = overrides.cols {
        cfg.board.cols = cols;
    }
    if let Some(rows) = overrides.rows {
        cfg.board.rows = rows;
    }
    if let Some(path) = &overrides.log_path {
        cfg.logging.path = Some(path.clone());
    }
}

fn absolutize_path(base: &Path, value: &Path) -> PathBuf {
    if value.is_absolute() {
        value.to_path_buf()
    } else {
        base.join(value)
    }
}

fn validate_config(cfg: &AppConfig) -> Result<(), PathgridError> {
    if cfg.board.cols == 0 || cfg.board.rows == 0 {
        return Err(PathgridError::InvalidConfig(
            "board.cols and board.rows must be greater than zero".to_string(),
        ));
    }

    let bounds = cfg.bounds();
    if cfg.ui.mode != Mode::Trace && !bounds.contains(cfg.board.start) {
        return Err(PathgridError::InvalidConfig(format!(
            "board.start ({}, {}) is outside the {}x{} board",
            cfg.board.start.x, cfg.board.start.y, bounds.cols, bounds.rows
        )));
    }

    if cfg.ui.mode == Mode::Trace {
        if !bounds.contains(cfg.trace.start) {
            return Err(PathgridError::InvalidConfig(format!(
                "trace.start ({}, {}) is outside the {}x{} board",
                cfg.trace.start.x, cfg.trace.start.y, bounds.cols, bounds.rows
            )));
        }
        cfg.expected_trace()?;
    }

    if cfg.logging.max_payload_bytes == 0 {
        return Err(PathgridError::InvalidConfig(
            "logging.max_payload_bytes must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_config, CliOverrides};
    use crate::errors::PathgridError;
    use crate::runtime::FakeFileSystem;
    use crate::types::{GridPoint, Mode};
    use std::path::{Path, PathBuf};

    fn load(toml: &str, overrides: CliOverrides) -> Result<super::AppConfig, PathgridError> {
        let fs = FakeFileSystem::with_file("/cfg/pathgrid.toml", toml);
        let overrides = CliOverrides {
            config_path: Some(PathBuf::from("/cfg/pathgrid.toml")),
            ..overrides
        };
        load_config(&overrides, Path::new("/work"), &fs)
    }

    #[test]
    fn defaults_describe_a_sixteen_by_twelve_board() {
        let fs = FakeFileSystem::default();
        let cfg = load_config(&CliOverrides::default(), Path::new("/work"), &fs).expect("cfg");
        assert_eq!((cfg.board.cols, cfg.board.rows), (16, 12));
        assert_eq!(cfg.board.start, GridPoint::new(2, 2));
        assert_eq!(cfg.ui.mode, Mode::Trace);
        assert_eq!(cfg.expected_trace().expect("path").len(), 12);
    }

    #[test]
    fn partial_file_merges_over_defaults() {
        let cfg = load(
            r#"
[board]
rows = 8

[trace]
start = { x = 1, y = 6 }
notation = ["3→", "2↑"]

[logging]
path = "logs/session.jsonl"
"#,
            CliOverrides::default(),
        )
        .expect("cfg");
        assert_eq!((cfg.board.cols, cfg.board.rows), (16, 8));
        assert_eq!(cfg.trace.start, GridPoint::new(1, 6));
        assert_eq!(
            cfg.expected_trace().expect("path").last(),
            Some(&GridPoint::new(4, 4))
        );
        assert_eq!(
            cfg.logging.path,
            Some(PathBuf::from("/work/logs/session.jsonl"))
        );
    }

    #[test]
    fn cli_overrides_win_over_file() {
        let cfg = load(
            "[ui]\nmode = \"free\"\n[board]\ncols = 10\n",
            CliOverrides {
                mode: Some(Mode::Sketch),
                cols: Some(20),
                ..CliOverrides::default()
            },
        )
        .expect("cfg");
        assert_eq!(cfg.ui.mode, Mode::Sketch);
        assert_eq!(cfg.board.cols, 20);
    }

    #[test]
    fn notation_leaving_the_board_is_rejected() {
        let err = load("[trace]\nnotation = [\"9↑\"]\n", CliOverrides::default())
            .expect_err("must fail");
        assert!(matches!(err, PathgridError::InvalidConfig(message) if message.contains("step 6")));
    }

    #[test]
    fn unreachable_notation_is_fine_outside_trace_mode() {
        let cfg = load(
            "[ui]\nmode = \"free\"\n[trace]\nnotation = [\"40↑\"]\n",
            CliOverrides::default(),
        );
        assert!(cfg.is_ok());
    }

    #[test]
    fn zero_sized_board_and_bad_start_are_rejected() {
        assert!(matches!(
            load("[board]\ncols = 0\n", CliOverrides::default()),
            Err(PathgridError::InvalidConfig(_))
        ));
        assert!(matches!(
            load(
                "[ui]\nmode = \"free\"\n[board]\nstart = { x = 16, y = 0 }\n",
                CliOverrides::default()
            ),
            Err(PathgridError::InvalidConfig(_))
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            load("[board\ncols = ", CliOverrides::default()),
            Err(PathgridError::ConfigParse(_))
        ));
    }

    #[test]
    fn huge_run_count_is_rejected_without_expanding_it() {
        let err = load("[trace]\nnotation = [\"4000000000↑\"]\n", CliOverrides::default())
            .expect_err("must fail");
        assert!(
            matches!(&err, PathgridError::InvalidConfig(message) if message.contains("step 6")),
            "{err}"
        );
    }

    #[test]
    fn trace_start_off_the_board_is_rejected() {
        let err = load(
            "[trace]\nstart = { x = 3, y = 20 }\nnotation = []\n",
            CliOverrides::default(),
        )
        .expect_err("must fail");
        assert!(matches!(err, PathgridError::InvalidConfig(message) if message.contains("trace.start")));
    }

    #[test]
    fn small_trace_board_ignores_the_unused_board_start() {
        let cfg = load(
            "[board]\ncols = 2\nrows = 2\n[trace]\nstart = { x = 0, y = 1 }\nnotation = [\"1↑1→\"]\n",
            CliOverrides::default(),
        )
        .expect("trace board");
        assert_eq!(cfg.board.start, GridPoint::new(2, 2));
        assert_eq!(cfg.expected_trace().expect("path").len(), 2);

        let err = load(
            "[ui]\nmode = \"free\"\n[board]\ncols = 2\nrows = 2\n",
            CliOverrides::default(),
        )
        .expect_err("free mode uses board.start");
        assert!(matches!(err, PathgridError::InvalidConfig(message) if message.contains("board.start")));
    }
}
