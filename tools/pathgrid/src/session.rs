use crate::config::AppConfig;
use crate::errors::PathgridError;
use crate::facts::FactDeck;
use crate::hotkeys::{action_for_key, Action};
use crate::logging::JsonlLogger;
use crate::notation::encode;
use crate::recorder::{MoveOutcome, PathSession};
use crate::runtime::{KeySource, Terminal};
use crate::sketch::{SketchSession, StampOutcome};
use crate::tui::{render_screen, BoardView};
use crate::types::{Direction, Mode};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

pub const COMPLETE_MESSAGE: &str = "Path complete!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Continue,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Board {
    Path(PathSession),
    Sketch(SketchSession),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub mode: Mode,
    pub moves: usize,
    pub blocked: usize,
    pub visited: usize,
    pub anchors: usize,
    pub complete: bool,
}

pub struct Session {
    mode: Mode,
    board: Board,
    facts: FactDeck,
    rng: StdRng,
    status: String,
    moves: usize,
    blocked: usize,
}

impl Session {
    pub fn from_config(cfg: &AppConfig) -> Result<Self, PathgridError> {
        Self::with_rng(cfg, StdRng::from_os_rng())
    }

    pub fn with_rng(cfg: &AppConfig, rng: StdRng) -> Result<Self, PathgridError> {
        let mode = cfg.ui.mode;
        let board = match mode {
            Mode::Free => Board::Path(PathSession::free(cfg.board.start, cfg.bounds())),
            Mode::Trace => Board::Path(PathSession::tracing(
                cfg.trace.start,
                cfg.bounds(),
                cfg.expected_trace()?,
            )),
            Mode::Sketch => Board::Sketch(SketchSession::new(cfg.board.start, cfg.bounds())),
        };
        let mut session = Self {
            mode,
            board,
            facts: FactDeck::new(cfg.sketch.facts.clone()),
            rng,
            status: String::new(),
            moves: 0,
            blocked: 0,
        };
        if mode == Mode::Sketch {
            session.status = session.facts.draw(&mut session.rng).to_string();
        } else {
            session.refresh_completion();
        }
        Ok(session)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_complete(&self) -> bool {
        match &self.board {
            Board::Path(path) => path.is_complete(),
            Board::Sketch(_) => false,
        }
    }

    pub fn summary(&self) -> SessionSummary {
        let (visited, anchors) = match &self.board {
            Board::Path(path) => (path.visited().len(), 0),
            Board::Sketch(sketch) => (0, sketch.anchors().len()),
        };
        SessionSummary {
            mode: self.mode,
            moves: self.moves,
            blocked: self.blocked,
            visited,
            anchors,
            complete: self.is_complete(),
        }
    }

    pub fn view(&self) -> BoardView {
        match &self.board {
            Board::Path(path) => BoardView {
                mode: self.mode,
                bounds: path.bounds(),
                start: Some(path.start()),
                cursor: path.cursor(),
                strokes: path.segments(),
                anchors: Vec::new(),
                target: path.expected().map(<[_]>::to_vec).unwrap_or_default(),
                status: self.status.clone(),
            },
            Board::Sketch(sketch) => BoardView {
                mode: self.mode,
                bounds: sketch.bounds(),
                start: None,
                cursor: sketch.cursor(),
                strokes: sketch.lines(),
                anchors: sketch.anchors().to_vec(),
                target: Vec::new(),
                status: self.status.clone(),
            },
        }
    }

    pub fn log_start(&self, logger: &JsonlLogger) -> Result<(), PathgridError> {
        let view = self.view();
        let expected = match &self.board {
            Board::Path(path) => path.expected().map(<[_]>::len),
            Board::Sketch(_) => None,
        };
        logger.info(
            "session_start",
            json!({
                "mode": self.mode.as_str(),
                "cols": view.bounds.cols,
                "rows": view.bounds.rows,
                "cursor": view.cursor,
                "expected_len": expected,
            }),
        )
    }

    pub fn dispatch(
        &mut self,
        action: Action,
        logger: &JsonlLogger,
    ) -> Result<Dispatch, PathgridError> {
        match action {
            Action::Quit => return Ok(Dispatch::Quit),
            Action::Move(direction) => self.apply_move(direction, logger)?,
            Action::Reset => {
                if let Board::Path(path) = &mut self.board {
                    path.reset();
                    logger.info("reset", json!({ "cursor": path.cursor() }))?;
                    self.refresh_completion();
                }
            }
            Action::Stamp => {
                if let Board::Sketch(sketch) = &mut self.board {
                    match sketch.stamp() {
                        StampOutcome::First(at) => {
                            logger.info("stamp", json!({ "at": at }))?;
                        }
                        StampOutcome::Joined { from, to } => {
                            logger.info("stamp", json!({ "from": from, "at": to }))?;
                        }
                        StampOutcome::Duplicate => {}
                    }
                }
            }
            Action::Clear => {
                if let Board::Sketch(sketch) = &mut self.board {
                    let erased = sketch.clear();
                    self.status = self.facts.draw(&mut self.rng).to_string();
                    logger.info("clear", json!({ "erased": erased, "fact": self.status }))?;
                }
            }
        }
        Ok(Dispatch::Continue)
    }

    fn apply_move(&mut self, direction: Direction, logger: &JsonlLogger) -> Result<(), PathgridError> {
        self.moves += 1;
        let moved = match &mut self.board {
            Board::Path(path) => match path.apply(direction) {
                MoveOutcome::Blocked => false,
                MoveOutcome::Moved { from, to, complete } => {
                    logger.debug(
                        "move",
                        json!({ "direction": direction.as_str(), "from": from, "to": to }),
                    )?;
                    if complete {
                        logger.info("complete", json!({ "steps": path.visited().len() }))?;
                    }
                    true
                }
            },
            Board::Sketch(sketch) => {
                let moved = sketch.move_pen(direction);
                if moved {
                    logger.debug(
                        "move",
                        json!({ "direction": direction.as_str(), "to": sketch.cursor() }),
                    )?;
                }
                moved
            }
        };
        if !moved {
            self.blocked += 1;
            logger.debug("blocked", json!({ "direction": direction.as_str() }))?;
        }
        self.refresh_completion();
        Ok(())
    }

    fn refresh_completion(&mut self) {
        if self.mode != Mode::Trace {
            return;
        }
        self.status = if self.is_complete() {
            COMPLETE_MESSAGE.to_string()
        } else {
            String::new()
        };
    }

    /// Target drawing in run-token notation, if this session has one.
    pub fn expected_notation(&self) -> Option<String> {
        let Board::Path(path) = &self.board else {
            return None;
        };
        let expected = path.expected()?;
        let mut steps = Vec::with_capacity(expected.len());
        let mut previous = path.start();
        for point in expected {
            let step = Direction::ALL
                .into_iter()
                .find(|direction| previous.offset(*direction) == *point)?;
            steps.push(step);
            previous = *point;
        }
        Some(encode(&steps))
    }
}

pub fn run_script(
    session: &mut Session,
    actions: impl IntoIterator<Item = Action>,
    logger: &JsonlLogger,
) -> Result<SessionSummary, PathgridError> {
    session.log_start(logger)?;
    for action in actions {
        if session.dispatch(action, logger)? == Dispatch::Quit {
            break;
        }
    }
    finish(session, logger)
}

pub fn run_interactive(
    session: &mut Session,
    terminal: &dyn Terminal,
    keys: &mut dyn KeySource,
    logger: &JsonlLogger,
) -> Result<SessionSummary, PathgridError> {
    session.log_start(logger)?;
    loop {
        let (width, height) = terminal.size();
        terminal.draw(&render_screen(&session.view(), width, height)?)?;
        let Some(key) = keys.next_key()? else {
            break;
        };
        let Some(action) = action_for_key(key, session.mode()) else {
            continue;
        };
        if session.dispatch(action, logger)? == Dispatch::Quit {
            break;
        }
    }
    finish(session, logger)
}

fn finish(session: &Session, logger: &JsonlLogger) -> Result<SessionSummary, PathgridError> {
    let summary = session.summary();
    logger.info(
        "session_end",
        json!({
            "mode": summary.mode.as_str(),
            "moves": summary.moves,
            "blocked": summary.blocked,
            "complete": summary.complete,
        }),
    )?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::{run_interactive, run_script, Board, Session, COMPLETE_MESSAGE};
    use crate::config::AppConfig;
    use crate::hotkeys::{parse_script, Action, Key};
    use crate::logging::JsonlLogger;
    use crate::runtime::{FakeTerminal, ScriptedKeys};
    use crate::types::{Direction, GridPoint, Mode};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session(mode: Mode) -> Session {
        let mut cfg = AppConfig::default();
        cfg.ui.mode = mode;
        cfg.trace.notation = vec!["2↑2→".to_string()];
        Session::with_rng(&cfg, StdRng::seed_from_u64(3)).expect("session")
    }

    #[test]
    fn trace_status_follows_completion() {
        let mut session = session(Mode::Trace);
        let logger = JsonlLogger::disabled();
        assert_eq!(session.status(), "");
        for action in parse_script("2↑2→") {
            session.dispatch(action, &logger).expect("dispatch");
        }
        assert_eq!(session.status(), COMPLETE_MESSAGE);
        session
            .dispatch(Action::Move(Direction::Down), &logger)
            .expect("dispatch");
        assert_eq!(session.status(), "");
        session.dispatch(Action::Reset, &logger).expect("reset");
        assert_eq!(session.status(), "");
        assert_eq!(session.view().cursor, GridPoint::new(2, 5));
    }

    #[test]
    fn blocked_moves_are_counted_but_not_visited() {
        let mut cfg = AppConfig::default();
        cfg.ui.mode = Mode::Free;
        cfg.board.start = GridPoint::new(0, 0);
        let mut session = Session::with_rng(&cfg, StdRng::seed_from_u64(0)).expect("session");
        let summary = run_script(
            &mut session,
            parse_script("1↑ 1← 1→"),
            &JsonlLogger::disabled(),
        )
        .expect("run");
        assert_eq!(summary.moves, 3);
        assert_eq!(summary.blocked, 2);
        assert_eq!(summary.visited, 1);
        assert!(!summary.complete);
    }

    #[test]
    fn long_replay_runs_are_streamed_into_the_session() {
        let mut cfg = AppConfig::default();
        cfg.ui.mode = Mode::Free;
        let mut session = Session::with_rng(&cfg, StdRng::seed_from_u64(0)).expect("session");
        let summary = run_script(&mut session, parse_script("100000→"), &JsonlLogger::disabled())
            .expect("run");
        let open = (cfg.board.cols as i32 - 1 - cfg.board.start.x) as usize;
        assert_eq!(summary.moves, 100_000);
        assert_eq!(summary.blocked, 100_000 - open);
        assert_eq!(summary.visited, open);
    }

    #[test]
    fn trace_target_leaving_the_board_fails_session_setup() {
        let mut cfg = AppConfig::default();
        cfg.trace.notation = vec!["4000000000↑".to_string()];
        assert!(Session::with_rng(&cfg, StdRng::seed_from_u64(0)).is_err());
    }

    #[test]
    fn sketch_shows_a_fact_and_redraws_it_on_clear() {
        let mut session = session(Mode::Sketch);
        let logger = JsonlLogger::disabled();
        let first = session.status().to_string();
        assert!(!first.is_empty());
        run_script(
            &mut session,
            parse_script("stamp 3→ stamp 2↓ stamp"),
            &logger,
        )
        .expect("run");
        match session.board() {
            Board::Sketch(sketch) => assert_eq!(sketch.lines().len(), 2),
            Board::Path(_) => panic!("expected sketch board"),
        }
        session.dispatch(Action::Clear, &logger).expect("clear");
        assert_ne!(session.status(), first);
        assert_eq!(session.summary().anchors, 0);
    }

    #[test]
    fn path_only_actions_are_ignored_in_sketch_and_vice_versa() {
        let logger = JsonlLogger::disabled();
        let mut sketch = session(Mode::Sketch);
        sketch.dispatch(Action::Reset, &logger).expect("reset");
        let mut trace = session(Mode::Trace);
        trace.dispatch(Action::Stamp, &logger).expect("stamp");
        trace.dispatch(Action::Clear, &logger).expect("clear");
        assert_eq!(trace.summary().visited, 0);
    }

    #[test]
    fn interactive_loop_draws_each_state_and_stops_on_quit() {
        let terminal = FakeTerminal::new(true);
        let mut keys = ScriptedKeys::new([
            Key::Up,
            Key::Char('x'),
            Key::Up,
            Key::Right,
            Key::Right,
            Key::Char('q'),
            Key::Down,
        ]);
        let mut session = session(Mode::Trace);
        let summary = run_interactive(&mut session, &terminal, &mut keys, &JsonlLogger::disabled())
            .expect("run");
        assert!(summary.complete);
        assert_eq!(summary.moves, 4);
        let frames = terminal.drawn_frames();
        assert_eq!(frames.len(), 6);
        assert!(frames.last().is_some_and(|frame| frame.contains(COMPLETE_MESSAGE)));
    }

    #[test]
    fn expected_notation_round_trips_the_target() {
        assert_eq!(session(Mode::Trace).expected_notation().as_deref(), Some("2↑2→"));
        assert_eq!(session(Mode::Free).expected_notation(), None);
    }

    #[test]
    fn session_events_are_logged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.jsonl");
        let logger = JsonlLogger::new(&path);
        let mut session = session(Mode::Trace);
        run_script(&mut session, parse_script("2↑2→ reset 1←"), &logger).expect("run");
        let text = std::fs::read_to_string(&path).expect("read");
        for event in ["session_start", "move", "complete", "reset", "session_end"] {
            assert!(
                text.contains(&format!("\"event_type\":\"{event}\"")),
                "missing {event}: {text}"
            );
        }
    }
}
