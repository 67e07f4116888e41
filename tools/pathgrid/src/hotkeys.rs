use crate::notation::tokenize;
use crate::types::{Direction, Mode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Esc,
    Enter,
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(Direction),
    Reset,
    Stamp,
    Clear,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyBinding {
    pub key: &'static str,
    pub action: &'static str,
}

pub const MOVE_BINDINGS: [HotkeyBinding; 1] = [HotkeyBinding {
    key: "arrows",
    action: "move",
}];

pub const PATH_BINDINGS: [HotkeyBinding; 2] = [
    HotkeyBinding {
        key: "r",
        action: "reset",
    },
    HotkeyBinding {
        key: "q",
        action: "quit",
    },
];

pub const SKETCH_BINDINGS: [HotkeyBinding; 3] = [
    HotkeyBinding {
        key: "s",
        action: "stamp",
    },
    HotkeyBinding {
        key: "c",
        action: "clear",
    },
    HotkeyBinding {
        key: "q",
        action: "quit",
    },
];

pub fn bindings_for_mode(mode: Mode) -> Vec<HotkeyBinding> {
    let mut bindings = MOVE_BINDINGS.to_vec();
    match mode {
        Mode::Free | Mode::Trace => bindings.extend(PATH_BINDINGS),
        Mode::Sketch => bindings.extend(SKETCH_BINDINGS),
    }
    bindings
}

pub fn controls_legend(mode: Mode) -> String {
    let parts = bindings_for_mode(mode)
        .iter()
        .map(|binding| format!("{} {}", binding.key, binding.action))
        .collect::<Vec<_>>();
    format!("Keys: {}", parts.join("  "))
}

pub fn action_for_key(key: Key, mode: Mode) -> Option<Action> {
    let sketch = mode == Mode::Sketch;
    match key {
        Key::Up => Some(Action::Move(Direction::Up)),
        Key::Down => Some(Action::Move(Direction::Down)),
        Key::Left => Some(Action::Move(Direction::Left)),
        Key::Right => Some(Action::Move(Direction::Right)),
        Key::Esc | Key::Char('q') => Some(Action::Quit),
        Key::Char('r') if !sketch => Some(Action::Reset),
        Key::Char('s') | Key::Char(' ') | Key::Enter if sketch => Some(Action::Stamp),
        Key::Char('c') if sketch => Some(Action::Clear),
        _ => None,
    }
}

/// Parses a headless replay script: words separated by whitespace or
/// commas, each either `reset`, `stamp`, `clear`, `quit`, or move notation
/// such as `2↑3→`. Unknown words contribute nothing. Runs are expanded
/// one step at a time as the iterator is consumed.
pub fn parse_script(script: &str) -> impl Iterator<Item = Action> + '_ {
    script
        .split(|ch: char| ch.is_whitespace() || ch == ',')
        .filter(|word| !word.is_empty())
        .flat_map(|word| {
            let keyword = match word.to_ascii_lowercase().as_str() {
                "reset" => Some(Action::Reset),
                "stamp" => Some(Action::Stamp),
                "clear" => Some(Action::Clear),
                "quit" => Some(Action::Quit),
                _ => None,
            };
            let runs = match keyword {
                Some(_) => Vec::new(),
                None => tokenize(word),
            };
            keyword.into_iter().chain(runs.into_iter().flat_map(|run| {
                std::iter::repeat(Action::Move(run.direction)).take(run.count as usize)
            }))
        })
}
