use crate::errors::PathgridError;
use crate::hotkeys::Key;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> Result<String, PathgridError>;
    fn write_string(&self, path: &Path, contents: &str) -> Result<(), PathgridError>;
    fn exists(&self, path: &Path) -> bool;
}

pub trait Terminal: Send + Sync {
    fn stdin_is_tty(&self) -> bool;
    fn size(&self) -> (u16, u16);
    fn write_line(&self, line: &str) -> Result<(), PathgridError>;
    fn draw(&self, frame: &str) -> Result<(), PathgridError>;
}

pub trait KeySource {
    /// `Ok(None)` means the input is exhausted.
    fn next_key(&mut self) -> Result<Option<Key>, PathgridError>;
}

pub struct ProductionFileSystem;

impl FileSystem for ProductionFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, PathgridError> {
        std::fs::read_to_string(path).map_err(|e| PathgridError::Io(e.to_string()))
    }

    fn write_string(&self, path: &Path, contents: &str) -> Result<(), PathgridError> {
        std::fs::write(path, contents).map_err(|e| PathgridError::Io(e.to_string()))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

pub struct ProductionTerminal;

impl Terminal for ProductionTerminal {
    fn stdin_is_tty(&self) -> bool {
        std::io::IsTerminal::is_terminal(&std::io::stdin())
    }

    fn size(&self) -> (u16, u16) {
        terminal::size().unwrap_or((80, 32))
    }

    fn write_line(&self, line: &str) -> Result<(), PathgridError> {
        let mut out = std::io::stdout();
        writeln!(out, "{line}").map_err(|e| PathgridError::Io(e.to_string()))
    }

    fn draw(&self, frame: &str) -> Result<(), PathgridError> {
        let mut out = std::io::stdout();
        queue!(out, MoveTo(0, 0), Clear(ClearType::All))
            .map_err(|e| PathgridError::Terminal(e.to_string()))?;
        // Raw mode does not translate \n into a carriage return.
        let body = frame.trim_end_matches('\n').replace('\n', "\r\n");
        out.write_all(body.as_bytes())
            .map_err(|e| PathgridError::Io(e.to_string()))?;
        out.flush().map_err(|e| PathgridError::Io(e.to_string()))
    }
}

/// Raw mode plus the alternate screen for as long as the guard lives.
pub struct ScreenGuard;

impl ScreenGuard {
    pub fn enter() -> Result<Self, PathgridError> {
        enable_raw_mode().map_err(|e| PathgridError::Terminal(e.to_string()))?;
        execute!(std::io::stdout(), EnterAlternateScreen, Hide)
            .map_err(|e| PathgridError::Terminal(e.to_string()))?;
        Ok(Self)
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        let _ = execute!(std::io::stdout(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

pub struct CrosstermKeys;

impl KeySource for CrosstermKeys {
    fn next_key(&mut self) -> Result<Option<Key>, PathgridError> {
        loop {
            let event = event::read().map_err(|e| PathgridError::Terminal(e.to_string()))?;
            if let Event::Key(key) = event {
                if key.kind == KeyEventKind::Press {
                    return Ok(Some(map_key_event(key)));
                }
            }
        }
    }
}

pub fn map_key_event(event: KeyEvent) -> Key {
    if event.modifiers.contains(KeyModifiers::CONTROL) && event.code == KeyCode::Char('c') {
        return Key::Esc;
    }
    match event.code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Esc => Key::Esc,
        KeyCode::Enter => Key::Enter,
        KeyCode::Char(ch) => Key::Char(ch.to_ascii_lowercase()),
        _ => Key::Other,
    }
}

pub struct ProductionRuntime {
    pub file_system: Arc<dyn FileSystem>,
    pub terminal: Arc<dyn Terminal>,
}

impl ProductionRuntime {
    pub fn new() -> Self {
        Self {
            file_system: Arc::new(ProductionFileSystem),
            terminal: Arc::new(ProductionTerminal),
        }
    }
}

impl Default for ProductionRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default, Clone)]
pub struct FakeFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
}

impl FakeFileSystem {
    pub fn with_file(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        let mut map = HashMap::new();
        map.insert(path.into(), contents.into());
        Self {
            files: Arc::new(Mutex::new(map)),
        }
    }
}

impl FileSystem for FakeFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, PathgridError> {
        self.files
            .lock()
            .map_err(|_| PathgridError::Io("files lock poisoned".to_string()))?
            .get(path)
            .cloned()
            .ok_or_else(|| PathgridError::Io(format!("missing file {}", path.display())))
    }

    fn write_string(&self, path: &Path, contents: &str) -> Result<(), PathgridError> {
        self.files
            .lock()
            .map_err(|_| PathgridError::Io("files lock poisoned".to_string()))?
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files
            .lock()
            .map(|files| files.contains_key(path))
            .unwrap_or(false)
    }
}

#[derive(Clone)]
pub struct FakeTerminal {
    pub is_tty: bool,
    pub width: u16,
    pub height: u16,
    writes: Arc<Mutex<Vec<String>>>,
    draws: Arc<Mutex<Vec<String>>>,
}

impl Default for FakeTerminal {
    fn default() -> Self {
        Self::new(false)
    }
}

impl FakeTerminal {
    pub fn new(is_tty: bool) -> Self {
        Self {
            is_tty,
            width: 80,
            height: 32,
            writes: Arc::default(),
            draws: Arc::default(),
        }
    }

    pub fn written_lines(&self) -> Vec<String> {
        self.writes
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    pub fn drawn_frames(&self) -> Vec<String> {
        self.draws
            .lock()
            .map(|frames| frames.clone())
            .unwrap_or_default()
    }
}

impl Terminal for FakeTerminal {
    fn stdin_is_tty(&self) -> bool {
        self.is_tty
    }

    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn write_line(&self, line: &str) -> Result<(), PathgridError> {
        self.writes
            .lock()
            .map_err(|_| PathgridError::Io("writes lock poisoned".to_string()))?
            .push(line.to_string());
        Ok(())
    }

    fn draw(&self, frame: &str) -> Result<(), PathgridError> {
        self.draws
            .lock()
            .map_err(|_| PathgridError::Io("draw lock poisoned".to_string()))?
            .push(frame.to_string());
        Ok(())
    }
}

/// Replays a fixed list of keys, then reports end of input.
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeys {
    keys: VecDeque<Key>,
}

impl ScriptedKeys {
    pub fn new(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }
}

impl KeySource for ScriptedKeys {
    fn next_key(&mut self) -> Result<Option<Key>, PathgridError> {
        Ok(self.keys.pop_front())
    }
}
