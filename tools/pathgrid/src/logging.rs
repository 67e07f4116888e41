use crate::errors::PathgridError;
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 4096;

/// Appends one JSON object per line. A logger without a path drops events.
#[derive(Debug, Clone)]
pub struct JsonlLogger {
    pub path: Option<PathBuf>,
    pub max_payload_bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent<'a> {
    pub level: &'a str,
    pub event_type: &'a str,
    pub payload: Value,
}

impl JsonlLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }

    pub fn disabled() -> Self {
        Self {
            path: None,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }

    pub fn append(&self, event: &LogEvent<'_>) -> Result<(), PathgridError> {
        match &self.path {
            Some(path) => write_line(path, &self.encode_line(event)?),
            None => Ok(()),
        }
    }

    /// Serializes `event` as one newline-terminated JSON line with its
    /// payload cut down to `max_payload_bytes`.
    fn encode_line(&self, event: &LogEvent<'_>) -> Result<String, PathgridError> {
        let bounded = LogEvent {
            payload: truncate_json(event.payload.clone(), self.max_payload_bytes),
            ..*event
        };
        let mut line =
            serde_json::to_string(&bounded).map_err(|e| PathgridError::Io(e.to_string()))?;
        line.push('\n');
        Ok(line)
    }

    pub fn info(&self, event_type: &str, payload: Value) -> Result<(), PathgridError> {
        self.append(&LogEvent {
            level: "info",
            event_type,
            payload,
        })
    }

    pub fn debug(&self, event_type: &str, payload: Value) -> Result<(), PathgridError> {
        self.append(&LogEvent {
            level: "debug",
            event_type,
            payload,
        })
    }
}

fn write_line(path: &Path, line: &str) -> Result<(), PathgridError> {
    let io = |e: std::io::Error| PathgridError::Io(format!("{}: {e}", path.display()));
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| file.write_all(line.as_bytes()))
        .map_err(io)
}

pub fn structured_fallback_line(mode: &str, state: &str, message: &str) -> String {
    format!(
        "mode={mode} state={state} message={} ",
        message.replace('\n', "\\n")
    )
}

fn truncate_json(value: Value, max_bytes: usize) -> Value {
    let rendered = serde_json::to_string(&value).unwrap_or_default();
    if rendered.len() <= max_bytes {
        return value;
    }
    let mut cut = max_bytes.saturating_sub(3);
    while !rendered.is_char_boundary(cut) {
        cut -= 1;
    }
    Value::String(format!("{}...", &rendered[..cut]))
}
