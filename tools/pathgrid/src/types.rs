use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Unit vector in screen coordinates: y grows downward.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Self::Up => '↑',
            Self::Down => '↓',
            Self::Left => '←',
            Self::Right => '→',
        }
    }

    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '↑' => Some(Self::Up),
            '↓' => Some(Self::Down),
            '←' => Some(Self::Left),
            '→' => Some(Self::Right),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub cols: u32,
    pub rows: u32,
}

impl Bounds {
    pub const fn new(cols: u32, rows: u32) -> Self {
        Self { cols, rows }
    }

    pub fn clamp(self, point: GridPoint) -> GridPoint {
        GridPoint {
            x: clamp_axis(point.x, self.cols),
            y: clamp_axis(point.y, self.rows),
        }
    }

    pub fn contains(self, point: GridPoint) -> bool {
        point.x >= 0
            && point.y >= 0
            && (point.x as i64) < self.cols as i64
            && (point.y as i64) < self.rows as i64
    }
}

fn clamp_axis(value: i32, size: u32) -> i32 {
    let max = i32::try_from(size.saturating_sub(1)).unwrap_or(i32::MAX);
    value.clamp(0, max)
}

/// One `<count><glyph>` unit of move notation, e.g. `3↑`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRun {
    pub count: u32,
    pub direction: Direction,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Free,
    Trace,
    Sketch,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Trace => "trace",
            Self::Sketch => "sketch",
        }
    }
}
