//! Freeform point-to-point drawing: move the pen, stamp anchors, and every
//! new anchor is joined to the previous one with a straight line.

use crate::recorder::attempt_move;
use crate::types::{Bounds, Direction, GridPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampOutcome {
    First(GridPoint),
    Joined { from: GridPoint, to: GridPoint },
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SketchSession {
    bounds: Bounds,
    cursor: GridPoint,
    anchors: Vec<GridPoint>,
}

impl SketchSession {
    pub fn new(start: GridPoint, bounds: Bounds) -> Self {
        Self {
            bounds,
            cursor: start,
            anchors: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn cursor(&self) -> GridPoint {
        self.cursor
    }

    pub fn anchors(&self) -> &[GridPoint] {
        &self.anchors
    }

    pub fn move_pen(&mut self, direction: Direction) -> bool {
        let (next, moved) = attempt_move(self.cursor, direction, self.bounds);
        self.cursor = next;
        moved
    }

    pub fn stamp(&mut self) -> StampOutcome {
        let here = self.cursor;
        match self.anchors.last().copied() {
            Some(last) if last == here => StampOutcome::Duplicate,
            Some(last) => {
                self.anchors.push(here);
                StampOutcome::Joined {
                    from: last,
                    to: here,
                }
            }
            None => {
                self.anchors.push(here);
                StampOutcome::First(here)
            }
        }
    }

    /// Erases the drawing; the pen stays where it is.
    pub fn clear(&mut self) -> usize {
        let erased = self.anchors.len();
        self.anchors.clear();
        erased
    }

    pub fn lines(&self) -> Vec<(GridPoint, GridPoint)> {
        self.anchors
            .windows(2)
            .map(|pair| (pair[0], pair[1]))
            .collect()
    }
}

/// Integer Bresenham walk from `from` to `to`, both ends included.
pub fn rasterize(from: GridPoint, to: GridPoint) -> Vec<GridPoint> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let mut point = from;
    let mut out = Vec::with_capacity((dx.max(-dy) + 1) as usize);

    loop {
        out.push(point);
        if point == to {
            break;
        }
        let doubled = 2 * err;
        if doubled >= dy {
            err += dy;
            point.x += sx;
        }
        if doubled <= dx {
            err += dx;
            point.y += sy;
        }
    }

    out
}
