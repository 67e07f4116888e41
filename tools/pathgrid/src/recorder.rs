use crate::types::{Bounds, Direction, GridPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Blocked,
    Moved {
        from: GridPoint,
        to: GridPoint,
        complete: bool,
    },
}

/// Moves one cell, clamped to `bounds`. Returns the cursor unchanged and
/// `false` when the clamp swallows the whole step.
pub fn attempt_move(cursor: GridPoint, direction: Direction, bounds: Bounds) -> (GridPoint, bool) {
    let candidate = bounds.clamp(cursor.offset(direction));
    if candidate == cursor {
        (cursor, false)
    } else {
        (candidate, true)
    }
}

pub fn is_complete(visited: &[GridPoint], expected: &[GridPoint]) -> bool {
    visited == expected
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSession {
    start: GridPoint,
    bounds: Bounds,
    cursor: GridPoint,
    visited: Vec<GridPoint>,
    expected: Option<Vec<GridPoint>>,
}

impl PathSession {
    /// Session without a target drawing; it never reports completion.
    pub fn free(start: GridPoint, bounds: Bounds) -> Self {
        Self {
            start,
            bounds,
            cursor: start,
            visited: Vec::new(),
            expected: None,
        }
    }

    pub fn tracing(start: GridPoint, bounds: Bounds, expected: Vec<GridPoint>) -> Self {
        Self {
            expected: Some(expected),
            ..Self::free(start, bounds)
        }
    }

    pub fn start(&self) -> GridPoint {
        self.start
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn cursor(&self) -> GridPoint {
        self.cursor
    }

    pub fn visited(&self) -> &[GridPoint] {
        &self.visited
    }

    pub fn expected(&self) -> Option<&[GridPoint]> {
        self.expected.as_deref()
    }

    pub fn apply(&mut self, direction: Direction) -> MoveOutcome {
        let from = self.cursor;
        let (to, moved) = attempt_move(from, direction, self.bounds);
        if !moved {
            return MoveOutcome::Blocked;
        }
        self.cursor = to;
        self.visited.push(to);
        MoveOutcome::Moved {
            from,
            to,
            complete: self.is_complete(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.expected
            .as_deref()
            .is_some_and(|expected| is_complete(&self.visited, expected))
    }

    pub fn reset(&mut self) {
        self.cursor = self.start;
        self.visited.clear();
    }

    /// Drawn segments, in the order they were drawn.
    pub fn segments(&self) -> Vec<(GridPoint, GridPoint)> {
        std::iter::once(self.start)
            .chain(self.visited.iter().copied())
            .zip(self.visited.iter().copied())
            .collect()
    }
}
