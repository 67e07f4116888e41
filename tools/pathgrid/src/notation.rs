//! Compact directional-run notation, e.g. `2↑2→1↑1→`.
//!
//! Each run is a positive count followed by one of `↑ ↓ ← →`. Anything that
//! does not form a complete run is skipped, so hand-written notation with
//! spaces, separators or typos still decodes to the runs it does contain.

use crate::types::{Bounds, Direction, GridPoint, MoveRun};

pub fn tokenize(text: &str) -> Vec<MoveRun> {
    let mut runs = Vec::new();
    // None: no pending digits. Some(None): digits overflowed u32.
    let mut pending: Option<Option<u32>> = None;

    for ch in text.chars() {
        if let Some(digit) = ch.to_digit(10) {
            let next = match pending {
                None => Some(digit),
                Some(Some(count)) => count
                    .checked_mul(10)
                    .and_then(|count| count.checked_add(digit)),
                Some(None) => None,
            };
            pending = Some(next);
            continue;
        }

        if let (Some(Some(count)), Some(direction)) = (pending, Direction::from_glyph(ch)) {
            if count > 0 {
                runs.push(MoveRun { count, direction });
            }
        }
        pending = None;
    }

    runs
}

/// Lazily expands every run in `notation` into single steps.
pub fn steps<S: AsRef<str>>(notation: &[S]) -> impl Iterator<Item = Direction> + '_ {
    notation
        .iter()
        .flat_map(|text| tokenize(text.as_ref()))
        .flat_map(|run| std::iter::repeat(run.direction).take(run.count as usize))
}

pub fn decode<S: AsRef<str>>(notation: &[S]) -> Vec<Direction> {
    steps(notation).collect()
}

/// Running sum of `steps` from `start`, unclamped. `start` is not yielded.
pub fn walk<I>(start: GridPoint, steps: I) -> impl Iterator<Item = GridPoint>
where
    I: IntoIterator<Item = Direction>,
{
    steps.into_iter().scan(start, |point, direction| {
        *point = point.offset(direction);
        Some(*point)
    })
}

/// Walks `steps` from `start` without clamping. `start` itself is not part
/// of the returned path.
pub fn integrate(start: GridPoint, steps: &[Direction]) -> Vec<GridPoint> {
    walk(start, steps.iter().copied()).collect()
}

pub fn expected_path<S: AsRef<str>>(start: GridPoint, notation: &[S]) -> Vec<GridPoint> {
    walk(start, steps(notation)).collect()
}

/// First point of a walk that falls outside the board, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffBoard {
    pub step: usize,
    pub point: GridPoint,
}

/// Like `expected_path`, but stops at the first step that leaves `bounds`,
/// so a huge run count costs no more than the board is wide.
pub fn bounded_path<S: AsRef<str>>(
    start: GridPoint,
    notation: &[S],
    bounds: Bounds,
) -> Result<Vec<GridPoint>, OffBoard> {
    let mut path = Vec::new();
    for (index, point) in walk(start, steps(notation)).enumerate() {
        if !bounds.contains(point) {
            return Err(OffBoard {
                step: index + 1,
                point,
            });
        }
        path.push(point);
    }
    Ok(path)
}

pub fn encode(steps: &[Direction]) -> String {
    let mut out = String::new();
    let mut iter = steps.iter().peekable();
    while let Some(direction) = iter.next() {
        let mut count = 1u32;
        while iter.peek() == Some(&direction) {
            iter.next();
            count += 1;
        }
        out.push_str(&count.to_string());
        out.push(direction.glyph());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{bounded_path, decode, encode, expected_path, integrate, steps, tokenize, OffBoard};
    use crate::types::{Bounds, Direction, GridPoint, MoveRun};

    #[test]
    fn tokenize_reads_runs_in_order() {
        assert_eq!(
            tokenize("2↑10→"),
            vec![
                MoveRun {
                    count: 2,
                    direction: Direction::Up
                },
                MoveRun {
                    count: 10,
                    direction: Direction::Right
                },
            ]
        );
    }

    #[test]
    fn tokenize_skips_fragments_that_are_not_complete_runs() {
        let runs = tokenize("↑ 3 ↓ 0← 2x→ 4← ??");
        assert_eq!(
            runs,
            vec![MoveRun {
                count: 4,
                direction: Direction::Left
            }]
        );
    }

    #[test]
    fn tokenize_drops_counts_that_overflow() {
        assert!(tokenize("99999999999↑").is_empty());
        assert_eq!(tokenize("99999999999↑1↓").len(), 1);
    }

    #[test]
    fn decode_concatenates_across_strings() {
        let steps = decode(&["1↑", "", "2←"]);
        assert_eq!(steps, vec![Direction::Up, Direction::Left, Direction::Left]);
    }

    #[test]
    fn empty_notation_decodes_to_empty_path() {
        let empty: [&str; 0] = [];
        assert!(decode(&empty).is_empty());
        assert!(decode(&[""]).is_empty());
        assert!(integrate(GridPoint::new(2, 5), &[]).is_empty());
    }

    #[test]
    fn two_up_two_right_from_two_five() {
        let steps = decode(&["2↑2→"]);
        assert_eq!(
            steps,
            vec![Direction::Up, Direction::Up, Direction::Right, Direction::Right]
        );
        assert_eq!(
            integrate(GridPoint::new(2, 5), &steps),
            vec![
                GridPoint::new(2, 4),
                GridPoint::new(2, 3),
                GridPoint::new(3, 3),
                GridPoint::new(4, 3),
            ]
        );
    }

    #[test]
    fn path_length_is_the_sum_of_run_counts() {
        for notation in ["3↑", "1↓1↓1↓", "2↑2→1↑1→ 5←", "12→3↓7↑"] {
            let total: u32 = tokenize(notation).iter().map(|run| run.count).sum();
            let path = expected_path(GridPoint::new(0, 0), &[notation]);
            assert_eq!(path.len(), total as usize, "{notation}");
        }
    }

    #[test]
    fn encode_compresses_repeated_steps() {
        let steps = decode(&["2↑ 1↑ 3→ 1↓"]);
        assert_eq!(encode(&steps), "3↑3→1↓");
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn steps_are_lazy_for_huge_counts() {
        let mut iter = steps(&["4000000000↑"]);
        assert_eq!(iter.next(), Some(Direction::Up));
        assert_eq!(iter.nth(10), Some(Direction::Up));
    }

    #[test]
    fn bounded_path_stops_at_the_first_off_board_step() {
        let bounds = Bounds::new(16, 12);
        assert_eq!(
            bounded_path(GridPoint::new(2, 2), &["4000000000↑"], bounds),
            Err(OffBoard {
                step: 3,
                point: GridPoint::new(2, -1),
            })
        );
        assert_eq!(
            bounded_path(GridPoint::new(2, 5), &["2↑2→"], bounds),
            Ok(expected_path(GridPoint::new(2, 5), &["2↑2→"]))
        );
    }
}
