use crate::errors::PathgridError;
use crate::hotkeys::controls_legend;
use crate::sketch::rasterize;
use crate::types::{Bounds, GridPoint, Mode};
use ratatui::backend::TestBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Terminal;

pub const CURSOR: char = '@';
pub const START: char = 'S';
pub const VISITED: char = 'o';
pub const ANCHOR: char = 'O';
pub const TARGET: char = '+';

/// Everything the renderer needs to paint one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub mode: Mode,
    pub bounds: Bounds,
    pub start: Option<GridPoint>,
    pub cursor: GridPoint,
    pub strokes: Vec<(GridPoint, GridPoint)>,
    pub anchors: Vec<GridPoint>,
    pub target: Vec<GridPoint>,
    pub status: String,
}

/// Rasterizes the board onto a doubled grid: cells sit on even coordinates
/// and the gaps between them carry the strokes.
pub fn raster_board(view: &BoardView) -> Vec<String> {
    let width = (view.bounds.cols as usize * 2).saturating_sub(1);
    let height = (view.bounds.rows as usize * 2).saturating_sub(1);
    let mut canvas = (0..height)
        .map(|y| {
            (0..width)
                .map(|x| background(x, y))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let mut plot = |point: GridPoint, glyph: char| {
        if point.x < 0 || point.y < 0 {
            return;
        }
        if let Some(cell) = canvas
            .get_mut(point.y as usize)
            .and_then(|row| row.get_mut(point.x as usize))
        {
            *cell = glyph;
        }
    };

    for point in &view.target {
        plot(doubled(*point), TARGET);
    }
    for (from, to) in &view.strokes {
        let glyph = stroke_glyph(*from, *to);
        for point in rasterize(doubled(*from), doubled(*to)) {
            plot(point, glyph);
        }
        plot(doubled(*from), VISITED);
        plot(doubled(*to), VISITED);
    }
    for anchor in &view.anchors {
        plot(doubled(*anchor), ANCHOR);
    }
    if let Some(start) = view.start {
        plot(doubled(start), START);
    }
    plot(doubled(view.cursor), CURSOR);

    canvas
        .into_iter()
        .map(|row| row.into_iter().collect())
        .collect()
}

fn background(x: usize, y: usize) -> char {
    if x % 2 == 1 || y % 2 == 1 {
        ' '
    } else if (x / 2 + y / 2) % 2 == 1 {
        ':'
    } else {
        '.'
    }
}

fn doubled(point: GridPoint) -> GridPoint {
    GridPoint::new(point.x.saturating_mul(2), point.y.saturating_mul(2))
}

fn stroke_glyph(from: GridPoint, to: GridPoint) -> char {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dy == 0 {
        '-'
    } else if dx == 0 {
        '|'
    } else if (dx > 0) == (dy > 0) {
        '\\'
    } else {
        '/'
    }
}

pub fn render_screen(view: &BoardView, width: u16, height: u16) -> Result<String, PathgridError> {
    let backend = TestBackend::new(width, height);
    let mut terminal =
        Terminal::new(backend).map_err(|e| PathgridError::Terminal(e.to_string()))?;
    let board = raster_board(view);

    terminal
        .draw(|frame| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(4),
                    Constraint::Min(3),
                    Constraint::Length(1),
                ])
                .split(frame.area());

            let header = Paragraph::new(vec![
                Line::from(vec![
                    Span::styled(
                        " PATHGRID ",
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(format!(
                        " mode={} cursor=({}, {}) board={}x{}",
                        view.mode.as_str(),
                        view.cursor.x,
                        view.cursor.y,
                        view.bounds.cols,
                        view.bounds.rows
                    )),
                ]),
                Line::from(Span::styled(
                    view.status.clone(),
                    Style::default().fg(Color::Green),
                )),
            ])
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Status"));
            frame.render_widget(header, chunks[0]);

            let lines = board
                .iter()
                .map(|row| Line::from(row.clone()))
                .collect::<Vec<_>>();
            frame.render_widget(
                Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Board")),
                chunks[1],
            );

            frame.render_widget(
                Paragraph::new(controls_legend(view.mode))
                    .style(Style::default().fg(Color::DarkGray)),
                chunks[2],
            );
        })
        .map_err(|e| PathgridError::Terminal(e.to_string()))?;

    let buffer = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..height {
        for x in 0..width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{raster_board, render_screen, BoardView};
    use crate::types::{Bounds, GridPoint, Mode};

    fn view() -> BoardView {
        BoardView {
            mode: Mode::Free,
            bounds: Bounds::new(3, 2),
            start: Some(GridPoint::new(0, 0)),
            cursor: GridPoint::new(1, 1),
            strokes: vec![
                (GridPoint::new(0, 0), GridPoint::new(1, 0)),
                (GridPoint::new(1, 0), GridPoint::new(1, 1)),
            ],
            anchors: Vec::new(),
            target: Vec::new(),
            status: String::new(),
        }
    }

    #[test]
    fn raster_draws_strokes_between_cells() {
        let rows = raster_board(&view());
        assert_eq!(rows, vec!["S-o .", "  |  ", ": @ :"]);
    }

    #[test]
    fn cursor_wins_over_target_and_start() {
        let mut view = view();
        view.strokes.clear();
        view.cursor = GridPoint::new(0, 0);
        view.target = vec![GridPoint::new(2, 1), GridPoint::new(0, 0)];
        let rows = raster_board(&view);
        assert_eq!(rows[0].chars().next(), Some('@'));
        assert_eq!(rows[2].chars().nth(4), Some('+'));
    }

    #[test]
    fn diagonal_sketch_lines_use_slashes() {
        let mut view = view();
        view.mode = Mode::Sketch;
        view.start = None;
        view.cursor = GridPoint::new(2, 1);
        view.strokes = vec![(GridPoint::new(0, 0), GridPoint::new(1, 1))];
        view.anchors = vec![GridPoint::new(0, 0), GridPoint::new(1, 1)];
        let rows = raster_board(&view);
        assert_eq!(rows[0].chars().next(), Some('O'));
        assert_eq!(rows[1].chars().nth(1), Some('\\'));
        assert_eq!(rows[2].chars().nth(2), Some('O'));
    }

    #[test]
    fn screen_contains_header_board_and_legend() {
        let mut view = view();
        view.mode = Mode::Trace;
        view.status = "Path complete!".to_string();
        let frame = render_screen(&view, 60, 14).expect("render");
        assert!(frame.contains("PATHGRID"));
        assert!(frame.contains("mode=trace"));
        assert!(frame.contains("Path complete!"));
        assert!(frame.contains("Board"));
        assert!(frame.contains("S-o"));
        assert!(frame.contains("r reset"));
        assert_eq!(frame.lines().count(), 14);
    }
}
