use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};

use crate::config::{GLYPH_FOOD, GLYPH_SNAKE_BODY, GLYPH_SNAKE_HEAD, GLYPH_SNAKE_TAIL, GridSize};
use crate::game::{Cell, GameState};
use crate::snake::Coordinate;

/// Run-level values shown next to the board.
#[derive(Debug, Clone, Copy, Default)]
pub struct HudInfo {
    pub tick: u64,
    pub game_over: bool,
}

/// Renders the full game frame from immutable state.
pub fn render(frame: &mut Frame<'_>, state: &GameState, hud: HudInfo) {
    let [header_area, play_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(frame.area());

    frame.render_widget(Paragraph::new(header_line(state, hud)), header_area);

    let block = Block::bordered()
        .title(" snake ")
        .border_style(Style::new().fg(Color::DarkGray));
    let inner = block.inner(play_area);
    frame.render_widget(block, play_area);

    render_cells(frame, inner, state);

    if hud.game_over {
        render_game_over(frame, play_area, state.score());
    }
}

fn header_line(state: &GameState, hud: HudInfo) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("Score: {}", state.score()),
            Style::new().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Frame: {}", hud.tick),
            Style::new().fg(Color::DarkGray),
        ),
    ])
}

fn render_cells(frame: &mut Frame<'_>, inner: Rect, state: &GameState) {
    let grid = state.grid();
    let head = state.snake().head();
    let tail = state.snake().tail();
    let buffer = frame.buffer_mut();

    for row in 0..i32::from(grid.rows) {
        for col in 0..i32::from(grid.cols) {
            let cell = Coordinate::new(row, col);
            let Some((x, y)) = logical_to_terminal(inner, grid, cell) else {
                continue;
            };

            match state.cell_at(row, col) {
                Cell::Food => {
                    buffer.set_string(x, y, GLYPH_FOOD, Style::new().fg(Color::Red));
                }
                Cell::Tail if cell == head => {
                    buffer.set_string(
                        x,
                        y,
                        GLYPH_SNAKE_HEAD,
                        Style::new().fg(Color::White).add_modifier(Modifier::BOLD),
                    );
                }
                Cell::Tail if cell == tail => {
                    buffer.set_string(x, y, GLYPH_SNAKE_TAIL, Style::new().fg(Color::DarkGray));
                }
                Cell::Tail => {
                    buffer.set_string(x, y, GLYPH_SNAKE_BODY, Style::new().fg(Color::Green));
                }
                Cell::Empty => {}
            }
        }
    }
}

fn render_game_over(frame: &mut Frame<'_>, area: Rect, score: u32) {
    let popup = centered_popup(area, 24, 5);
    frame.render_widget(Clear, popup);

    let lines = vec![
        Line::from("GAME OVER"),
        Line::from(format!("Score: {score}")),
        Line::from("[Q] Quit"),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::bordered()),
        popup,
    );
}

fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);

    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn logical_to_terminal(inner: Rect, grid: GridSize, cell: Coordinate) -> Option<(u16, u16)> {
    if !cell.is_within_bounds(grid) {
        return None;
    }

    let x = inner.x.saturating_add(u16::try_from(cell.col).ok()?);
    let y = inner.y.saturating_add(u16::try_from(cell.row).ok()?);
    if x >= inner.right() || y >= inner.bottom() {
        return None;
    }

    Some((x, y))
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use crate::config::{
        EngineConfig, GLYPH_FOOD, GLYPH_SNAKE_BODY, GLYPH_SNAKE_HEAD, GLYPH_SNAKE_TAIL,
    };
    use crate::game::GameState;
    use crate::snake::{Coordinate, Snake};

    use super::{HudInfo, render};

    fn small_state() -> GameState {
        let config = EngineConfig::with_grid(4, 6);
        let mut state = GameState::new(&config, Snake::starting(config.grid()));
        state.set_food(Some(Coordinate::new(0, 1)));
        state
    }

    fn draw(state: &GameState, hud: HudInfo) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(30, 12)).expect("test backend");
        terminal
            .draw(|frame| render(frame, state, hud))
            .expect("draw succeeds");
        terminal
    }

    #[test]
    fn cells_are_drawn_inside_the_border() {
        let state = small_state();
        let terminal = draw(&state, HudInfo::default());
        let buffer = terminal.backend().buffer();

        // Header row, then the border: the grid starts at (1, 2).
        // Snake starts at rows 1..=3 of column 3.
        assert_eq!(buffer[(2, 2)].symbol(), GLYPH_FOOD);
        assert_eq!(buffer[(4, 3)].symbol(), GLYPH_SNAKE_HEAD);
        assert_eq!(buffer[(4, 4)].symbol(), GLYPH_SNAKE_BODY);
        assert_eq!(buffer[(1, 2)].symbol(), " ");
    }

    #[test]
    fn tail_segment_gets_its_own_glyph() {
        let state = small_state();
        let terminal = draw(&state, HudInfo::default());
        let buffer = terminal.backend().buffer();

        assert_eq!(state.snake().tail(), Coordinate::new(3, 3));
        assert_eq!(buffer[(4, 5)].symbol(), GLYPH_SNAKE_TAIL);
    }

    #[test]
    fn header_shows_score_and_frame() {
        let state = small_state();
        let terminal = draw(
            &state,
            HudInfo {
                tick: 7,
                game_over: false,
            },
        );
        let buffer = terminal.backend().buffer();

        let header: String = (0..buffer.area.width)
            .map(|x| buffer[(x, 0)].symbol().to_owned())
            .collect();
        assert!(header.starts_with("Score: 0  Frame: 7"));
    }
}
