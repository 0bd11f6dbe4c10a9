use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

use crate::framebuffer::{HEIGHT, WIDTH};

/// Render collaborator. The core hands over the 64x32 boolean grid once per
/// tick when a redraw is owed; colors and presentation are entirely this
/// side's concern.
pub trait Display {
    /// present one frame; `cells` is row-major, `WIDTH * HEIGHT` long
    fn draw(&mut self, cells: &[bool]) -> Result<(), io::Error>;
}

// collect the coordinates of every cell in the wanted state, in the
// float/inverted-y form the TUI canvas wants
fn plane(cells: &[bool], lit: bool) -> Vec<(f64, f64)> {
    cells
        .iter()
        .enumerate()
        .filter(|(_, c)| **c == lit)
        .map(|(n, _)| ((n % WIDTH) as f64, -1.0 * (n / WIDTH) as f64))
        .collect()
}

/// monochrome display in a terminal, rendered with TUI over crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(MonoTermDisplay { terminal })
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, cells: &[bool]) -> Result<(), io::Error> {
        assert_eq!(
            cells.len(),
            WIDTH * HEIGHT,
            "MonoTermDisplay must have correct-sized data to draw"
        );

        // 1:1 between machine pixels and terminal cells, plus the border
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + WIDTH as u16, 2 + HEIGHT as u16);
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds([0.0, (WIDTH - 1) as f64])
                .y_bounds([-1.0 * (HEIGHT - 1) as f64, 0.0])
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &plane(cells, false),
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &plane(cells, true),
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines
pub struct DummyDisplay {
    pub frames: usize,
}

impl DummyDisplay {
    pub fn new() -> Self {
        DummyDisplay { frames: 0 }
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, _cells: &[bool]) -> Result<(), io::Error> {
        self.frames += 1;
        Ok(())
    }
}
