use crate::display::FrameView;
use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

/// Screen is used by the host to show the framebuffer. It should abstract the
/// implementation details, so a variety of kinds of screen would work.
pub trait Screen {
    fn draw(&mut self, frame: FrameView) -> Result<(), io::Error>;
}

// store useful metadata about the canvas
struct Resolution(usize, usize);

impl Resolution {
    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }
}

/// canvas coordinates for every pixel in one bitplane; y grows downward on
/// the chip-8 but upward on the canvas
fn bitplane_points(frame: &FrameView, bitplane: u8) -> Vec<(f64, f64)> {
    frame
        .bitplane(bitplane)
        .map(|(x, y)| (x as f64, -1.0 * y as f64))
        .collect()
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermScreen {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl MonoTermScreen {
    pub fn new() -> Result<MonoTermScreen, io::Error> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(MonoTermScreen { terminal })
    }
}

impl Drop for MonoTermScreen {
    fn drop(&mut self) {
        // nothing useful to do if the terminal won't come back
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
    }
}

impl Screen for MonoTermScreen {
    fn draw(&mut self, frame: FrameView) -> Result<(), io::Error> {
        let resolution = Resolution(frame.width(), frame.height());
        let off = bitplane_points(&frame, 0);
        let on = bitplane_points(&frame, 1);

        // for now this assumes a 1:1 ratio between terminal cells and chip-8
        // pixels
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + resolution.0 as u16, 2 + resolution.1 as u16);

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &off,
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &on,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines; remembers the last frame
#[derive(Default)]
pub struct DummyScreen {
    pub frames: usize,
    pub last: Vec<u8>,
}

impl DummyScreen {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Screen for DummyScreen {
    fn draw(&mut self, frame: FrameView) -> Result<(), io::Error> {
        self.frames += 1;
        self.last = frame.as_bytes().to_vec();
        Ok(())
    }
}
