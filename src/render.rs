use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use crate::components::{Pos, Tile};
use crate::maze::Maze;

const CELL_W: usize = 2;

/// Everything a view needs to draw one turn.
pub struct Frame<'a> {
    pub maze: &'a Maze,
    pub player: Pos,
    pub level: u32,
    pub total_levels: u32,
    pub elapsed_seconds: u64,
    pub notice: Option<&'a str>,
}

pub trait Render {
    fn draw(&mut self, frame: &Frame<'_>) -> io::Result<()>;
}

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Exit,
    Gate,
    Wall,
    Empty,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

const BLANK: Cell = Cell {
    glyph: Glyph::Empty,
    color: Color::Reset,
};

/// Draws frames with crossterm, rewriting only the cells that changed.
pub struct TerminalRenderer {
    stdout: Stdout,
    last: Vec<Cell>,
    last_hud: String,
    last_notice: String,
    grid_size: (usize, usize),
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl TerminalRenderer {
    pub fn new(stdout: Stdout) -> Self {
        Self {
            stdout,
            last: Vec::new(),
            last_hud: String::new(),
            last_notice: String::new(),
            grid_size: (0, 0),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    /// Blocks until any key is pressed.
    pub fn wait_for_key(&mut self) -> io::Result<()> {
        loop {
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn resize_buffer(&mut self, rows: usize, cols: usize) -> io::Result<()> {
        if self.grid_size != (rows, cols) {
            self.grid_size = (rows, cols);
            self.last = vec![BLANK; rows * cols];
            self.stdout.queue(Clear(ClearType::All))?;
            self.needs_full = true;
        }
        Ok(())
    }

    fn draw_cell(&mut self, row: u16, col: u16, cell: Cell) -> io::Result<()> {
        let text = match cell.glyph {
            Glyph::Player => "😃",
            Glyph::Exit => "🚩",
            Glyph::Gate => "░░",
            Glyph::Wall => "██",
            Glyph::Empty => "  ",
        };
        let x_pos = self.origin_x + col * CELL_W as u16;
        let y_pos = self.origin_y + row;
        self.stdout.queue(MoveTo(x_pos, y_pos))?;
        self.stdout.queue(SetForegroundColor(cell.color))?;
        self.stdout.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        for _ in w..CELL_W {
            self.stdout.queue(Print(' '))?;
        }
        self.stdout.queue(ResetColor)?;
        Ok(())
    }
}

impl Render for TerminalRenderer {
    fn draw(&mut self, frame: &Frame<'_>) -> io::Result<()> {
        let rows = frame.maze.rows();
        let cols = frame.maze.cols();
        self.resize_buffer(rows, cols)?;

        let (term_w, term_h) = terminal::size()?;
        let Some((needed_w, needed_h)) = fit(rows, cols, term_w, term_h) else {
            self.stdout.queue(Clear(ClearType::All))?;
            self.stdout.queue(MoveTo(0, 0))?;
            self.stdout.queue(Print(format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                cols.saturating_mul(CELL_W),
                rows.saturating_add(2),
                term_w,
                term_h
            )))?;
            self.stdout.flush()?;
            self.needs_full = true;
            return Ok(());
        };

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.stdout.queue(Clear(ClearType::All))?;
            self.needs_full = true;
        }

        let hud = format!(
            "Level: {}/{}  Time: {}s  (wasd/hjkl/arrows to move, q to quit)",
            frame.level, frame.total_levels, frame.elapsed_seconds
        );
        if self.needs_full || hud != self.last_hud {
            self.stdout.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            self.stdout.queue(SetForegroundColor(Color::White))?;
            self.stdout.queue(Clear(ClearType::CurrentLine))?;
            self.stdout.queue(Print(&hud))?;
            self.stdout.queue(ResetColor)?;
            self.last_hud = hud;
        }

        // `fit` guarantees every row and column index below fits in u16.
        for row in 0..needed_h - 2 {
            for col in 0..needed_w / CELL_W as u16 {
                let cell = cell_for(frame, Pos::new(row.into(), col.into()));
                let idx = usize::from(row) * cols + usize::from(col);
                if self.needs_full || cell != self.last[idx] {
                    self.last[idx] = cell;
                    self.draw_cell(row, col, cell)?;
                }
            }
        }

        let notice = frame.notice.unwrap_or_default();
        if self.needs_full || notice != self.last_notice {
            self.stdout.queue(MoveTo(self.origin_x, self.origin_y + needed_h - 2))?;
            self.stdout.queue(Clear(ClearType::CurrentLine))?;
            self.stdout.queue(SetForegroundColor(Color::Green))?;
            self.stdout.queue(Print(notice))?;
            self.stdout.queue(ResetColor)?;
            self.last_notice = notice.to_string();
        }
        self.needs_full = false;

        self.stdout.flush()
    }
}

/// Terminal `(width, height)` a maze needs, or `None` if it does not fit the
/// terminal or cannot be expressed in terminal coordinates at all.
fn fit(rows: usize, cols: usize, term_w: u16, term_h: u16) -> Option<(u16, u16)> {
    let needed_w = u16::try_from(cols.checked_mul(CELL_W)?).ok()?;
    let needed_h = u16::try_from(rows.checked_add(2)?).ok()?;
    (needed_w <= term_w && needed_h <= term_h).then_some((needed_w, needed_h))
}

fn cell_for(frame: &Frame<'_>, pos: Pos) -> Cell {
    if pos == frame.player {
        return Cell {
            glyph: Glyph::Player,
            color: Color::Yellow,
        };
    }
    if pos == frame.maze.exit() {
        return Cell {
            glyph: Glyph::Exit,
            color: Color::Red,
        };
    }
    if Some(pos) == frame.maze.entrance() || Some(pos) == frame.maze.exit_gate() {
        return Cell {
            glyph: Glyph::Gate,
            color: Color::Green,
        };
    }
    match frame.maze.tile(pos) {
        Some(Tile::Wall) => Cell {
            glyph: Glyph::Wall,
            color: Color::Blue,
        },
        Some(Tile::Open) | None => BLANK,
    }
}
