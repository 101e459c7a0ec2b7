// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

/// Style currently active on the terminal, to skip redundant escapes.
#[derive(Default)]
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    pos: Option<(u16, u16)>,
}

pub struct Terminal {
    stdout: Stdout,
    shown: Option<(u16, u16)>,
    run: String,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()
        })();
        if let Err(e) = init {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            shown: None,
            run: String::with_capacity(64),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    fn pen_to(&mut self, pen: &mut Pen, cell: &Cell) -> Result<()> {
        if cell.fg != pen.fg {
            self.stdout
                .queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            pen.fg = cell.fg;
        }
        if cell.bg != pen.bg {
            self.stdout
                .queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            pen.bg = cell.bg;
        }
        if cell.bold != pen.bold {
            self.stdout.queue(SetAttribute(if cell.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            pen.bold = cell.bold;
        }
        Ok(())
    }

    /// Writes the frame's pending changes. A resize or a frame marked
    /// dirty-all repaints every row; otherwise dirty cells are grouped into
    /// same-style horizontal runs.
    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let size = (frame.width, frame.height);
        let full = self.shown != Some(size) || frame.is_dirty_all();
        let mut pen = Pen::default();

        if self.shown != Some(size) {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
        }

        if full {
            for y in 0..frame.height {
                self.stdout.queue(cursor::MoveTo(0, y))?;
                for x in 0..frame.width {
                    let cell = frame.cell_at_index(y as usize * frame.width as usize + x as usize);
                    self.pen_to(&mut pen, &cell)?;
                    self.stdout.queue(Print(cell.ch))?;
                }
            }
        } else {
            let width = frame.width as usize;
            let mut dirty = frame.dirty_indices().to_vec();
            dirty.sort_unstable();

            let mut i = 0usize;
            while i < dirty.len() {
                let start = dirty[i];
                let head = frame.cell_at_index(start);
                let (x0, y0) = ((start % width) as u16, (start / width) as u16);

                self.run.clear();
                self.run.push(head.ch);
                let mut last = start;
                let mut j = i + 1;
                while j < dirty.len() {
                    let idx = dirty[j];
                    if idx != last + 1 || idx / width != start / width {
                        break;
                    }
                    let cell = frame.cell_at_index(idx);
                    if cell.fg != head.fg || cell.bg != head.bg || cell.bold != head.bold {
                        break;
                    }
                    self.run.push(cell.ch);
                    last = idx;
                    j += 1;
                }

                if pen.pos != Some((x0, y0)) {
                    self.stdout.queue(cursor::MoveTo(x0, y0))?;
                }
                self.pen_to(&mut pen, &head)?;
                self.stdout.queue(Print(self.run.as_str()))?;

                let next_x = x0.saturating_add((j - i) as u16);
                pen.pos = (next_x < frame.width).then_some((next_x, y0));
                i = j;
            }
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        self.shown = Some(size);
        frame.clear_dirty();
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore_terminal_best_effort();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
