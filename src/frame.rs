// Copyright (c) 2026 rezky_nightky

use crate::canvas::Canvas;
use crate::cell::Cell;
use crate::palette::Palette;

/// Screen buffer mirrored to the terminal. Only cells whose resolved value
/// changes between presents are queued for output.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

impl Frame {
    pub fn new(width: u16, height: u16, bg: Option<crossterm::style::Color>) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::blank_with_bg(bg); len],
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_all = false;
            self.dirty_map.fill(false);
            self.dirty.clear();
            return;
        }

        for &i in &self.dirty {
            if let Some(v) = self.dirty_map.get_mut(i) {
                *v = false;
            }
        }
        self.dirty.clear();
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        self.cells[i]
    }

    #[cfg(test)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y as usize * self.width as usize + x as usize)
    }

    fn set_index(&mut self, i: usize, cell: Cell) {
        if self.cells[i] == cell {
            return;
        }
        self.cells[i] = cell;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }

    /// Resolves a composed canvas through the palette into this buffer.
    pub fn present(&mut self, canvas: &Canvas, palette: &Palette) {
        if canvas.width != self.width || canvas.height != self.height {
            *self = Frame::new(canvas.width, canvas.height, palette.bg);
        }
        for i in 0..self.cells.len() {
            let cell = palette.resolve(canvas.ink_at_index(i));
            self.set_index(i, cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Ink;
    use crate::palette::build_palette;
    use crate::runtime::{ColorMode, Theme};

    #[test]
    fn present_marks_only_changed_cells() {
        let palette = build_palette(Theme::Cyber, ColorMode::TrueColor, false);
        let mut frame = Frame::new(4, 2, palette.bg);
        let mut canvas = Canvas::new(4, 2);

        frame.present(&canvas, &palette);
        frame.clear_dirty();
        assert!(frame.dirty_indices().is_empty());

        canvas.plot(2, 1, Ink::new('x', palette.accent_a, 1.0));
        frame.present(&canvas, &palette);
        assert_eq!(frame.dirty_indices(), &[6]);
        assert_eq!(frame.get(2, 1).map(|c| c.ch), Some('x'));
    }

    #[test]
    fn present_rebuilds_on_size_change() {
        let palette = build_palette(Theme::Cyber, ColorMode::Color256, false);
        let mut frame = Frame::new(4, 2, palette.bg);
        frame.clear_dirty();
        frame.present(&Canvas::new(6, 3), &palette);
        assert_eq!((frame.width, frame.height), (6, 3));
        assert!(frame.is_dirty_all());
    }
}
