// Copyright (c) 2026 rezky_nightky

use crate::cell::{Ink, Rgb};
use crate::runtime::{CELL_H, CELL_W};

/// An offscreen draw surface in cell resolution. Each simulation owns one,
/// so stopping a loop never disturbs what another loop painted.
#[derive(Clone, Debug)]
pub struct Canvas {
    pub width: u16,
    pub height: u16,
    inks: Vec<Option<Ink>>,
}

impl Canvas {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            inks: vec![None; width as usize * height as usize],
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.inks.clear();
        self.inks.resize(width as usize * height as usize, None);
    }

    pub fn clear(&mut self) {
        self.inks.fill(None);
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<Ink> {
        self.index(x, y).and_then(|i| self.inks[i])
    }

    pub fn ink_at_index(&self, i: usize) -> Option<Ink> {
        self.inks.get(i).copied().flatten()
    }

    /// Overwrites whatever is in the cell.
    pub fn plot(&mut self, x: u16, y: u16, ink: Ink) {
        if ink.alpha <= 0.0 {
            return;
        }
        if let Some(i) = self.index(x, y) {
            self.inks[i] = Some(ink);
        }
    }

    /// Keeps the stronger of the existing ink and `ink`.
    pub fn plot_max(&mut self, x: u16, y: u16, ink: Ink) {
        if ink.alpha <= 0.0 {
            return;
        }
        if let Some(i) = self.index(x, y) {
            match self.inks[i] {
                Some(cur) if cur.alpha >= ink.alpha => {}
                _ => self.inks[i] = Some(ink),
            }
        }
    }

    pub fn text(&mut self, x: u16, y: u16, s: &str, rgb: Rgb, alpha: f32, bold: bool) {
        for (i, ch) in s.chars().enumerate() {
            let cx = x as usize + i;
            if cx >= self.width as usize {
                break;
            }
            self.plot(cx as u16, y, Ink::new(ch, rgb, alpha).bold(bold));
        }
    }

    /// Cell under a virtual pixel position.
    pub fn cell_of(&self, px: f32, py: f32) -> Option<(u16, u16)> {
        if !px.is_finite() || !py.is_finite() || px < 0.0 || py < 0.0 {
            return None;
        }
        let x = (px / CELL_W) as usize;
        let y = (py / CELL_H) as usize;
        if x >= self.width as usize || y >= self.height as usize {
            return None;
        }
        Some((x as u16, y as u16))
    }

    /// Rasterizes a segment between two pixel positions.
    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), rgb: Rgb, alpha: f32) {
        let (x0, y0) = (from.0 / CELL_W, from.1 / CELL_H);
        let (x1, y1) = (to.0 / CELL_W, to.1 / CELL_H);
        let ch = line_glyph(x1 - x0, y1 - y0);

        let mut x = x0.floor() as i32;
        let mut y = y0.floor() as i32;
        let xe = x1.floor() as i32;
        let ye = y1.floor() as i32;
        let dx = (xe - x).abs();
        let dy = -(ye - y).abs();
        let sx = if x < xe { 1 } else { -1 };
        let sy = if y < ye { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            if x >= 0 && y >= 0 && x <= u16::MAX as i32 && y <= u16::MAX as i32 {
                self.plot_max(x as u16, y as u16, Ink::new(ch, rgb, alpha));
            }
            if x == xe && y == ye {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Copies `top` over this canvas wherever `mask` holds, including empty
    /// cells, so the covered region hides what was underneath.
    pub fn cover(&mut self, top: &Canvas, mask: impl Fn(u16, u16) -> bool) {
        if top.width != self.width || top.height != self.height {
            return;
        }
        for y in 0..self.height {
            for x in 0..self.width {
                if mask(x, y) {
                    let i = y as usize * self.width as usize + x as usize;
                    self.inks[i] = top.inks[i];
                }
            }
        }
    }

    /// Stacks the painted cells of `top` over this canvas.
    pub fn layer(&mut self, top: &Canvas) {
        if top.width != self.width || top.height != self.height {
            return;
        }
        for (dst, src) in self.inks.iter_mut().zip(&top.inks) {
            if src.is_some() {
                *dst = *src;
            }
        }
    }
}

/// Picks a glyph that follows the slope of a segment in cell space.
fn line_glyph(dx: f32, dy: f32) -> char {
    let ax = dx.abs();
    let ay = dy.abs() * 2.0;
    if ax < f32::EPSILON && ay < f32::EPSILON {
        return '·';
    }
    if ay < ax * 0.4 {
        '─'
    } else if ax < ay * 0.4 {
        '│'
    } else if (dx > 0.0) == (dy > 0.0) {
        '╲'
    } else {
        '╱'
    }
}
