// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

pub type Rgb = (u8, u8, u8);

/// A resolved terminal cell, ready to be written out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Cell {
    pub fn blank_with_bg(bg: Option<Color>) -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg,
            bold: false,
        }
    }
}

/// What a simulation paints: a glyph with a color and an opacity that the
/// palette resolves against the background at present time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ink {
    pub ch: char,
    pub rgb: Rgb,
    pub alpha: f32,
    pub bold: bool,
}

impl Ink {
    pub fn new(ch: char, rgb: Rgb, alpha: f32) -> Self {
        Self {
            ch,
            rgb,
            alpha: alpha.clamp(0.0, 1.0),
            bold: false,
        }
    }

    pub fn bold(mut self, on: bool) -> Self {
        self.bold = on;
        self
    }
}
