// Copyright (c) 2026 rezky_nightky

/// Virtual pixels per terminal cell, horizontally.
pub const CELL_W: f32 = 8.0;
/// Virtual pixels per terminal cell, vertically.
pub const CELL_H: f32 = 16.0;

/// Viewports at most this wide count as compact devices.
pub const COMPACT_MAX_WIDTH: f32 = 768.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Cyber,
    Amber,
    Ice,
    Mono,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceClass {
    Compact,
    Full,
}

/// Drawable area in virtual pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn from_cells(cols: u16, rows: u16) -> Self {
        Self::new(cols as f32 * CELL_W, rows as f32 * CELL_H)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn device_class(&self, force_compact: bool) -> DeviceClass {
        if force_compact || self.width <= COMPACT_MAX_WIDTH {
            DeviceClass::Compact
        } else {
            DeviceClass::Full
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_terminals_are_compact() {
        assert_eq!(
            Viewport::from_cells(96, 30).device_class(false),
            DeviceClass::Compact
        );
        assert_eq!(
            Viewport::from_cells(97, 30).device_class(false),
            DeviceClass::Full
        );
        assert_eq!(
            Viewport::from_cells(200, 60).device_class(true),
            DeviceClass::Compact
        );
    }
}
