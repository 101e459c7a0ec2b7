// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::{Cell, Ink, Rgb};
use crate::runtime::{ColorMode, Theme};

/// Below this opacity mono terminals draw nothing at all.
const MONO_CUTOFF: f32 = 0.2;

#[derive(Clone, Debug)]
pub struct Palette {
    pub mode: ColorMode,
    pub bg: Option<Color>,
    bg_rgb: Rgb,
    pub accent_a: Rgb,
    pub accent_b: Rgb,
    pub text: Rgb,
    pub dim: Rgb,
    pub ok: Rgb,
    pub warn: Rgb,
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let r6 = ((r as u16 * 5) + 127) / 255;
    let g6 = ((g as u16 * 5) + 127) / 255;
    let b6 = ((b as u16 * 5) + 127) / 255;

    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2(
        r,
        g,
        b,
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let (gray_idx, gv) = match avg {
        0..=7 => (16, 0),
        239..=255 => (231, 255),
        _ => {
            let step = (avg - 8) / 10;
            (232 + step, 8 + 10 * step)
        }
    };
    let gray_dist = dist2(r, g, b, gv, gv, gv);

    if gray_dist < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, Rgb); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    let mut best = Color::White;
    let mut best_d = i32::MAX;
    for (c, (cr, cg, cb)) in TABLE {
        let d = dist2(r, g, b, cr, cg, cb);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

/// Composites `rgb` at opacity `alpha` over `under`.
pub fn mix(under: Rgb, rgb: Rgb, alpha: f32) -> Rgb {
    let t = alpha.clamp(0.0, 1.0);
    (
        lerp_u8(under.0, rgb.0, t),
        lerp_u8(under.1, rgb.1, t),
        lerp_u8(under.2, rgb.2, t),
    )
}

pub fn build_palette(theme: Theme, mode: ColorMode, default_background: bool) -> Palette {
    let bg_rgb = (0, 0, 0);
    let bg = if default_background {
        None
    } else {
        Some(match mode {
            ColorMode::Color16 => Color::Black,
            ColorMode::TrueColor => Color::Rgb { r: 0, g: 0, b: 0 },
            _ => Color::AnsiValue(16),
        })
    };

    let (accent_a, accent_b) = match theme {
        Theme::Cyber => ((0, 240, 200), (255, 95, 126)),
        Theme::Amber => ((255, 176, 0), (255, 90, 40)),
        Theme::Ice => ((140, 220, 255), (200, 160, 255)),
        Theme::Mono => ((230, 230, 230), (150, 150, 150)),
    };

    Palette {
        mode,
        bg,
        bg_rgb,
        accent_a,
        accent_b,
        text: (232, 236, 240),
        dim: (110, 120, 130),
        ok: mix(accent_a, (120, 255, 140), 0.5),
        warn: (255, 200, 60),
    }
}

impl Palette {
    /// Terminal color for `rgb` drawn at opacity `alpha` over the background.
    pub fn shade(&self, rgb: Rgb, alpha: f32) -> Option<Color> {
        let (r, g, b) = mix(self.bg_rgb, rgb, alpha);
        match self.mode {
            ColorMode::Mono => None,
            ColorMode::TrueColor => Some(Color::Rgb { r, g, b }),
            ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(r, g, b))),
            ColorMode::Color16 => Some(rgb_to_color16(r, g, b)),
        }
    }

    pub fn resolve(&self, ink: Option<Ink>) -> Cell {
        let Some(ink) = ink else {
            return Cell::blank_with_bg(self.bg);
        };
        if self.mode == ColorMode::Mono && ink.alpha < MONO_CUTOFF {
            return Cell::blank_with_bg(self.bg);
        }
        Cell {
            ch: ink.ch,
            fg: self.shade(ink.rgb, ink.alpha),
            bg: self.bg,
            bold: ink.bold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_interpolates_between_background_and_ink() {
        assert_eq!(mix((0, 0, 0), (200, 100, 50), 0.0), (0, 0, 0));
        assert_eq!(mix((0, 0, 0), (200, 100, 50), 1.0), (200, 100, 50));
        assert_eq!(mix((0, 0, 0), (200, 100, 50), 0.5), (100, 50, 25));
    }

    #[test]
    fn ansi256_maps_pure_colors_into_cube() {
        assert_eq!(rgb_to_ansi256(255, 0, 0), 196);
        assert_eq!(rgb_to_ansi256(0, 0, 0), 16);
        assert_eq!(rgb_to_ansi256(255, 255, 255), 231);
    }

    #[test]
    fn mono_drops_faint_ink() {
        let p = build_palette(Theme::Cyber, ColorMode::Mono, true);
        let faint = p.resolve(Some(Ink::new('x', p.accent_a, 0.1)));
        assert_eq!(faint.ch, ' ');
        let solid = p.resolve(Some(Ink::new('x', p.accent_a, 0.9)));
        assert_eq!(solid.ch, 'x');
        assert_eq!(solid.fg, None);
    }
}
