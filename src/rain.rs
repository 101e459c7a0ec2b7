// Copyright (c) 2026 rezky_nightky

use rand::Rng;

use crate::canvas::Canvas;
use crate::cell::{Ink, Rgb};
use crate::clock::{FrameClock, FrameHandle};
use crate::runtime::{Viewport, CELL_H, CELL_W};

/// Width of one rain column and height of one drop step, in pixels.
const COL_PX: f32 = 18.0;
/// Share of brightness lost every frame.
const FADE: f32 = 0.07;
const BRIGHT_CHANCE: f64 = 0.07;
const DIM_ALPHA: f32 = 0.42;
const RESET_CHANCE: f64 = 0.025;

/// The loader backdrop: glyph columns falling over a slowly fading surface.
pub struct MatrixRain {
    glyphs: Vec<char>,
    viewport: Viewport,
    drops: Vec<i32>,
    /// Persistent surface in cell resolution; brightness decays each frame.
    trail: Vec<Option<(char, f32)>>,
    cols: u16,
    rows: u16,
    handle: Option<FrameHandle>,
}

impl MatrixRain {
    pub fn new(glyphs: Vec<char>) -> Self {
        let glyphs = if glyphs.is_empty() {
            vec!['0', '1']
        } else {
            glyphs
        };
        Self {
            glyphs,
            viewport: Viewport::new(0.0, 0.0),
            drops: Vec::new(),
            trail: Vec::new(),
            cols: 0,
            rows: 0,
            handle: None,
        }
    }

    pub fn is_running(&self, clock: &FrameClock) -> bool {
        self.handle.as_ref().is_some_and(|h| clock.is_live(h))
    }

    #[cfg(test)]
    pub fn drops(&self) -> &[i32] {
        &self.drops
    }

    pub fn start(&mut self, clock: &mut FrameClock, viewport: Viewport, rng: &mut impl Rng) {
        if self.handle.is_some() {
            return;
        }
        self.resize(viewport, rng);
        self.handle = Some(clock.request());
    }

    pub fn stop(&mut self, clock: &mut FrameClock) {
        if let Some(h) = self.handle.take() {
            clock.cancel(h);
        }
    }

    /// Rebuilds the columns immediately; the backdrop is transient.
    pub fn resize(&mut self, viewport: Viewport, rng: &mut impl Rng) {
        self.viewport = viewport;
        let n = (viewport.width / COL_PX).floor().max(0.0) as usize;
        self.drops = (0..n).map(|_| rng.random_range(-60..0)).collect();
        self.cols = (viewport.width / CELL_W) as u16;
        self.rows = (viewport.height / CELL_H) as u16;
        self.trail = vec![None; self.cols as usize * self.rows as usize];
    }

    /// Fades the surface, drops one glyph per column, advances every drop.
    pub fn advance(&mut self, rng: &mut impl Rng) {
        for slot in &mut self.trail {
            if let Some((_, alpha)) = slot {
                *alpha *= 1.0 - FADE;
                if *alpha < 0.02 {
                    *slot = None;
                }
            }
        }

        for (i, drop) in self.drops.iter_mut().enumerate() {
            let ch = self.glyphs[rng.random_range(0..self.glyphs.len())];
            let y = *drop as f32 * COL_PX;
            let alpha = if rng.random_bool(BRIGHT_CHANCE) {
                1.0
            } else {
                DIM_ALPHA
            };

            if y >= 0.0 {
                let cx = (i as f32 * COL_PX / CELL_W) as usize;
                let cy = (y / CELL_H) as usize;
                if cx < self.cols as usize && cy < self.rows as usize {
                    self.trail[cy * self.cols as usize + cx] = Some((ch, alpha));
                }
            }

            if y > self.viewport.height && rng.random_bool(RESET_CHANCE) {
                *drop = 0;
            }
            *drop += 1;
        }
    }

    pub fn draw(&self, canvas: &mut Canvas, rgb: Rgb) {
        for y in 0..self.rows.min(canvas.height) {
            for x in 0..self.cols.min(canvas.width) {
                if let Some((ch, alpha)) = self.trail[y as usize * self.cols as usize + x as usize] {
                    canvas.plot(x, y, Ink::new(ch, rgb, alpha).bold(alpha >= 1.0));
                }
            }
        }
    }

    pub fn frame(
        &mut self,
        clock: &FrameClock,
        canvas: &mut Canvas,
        rgb: Rgb,
        rng: &mut impl Rng,
    ) -> bool {
        if !self.is_running(clock) {
            return false;
        }
        self.advance(rng);
        self.draw(canvas, rgb);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn columns_follow_viewport_width() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut clock = FrameClock::new();
        let mut rain = MatrixRain::new(vec!['0', '1']);
        rain.start(&mut clock, Viewport::from_cells(45, 10), &mut rng);
        assert_eq!(rain.drops().len(), 20);
        assert!(rain.drops().iter().all(|d| (-60..0).contains(d)));
    }

    #[test]
    fn every_drop_moves_one_step_per_frame() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut clock = FrameClock::new();
        let mut rain = MatrixRain::new(vec!['x']);
        rain.start(&mut clock, Viewport::from_cells(36, 20), &mut rng);
        let before = rain.drops().to_vec();
        let mut canvas = Canvas::new(36, 20);
        assert!(rain.frame(&clock, &mut canvas, (0, 255, 0), &mut rng));
        for (a, b) in before.iter().zip(rain.drops()) {
            assert_eq!(*b, a + 1);
        }
    }

    #[test]
    fn glyphs_appear_and_fade() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut clock = FrameClock::new();
        let mut rain = MatrixRain::new(vec!['x']);
        rain.start(&mut clock, Viewport::from_cells(36, 20), &mut rng);
        rain.drops.iter_mut().for_each(|d| *d = 0);

        rain.advance(&mut rng);
        let first = rain.trail[0].map(|(_, a)| a).unwrap_or(0.0);
        assert!(first >= DIM_ALPHA);
        rain.advance(&mut rng);
        let second = rain.trail[0].map(|(_, a)| a).unwrap_or(0.0);
        assert!(second < first);
    }

    #[test]
    fn stopped_rain_is_inert() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut clock = FrameClock::new();
        let mut rain = MatrixRain::new(Vec::new());
        rain.start(&mut clock, Viewport::from_cells(36, 20), &mut rng);
        rain.stop(&mut clock);
        let mut canvas = Canvas::new(36, 20);
        assert!(!rain.frame(&clock, &mut canvas, (0, 255, 0), &mut rng));
        assert_eq!(clock.live_count(), 0);
    }
}
