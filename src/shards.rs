// Copyright (c) 2026 rezky_nightky

//! Exit burst: a one-shot spray of spinning polygon shards that fall under
//! gravity and fade out. The loop stops itself on the first frame that finds
//! nothing left to draw.

use std::f32::consts::TAU;

use rand::Rng;

use crate::canvas::Canvas;
use crate::cell::{Ink, Rgb};
use crate::clock::{FrameClock, FrameHandle};
use crate::runtime::{Viewport, CELL_H, CELL_W};

/// Unit outline of a shard, scaled by its size.
pub const OUTLINE: [(f32, f32); 5] = [
    (-1.0, -0.35),
    (0.0, -1.0),
    (0.7, -0.2),
    (0.3, 0.85),
    (-0.6, 0.5),
];

/// Glow cells are this much fainter than the shard body.
const GLOW_STRENGTH: f32 = 0.35;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BurstConfig {
    pub count: usize,
    pub speed_min: f32,
    pub speed_span: f32,
    /// Subtracted from the initial vertical velocity.
    pub lift: f32,
    pub size_min: f32,
    pub size_span: f32,
    pub spin: f32,
    /// Fraction of the viewport the spawn points are jittered across.
    pub region: f32,
    pub gravity: f32,
    pub decay: f32,
    /// Glow radius in pixels.
    pub glow: f32,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            count: 130,
            speed_min: 6.0,
            speed_span: 24.0,
            lift: 5.0,
            size_min: 4.0,
            size_span: 20.0,
            spin: 0.28,
            region: 0.9,
            gravity: 0.65,
            decay: 0.026,
            glow: 10.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accent {
    A,
    B,
}

/// Where shards may spawn: a box around a center point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
}

impl Region {
    pub fn around_center(vp: Viewport, fraction: f32) -> Self {
        Self {
            cx: vp.width / 2.0,
            cy: vp.height / 2.0,
            w: vp.width * fraction,
            h: vp.height * fraction,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shard {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub rot: f32,
    pub rot_v: f32,
    pub opacity: f32,
    pub accent: Accent,
}

impl Shard {
    pub fn is_alive(&self) -> bool {
        self.opacity > 0.0
    }

    fn step(&mut self, gravity: f32, decay: f32) {
        self.x += self.vx;
        self.y += self.vy;
        self.vy += gravity;
        self.rot += self.rot_v;
        self.opacity -= decay;
    }

    /// Outline corners in pixel space.
    pub fn corners(&self) -> [(f32, f32); 5] {
        let (sin, cos) = self.rot.sin_cos();
        OUTLINE.map(|(ux, uy)| {
            let (px, py) = (ux * self.size, uy * self.size);
            (self.x + px * cos - py * sin, self.y + px * sin + py * cos)
        })
    }
}

fn point_in_polygon(p: (f32, f32), poly: &[(f32, f32)]) -> bool {
    let mut inside = false;
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let (xi, yi) = poly[i];
        let (xj, yj) = poly[j];
        if (yi > p.1) != (yj > p.1) && p.0 < (xj - xi) * (p.1 - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn dist_to_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let len2 = abx * abx + aby * aby;
    let t = if len2 > 0.0 {
        (((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (p.0 - (a.0 + abx * t)).hypot(p.1 - (a.1 + aby * t))
}

fn dist_to_outline(p: (f32, f32), poly: &[(f32, f32)]) -> f32 {
    (0..poly.len())
        .map(|i| dist_to_segment(p, poly[i], poly[(i + 1) % poly.len()]))
        .fold(f32::INFINITY, f32::min)
}

pub struct ShardBurst {
    cfg: BurstConfig,
    shards: Vec<Shard>,
    handle: Option<FrameHandle>,
    frames: u32,
}

impl ShardBurst {
    pub fn new(cfg: BurstConfig) -> Self {
        Self {
            cfg,
            shards: Vec::new(),
            handle: None,
            frames: 0,
        }
    }

    pub fn config(&self) -> &BurstConfig {
        &self.cfg
    }

    #[cfg(test)]
    pub fn shards(&self) -> &[Shard] {
        &self.shards
    }

    #[cfg(test)]
    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn is_running(&self, clock: &FrameClock) -> bool {
        self.handle.as_ref().is_some_and(|h| clock.is_live(h))
    }

    #[cfg(test)]
    pub fn any_alive(&self) -> bool {
        self.shards.iter().any(Shard::is_alive)
    }

    /// Replaces any previous burst with `count` fresh shards and starts the
    /// per-frame loop.
    pub fn spawn(
        &mut self,
        count: usize,
        region: Region,
        clock: &mut FrameClock,
        rng: &mut impl Rng,
    ) {
        self.stop(clock);
        let cfg = self.cfg;
        self.shards = (0..count)
            .map(|_| {
                let angle = rng.random::<f32>() * TAU;
                let speed = rng.random::<f32>() * cfg.speed_span + cfg.speed_min;
                Shard {
                    x: region.cx + (rng.random::<f32>() - 0.5) * region.w,
                    y: region.cy + (rng.random::<f32>() - 0.5) * region.h,
                    vx: angle.cos() * speed,
                    vy: angle.sin() * speed - cfg.lift,
                    size: rng.random::<f32>() * cfg.size_span + cfg.size_min,
                    rot: rng.random::<f32>() * TAU,
                    rot_v: (rng.random::<f32>() - 0.5) * cfg.spin,
                    opacity: 1.0,
                    accent: if rng.random_bool(0.5) {
                        Accent::A
                    } else {
                        Accent::B
                    },
                }
            })
            .collect();
        self.frames = 0;
        self.handle = Some(clock.request());
    }

    pub fn stop(&mut self, clock: &mut FrameClock) {
        if let Some(h) = self.handle.take() {
            clock.cancel(h);
        }
    }

    fn draw_shard(&self, s: &Shard, canvas: &mut Canvas, rgb: Rgb) {
        let poly = s.corners();
        let glow = self.cfg.glow;
        let (mut x0, mut y0, mut x1, mut y1) = (f32::MAX, f32::MAX, f32::MIN, f32::MIN);
        for &(px, py) in &poly {
            x0 = x0.min(px - glow);
            y0 = y0.min(py - glow);
            x1 = x1.max(px + glow);
            y1 = y1.max(py + glow);
        }

        let cx0 = (x0 / CELL_W).floor().max(0.0) as u32;
        let cy0 = (y0 / CELL_H).floor().max(0.0) as u32;
        let cx1 = ((x1 / CELL_W).ceil().max(0.0) as u32).min(canvas.width as u32);
        let cy1 = ((y1 / CELL_H).ceil().max(0.0) as u32).min(canvas.height as u32);

        let mut covered = false;
        for cy in cy0..cy1 {
            for cx in cx0..cx1 {
                let center = ((cx as f32 + 0.5) * CELL_W, (cy as f32 + 0.5) * CELL_H);
                if point_in_polygon(center, &poly) {
                    canvas.plot(cx as u16, cy as u16, Ink::new('█', rgb, s.opacity));
                    covered = true;
                    continue;
                }
                let d = dist_to_outline(center, &poly);
                if glow > 0.0 && d < glow {
                    let alpha = s.opacity * GLOW_STRENGTH * (1.0 - d / glow);
                    canvas.plot_max(cx as u16, cy as u16, Ink::new('░', rgb, alpha));
                }
            }
        }

        // Shards smaller than a cell still leave a mark.
        if !covered {
            if let Some((cx, cy)) = canvas.cell_of(s.x, s.y) {
                canvas.plot(cx, cy, Ink::new('▪', rgb, s.opacity));
            }
        }
    }

    /// Draws and integrates every living shard. On the first frame with
    /// nothing alive the loop releases its handle and returns false.
    pub fn frame(
        &mut self,
        clock: &mut FrameClock,
        canvas: &mut Canvas,
        colors: (Rgb, Rgb),
    ) -> bool {
        if !self.is_running(clock) {
            return false;
        }
        self.frames += 1;

        let mut alive = false;
        for i in 0..self.shards.len() {
            let s = self.shards[i];
            if !s.is_alive() {
                continue;
            }
            alive = true;
            let rgb = match s.accent {
                Accent::A => colors.0,
                Accent::B => colors.1,
            };
            self.draw_shard(&s, canvas, rgb);
            self.shards[i].step(self.cfg.gravity, self.cfg.decay);
        }

        if !alive {
            log::debug!("shard burst spent after {} frames", self.frames);
            self.stop(clock);
        }
        alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const COLORS: (Rgb, Rgb) = ((0, 240, 200), (255, 95, 126));

    fn burst(seed: u64) -> (ShardBurst, FrameClock, Canvas) {
        let mut clock = FrameClock::new();
        let mut rng = StdRng::seed_from_u64(seed);
        let vp = Viewport::from_cells(80, 24);
        let mut b = ShardBurst::new(BurstConfig::default());
        b.spawn(130, Region::around_center(vp, 0.9), &mut clock, &mut rng);
        (b, clock, Canvas::new(80, 24))
    }

    #[test]
    fn spawn_respects_ranges() {
        let (b, clock, _) = burst(42);
        let vp = Viewport::from_cells(80, 24);
        assert_eq!(b.shards().len(), 130);
        assert!(b.is_running(&clock));
        for s in b.shards() {
            assert_eq!(s.opacity, 1.0);
            assert!((4.0..24.0).contains(&s.size));
            assert!(s.rot_v.abs() <= 0.14);
            assert!((vp.width * 0.05..=vp.width * 0.95).contains(&s.x));
            assert!((vp.height * 0.05..=vp.height * 0.95).contains(&s.y));
            let speed = s.vx.hypot(s.vy + 5.0);
            assert!((6.0 - 1e-3..30.0 + 1e-3).contains(&speed));
        }
    }

    #[test]
    fn same_seed_same_trajectories() {
        let (a, _, _) = burst(9);
        let (b, _, _) = burst(9);
        assert_eq!(a.shards(), b.shards());
    }

    #[test]
    fn step_applies_gravity_spin_and_decay() {
        let mut s = Shard {
            x: 10.0,
            y: 10.0,
            vx: 2.0,
            vy: -3.0,
            size: 5.0,
            rot: 0.0,
            rot_v: 0.1,
            opacity: 1.0,
            accent: Accent::A,
        };
        s.step(0.65, 0.026);
        assert_eq!((s.x, s.y), (12.0, 7.0));
        assert!((s.vy - -2.35).abs() < 1e-6);
        assert!((s.rot - 0.1).abs() < 1e-6);
        assert!((s.opacity - 0.974).abs() < 1e-6);
    }

    #[test]
    fn burst_dies_within_39_frames_and_stops_one_frame_later() {
        let (mut b, mut clock, mut canvas) = burst(1);
        for _ in 0..39 {
            canvas.clear();
            assert!(b.frame(&mut clock, &mut canvas, COLORS));
        }
        assert!(!b.any_alive());
        assert!(b.is_running(&clock));

        canvas.clear();
        assert!(!b.frame(&mut clock, &mut canvas, COLORS));
        assert!(!b.is_running(&clock));
        assert_eq!(clock.live_count(), 0);
        assert_eq!(b.frames(), 40);
    }

    #[test]
    fn dead_shards_are_never_drawn() {
        let mut clock = FrameClock::new();
        let mut b = ShardBurst::new(BurstConfig::default());
        let mut rng = StdRng::seed_from_u64(2);
        b.spawn(
            1,
            Region::around_center(Viewport::from_cells(10, 5), 0.0),
            &mut clock,
            &mut rng,
        );
        b.shards[0].opacity = 0.0;

        let mut canvas = Canvas::new(10, 5);
        assert!(!b.frame(&mut clock, &mut canvas, COLORS));
        for y in 0..5 {
            for x in 0..10 {
                assert!(canvas.get(x, y).is_none());
            }
        }
    }

    #[test]
    fn polygon_geometry() {
        let square = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        assert!(point_in_polygon((5.0, 5.0), &square));
        assert!(!point_in_polygon((15.0, 5.0), &square));
        assert_eq!(dist_to_outline((15.0, 5.0), &square), 5.0);
    }
}
