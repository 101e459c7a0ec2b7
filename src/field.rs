// Copyright (c) 2026 rezky_nightky

//! Ambient particle field: drifting points joined by distance-faded links.

use rand::Rng;

use crate::canvas::Canvas;
use crate::cell::{Ink, Rgb};
use crate::clock::{FrameClock, FrameHandle};
use crate::runtime::{DeviceClass, Viewport};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldConfig {
    pub compact_count: usize,
    pub full_count: usize,
    /// Links are drawn between points closer than this, in pixels.
    pub connect_dist: f32,
    pub max_speed: f32,
    pub link_alpha: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            compact_count: 35,
            full_count: 75,
            connect_dist: 130.0,
            max_speed: 0.19,
            link_alpha: 0.45,
        }
    }
}

impl FieldConfig {
    pub fn count_for(&self, class: DeviceClass) -> usize {
        match class {
            DeviceClass::Compact => self.compact_count,
            DeviceClass::Full => self.full_count,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientParticle {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub radius: f32,
    pub opacity: f32,
}

impl AmbientParticle {
    fn random(rng: &mut impl Rng, vp: Viewport, max_speed: f32) -> Self {
        Self {
            x: rng.random::<f32>() * vp.width,
            y: rng.random::<f32>() * vp.height,
            dx: (rng.random::<f32>() - 0.5) * 2.0 * max_speed,
            dy: (rng.random::<f32>() - 0.5) * 2.0 * max_speed,
            radius: rng.random::<f32>() * 1.4 + 0.3,
            opacity: rng.random::<f32>() * 0.6 + 0.2,
        }
    }

    /// One step of motion with an elastic bounce off the viewport edges.
    pub fn step(&mut self, vp: Viewport) {
        self.x += self.dx;
        self.y += self.dy;
        if self.x < 0.0 || self.x > vp.width {
            self.dx = -self.dx;
        }
        if self.y < 0.0 || self.y > vp.height {
            self.dy = -self.dy;
        }
    }
}

/// A connection between two particles, `alpha` already faded by distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub alpha: f32,
}

/// Linear falloff: full at distance 0, zero at the threshold.
pub fn link_alpha(dist: f32, connect_dist: f32, max_alpha: f32) -> f32 {
    if connect_dist <= 0.0 || dist >= connect_dist {
        return 0.0;
    }
    max_alpha * (1.0 - dist / connect_dist)
}

pub struct ParticleField {
    cfg: FieldConfig,
    viewport: Viewport,
    count: usize,
    particles: Vec<AmbientParticle>,
    handle: Option<FrameHandle>,
}

impl ParticleField {
    pub fn new(cfg: FieldConfig) -> Self {
        Self {
            cfg,
            viewport: Viewport::new(0.0, 0.0),
            count: 0,
            particles: Vec::new(),
            handle: None,
        }
    }

    #[cfg(test)]
    pub fn particles(&self) -> &[AmbientParticle] {
        &self.particles
    }

    #[cfg(test)]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_running(&self, clock: &FrameClock) -> bool {
        self.handle.as_ref().is_some_and(|h| clock.is_live(h))
    }

    /// Sizes the field for `viewport` and starts advancing it every frame.
    /// The particle count is fixed here and never re-derived.
    pub fn start(
        &mut self,
        clock: &mut FrameClock,
        viewport: Viewport,
        count: usize,
        rng: &mut impl Rng,
    ) {
        if self.handle.is_some() {
            return;
        }
        self.count = count;
        self.resize(viewport, rng);
        self.handle = Some(clock.request());
        log::debug!("particle field started with {} particles", self.count);
    }

    pub fn stop(&mut self, clock: &mut FrameClock) {
        if let Some(h) = self.handle.take() {
            clock.cancel(h);
        }
    }

    /// Existing particles are clamped into the new bounds so the field keeps
    /// its motion; an empty field is populated.
    pub fn resize(&mut self, viewport: Viewport, rng: &mut impl Rng) {
        self.viewport = viewport;
        if viewport.is_empty() {
            return;
        }
        if self.particles.is_empty() {
            let max_speed = self.cfg.max_speed;
            self.particles = (0..self.count)
                .map(|_| AmbientParticle::random(rng, viewport, max_speed))
                .collect();
            return;
        }
        for p in &mut self.particles {
            p.x = p.x.clamp(0.0, viewport.width);
            p.y = p.y.clamp(0.0, viewport.height);
        }
    }

    /// Every unordered pair closer than the connection threshold.
    pub fn links(&self) -> Vec<Link> {
        let mut out = Vec::new();
        let n = self.particles.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (p, q) = (&self.particles[i], &self.particles[j]);
                let dist = (p.x - q.x).hypot(p.y - q.y);
                if dist < self.cfg.connect_dist {
                    out.push(Link {
                        a: i,
                        b: j,
                        alpha: link_alpha(dist, self.cfg.connect_dist, self.cfg.link_alpha),
                    });
                }
            }
        }
        out
    }

    pub fn advance(&mut self) {
        let vp = self.viewport;
        for p in &mut self.particles {
            p.step(vp);
        }
    }

    pub fn draw(&self, canvas: &mut Canvas, rgb: Rgb) {
        for link in self.links() {
            let (p, q) = (&self.particles[link.a], &self.particles[link.b]);
            canvas.line((p.x, p.y), (q.x, q.y), rgb, link.alpha);
        }
        for p in &self.particles {
            if let Some((x, y)) = canvas.cell_of(p.x, p.y) {
                let ch = if p.radius > 1.0 { '•' } else { '·' };
                canvas.plot(x, y, Ink::new(ch, rgb, p.opacity));
            }
        }
    }

    /// Paints the current state, then integrates one step. Returns false
    /// when the field has no live frame handle.
    pub fn frame(&mut self, clock: &FrameClock, canvas: &mut Canvas, rgb: Rgb) -> bool {
        if !self.is_running(clock) {
            return false;
        }
        self.draw(canvas, rgb);
        self.advance();
        true
    }
}
