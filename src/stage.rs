// Copyright (c) 2026 rezky_nightky

//! Owns the event loop state: the timer queue, the frame clock, the random
//! source, the sequencer and the page behind it. The binary feeds it input
//! and wall time; it hands back a composed canvas.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::canvas::Canvas;
use crate::clock::{Debounce, FrameClock, Timers};
use crate::field::{FieldConfig, ParticleField};
use crate::page::Page;
use crate::palette::Palette;
use crate::render;
use crate::runtime::Viewport;
use crate::script::{Script, Timings};
use crate::sequencer::{Cue, Host, Phase, Sequencer};
use crate::shards::BurstConfig;

pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(150);
pub const TITLE_GLITCH_PERIOD: Duration = Duration::from_millis(3800);
pub const TITLE_GLITCH_HOLD: Duration = Duration::from_millis(90);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    Cue(Cue),
    /// The terminal stopped changing size.
    ResizeSettled(Viewport),
    TitleGlitch,
    TitleGlitchEnd,
}

impl From<Cue> for Event {
    fn from(c: Cue) -> Self {
        Event::Cue(c)
    }
}

#[derive(Clone, Debug)]
pub struct StageConfig {
    pub script: Script,
    pub timings: Timings,
    pub burst: BurstConfig,
    pub field: FieldConfig,
    /// Overrides the device-class particle count.
    pub particles: Option<usize>,
    pub force_compact: bool,
    pub rain_glyphs: Vec<char>,
    pub message: String,
    pub message_border: bool,
    pub seed: u64,
    pub skip_intro: bool,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            script: Script::default(),
            timings: Timings::default(),
            burst: BurstConfig::default(),
            field: FieldConfig::default(),
            particles: None,
            force_compact: false,
            rain_glyphs: vec!['0', '1'],
            message: String::new(),
            message_border: true,
            seed: 0,
            skip_intro: false,
        }
    }
}

pub struct Stage {
    timers: Timers<Event>,
    clock: FrameClock,
    rng: StdRng,
    seq: Sequencer,
    field: ParticleField,
    page: Page,
    resize: Debounce,
    viewport: Viewport,
    cols: u16,
    rows: u16,
    particles: usize,
    skip_intro: bool,
    page_layer: Canvas,
    loader_layer: Canvas,
    burst_layer: Canvas,
    out: Canvas,
}

impl Stage {
    pub fn new(cfg: StageConfig, cols: u16, rows: u16) -> Self {
        let viewport = Viewport::from_cells(cols, rows);
        let particles = cfg
            .particles
            .unwrap_or_else(|| cfg.field.count_for(viewport.device_class(cfg.force_compact)));

        let mut page = Page::new(&cfg.script.name, &cfg.script.subtitle, &cfg.message);
        page.set_border(cfg.message_border);
        page.layout(cols, rows);

        Self {
            timers: Timers::new(),
            clock: FrameClock::new(),
            rng: StdRng::seed_from_u64(cfg.seed),
            seq: Sequencer::new(cfg.script, cfg.timings, cfg.rain_glyphs, cfg.burst, viewport),
            field: ParticleField::new(cfg.field),
            page,
            resize: Debounce::new(RESIZE_DEBOUNCE),
            viewport,
            cols,
            rows,
            particles,
            skip_intro: cfg.skip_intro,
            page_layer: Canvas::new(cols, rows),
            loader_layer: Canvas::new(cols, rows),
            burst_layer: Canvas::new(cols, rows),
            out: Canvas::new(cols, rows),
        }
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.seq
    }

    pub fn phase(&self) -> Phase {
        self.seq.phase()
    }

    pub fn is_done(&self) -> bool {
        self.seq.is_done()
    }

    pub fn particle_count(&self) -> usize {
        self.particles
    }

    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    pub fn start(&mut self) {
        self.seq.start(&mut Host {
            timers: &mut self.timers,
            clock: &mut self.clock,
            rng: &mut self.rng,
        });
        self.field
            .start(&mut self.clock, self.viewport, self.particles, &mut self.rng);
        self.timers.every(TITLE_GLITCH_PERIOD, Event::TitleGlitch);
        if self.skip_intro {
            self.skip();
        }
    }

    /// User skip; true only when it actually started the exit.
    pub fn skip(&mut self) -> bool {
        self.seq.skip(&mut Host {
            timers: &mut self.timers,
            clock: &mut self.clock,
            rng: &mut self.rng,
        })
    }

    /// Scrolls the page; a no-op while the loader holds the lock.
    pub fn scroll(&mut self, delta: isize) -> bool {
        self.page.scroll_by(delta, self.seq.scroll_locked())
    }

    /// Surfaces follow the terminal at once; the particle field only
    /// relayouts once the size settles.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        if (cols, rows) == (self.cols, self.rows) {
            return;
        }
        self.cols = cols;
        self.rows = rows;
        for c in [
            &mut self.page_layer,
            &mut self.loader_layer,
            &mut self.burst_layer,
            &mut self.out,
        ] {
            c.resize(cols, rows);
        }
        self.viewport = Viewport::from_cells(cols, rows);
        self.seq.resize(self.viewport, &self.clock, &mut self.rng);
        self.page.layout(cols, rows);
        self.resize
            .arm(&mut self.timers, Event::ResizeSettled(self.viewport));
    }

    fn dispatch(&mut self, ev: Event) {
        match ev {
            Event::Cue(cue) => self.seq.on_cue(
                cue,
                &mut Host {
                    timers: &mut self.timers,
                    clock: &mut self.clock,
                    rng: &mut self.rng,
                },
            ),
            Event::ResizeSettled(vp) => {
                self.resize.fired();
                log::debug!("viewport settled at {}x{}px", vp.width, vp.height);
                self.field.resize(vp, &mut self.rng);
            }
            Event::TitleGlitch => {
                let shift = if self.rng.random::<bool>() { 1 } else { -1 };
                self.page.set_glitch(Some(shift));
                self.timers.after(TITLE_GLITCH_HOLD, Event::TitleGlitchEnd);
            }
            Event::TitleGlitchEnd => self.page.set_glitch(None),
        }
    }

    /// Fires every timer due by `now`, then runs one frame of every live
    /// loop.
    pub fn step(&mut self, now: Duration, pal: &Palette) {
        while let Some(ev) = self.timers.pop_due(now) {
            self.dispatch(ev);
        }
        self.timers.settle(now);
        self.clock.tick();

        let loader_live = self.seq.phase() < Phase::Exiting;
        if loader_live {
            self.loader_layer.clear();
        }
        self.burst_layer.clear();
        self.seq.frame(
            &mut Host {
                timers: &mut self.timers,
                clock: &mut self.clock,
                rng: &mut self.rng,
            },
            &mut self.loader_layer,
            &mut self.burst_layer,
            (pal.accent_a, pal.accent_b),
        );
        if loader_live {
            render::loader(&self.seq, now, &mut self.loader_layer, pal);
        }

        self.page_layer.clear();
        self.field.frame(&self.clock, &mut self.page_layer, pal.dim);
        self.page.draw(
            &mut self.page_layer,
            pal.text,
            pal.accent_a,
            pal.dim,
            (pal.accent_b, pal.accent_a),
        );
    }

    /// Stacks page, loader (clipped by the wipe) and shards.
    pub fn compose(&mut self, now: Duration) -> &Canvas {
        self.out.clear();
        self.out.layer(&self.page_layer);
        if !self.seq.is_hidden() {
            let p = self.seq.wipe_progress(now).unwrap_or(0.0);
            let (w, h) = (self.cols, self.rows);
            self.out
                .cover(&self.loader_layer, |x, y| render::wipe_covers(p, x, y, w, h));
            self.out.layer(&self.burst_layer);
        }
        &self.out
    }

    pub fn shutdown(&mut self) {
        self.field.stop(&mut self.clock);
    }
}
