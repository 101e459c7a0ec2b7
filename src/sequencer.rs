// Copyright (c) 2026 rezky_nightky

//! Phase state machine for the intro.
//!
//! The sequence runs `Boot -> NameReveal -> ProgressScan`, each phase
//! scheduling its own effects and the entry of the next phase on the shared
//! [`Timers`] queue. Three independent paths end it: the progress bar
//! completing, the user skipping, and a safety timeout armed at start. All
//! three funnel into [`Sequencer::exit`], which takes effect exactly once.
//!
//! Phases only move forward. A transition cue that arrives after the
//! sequence already moved past it (for example after a skip) is dropped.

use std::time::Duration;

use rand::Rng;

use crate::canvas::Canvas;
use crate::cell::Rgb;
use crate::clock::{FrameClock, Timers};
use crate::progress::{ProgressDriver, ProgressState, StatusRotator, Tick};
use crate::rain::MatrixRain;
use crate::runtime::Viewport;
use crate::script::{BootLine, Script, Timings};
use crate::shards::{BurstConfig, Region, ShardBurst};

/// Maximum entry tilt of a letter, in degrees either way.
pub const MAX_TILT_DEG: f32 = 24.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Boot,
    NameReveal,
    ProgressScan,
    Exiting,
    Done,
}

/// Everything the sequencer schedules on the timer queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    BootLine(usize),
    Enter(Phase),
    LetterLand(usize),
    GlowOn(usize),
    GlowOff(usize),
    Subtitle,
    StatusFade,
    StatusSwap,
    /// Grace delay after the bar completed.
    Launch,
    SafetyTimeout,
    /// The wipe finished; hide the loader for good.
    Hide,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitCause {
    Skip,
    Completion,
    SafetyTimeout,
}

/// One-shot guard for the exit path. The only way to read or change it is
/// [`ExitLatch::trip`], which checks and sets in the same call.
#[derive(Debug, Default)]
struct ExitLatch {
    tripped: bool,
}

impl ExitLatch {
    /// True for the first caller only.
    fn trip(&mut self) -> bool {
        !std::mem::replace(&mut self.tripped, true)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Letter {
    pub glyph: char,
    /// Column within the name, blanks included.
    pub slot: usize,
    /// Entry rotation in degrees.
    pub tilt: f32,
    /// Offset of the landing from name phase entry.
    pub land_at: Duration,
    pub landed: bool,
    pub glowing: bool,
}

/// The services a sequencer callback may touch: the timer queue, the frame
/// clock and the random source.
pub struct Host<'a, E, R> {
    pub timers: &'a mut Timers<E>,
    pub clock: &'a mut FrameClock,
    pub rng: &'a mut R,
}

pub struct Sequencer {
    script: Script,
    timings: Timings,
    viewport: Viewport,

    started: bool,
    phase: Phase,
    phase_entered: Duration,
    latch: ExitLatch,
    exit_cause: Option<ExitCause>,

    boot_log: Vec<usize>,
    letters: Vec<Letter>,
    subtitle_visible: bool,

    progress: ProgressDriver,
    rotator: StatusRotator,

    rain: MatrixRain,
    burst: ShardBurst,
    wipe_started: Option<Duration>,

    hidden: bool,
    scroll_locked: bool,
}

impl Sequencer {
    pub fn new(
        script: Script,
        timings: Timings,
        rain_glyphs: Vec<char>,
        burst: BurstConfig,
        viewport: Viewport,
    ) -> Self {
        let rotator = StatusRotator::new(script.status_messages.clone(), timings.status_fade);
        Self {
            progress: ProgressDriver::new(timings.progress_total),
            rotator,
            script,
            timings,
            viewport,
            started: false,
            phase: Phase::Boot,
            phase_entered: Duration::ZERO,
            latch: ExitLatch::default(),
            exit_cause: None,
            boot_log: Vec::new(),
            letters: Vec::new(),
            subtitle_visible: false,
            rain: MatrixRain::new(rain_glyphs),
            burst: ShardBurst::new(burst),
            wipe_started: None,
            hidden: false,
            scroll_locked: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn exit_cause(&self) -> Option<ExitCause> {
        self.exit_cause
    }

    pub fn phase_elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.phase_entered)
    }

    /// Boot lines rendered so far, in the order they fired.
    pub fn boot_log(&self) -> impl Iterator<Item = &BootLine> + '_ {
        self.boot_log
            .iter()
            .filter_map(|&i| self.script.boot_lines.get(i))
    }

    pub fn letters(&self) -> &[Letter] {
        &self.letters
    }

    pub fn subtitle_visible(&self) -> bool {
        self.subtitle_visible
    }

    pub fn progress(&self) -> ProgressState {
        self.progress.state()
    }

    pub fn status_text(&self) -> Option<&str> {
        self.rotator.text()
    }

    pub fn status_visible(&self) -> bool {
        self.rotator.is_visible()
    }

    #[cfg(test)]
    pub fn shards(&self) -> &[crate::shards::Shard] {
        self.burst.shards()
    }

    pub fn rain_running(&self, clock: &FrameClock) -> bool {
        self.rain.is_running(clock)
    }

    #[cfg(test)]
    pub fn burst_running(&self, clock: &FrameClock) -> bool {
        self.burst.is_running(clock)
    }

    /// Fraction of the wipe done, once the exit started.
    pub fn wipe_progress(&self, now: Duration) -> Option<f32> {
        let start = self.wipe_started?;
        if self.timings.wipe.is_zero() {
            return Some(1.0);
        }
        let t = now.saturating_sub(start).as_secs_f32() / self.timings.wipe.as_secs_f32();
        Some(t.clamp(0.0, 1.0))
    }

    /// Whether the loader still covers the page.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Locks page scrolling, arms the safety timeout, starts the rain and
    /// enters the boot phase. Calling it again does nothing.
    pub fn start<E, R>(&mut self, host: &mut Host<'_, E, R>)
    where
        E: Clone + From<Cue>,
        R: Rng,
    {
        if self.started {
            return;
        }
        self.started = true;
        self.scroll_locked = true;

        for w in self.timings.audit(self.script.letter_count()) {
            log::debug!("intro timing: {}", w);
        }

        host.timers
            .after(self.timings.safety, Cue::SafetyTimeout.into());
        self.rain.start(host.clock, self.viewport, host.rng);
        self.enter_boot(host);
    }

    fn mark_phase<E: Clone>(&mut self, phase: Phase, timers: &Timers<E>) {
        log::debug!("intro phase {:?} at {}ms", phase, timers.now().as_millis());
        self.phase = phase;
        self.phase_entered = timers.now();
    }

    fn enter_boot<E, R>(&mut self, host: &mut Host<'_, E, R>)
    where
        E: Clone + From<Cue>,
    {
        self.mark_phase(Phase::Boot, host.timers);
        self.boot_log.clear();

        // One timer per line: render order follows fire time, whatever
        // order the lines were authored in.
        for (i, line) in self.script.boot_lines.iter().enumerate() {
            host.timers.after(line.delay, Cue::BootLine(i).into());
        }
        host.timers.after(
            self.timings.boot_total,
            Cue::Enter(Phase::NameReveal).into(),
        );
    }

    fn enter_name_reveal<E, R>(&mut self, host: &mut Host<'_, E, R>)
    where
        E: Clone + From<Cue>,
        R: Rng,
    {
        self.mark_phase(Phase::NameReveal, host.timers);
        self.letters.clear();
        self.subtitle_visible = false;

        let t = self.timings;
        let mut prev_land = Duration::ZERO;
        let glyphs = self
            .script
            .name
            .chars()
            .enumerate()
            .filter(|(_, c)| !c.is_whitespace());
        for (index, (slot, glyph)) in glyphs.enumerate() {
            let tilt = host.rng.random_range(-MAX_TILT_DEG..=MAX_TILT_DEG);
            let jitter = t.letter_jitter.mul_f32(host.rng.random::<f32>());
            let land_at = (t.letter_step * index as u32 + jitter).max(prev_land);
            prev_land = land_at;

            self.letters.push(Letter {
                glyph,
                slot,
                tilt,
                land_at,
                landed: false,
                glowing: false,
            });
            host.timers.after(land_at, Cue::LetterLand(index).into());
            host.timers
                .after(t.glow_at(index, land_at), Cue::GlowOn(index).into());
        }

        host.timers
            .after(t.subtitle_at(self.letters.len()), Cue::Subtitle.into());
        host.timers
            .after(t.name_total, Cue::Enter(Phase::ProgressScan).into());
    }

    fn enter_progress_scan<E, R>(&mut self, host: &mut Host<'_, E, R>)
    where
        E: Clone + From<Cue>,
    {
        self.mark_phase(Phase::ProgressScan, host.timers);
        self.progress.start(host.timers.now(), host.clock);
        self.rotator.start(host.timers, self.timings.progress_total);
    }

    /// Moves to `next` if it lies ahead of the current phase. Exiting and
    /// Done are only reachable through [`Sequencer::exit`] and the hide cue.
    fn advance_to<E, R>(&mut self, next: Phase, host: &mut Host<'_, E, R>)
    where
        E: Clone + From<Cue>,
        R: Rng,
    {
        if next <= self.phase || self.phase >= Phase::Exiting {
            log::debug!("dropping stale transition to {:?}", next);
            return;
        }
        match next {
            Phase::NameReveal => self.enter_name_reveal(host),
            Phase::ProgressScan => self.enter_progress_scan(host),
            Phase::Boot | Phase::Exiting | Phase::Done => {}
        }
    }

    pub fn on_cue<E, R>(&mut self, cue: Cue, host: &mut Host<'_, E, R>)
    where
        E: Clone + From<Cue>,
        R: Rng,
    {
        match cue {
            Cue::BootLine(i) => {
                if self.phase == Phase::Boot && i < self.script.boot_lines.len() {
                    self.boot_log.push(i);
                }
            }
            Cue::Enter(next) => self.advance_to(next, host),
            Cue::LetterLand(i) => {
                if self.phase == Phase::NameReveal {
                    if let Some(l) = self.letters.get_mut(i) {
                        l.landed = true;
                    }
                }
            }
            Cue::GlowOn(i) => {
                if self.phase == Phase::NameReveal {
                    if let Some(l) = self.letters.get_mut(i) {
                        l.glowing = true;
                        host.timers
                            .after(self.timings.glow_hold, Cue::GlowOff(i).into());
                    }
                }
            }
            Cue::GlowOff(i) => {
                if let Some(l) = self.letters.get_mut(i) {
                    l.glowing = false;
                }
            }
            Cue::Subtitle => {
                if self.phase == Phase::NameReveal {
                    self.subtitle_visible = true;
                }
            }
            Cue::StatusFade => self.rotator.on_fade(host.timers),
            Cue::StatusSwap => self.rotator.on_swap(),
            Cue::Launch => {
                self.exit(ExitCause::Completion, host);
            }
            Cue::SafetyTimeout => {
                self.exit(ExitCause::SafetyTimeout, host);
            }
            Cue::Hide => self.hide(host.timers),
        }
    }

    /// User skip. Valid from any phase; a no-op once the exit ran.
    pub fn skip<E, R>(&mut self, host: &mut Host<'_, E, R>) -> bool
    where
        E: Clone + From<Cue>,
        R: Rng,
    {
        self.exit(ExitCause::Skip, host)
    }

    /// Tears the loader down: stops the rain and the progress loop, fires
    /// the shard burst, starts the wipe and schedules the final hide.
    /// Only the first call has any effect; it returns whether this call did.
    pub fn exit<E, R>(&mut self, cause: ExitCause, host: &mut Host<'_, E, R>) -> bool
    where
        E: Clone + From<Cue>,
        R: Rng,
    {
        if !self.latch.trip() {
            log::debug!("exit via {:?} ignored, already exiting", cause);
            return false;
        }
        log::info!(
            "intro exit via {:?} during {:?} at {}ms",
            cause,
            self.phase,
            host.timers.now().as_millis()
        );

        self.exit_cause = Some(cause);
        self.mark_phase(Phase::Exiting, host.timers);

        // The rain must release its frame slot before the burst takes one.
        self.rain.stop(host.clock);
        self.progress.stop(host.clock);
        self.rotator.halt(host.timers);

        let cfg = *self.burst.config();
        self.burst.spawn(
            cfg.count,
            Region::around_center(self.viewport, cfg.region),
            host.clock,
            host.rng,
        );

        self.wipe_started = Some(host.timers.now());
        host.timers.after(self.timings.wipe, Cue::Hide.into());
        true
    }

    fn hide<E: Clone>(&mut self, timers: &Timers<E>) {
        if self.phase != Phase::Exiting {
            return;
        }
        self.mark_phase(Phase::Done, timers);
        self.hidden = true;
        self.scroll_locked = false;
    }

    /// Per-frame work: rain, progress sampling and the shard burst, each
    /// only while its own loop is live.
    pub fn frame<E, R>(
        &mut self,
        host: &mut Host<'_, E, R>,
        loader: &mut Canvas,
        burst: &mut Canvas,
        accents: (Rgb, Rgb),
    ) where
        E: Clone + From<Cue>,
        R: Rng,
    {
        self.rain.frame(host.clock, loader, accents.0, host.rng);

        if let Some(tick) = self.progress.tick(host.timers.now(), host.clock) {
            self.progress.set_status_index(self.rotator.index());
            if let Tick::Complete(_) = tick {
                self.rotator.finish(host.timers);
                self.progress.set_status_index(self.rotator.index());
                host.timers
                    .after(self.timings.launch_grace, Cue::Launch.into());
            }
        }

        self.burst.frame(host.clock, burst, accents);
    }

    pub fn resize<R: Rng>(&mut self, viewport: Viewport, clock: &FrameClock, rng: &mut R) {
        self.viewport = viewport;
        if self.rain.is_running(clock) {
            self.rain.resize(viewport, rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    use crate::script::LineStyle;

    const ACCENTS: (Rgb, Rgb) = ((0, 240, 200), (255, 95, 126));
    const FRAME_MS: u64 = 16;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    struct Rig {
        seq: Sequencer,
        timers: Timers<Cue>,
        clock: FrameClock,
        rng: StdRng,
        loader: Canvas,
        burst: Canvas,
        now: Duration,
        phases: Vec<Phase>,
    }

    impl Rig {
        fn new(script: Script, timings: Timings) -> Self {
            let vp = Viewport::from_cells(80, 24);
            Self {
                seq: Sequencer::new(script, timings, vec!['0', '1'], BurstConfig::default(), vp),
                timers: Timers::new(),
                clock: FrameClock::new(),
                rng: StdRng::seed_from_u64(0xB007),
                loader: Canvas::new(80, 24),
                burst: Canvas::new(80, 24),
                now: Duration::ZERO,
                phases: vec![Phase::Boot],
            }
        }

        fn started(script: Script, timings: Timings) -> Self {
            let mut rig = Self::new(script, timings);
            rig.seq.start(&mut Host {
                timers: &mut rig.timers,
                clock: &mut rig.clock,
                rng: &mut rig.rng,
            });
            rig
        }

        fn dispatch_until(&mut self, t: Duration) {
            while let Some(cue) = self.timers.pop_due(t) {
                self.seq.on_cue(
                    cue,
                    &mut Host {
                        timers: &mut self.timers,
                        clock: &mut self.clock,
                        rng: &mut self.rng,
                    },
                );
                if self.phases.last() != Some(&self.seq.phase()) {
                    self.phases.push(self.seq.phase());
                }
            }
            self.timers.settle(t);
        }

        /// Advances in frame-sized steps, firing timers then a frame.
        fn run_to(&mut self, until: Duration) {
            while self.now < until {
                self.now = (self.now + ms(FRAME_MS)).min(until);
                self.dispatch_until(self.now);
                self.loader.clear();
                self.burst.clear();
                self.clock.tick();
                self.seq.frame(
                    &mut Host {
                        timers: &mut self.timers,
                        clock: &mut self.clock,
                        rng: &mut self.rng,
                    },
                    &mut self.loader,
                    &mut self.burst,
                    ACCENTS,
                );
            }
        }

        fn exit(&mut self, cause: ExitCause) -> bool {
            self.seq.exit(
                cause,
                &mut Host {
                    timers: &mut self.timers,
                    clock: &mut self.clock,
                    rng: &mut self.rng,
                },
            )
        }
    }

    #[test]
    fn full_run_visits_every_phase_in_order() {
        let mut rig = Rig::started(Script::default(), Timings::default());
        assert!(rig.seq.scroll_locked());
        assert!(rig.seq.rain_running(&rig.clock));

        rig.run_to(ms(12_000));
        assert_eq!(
            rig.phases,
            vec![
                Phase::Boot,
                Phase::NameReveal,
                Phase::ProgressScan,
                Phase::Exiting,
                Phase::Done
            ]
        );
        assert_eq!(rig.seq.exit_cause(), Some(ExitCause::Completion));
        assert!(rig.seq.is_hidden());
        assert!(!rig.seq.scroll_locked());
        assert!(!rig.seq.rain_running(&rig.clock));
    }

    #[test]
    fn boot_lines_render_in_fire_order() {
        let script = Script {
            boot_lines: vec![
                BootLine::new(LineStyle::Prompt, "third", 600),
                BootLine::new(LineStyle::Ok, "first", 100),
                BootLine::new(LineStyle::Dim, "second", 300),
            ],
            ..Script::default()
        };
        let mut rig = Rig::started(script, Timings::default());
        rig.dispatch_until(ms(350));
        let texts: Vec<_> = rig.seq.boot_log().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);

        rig.dispatch_until(ms(2000));
        let texts: Vec<_> = rig.seq.boot_log().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert_eq!(rig.seq.phase(), Phase::Boot);
    }

    #[test]
    fn boot_phase_length_ignores_line_count() {
        let script = Script {
            boot_lines: Vec::new(),
            ..Script::default()
        };
        let mut rig = Rig::started(script, Timings::default());
        rig.dispatch_until(ms(2349));
        assert_eq!(rig.seq.phase(), Phase::Boot);
        rig.dispatch_until(ms(2350));
        assert_eq!(rig.seq.phase(), Phase::NameReveal);
    }

    #[test]
    fn letters_land_in_index_order_with_bounded_tilt() {
        let mut rig = Rig::started(Script::default(), Timings::default());
        rig.dispatch_until(ms(2350));
        let letters = rig.seq.letters().to_vec();
        assert_eq!(letters.len(), 9);

        for (i, l) in letters.iter().enumerate() {
            assert!(l.tilt.abs() <= MAX_TILT_DEG);
            assert!(l.land_at >= ms(52) * i as u32);
            assert!(l.land_at < ms(52) * i as u32 + ms(24));
        }
        assert!(letters.windows(2).all(|w| w[0].land_at <= w[1].land_at));

        let last_land = letters.last().map(|l| l.land_at).unwrap_or_default();
        rig.dispatch_until(ms(2350) + last_land);
        assert!(rig.seq.letters().iter().all(|l| l.landed));
        assert!(!rig.seq.subtitle_visible());

        rig.dispatch_until(ms(2350 + 9 * 52 + 260));
        assert!(rig.seq.subtitle_visible());
    }

    #[test]
    fn wide_jitter_keeps_landing_order_and_glows_after_landing() {
        let timings = Timings {
            letter_jitter: ms(400),
            ..Timings::default()
        };
        let mut rig = Rig::started(Script::default(), timings);
        rig.dispatch_until(ms(2350));
        assert_eq!(rig.seq.phase(), Phase::NameReveal);

        let letters = rig.seq.letters().to_vec();
        assert!(letters.windows(2).all(|w| w[0].land_at <= w[1].land_at));

        let mut landed = Vec::new();
        let end = ms(2350 + 2300);
        while let Some(cue) = rig.timers.pop_due(end) {
            if let Cue::LetterLand(i) = cue {
                landed.push(i);
            }
            rig.seq.on_cue(
                cue,
                &mut Host {
                    timers: &mut rig.timers,
                    clock: &mut rig.clock,
                    rng: &mut rig.rng,
                },
            );
            if rig.seq.phase() != Phase::NameReveal {
                break;
            }
            assert!(rig
                .seq
                .letters()
                .iter()
                .all(|l| !l.glowing || l.landed));
        }
        assert_eq!(landed, (0..letters.len()).collect::<Vec<_>>());
    }

    #[test]
    fn glow_is_transient() {
        let mut rig = Rig::started(Script::default(), Timings::default());
        rig.dispatch_until(ms(2350 + 120));
        assert!(rig.seq.letters()[0].glowing);
        rig.dispatch_until(ms(2350 + 120 + 319));
        assert!(rig.seq.letters()[0].glowing);
        rig.dispatch_until(ms(2350 + 120 + 320));
        assert!(!rig.seq.letters()[0].glowing);
    }

    #[test]
    fn progress_completion_pins_final_status() {
        let mut rig = Rig::started(Script::default(), Timings::default());
        let scan_at = ms(2350 + 2300);
        rig.run_to(scan_at + ms(2600));

        let p = rig.seq.progress();
        assert_eq!(p.raw_percent, 100);
        assert_eq!(p.display_percent, 91.0);
        assert_eq!(p.status_index, 8);
        assert_eq!(rig.seq.status_text(), Some("Ready to launch"));
        assert!(rig.seq.status_visible());
        assert_eq!(rig.seq.phase(), Phase::ProgressScan);

        // The swap that was pending when the bar filled never lands.
        rig.run_to(scan_at + ms(2600 + 500));
        assert_eq!(rig.seq.status_text(), Some("Ready to launch"));
        assert_eq!(rig.seq.phase(), Phase::ProgressScan);
        rig.run_to(scan_at + ms(2600 + 620));
        assert_eq!(rig.seq.phase(), Phase::Exiting);
        assert_eq!(rig.seq.exit_cause(), Some(ExitCause::Completion));
    }

    #[test]
    fn skip_during_boot_jumps_straight_to_exit() {
        let mut rig = Rig::started(Script::default(), Timings::default());
        rig.run_to(ms(500));
        assert!(rig.exit(ExitCause::Skip));
        assert!(rig.seq.burst_running(&rig.clock));
        assert!(!rig.seq.rain_running(&rig.clock));

        rig.run_to(ms(20_000));
        assert_eq!(rig.phases, vec![Phase::Boot, Phase::Exiting, Phase::Done]);
        assert!(rig.seq.letters().is_empty());
        assert_eq!(rig.seq.exit_cause(), Some(ExitCause::Skip));
    }

    #[test]
    fn safety_timeout_rescues_a_stalled_sequence() {
        let mut rig = Rig::started(Script::default(), Timings::default());
        rig.timers.retain(|c| matches!(c, Cue::SafetyTimeout));

        rig.run_to(ms(8_999));
        assert_eq!(rig.seq.phase(), Phase::Boot);
        assert!(rig.seq.scroll_locked());

        rig.run_to(ms(9_000));
        assert_eq!(rig.seq.phase(), Phase::Exiting);
        assert_eq!(rig.seq.exit_cause(), Some(ExitCause::SafetyTimeout));

        rig.run_to(ms(9_950));
        assert!(rig.seq.is_done());
        assert!(rig.seq.is_hidden());
        assert!(!rig.seq.scroll_locked());
    }

    #[test]
    fn empty_script_still_finishes() {
        let script = Script {
            boot_lines: Vec::new(),
            name: String::new(),
            subtitle: String::new(),
            status_messages: Vec::new(),
        };
        let mut rig = Rig::started(script, Timings::default());
        rig.run_to(ms(12_000));
        assert!(rig.seq.is_done());
        assert_eq!(rig.seq.exit_cause(), Some(ExitCause::Completion));
        assert_eq!(rig.seq.status_text(), None);
    }

    #[test]
    fn wipe_progress_spans_the_wipe_duration() {
        let mut rig = Rig::started(Script::default(), Timings::default());
        assert_eq!(rig.seq.wipe_progress(ms(0)), None);
        rig.run_to(ms(1000));
        rig.exit(ExitCause::Skip);
        assert_eq!(rig.seq.wipe_progress(ms(1000)), Some(0.0));
        let half = rig.seq.wipe_progress(ms(1475)).unwrap_or_default();
        assert!((half - 0.5).abs() < 1e-3);
        assert_eq!(rig.seq.wipe_progress(ms(5000)), Some(1.0));
    }

    fn cause_strategy() -> impl Strategy<Value = ExitCause> {
        prop_oneof![
            Just(ExitCause::Skip),
            Just(ExitCause::Completion),
            Just(ExitCause::SafetyTimeout),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn exit_takes_effect_exactly_once(
            causes in prop::collection::vec(cause_strategy(), 1..8),
            at in 0u64..7_700,
        ) {
            let mut rig = Rig::started(Script::default(), Timings::default());
            rig.run_to(ms(at));

            let effective: Vec<bool> = causes.iter().map(|&c| rig.exit(c)).collect();
            let first_live = effective.iter().position(|&e| e);
            let expected_cause = rig.seq.exit_cause();

            prop_assert_eq!(effective.iter().filter(|&&e| e).count(), 1);
            prop_assert_eq!(first_live, Some(0));
            prop_assert_eq!(expected_cause, Some(causes[0]));
            prop_assert_eq!(rig.seq.shards().len(), 130);
            prop_assert_eq!(rig.timers.count_where(|c| *c == Cue::Hide), 1);
            prop_assert!(!rig.seq.rain_running(&rig.clock));
            prop_assert_eq!(rig.clock.live_count(), 1);

            // Later timeouts and launches stay inert too.
            rig.run_to(ms(at + 10_000));
            prop_assert!(rig.seq.is_done());
            prop_assert_eq!(rig.seq.exit_cause(), Some(causes[0]));
        }
    }
}
