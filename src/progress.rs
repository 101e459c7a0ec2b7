// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

use crate::clock::{FrameClock, FrameHandle, TimerId, Timers};
use crate::sequencer::Cue;

/// Past this raw percentage the bar slows down.
pub const EASE_BREAK: u8 = 80;
/// Rate of the bar past [`EASE_BREAK`], relative to the true progress.
pub const EASE_FACTOR: f32 = 0.55;

pub fn raw_percent(elapsed: Duration, duration: Duration) -> u8 {
    if duration.is_zero() {
        return 100;
    }
    let ratio = elapsed.as_secs_f64() / duration.as_secs_f64();
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Width of the visible bar for a raw percentage. The numeric label keeps
/// showing the raw value.
pub fn display_percent(raw: u8) -> f32 {
    let raw = raw.min(100);
    if raw < EASE_BREAK {
        raw as f32
    } else {
        EASE_BREAK as f32 + (raw - EASE_BREAK) as f32 * EASE_FACTOR
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressState {
    pub elapsed: Duration,
    pub raw_percent: u8,
    pub display_percent: f32,
    pub status_index: usize,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            elapsed: Duration::ZERO,
            raw_percent: 0,
            display_percent: 0.0,
            status_index: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tick {
    Running(ProgressState),
    Complete(ProgressState),
}

/// Maps time since phase entry to a percentage, once per frame.
pub struct ProgressDriver {
    duration: Duration,
    started: Duration,
    state: ProgressState,
    handle: Option<FrameHandle>,
}

impl ProgressDriver {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            started: Duration::ZERO,
            state: ProgressState::default(),
            handle: None,
        }
    }

    pub fn state(&self) -> ProgressState {
        self.state
    }

    pub fn is_running(&self, clock: &FrameClock) -> bool {
        self.handle.as_ref().is_some_and(|h| clock.is_live(h))
    }

    pub fn start(&mut self, now: Duration, clock: &mut FrameClock) {
        if self.handle.is_some() {
            return;
        }
        self.started = now;
        self.state = ProgressState::default();
        self.handle = Some(clock.request());
    }

    pub fn stop(&mut self, clock: &mut FrameClock) {
        if let Some(h) = self.handle.take() {
            clock.cancel(h);
        }
    }

    pub fn set_status_index(&mut self, index: usize) {
        self.state.status_index = index;
    }

    /// Samples the curve at `now`. Reaching 100% releases the frame handle,
    /// so `Complete` is reported exactly once.
    pub fn tick(&mut self, now: Duration, clock: &mut FrameClock) -> Option<Tick> {
        if !self.is_running(clock) {
            return None;
        }
        let elapsed = now.saturating_sub(self.started);
        let raw = raw_percent(elapsed, self.duration).max(self.state.raw_percent);
        self.state.elapsed = elapsed;
        self.state.raw_percent = raw;
        self.state.display_percent = display_percent(raw);

        if raw >= 100 {
            self.stop(clock);
            Some(Tick::Complete(self.state))
        } else {
            Some(Tick::Running(self.state))
        }
    }
}

/// Cycles status messages on a fixed period, independent of the bar easing.
/// Each step fades the label out, then swaps the text in after a short delay.
pub struct StatusRotator {
    messages: Vec<String>,
    fade: Duration,
    next: usize,
    text: Option<String>,
    visible: bool,
    interval: Option<TimerId>,
    swap: Option<TimerId>,
}

impl StatusRotator {
    pub fn new(messages: Vec<String>, fade: Duration) -> Self {
        Self {
            messages,
            fade,
            next: 0,
            text: None,
            visible: true,
            interval: None,
            swap: None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Index of the next message to show; equals the message count once the
    /// final text is in place.
    pub fn index(&self) -> usize {
        self.next
    }

    pub fn period(&self, total: Duration) -> Option<Duration> {
        if self.messages.is_empty() {
            return None;
        }
        Some(total / self.messages.len() as u32)
    }

    pub fn start<E: Clone + From<Cue>>(&mut self, timers: &mut Timers<E>, total: Duration) {
        if self.interval.is_some() {
            return;
        }
        if let Some(period) = self.period(total) {
            self.interval = Some(timers.every(period, Cue::StatusFade.into()));
        }
    }

    pub fn on_fade<E: Clone + From<Cue>>(&mut self, timers: &mut Timers<E>) {
        if self.interval.is_none() || self.next >= self.messages.len() {
            return;
        }
        self.visible = false;
        if let Some(id) = self.swap.take() {
            timers.cancel(id);
        }
        self.swap = Some(timers.after(self.fade, Cue::StatusSwap.into()));
    }

    pub fn on_swap(&mut self) {
        self.swap = None;
        if let Some(msg) = self.messages.get(self.next) {
            self.text = Some(msg.clone());
            self.next += 1;
        }
        self.visible = true;
    }

    /// Stops rotating and pins the final message, whatever step was pending.
    pub fn finish<E: Clone>(&mut self, timers: &mut Timers<E>) {
        self.halt(timers);
        if let Some(last) = self.messages.last() {
            self.text = Some(last.clone());
            self.next = self.messages.len();
        }
        self.visible = true;
    }

    /// Stops rotating and leaves the label as it is.
    pub fn halt<E: Clone>(&mut self, timers: &mut Timers<E>) {
        if let Some(id) = self.interval.take() {
            timers.cancel(id);
        }
        if let Some(id) = self.swap.take() {
            timers.cancel(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn display_percent_tail_is_compressed() {
        assert_eq!(display_percent(100), 91.0);
        assert_eq!(display_percent(80), 80.0);
        assert_eq!(display_percent(79), 79.0);
        assert_eq!(display_percent(90), 85.5);
    }

    #[test]
    fn raw_percent_rounds_and_caps() {
        let d = ms(2600);
        assert_eq!(raw_percent(ms(0), d), 0);
        assert_eq!(raw_percent(ms(26), d), 1);
        assert_eq!(raw_percent(ms(1300), d), 50);
        assert_eq!(raw_percent(ms(2600), d), 100);
        assert_eq!(raw_percent(ms(9000), d), 100);
        assert_eq!(raw_percent(ms(5), Duration::ZERO), 100);
    }

    #[test]
    fn driver_completes_once_and_releases_handle() {
        let mut clock = FrameClock::new();
        let mut d = ProgressDriver::new(ms(2600));
        d.start(ms(1000), &mut clock);

        match d.tick(ms(2300), &mut clock) {
            Some(Tick::Running(s)) => {
                assert_eq!(s.raw_percent, 50);
                assert_eq!(s.elapsed, ms(1300));
            }
            other => panic!("unexpected {:?}", other),
        }
        match d.tick(ms(3600), &mut clock) {
            Some(Tick::Complete(s)) => {
                assert_eq!(s.raw_percent, 100);
                assert_eq!(s.display_percent, 91.0);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(d.tick(ms(4000), &mut clock), None);
        assert_eq!(clock.live_count(), 0);
    }

    #[test]
    fn raw_percent_never_goes_backwards() {
        let mut clock = FrameClock::new();
        let mut d = ProgressDriver::new(ms(1000));
        d.start(ms(0), &mut clock);
        d.tick(ms(600), &mut clock);
        let Some(Tick::Running(s)) = d.tick(ms(300), &mut clock) else {
            panic!("driver stopped early");
        };
        assert_eq!(s.raw_percent, 60);
    }

    #[test]
    fn rotator_period_and_final_message() {
        let msgs: Vec<String> = (1..=8).map(|i| format!("step {}", i)).collect();
        let mut timers: Timers<Cue> = Timers::new();
        let mut r = StatusRotator::new(msgs, ms(140));
        assert_eq!(r.period(ms(2600)), Some(ms(325)));
        r.start(&mut timers, ms(2600));

        while let Some(cue) = timers.pop_due(ms(2600)) {
            match cue {
                Cue::StatusFade => r.on_fade(&mut timers),
                Cue::StatusSwap => r.on_swap(),
                _ => {}
            }
        }
        // The eighth swap would land at 2740ms; completion pins it first.
        assert_eq!(r.text(), Some("step 7"));
        assert!(!r.is_visible());

        r.finish(&mut timers);
        assert_eq!(r.text(), Some("step 8"));
        assert!(r.is_visible());
        assert_eq!(r.index(), 8);
        assert_eq!(timers.pop_due(ms(60_000)), None);
    }

    #[test]
    fn rotator_without_messages_stays_idle() {
        let mut timers: Timers<Cue> = Timers::new();
        let mut r = StatusRotator::new(Vec::new(), ms(140));
        r.start(&mut timers, ms(2600));
        assert_eq!(timers.next_due(), None);
        r.finish(&mut timers);
        assert_eq!(r.text(), None);
    }

    proptest! {
        #[test]
        fn below_break_display_equals_raw(raw in 0u8..80) {
            prop_assert_eq!(display_percent(raw), raw as f32);
        }

        #[test]
        fn above_break_display_is_eased(raw in 80u8..=100) {
            let expected = 80.0 + (raw - 80) as f32 * 0.55;
            prop_assert!((display_percent(raw) - expected).abs() < 1e-4);
            prop_assert!(display_percent(raw) <= raw as f32);
        }
    }
}
