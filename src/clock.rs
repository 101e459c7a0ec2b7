// Copyright (c) 2026 rezky_nightky

//! Virtual time for the intro.
//!
//! Everything the sequencer schedules goes through [`Timers`], a single
//! cooperative queue of one-shot and repeating timers keyed by their fire
//! time. Continuous loops hold a [`FrameHandle`] from the [`FrameClock`];
//! a loop only advances while its handle is live, and stopping it consumes
//! the handle.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Clone, Debug)]
struct Slot<E> {
    at: Duration,
    period: Option<Duration>,
    event: E,
}

pub struct Timers<E> {
    now: Duration,
    next_id: u64,
    queue: BinaryHeap<Reverse<(Duration, u64)>>,
    slots: HashMap<u64, Slot<E>>,
}

impl<E: Clone> Timers<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 1,
            queue: BinaryHeap::new(),
            slots: HashMap::new(),
        }
    }

    /// Time of the most recently dispatched timer, or the last settled time.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn after(&mut self, delay: Duration, event: E) -> TimerId {
        self.insert(self.now + delay, None, event)
    }

    /// Repeats every `period`, first firing one period from now.
    pub fn every(&mut self, period: Duration, event: E) -> TimerId {
        let period = period.max(Duration::from_millis(1));
        self.insert(self.now + period, Some(period), event)
    }

    fn insert(&mut self, at: Duration, period: Option<Duration>, event: E) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.queue.push(Reverse((at, id)));
        self.slots.insert(id, Slot { at, period, event });
        TimerId(id)
    }

    /// Returns false when the timer already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.slots.remove(&id.0).is_some()
    }

    #[cfg(test)]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.slots.contains_key(&id.0)
    }

    #[cfg(test)]
    pub fn next_due(&self) -> Option<Duration> {
        self.slots.values().map(|s| s.at).min()
    }

    #[cfg(test)]
    pub fn count_where(&self, pred: impl Fn(&E) -> bool) -> usize {
        self.slots.values().filter(|s| pred(&s.event)).count()
    }

    /// Pops the earliest timer due at or before `until` and moves `now` to
    /// its fire time. Repeating timers are re-armed before returning.
    pub fn pop_due(&mut self, until: Duration) -> Option<E> {
        while let Some(&Reverse((at, id))) = self.queue.peek() {
            if at > until {
                return None;
            }
            self.queue.pop();

            let Some(slot) = self.slots.get_mut(&id) else {
                continue;
            };
            if slot.at != at {
                continue;
            }

            self.now = self.now.max(at);
            match slot.period {
                Some(period) => {
                    let event = slot.event.clone();
                    slot.at = at + period;
                    self.queue.push(Reverse((slot.at, id)));
                    return Some(event);
                }
                None => {
                    return self.slots.remove(&id).map(|s| s.event);
                }
            }
        }
        None
    }

    /// Moves `now` forward after all due timers were drained.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    #[cfg(test)]
    pub fn retain(&mut self, keep: impl Fn(&E) -> bool) {
        self.slots.retain(|_, s| keep(&s.event));
    }
}

impl<E: Clone> Default for Timers<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancellation handle for one continuous per-frame loop.
#[derive(Debug, PartialEq, Eq)]
pub struct FrameHandle(u64);

#[derive(Debug, Default)]
pub struct FrameClock {
    next_id: u64,
    live: Vec<u64>,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self) -> FrameHandle {
        self.next_id += 1;
        self.live.push(self.next_id);
        FrameHandle(self.next_id)
    }

    pub fn cancel(&mut self, handle: FrameHandle) {
        self.live.retain(|&id| id != handle.0);
    }

    pub fn is_live(&self, handle: &FrameHandle) -> bool {
        self.live.contains(&handle.0)
    }

    #[cfg(test)]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn tick(&mut self) -> u64 {
        self.frames += 1;
        self.frames
    }
}

/// Coalesces bursts of events into one delivery `delay` after the last.
#[derive(Debug)]
pub struct Debounce {
    delay: Duration,
    pending: Option<TimerId>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn arm<E: Clone>(&mut self, timers: &mut Timers<E>, event: E) {
        if let Some(id) = self.pending.take() {
            timers.cancel(id);
        }
        self.pending = Some(timers.after(self.delay, event));
    }

    pub fn fired(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn timers_fire_by_time_not_insertion_order() {
        let mut t = Timers::new();
        t.after(ms(300), "late");
        t.after(ms(100), "early");
        t.after(ms(200), "middle");

        let mut got = Vec::new();
        while let Some(e) = t.pop_due(ms(1000)) {
            got.push((e, t.now()));
        }
        assert_eq!(
            got,
            vec![("early", ms(100)), ("middle", ms(200)), ("late", ms(300))]
        );
    }

    #[test]
    fn pop_due_stops_at_horizon() {
        let mut t = Timers::new();
        t.after(ms(50), 1);
        t.after(ms(150), 2);
        assert_eq!(t.pop_due(ms(100)), Some(1));
        assert_eq!(t.pop_due(ms(100)), None);
        t.settle(ms(100));
        assert_eq!(t.now(), ms(100));
        assert_eq!(t.next_due(), Some(ms(150)));
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut t = Timers::new();
        let id = t.after(ms(10), 'x');
        assert!(t.cancel(id));
        assert!(!t.cancel(id));
        assert_eq!(t.pop_due(ms(100)), None);
    }

    #[test]
    fn interval_rearms_until_cancelled() {
        let mut t = Timers::new();
        let id = t.every(ms(325), ());
        let mut fires = 0;
        while t.pop_due(ms(2600)).is_some() {
            fires += 1;
        }
        assert_eq!(fires, 8);
        assert!(t.is_pending(id));
        t.cancel(id);
        assert_eq!(t.pop_due(ms(10_000)), None);
    }

    #[test]
    fn timers_scheduled_inside_dispatch_use_dispatch_time() {
        let mut t = Timers::new();
        t.after(ms(100), 0u8);
        assert_eq!(t.pop_due(ms(1000)), Some(0));
        t.after(ms(100), 1u8);
        assert_eq!(t.pop_due(ms(1000)), Some(1));
        assert_eq!(t.now(), ms(200));
    }

    #[test]
    fn frame_handles_are_independent() {
        let mut clock = FrameClock::new();
        let a = clock.request();
        let b = clock.request();
        assert!(clock.is_live(&a) && clock.is_live(&b));
        clock.cancel(a);
        assert!(clock.is_live(&b));
        assert_eq!(clock.live_count(), 1);
    }

    #[test]
    fn debounce_keeps_only_last_event() {
        let mut t = Timers::new();
        let mut d = Debounce::new(ms(150));
        d.arm(&mut t, 1);
        t.settle(ms(100));
        d.arm(&mut t, 2);
        t.settle(ms(200));
        d.arm(&mut t, 3);

        assert_eq!(t.pop_due(ms(300)), None);
        assert_eq!(t.pop_due(ms(350)), Some(3));
        d.fired();
        assert_eq!(t.pop_due(ms(10_000)), None);
    }
}
