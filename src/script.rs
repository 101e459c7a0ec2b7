// Copyright (c) 2026 rezky_nightky

//! Authored content and timing of the intro.

use std::fmt;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineStyle {
    Prompt,
    Dim,
    Ok,
    Warn,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootLine {
    pub style: LineStyle,
    pub text: String,
    /// Offset from boot phase entry.
    pub delay: Duration,
}

impl BootLine {
    pub fn new(style: LineStyle, text: &str, delay_ms: u64) -> Self {
        Self {
            style,
            text: text.to_string(),
            delay: Duration::from_millis(delay_ms),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Script {
    pub boot_lines: Vec<BootLine>,
    pub name: String,
    pub subtitle: String,
    pub status_messages: Vec<String>,
}

impl Default for Script {
    fn default() -> Self {
        use LineStyle::*;
        Self {
            boot_lines: vec![
                BootLine::new(Prompt, "$ ./boot.sh --env=production", 0),
                BootLine::new(Dim, "Initialising runtime environment...", 320),
                BootLine::new(Ok, "+  rustc 1.81 toolchain       [OK]", 580),
                BootLine::new(Ok, "+  crossterm backend loaded   [OK]", 760),
                BootLine::new(Ok, "+  frame clock synchronised   [OK]", 920),
                BootLine::new(Ok, "+  particle field seeded      [OK]", 1080),
                BootLine::new(Warn, "!  Compiling shaders...", 1240),
                BootLine::new(Ok, "+  Bundle: 142 kb             [OK]", 1420),
                BootLine::new(Ok, "+  shard cannon armed         [READY]", 1620),
                BootLine::new(Prompt, "$ Launching...", 1840),
            ],
            name: "BOOTSTRIX".to_string(),
            subtitle: "terminal intro sequencer".to_string(),
            status_messages: [
                "Loading experience data...",
                "Compiling skill modules...",
                "Mounting components...",
                "Authenticating session...",
                "Optimising bundle...",
                "Injecting passion...",
                "Adding coffee.exe...",
                "Ready to launch",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Script {
    /// Glyphs that take part in the name reveal; blanks only space them out.
    pub fn letter_count(&self) -> usize {
        self.name.chars().filter(|c| !c.is_whitespace()).count()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timings {
    pub boot_total: Duration,
    pub name_total: Duration,
    pub letter_step: Duration,
    pub letter_jitter: Duration,
    pub glow_offset: Duration,
    pub glow_hold: Duration,
    pub subtitle_delay: Duration,
    pub progress_total: Duration,
    pub status_fade: Duration,
    pub launch_grace: Duration,
    pub wipe: Duration,
    pub safety: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        let ms = Duration::from_millis;
        Self {
            boot_total: ms(2350),
            name_total: ms(2300),
            letter_step: ms(52),
            letter_jitter: ms(24),
            glow_offset: ms(120),
            glow_hold: ms(320),
            subtitle_delay: ms(260),
            progress_total: ms(2600),
            status_fade: ms(140),
            launch_grace: ms(550),
            wipe: ms(950),
            safety: ms(9000),
        }
    }
}

/// An authored schedule that outruns the phase meant to contain it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimingWarning {
    SubtitleCutOff { at: Duration, phase: Duration },
    GlowCutOff { at: Duration, phase: Duration },
    JitterOverlapsStep { jitter: Duration, step: Duration },
    SafetyBeforeScript { safety: Duration, script: Duration },
}

impl fmt::Display for TimingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimingWarning::SubtitleCutOff { at, phase } => write!(
                f,
                "subtitle reveal at {}ms falls after the {}ms name phase",
                at.as_millis(),
                phase.as_millis()
            ),
            TimingWarning::GlowCutOff { at, phase } => write!(
                f,
                "last letter glow ends at {}ms, after the {}ms name phase",
                at.as_millis(),
                phase.as_millis()
            ),
            TimingWarning::JitterOverlapsStep { jitter, step } => write!(
                f,
                "letter jitter {}ms is not below the {}ms step; letters may land out of order",
                jitter.as_millis(),
                step.as_millis()
            ),
            TimingWarning::SafetyBeforeScript { safety, script } => write!(
                f,
                "safety timeout {}ms cuts the {}ms script short",
                safety.as_millis(),
                script.as_millis()
            ),
        }
    }
}

impl Timings {
    /// Offset of the subtitle reveal from name phase entry.
    pub fn subtitle_at(&self, letters: usize) -> Duration {
        self.letter_step * letters as u32 + self.subtitle_delay
    }

    /// Offset of a letter's glow from name phase entry. A glow never starts
    /// before its letter has landed.
    pub fn glow_at(&self, index: usize, land_at: Duration) -> Duration {
        land_at.max(self.letter_step * index as u32 + self.glow_offset)
    }

    /// Natural length of the whole script, up to the exit trigger.
    pub fn script_total(&self) -> Duration {
        self.boot_total + self.name_total + self.progress_total + self.launch_grace
    }

    /// Checks the hand-authored constants against each other. Violations are
    /// warnings: the sequence still runs, it just may cut effects short.
    pub fn audit(&self, letters: usize) -> Vec<TimingWarning> {
        let mut out = Vec::new();

        let subtitle = self.subtitle_at(letters);
        if subtitle > self.name_total {
            out.push(TimingWarning::SubtitleCutOff {
                at: subtitle,
                phase: self.name_total,
            });
        }

        if letters > 0 {
            let last = letters - 1;
            let latest_land = self.letter_step * last as u32 + self.letter_jitter;
            let glow_end = self.glow_at(last, latest_land) + self.glow_hold;
            if glow_end > self.name_total {
                out.push(TimingWarning::GlowCutOff {
                    at: glow_end,
                    phase: self.name_total,
                });
            }
        }

        if letters > 1 && self.letter_jitter >= self.letter_step {
            out.push(TimingWarning::JitterOverlapsStep {
                jitter: self.letter_jitter,
                step: self.letter_step,
            });
        }

        if self.safety < self.script_total() {
            out.push(TimingWarning::SafetyBeforeScript {
                safety: self.safety,
                script: self.script_total(),
            });
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_is_consistent() {
        let script = Script::default();
        let t = Timings::default();
        assert_eq!(script.boot_lines.len(), 10);
        assert_eq!(script.status_messages.len(), 8);
        assert!(t.audit(script.letter_count()).is_empty());
        assert_eq!(t.script_total(), Duration::from_millis(7800));
    }

    #[test]
    fn long_names_overflow_the_name_phase() {
        let t = Timings::default();
        let warnings = t.audit(40);
        assert!(warnings.contains(&TimingWarning::SubtitleCutOff {
            at: Duration::from_millis(40 * 52 + 260),
            phase: t.name_total,
        }));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, TimingWarning::GlowCutOff { .. })));
    }

    #[test]
    fn glow_waits_for_a_late_landing() {
        let ms = Duration::from_millis;
        let t = Timings {
            letter_jitter: ms(400),
            name_total: ms(1000),
            ..Timings::default()
        };
        assert_eq!(t.glow_at(2, ms(110)), ms(2 * 52 + 120));
        assert_eq!(t.glow_at(2, ms(500)), ms(500));

        let w = t.audit(9);
        assert!(w.contains(&TimingWarning::GlowCutOff {
            at: ms(8 * 52 + 400 + 320),
            phase: ms(1000),
        }));
        assert!(w
            .iter()
            .any(|w| matches!(w, TimingWarning::JitterOverlapsStep { .. })));
    }

    #[test]
    fn short_safety_is_flagged() {
        let t = Timings {
            safety: Duration::from_millis(3000),
            ..Timings::default()
        };
        let w = t.audit(5);
        assert_eq!(w.len(), 1);
        assert!(w[0].to_string().contains("3000ms"));
    }

    #[test]
    fn letter_count_skips_blanks() {
        let s = Script {
            name: "AB C".to_string(),
            ..Script::default()
        };
        assert_eq!(s.letter_count(), 3);
    }
}
