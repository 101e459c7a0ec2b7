// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

use crate::canvas::Canvas;
use crate::cell::Ink;
use crate::palette::Palette;
use crate::script::LineStyle;
use crate::sequencer::{Phase, Sequencer, MAX_TILT_DEG};

const WINDOW_MAX_W: u16 = 64;
const BAR_MAX_W: u16 = 48;
/// Rows a letter at full tilt sits away from the baseline.
const FLY_ROWS: f32 = 3.0;
const SCAN_PERIOD: Duration = Duration::from_millis(1800);
const SKIP_HINT: &str = "[esc] skip";

/// Draws the view of the active phase on top of whatever the rain left in
/// `canvas`.
pub fn loader(seq: &Sequencer, now: Duration, canvas: &mut Canvas, pal: &Palette) {
    if canvas.width == 0 || canvas.height == 0 {
        return;
    }
    match seq.phase() {
        Phase::Boot => boot_window(seq, now, canvas, pal),
        Phase::NameReveal => name_reveal(seq, canvas, pal),
        Phase::ProgressScan => progress_scan(seq, now, canvas, pal),
        Phase::Exiting | Phase::Done => return,
    }
    skip_hint(canvas, pal);
}

fn boot_window(seq: &Sequencer, now: Duration, canvas: &mut Canvas, pal: &Palette) {
    let w = canvas.width.saturating_sub(4).min(WINDOW_MAX_W);
    let h = canvas.height.saturating_sub(2).min(14);
    if w < 12 || h < 4 {
        // Too small for chrome; just list the tail of the log.
        let lines: Vec<_> = seq.boot_log().collect();
        let skip = lines.len().saturating_sub(canvas.height as usize);
        for (row, line) in lines.iter().skip(skip).enumerate() {
            let rgb = line_rgb(line.style, pal);
            canvas.text(0, row as u16, &line.text, rgb, 1.0, false);
        }
        return;
    }

    let x0 = (canvas.width - w) / 2;
    let y0 = (canvas.height - h) / 2;
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            canvas.plot(x, y, Ink::new(' ', pal.text, 1.0));
        }
    }

    let rule: String = "─".repeat(w as usize);
    canvas.text(x0, y0, &rule, pal.dim, 0.8, false);
    canvas.text(x0, y0 + h - 1, &rule, pal.dim, 0.8, false);
    canvas.text(x0 + 1, y0, " ● ● ● ", pal.accent_b, 0.9, false);
    canvas.text(x0 + 9, y0, " boot.sh ", pal.dim, 1.0, false);

    let body_h = (h - 2) as usize;
    let lines: Vec<_> = seq.boot_log().collect();
    let skip = lines.len().saturating_sub(body_h.saturating_sub(1));
    let mut row = y0 + 1;
    for line in lines.iter().skip(skip) {
        let text: String = line.text.chars().take((w - 2) as usize).collect();
        let bold = line.style == LineStyle::Prompt;
        canvas.text(x0 + 1, row, &text, line_rgb(line.style, pal), 1.0, bold);
        row += 1;
    }

    if (now.as_millis() / 500) % 2 == 0 && row < y0 + h - 1 {
        canvas.text(x0 + 1, row, "_", pal.accent_a, 1.0, true);
    }
}

fn line_rgb(style: LineStyle, pal: &Palette) -> (u8, u8, u8) {
    match style {
        LineStyle::Prompt => pal.accent_a,
        LineStyle::Dim => pal.dim,
        LineStyle::Ok => pal.ok,
        LineStyle::Warn => pal.warn,
    }
}

fn name_reveal(seq: &Sequencer, canvas: &mut Canvas, pal: &Palette) {
    let script = seq.script();
    let span = u16::try_from(script.name.chars().count())
        .unwrap_or(u16::MAX)
        .saturating_mul(2);
    let x0 = canvas.width.saturating_sub(span) / 2;
    let base = canvas.height / 2;

    for l in seq.letters() {
        let slot = u16::try_from(l.slot).unwrap_or(u16::MAX);
        let x = x0.saturating_add(slot.saturating_mul(2));
        if l.landed {
            let (rgb, bold) = if l.glowing {
                (pal.accent_b, true)
            } else {
                (pal.accent_a, false)
            };
            canvas.plot(x, base, Ink::new(l.glyph, rgb, 1.0).bold(bold));
        } else {
            let lift = (l.tilt / MAX_TILT_DEG * FLY_ROWS).round() as i32;
            let y = base as i32 + lift;
            if y >= 0 {
                canvas.plot(x, y as u16, Ink::new(l.glyph, pal.accent_a, 0.3));
            }
        }
    }

    if seq.subtitle_visible() {
        let sub = &script.subtitle;
        let sx = canvas.width.saturating_sub(sub.chars().count() as u16) / 2;
        canvas.text(sx, base.saturating_add(2), sub, pal.dim, 1.0, false);
    }
}

fn progress_scan(seq: &Sequencer, now: Duration, canvas: &mut Canvas, pal: &Palette) {
    let elapsed = seq.phase_elapsed(now);
    let sweep = (elapsed.as_millis() % SCAN_PERIOD.as_millis()) as f32
        / SCAN_PERIOD.as_millis() as f32;
    let scan_y = (sweep * canvas.height as f32) as u16;
    for x in 0..canvas.width {
        canvas.plot_max(x, scan_y, Ink::new('─', pal.accent_a, 0.18));
    }

    let state = seq.progress();
    let bar_w = canvas.width.saturating_sub(12).min(BAR_MAX_W);
    let y = canvas.height / 2;
    if bar_w >= 4 {
        let x0 = (canvas.width - bar_w - 6) / 2;
        let filled = ((state.display_percent / 100.0) * bar_w as f32).round() as u16;
        for i in 0..bar_w {
            let ink = if i < filled {
                Ink::new('█', pal.accent_a, 1.0)
            } else {
                Ink::new('░', pal.dim, 0.5)
            };
            canvas.plot(x0 + i, y, ink);
        }
        let label = format!("{:>3}%", state.raw_percent);
        canvas.text(x0 + bar_w + 2, y, &label, pal.text, 1.0, true);
    }

    if let Some(status) = seq.status_text() {
        let alpha = if seq.status_visible() { 1.0 } else { 0.25 };
        let sx = canvas.width.saturating_sub(status.chars().count() as u16) / 2;
        canvas.text(sx, y + 2, status, pal.dim, alpha, false);
    }
}

fn skip_hint(canvas: &mut Canvas, pal: &Palette) {
    let n = SKIP_HINT.len() as u16;
    if canvas.width > n + 1 && canvas.height > 1 {
        let x = canvas.width - n - 1;
        let y = canvas.height - 1;
        canvas.text(x, y, SKIP_HINT, pal.dim, 0.7, false);
    }
}

/// Whether the loader still covers cell `(x, y)` at wipe progress `p`. The
/// reveal sweeps diagonally from the top-left corner.
pub fn wipe_covers(p: f32, x: u16, y: u16, width: u16, height: u16) -> bool {
    if width == 0 || height == 0 {
        return false;
    }
    let d = (x as f32 / width as f32 + y as f32 / height as f32) * 0.5;
    d >= p
}
