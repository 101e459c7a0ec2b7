// Copyright (c) 2026 rezky_nightky

//! The content that sits behind the loader: a centered, bordered panel
//! over the ambient particle field. It only scrolls once the loader is gone.

use crate::canvas::Canvas;
use crate::cell::Rgb;

const PAD_X: u16 = 2;
const PAD_Y: u16 = 1;

pub struct Page {
    title: String,
    subtitle: String,
    body: String,
    border: bool,
    lines: Vec<Vec<char>>,
    cols: u16,
    rows: u16,
    scroll: usize,
    /// Cells the title shadow is pushed sideways while glitching.
    glitch: Option<i16>,
}

impl Page {
    pub fn new(title: &str, subtitle: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            body: body.to_string(),
            border: true,
            lines: Vec::new(),
            cols: 0,
            rows: 0,
            scroll: 0,
            glitch: None,
        }
    }

    pub fn set_border(&mut self, on: bool) {
        self.border = on;
        self.layout(self.cols, self.rows);
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn set_glitch(&mut self, shift: Option<i16>) {
        self.glitch = shift;
    }

    #[cfg(test)]
    pub fn glitch(&self) -> Option<i16> {
        self.glitch
    }

    fn border_w(&self) -> u16 {
        if self.border {
            1
        } else {
            0
        }
    }

    fn max_content(&self) -> (u16, u16) {
        let b = self.border_w();
        let w = self
            .cols
            .saturating_sub(2 * b)
            .saturating_sub(2 * PAD_X);
        let h = self
            .rows
            .saturating_sub(2 * b)
            .saturating_sub(2 * PAD_Y);
        (w, h)
    }

    /// Wraps the content to the viewport. Keeps the scroll offset when it
    /// still fits.
    pub fn layout(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.lines.clear();

        let (max_w, _) = self.max_content();
        if max_w == 0 {
            return;
        }

        let mut raw: Vec<&str> = vec![self.title.as_str(), self.subtitle.as_str(), ""];
        raw.extend(self.body.split('\n'));
        for line in raw {
            let chars: Vec<char> = line.chars().collect();
            if chars.is_empty() {
                self.lines.push(Vec::new());
                continue;
            }
            for chunk in chars.chunks(max_w as usize) {
                self.lines.push(chunk.to_vec());
            }
        }
        self.scroll = self.scroll.min(self.max_scroll());
    }

    pub fn max_scroll(&self) -> usize {
        let (_, max_h) = self.max_content();
        self.lines.len().saturating_sub(max_h as usize)
    }

    /// Moves the view. Returns false while locked or when nothing moved.
    pub fn scroll_by(&mut self, delta: isize, locked: bool) -> bool {
        if locked {
            return false;
        }
        let next = self
            .scroll
            .saturating_add_signed(delta)
            .min(self.max_scroll());
        let moved = next != self.scroll;
        self.scroll = next;
        moved
    }

    /// `shadow` tints the two title offsets drawn during a glitch.
    pub fn draw(
        &self,
        canvas: &mut Canvas,
        text: Rgb,
        accent: Rgb,
        frame_rgb: Rgb,
        shadow: (Rgb, Rgb),
    ) {
        let (max_w, max_h) = self.max_content();
        if max_w == 0 || max_h == 0 || self.lines.is_empty() {
            return;
        }
        let b = self.border_w();

        let visible = &self.lines[self.scroll..];
        let content_h = visible.len().min(max_h as usize) as u16;
        let content_w = self
            .lines
            .iter()
            .map(|l| l.len())
            .max()
            .unwrap_or(0)
            .clamp(1, max_w as usize) as u16;

        let box_w = content_w + 2 * b + 2 * PAD_X;
        let box_h = content_h + 2 * b + 2 * PAD_Y;
        let x0 = self.cols / 2 - box_w / 2;
        let y0 = self.rows / 2 - box_h / 2;

        if b == 1 {
            let x1 = x0 + box_w - 1;
            let y1 = y0 + box_h - 1;
            for x in x0..=x1 {
                let ch = if x == x0 || x == x1 { '+' } else { '-' };
                canvas.text(x, y0, &ch.to_string(), frame_rgb, 0.8, false);
                canvas.text(x, y1, &ch.to_string(), frame_rgb, 0.8, false);
            }
            for y in (y0 + 1)..y1 {
                canvas.text(x0, y, "|", frame_rgb, 0.8, false);
                canvas.text(x1, y, "|", frame_rgb, 0.8, false);
            }
        }

        let cx = x0 + b + PAD_X;
        let cy = y0 + b + PAD_Y;
        for (i, line) in visible.iter().take(content_h as usize).enumerate() {
            let left = (content_w as usize).saturating_sub(line.len()) / 2;
            let s: String = line.iter().collect();
            let x = cx + left as u16;
            let y = cy + i as u16;
            let (rgb, bold) = if self.scroll + i == 0 {
                if let Some(shift) = self.glitch {
                    let ahead = x.saturating_add_signed(shift);
                    let behind = x.saturating_add_signed(-shift);
                    canvas.text(ahead, y, &s, shadow.0, 0.8, true);
                    canvas.text(behind, y, &s, shadow.1, 0.8, true);
                }
                (accent, true)
            } else {
                (text, false)
            };
            canvas.text(x, y, &s, rgb, 1.0, bold);
        }

        if self.scroll < self.max_scroll() && b == 1 {
            canvas.text(x0 + box_w - 2, y0 + box_h - 1, "v", accent, 1.0, true);
        }
    }
}
