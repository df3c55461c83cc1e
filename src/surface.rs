use crate::starfield::Point;
use std::io::{self, IsTerminal, Write};

pub type Rgb = (u8, u8, u8);

/// A 2D drawing target measured in pixels.
///
/// Alpha values outside `[0, 1]` are clamped by implementations.
pub trait Surface {
    fn size(&self) -> (usize, usize);
    fn resize(&mut self, width: usize, height: usize);
    fn clear(&mut self);
    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgb, alpha: f32);
    fn draw_line(&mut self, from: Point, to: Point, color: Rgb, alpha: f32);
}

/// Half-block terminal canvas: every cell shows two vertically stacked
/// pixels, the upper as background and the lower as foreground of `▄`.
pub struct TerminalSurface {
    width: usize,
    height: usize,
    background: Rgb,
    frame_buffer: Vec<(f32, f32, f32)>,
    output_buf: Vec<u8>,
}

impl TerminalSurface {
    pub fn new(width: usize, height: usize, background: Rgb) -> Self {
        let bg = to_float(background);
        Self {
            width,
            height,
            background,
            frame_buffer: vec![bg; width * height],
            output_buf: Vec::with_capacity(width * height * 25),
        }
    }

    /// A surface filling the current terminal, or `None` when stdout is not
    /// a terminal we can draw on.
    pub fn open(background: Rgb) -> Option<Self> {
        if !io::stdout().is_terminal() {
            return None;
        }
        let (cols, rows) = crossterm::terminal::size().ok()?;
        Some(Self::new(cols as usize, rows as usize * 2, background))
    }

    #[cfg(test)]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(to_rgb(self.frame_buffer[y * self.width + x]))
    }

    fn blend(&mut self, x: i64, y: i64, color: Rgb, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        if alpha == 0.0 {
            return;
        }
        let px = &mut self.frame_buffer[y as usize * self.width + x as usize];
        px.0 += (color.0 as f32 - px.0) * alpha;
        px.1 += (color.1 as f32 - px.1) * alpha;
        px.2 += (color.2 as f32 - px.2) * alpha;
    }

    /// Writes the frame, emitting colour escapes only when they change.
    pub fn present<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        let mut prev_top: Rgb = (255, 255, 255);
        let mut prev_bot: Rgb = (255, 255, 255);
        // force the first cell of each row to set both colours
        let mut fresh_row = true;

        for y in (0..self.height).step_by(2) {
            for x in 0..self.width {
                let top_idx = y * self.width + x;
                let bot_idx = if y + 1 < self.height {
                    (y + 1) * self.width + x
                } else {
                    top_idx
                };

                let top = to_rgb(self.frame_buffer[top_idx]);
                let bot = to_rgb(self.frame_buffer[bot_idx]);

                if fresh_row || top != prev_top {
                    write!(self.output_buf, "\x1b[48;2;{};{};{}m", top.0, top.1, top.2)?;
                    prev_top = top;
                }
                if fresh_row || bot != prev_bot {
                    write!(self.output_buf, "\x1b[38;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                    prev_bot = bot;
                }
                fresh_row = false;

                self.output_buf.extend_from_slice("▄".as_bytes());
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            fresh_row = true;
            if y + 2 < self.height {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        out.write_all(&self.output_buf)?;
        out.flush()
    }
}

impl Surface for TerminalSurface {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.frame_buffer = vec![to_float(self.background); width * height];
        self.output_buf = Vec::with_capacity(width * height * 25);
    }

    fn clear(&mut self) {
        self.frame_buffer.fill(to_float(self.background));
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgb, alpha: f32) {
        let home_x = center.x.floor() as i64;
        let home_y = center.y.floor() as i64;
        let min_x = (center.x - radius).floor() as i64;
        let max_x = (center.x + radius).floor() as i64;
        let min_y = (center.y - radius).floor() as i64;
        let max_y = (center.y + radius).floor() as i64;
        let r2 = radius * radius;

        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let dx = px as f32 + 0.5 - center.x;
                let dy = py as f32 + 0.5 - center.y;
                // sub-pixel stars still light the pixel they sit in
                if dx * dx + dy * dy <= r2 || (px == home_x && py == home_y) {
                    self.blend(px, py, color, alpha);
                }
            }
        }
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Rgb, alpha: f32) {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;

        let mut last = None;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let px = (from.x + dx * t).floor() as i64;
            let py = (from.y + dy * t).floor() as i64;
            if last == Some((px, py)) {
                continue;
            }
            last = Some((px, py));
            self.blend(px, py, color, alpha);
        }
    }
}

fn to_float(color: Rgb) -> (f32, f32, f32) {
    (color.0 as f32, color.1 as f32, color.2 as f32)
}

fn to_rgb(color: (f32, f32, f32)) -> Rgb {
    (
        color.0.round().clamp(0.0, 255.0) as u8,
        color.1.round().clamp(0.0, 255.0) as u8,
        color.2.round().clamp(0.0, 255.0) as u8,
    )
}


#[cfg(test)]
mod tests {
    use super::*;

    const BG: Rgb = (10, 10, 20);
    const WHITE: Rgb = (255, 255, 255);

    #[test]
    fn clear_restores_background() {
        let mut surface = TerminalSurface::new(4, 4, BG);
        surface.fill_circle(Point::new(1.5, 1.5), 0.5, WHITE, 1.0);
        assert_eq!(surface.pixel(1, 1), Some(WHITE));
        surface.clear();
        assert_eq!(surface.pixel(1, 1), Some(BG));
    }

    #[test]
    fn small_star_lights_its_own_pixel() {
        let mut surface = TerminalSurface::new(8, 8, (0, 0, 0));
        surface.fill_circle(Point::new(3.1, 5.9), 0.5, WHITE, 1.0);
        assert_eq!(surface.pixel(3, 5), Some(WHITE));
        assert_eq!(surface.pixel(4, 5), Some((0, 0, 0)));
    }

    #[test]
    fn alpha_blends_toward_colour() {
        let mut surface = TerminalSurface::new(2, 2, (0, 0, 0));
        surface.fill_circle(Point::new(0.5, 0.5), 0.5, WHITE, 0.5);
        assert_eq!(surface.pixel(0, 0), Some((128, 128, 128)));
        // over-bright twinkle is clamped
        surface.fill_circle(Point::new(1.5, 1.5), 0.5, WHITE, 1.3);
        assert_eq!(surface.pixel(1, 1), Some(WHITE));
    }

    #[test]
    fn line_covers_both_endpoints() {
        let mut surface = TerminalSurface::new(10, 10, (0, 0, 0));
        surface.draw_line(Point::new(1.0, 1.0), Point::new(6.0, 4.0), WHITE, 1.0);
        assert_eq!(surface.pixel(1, 1), Some(WHITE));
        assert_eq!(surface.pixel(6, 4), Some(WHITE));
        assert_eq!(surface.pixel(9, 9), Some((0, 0, 0)));
    }

    #[test]
    fn drawing_off_canvas_is_ignored() {
        let mut surface = TerminalSurface::new(3, 3, BG);
        surface.fill_circle(Point::new(-5.0, 50.0), 2.0, WHITE, 1.0);
        surface.draw_line(Point::new(-10.0, -10.0), Point::new(-1.0, -1.0), WHITE, 1.0);
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(surface.pixel(x, y), Some(BG));
            }
        }
    }

    #[test]
    fn resize_reallocates() {
        let mut surface = TerminalSurface::new(2, 2, BG);
        surface.resize(5, 6);
        assert_eq!(surface.size(), (5, 6));
        assert_eq!(surface.pixel(4, 5), Some(BG));
        assert_eq!(surface.pixel(5, 5), None);
    }

    #[test]
    fn present_packs_two_rows_per_line() {
        let mut surface = TerminalSurface::new(2, 4, (0, 0, 0));
        surface.fill_circle(Point::new(0.5, 1.5), 0.5, WHITE, 1.0);
        let mut out = Vec::new();
        surface.present(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("\x1b[H"));
        assert_eq!(text.matches('▄').count(), 4);
        assert_eq!(text.matches("\r\n").count(), 1);
        // lit pixel sits in the lower half of the first cell
        assert!(text.contains("\x1b[38;2;255;255;255m"));
    }
}
