// Drawing seam between the forest and whatever renders it

use glam::Vec2;

/// Top-of-canvas stroke colour (pale pink).
#[cfg(any(feature = "ui", test))]
pub const TIP_COLOR: [f32; 3] = [245.0, 186.0, 187.0];
/// Bottom-of-canvas stroke colour (dark green).
#[cfg(any(feature = "ui", test))]
pub const ROOT_COLOR: [f32; 3] = [6.0, 66.0, 50.0];

/// A surface the forest can draw branch segments onto.
pub trait Canvas {
    fn draw_line(&mut self, start: Vec2, end: Vec2, diameter: f32);
}

/// Discards every draw call (headless mode).
#[derive(Default)]
pub struct NullCanvas;

impl Canvas for NullCanvas {
    fn draw_line(&mut self, _start: Vec2, _end: Vec2, _diameter: f32) {}
}

/// Stroke colour for a segment starting at height `y`.
#[cfg(any(feature = "ui", test))]
pub fn stroke_color(y: f32, canvas_height: f32) -> [u8; 3] {
    let t = if canvas_height > 0.0 {
        (y / canvas_height).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut out = [0u8; 3];
    for (c, (&top, &bottom)) in out.iter_mut().zip(TIP_COLOR.iter().zip(ROOT_COLOR.iter())) {
        *c = (top + (bottom - top) * t).round() as u8;
    }
    out
}

/// Records draw calls in order, for tests.
#[cfg(test)]
#[derive(Default, Debug)]
pub struct RecordingCanvas {
    pub lines: Vec<(Vec2, Vec2, f32)>,
}

#[cfg(test)]
impl Canvas for RecordingCanvas {
    fn draw_line(&mut self, start: Vec2, end: Vec2, diameter: f32) {
        self.lines.push((start, end, diameter));
    }
}
