use glam::Vec2;
use macroquad::prelude::{
    clear_background, draw_circle, draw_line, draw_text, draw_texture_ex, get_fps, measure_text,
    mouse_position, screen_height, screen_width, vec2, Color, DrawTextureParams, Texture2D, WHITE,
};

use crate::canvas::{stroke_color, Canvas};
use crate::config::ForestConfig;
use crate::forest::ForestStats;

/// Draws branch segments with macroquad, coloured by height.
pub struct ScreenCanvas {
    pub canvas_height: f32,
}

impl Canvas for ScreenCanvas {
    fn draw_line(&mut self, start: Vec2, end: Vec2, diameter: f32) {
        let [r, g, b] = stroke_color(start.y, self.canvas_height);
        let color = Color::from_rgba(r, g, b, 255);
        draw_line(start.x, start.y, end.x, end.y, diameter, color);
        // Round joints so thick trunks don't show gaps between segments
        if diameter > 1.5 {
            draw_circle(end.x, end.y, diameter * 0.5, color);
        }
    }
}

pub fn draw_background(config: &ForestConfig) {
    let v = config.background;
    clear_background(Color::from_rgba(v, v, v, 255));
}

/// Load the pointer image through the `image` crate.
///
/// Any failure just means no custom pointer is drawn.
pub fn load_cursor(path: &str) -> Option<Texture2D> {
    let img = match image::open(path) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            log::warn!("cursor image {} unavailable: {}", path, e);
            return None;
        }
    };
    let (w, h) = img.dimensions();
    let (Ok(w), Ok(h)) = (u16::try_from(w), u16::try_from(h)) else {
        log::warn!("cursor image {} is too large ({}x{})", path, w, h);
        return None;
    };
    Some(Texture2D::from_rgba8(w, h, img.as_raw()))
}

/// Pointer overlay, centred on the mouse and only inside the canvas.
pub fn draw_cursor(cursor: Option<&Texture2D>, config: &ForestConfig) {
    let Some(texture) = cursor else {
        return;
    };
    let (mx, my) = mouse_position();
    if mx < 0.0 || mx > config.canvas_width || my < 0.0 || my > config.canvas_height {
        return;
    }
    let size = config.cursor_size;
    draw_texture_ex(
        texture,
        mx - size * 0.5,
        my - size * 0.5,
        WHITE,
        DrawTextureParams {
            dest_size: Some(vec2(size, size)),
            ..Default::default()
        },
    );
}

pub fn draw_stats_and_help(stats: &ForestStats, hud_visible: bool) {
    let text_color = Color::new(0.1, 0.1, 0.1, 0.8);
    if !hud_visible {
        let hint_text = "H = show controls";
        let hint_width = measure_text(hint_text, None, 16, 1.0).width;
        draw_text(
            hint_text,
            screen_width() - hint_width - 10.0,
            screen_height() - 10.0,
            16.0,
            Color::new(0.3, 0.3, 0.3, 0.6),
        );
        return;
    }

    let stats_text = format!(
        "Paths: {} | Forks: {} | Finished: {} | Segments: {}",
        stats.path_count, stats.fork_count, stats.finished_count, stats.segment_count,
    );
    draw_text(&stats_text, 10.0, 20.0, 18.0, text_color);
    let wind_text = format!(
        "Wind: {:.1} | FPS: {}",
        stats.wind_intensity,
        get_fps()
    );
    draw_text(&wind_text, 10.0, 38.0, 18.0, text_color);
    draw_text(
        "SPACE=Reset | +/-=Wind | P=Screenshot | H=Hide",
        10.0,
        screen_height() - 10.0,
        16.0,
        Color::new(0.2, 0.2, 0.2, 0.7),
    );
}
