// Text rendering for the control panel labels using cosmic-text

use crate::panel::{blend_pixel, Rect};
use crate::render::Frame;
use cosmic_text::{Attrs, Buffer, Color, FontSystem, Metrics, Shaping, SwashCache};
use log::debug;

const FONT_SIZE: f32 = 14.0;
const LINE_HEIGHT: f32 = 18.0;

/// Rasterizes single-line labels onto straight-alpha frames
pub struct TextRenderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
}

impl TextRenderer {
    pub fn new() -> Self {
        debug!("Loading system fonts");
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
        }
    }

    /// Draw `text` centered inside `rect`
    pub fn draw_centered(&mut self, frame: &mut Frame, rect: Rect, text: &str, color: [u8; 4]) {
        let mut buffer = Buffer::new(&mut self.font_system, Metrics::new(FONT_SIZE, LINE_HEIGHT));
        buffer.set_size(&mut self.font_system, None, None);
        buffer.set_text(&mut self.font_system, text, Attrs::new(), Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);

        let line_width = buffer
            .layout_runs()
            .map(|run| run.line_w)
            .fold(0.0f32, f32::max);
        let origin_x = rect.x + ((rect.width as f32 - line_width) / 2.0).round() as i32;
        let origin_y = rect.y + ((rect.height as f32 - LINE_HEIGHT) / 2.0).round() as i32;

        let text_color = Color::rgba(color[0], color[1], color[2], color[3]);
        buffer.draw(
            &mut self.font_system,
            &mut self.swash_cache,
            text_color,
            |x, y, w, h, glyph_color| {
                if glyph_color.a() == 0 {
                    return;
                }
                let rgba = [glyph_color.r(), glyph_color.g(), glyph_color.b(), glyph_color.a()];
                for dy in 0..h as i32 {
                    for dx in 0..w as i32 {
                        let px = origin_x + x + dx;
                        let py = origin_y + y + dy;
                        if rect.contains(px as f64, py as f64) {
                            blend_pixel(frame, px, py, rgba);
                        }
                    }
                }
            },
        );
    }
}
