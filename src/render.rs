// CPU rendering of the overlay frame
// Scales the source image, places it at the offset and applies opacity

use crate::image_loader::ImageData;
use crate::overlay::OverlayState;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use log::debug;

/// A rendered surface in straight-alpha RGBA (4 bytes per pixel)
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Frame {
    /// A fully transparent frame
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    #[cfg(test)]
    /// Whether every pixel has zero alpha
    pub fn is_transparent(&self) -> bool {
        self.pixels.chunks_exact(4).all(|p| p[3] == 0)
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }
}

/// Size of the image after applying `scale`, truncated to whole pixels
pub fn scaled_size(width: u32, height: u32, scale: f64) -> (u32, u32) {
    // Float to int casts saturate, so huge or NaN scales stay in range
    let w = (f64::from(width) * scale) as u32;
    let h = (f64::from(height) * scale) as u32;
    (w, h)
}

/// Byte offset of pixel (`x`, `y`) in a tightly packed RGBA buffer `width` pixels wide
fn pixel_index(x: u32, y: u32, width: u32) -> usize {
    (y as usize * width as usize + x as usize) * 4
}

/// Multiply a straight alpha value by the overlay opacity
fn apply_opacity(alpha: u8, opacity: f32) -> u8 {
    (f32::from(alpha) * opacity).round().clamp(0.0, 255.0) as u8
}

/// Triangle-filtered copy of the source for the last requested size
#[derive(Default)]
pub struct DownscaleCache {
    scaled: Option<RgbaImage>,
}

impl DownscaleCache {
    /// `source` resampled to `width`x`height`, reusing the previous result when the size matches
    pub fn resized(&mut self, source: &RgbaImage, width: u32, height: u32) -> &RgbaImage {
        let scaled = match self.scaled.take() {
            Some(cached) if cached.dimensions() == (width, height) => cached,
            _ => {
                debug!(
                    "Resampling {}x{} -> {}x{}",
                    source.width(),
                    source.height(),
                    width,
                    height
                );
                imageops::resize(source, width, height, FilterType::Triangle)
            }
        };
        self.scaled.insert(scaled)
    }
}

/// Renders overlay frames from a fixed source image
pub struct OverlayRenderer {
    image: ImageData,
    downscaled: DownscaleCache,
}

impl OverlayRenderer {
    pub fn new(image: ImageData) -> Self {
        Self {
            image,
            downscaled: DownscaleCache::default(),
        }
    }

    pub fn image(&self) -> &ImageData {
        &self.image
    }

    #[cfg(test)]
    /// Render `state` onto a fresh transparent surface of the given size
    pub fn render(&mut self, state: &OverlayState, width: u32, height: u32) -> Frame {
        let mut frame = Frame::new(width, height);
        self.render_into(state, &mut frame);
        frame
    }

    /// Repaint `frame` entirely from `state`
    pub fn render_into(&mut self, state: &OverlayState, frame: &mut Frame) {
        frame.clear();

        let (scaled_w, scaled_h) =
            scaled_size(self.image.width, self.image.height, state.scale_factor());
        if scaled_w == 0 || scaled_h == 0 {
            return;
        }

        // Visible part of the scaled image, in surface coordinates
        let offset = state.offset();
        let (ox, oy) = (i64::from(offset.x), i64::from(offset.y));
        let x0 = ox.max(0);
        let y0 = oy.max(0);
        let x1 = (ox + i64::from(scaled_w)).min(i64::from(frame.width));
        let y1 = (oy + i64::from(scaled_h)).min(i64::from(frame.height));
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let opacity = state.opacity().clamp(0.0, 1.0) as f32;
        let visible = VisibleRect {
            origin: (ox, oy),
            x: x0..x1,
            y: y0..y1,
        };

        if scaled_w < self.image.width {
            self.composite_downscaled(frame, &visible, scaled_w, scaled_h, opacity);
        } else {
            self.composite_bilinear(frame, &visible, scaled_w, scaled_h, opacity);
        }
    }

    /// Copy from a resampled copy of the image; it is never larger than the source
    fn composite_downscaled(
        &mut self,
        frame: &mut Frame,
        visible: &VisibleRect,
        scaled_w: u32,
        scaled_h: u32,
        opacity: f32,
    ) {
        let scaled = self
            .downscaled
            .resized(&self.image.pixels, scaled_w, scaled_h);

        let (ox, oy) = visible.origin;
        for y in visible.y.clone() {
            for x in visible.x.clone() {
                let src = scaled.get_pixel((x - ox) as u32, (y - oy) as u32).0;
                let dst_idx = pixel_index(x as u32, y as u32, frame.width);
                frame.pixels[dst_idx] = src[0];
                frame.pixels[dst_idx + 1] = src[1];
                frame.pixels[dst_idx + 2] = src[2];
                frame.pixels[dst_idx + 3] = apply_opacity(src[3], opacity);
            }
        }
    }

    /// Sample the source bilinearly for each visible destination pixel
    fn composite_bilinear(
        &self,
        frame: &mut Frame,
        visible: &VisibleRect,
        scaled_w: u32,
        scaled_h: u32,
        opacity: f32,
    ) {
        let img_width = self.image.width;
        let img_height = self.image.height;
        let src_data = self.image.pixels.as_raw();

        let scale_x = f64::from(img_width) / f64::from(scaled_w);
        let scale_y = f64::from(img_height) / f64::from(scaled_h);
        let max_x = f64::from(img_width - 1);
        let max_y = f64::from(img_height - 1);

        let get_pixel = |px: u32, py: u32| -> [f32; 4] {
            let idx = pixel_index(px, py, img_width);
            [
                f32::from(src_data[idx]),
                f32::from(src_data[idx + 1]),
                f32::from(src_data[idx + 2]),
                f32::from(src_data[idx + 3]),
            ]
        };

        let (ox, oy) = visible.origin;
        for y in visible.y.clone() {
            let src_y = (((y - oy) as f64 + 0.5) * scale_y - 0.5).clamp(0.0, max_y);
            let y0 = src_y.floor() as u32;
            let y1 = (y0 + 1).min(img_height - 1);
            let fy = (src_y - f64::from(y0)) as f32;

            for x in visible.x.clone() {
                let src_x = (((x - ox) as f64 + 0.5) * scale_x - 0.5).clamp(0.0, max_x);
                let x0 = src_x.floor() as u32;
                let x1 = (x0 + 1).min(img_width - 1);
                let fx = (src_x - f64::from(x0)) as f32;

                let p00 = get_pixel(x0, y0);
                let p10 = get_pixel(x1, y0);
                let p01 = get_pixel(x0, y1);
                let p11 = get_pixel(x1, y1);

                let interpolate = |c: usize| -> u8 {
                    let v0 = p00[c] * (1.0 - fx) + p10[c] * fx;
                    let v1 = p01[c] * (1.0 - fx) + p11[c] * fx;
                    let v = v0 * (1.0 - fy) + v1 * fy;
                    v.round().clamp(0.0, 255.0) as u8
                };

                let dst_idx = pixel_index(x as u32, y as u32, frame.width);
                frame.pixels[dst_idx] = interpolate(0);
                frame.pixels[dst_idx + 1] = interpolate(1);
                frame.pixels[dst_idx + 2] = interpolate(2);
                frame.pixels[dst_idx + 3] = apply_opacity(interpolate(3), opacity);
            }
        }
    }
}

/// Destination pixels covered by the scaled image
struct VisibleRect {
    origin: (i64, i64),
    x: std::ops::Range<i64>,
    y: std::ops::Range<i64>,
}

/// Copy a straight-alpha RGBA buffer into a Wayland ARGB8888 buffer.
///
/// wl_shm ARGB8888 is little-endian BGRA with premultiplied alpha.
pub fn write_argb8888(rgba: &[u8], canvas: &mut [u8]) {
    for (dst, src) in canvas.chunks_exact_mut(4).zip(rgba.chunks_exact(4)) {
        let a = u32::from(src[3]);
        let premultiply = |c: u8| ((u32::from(c) * a + 127) / 255) as u8;
        dst[0] = premultiply(src[2]);
        dst[1] = premultiply(src[1]);
        dst[2] = premultiply(src[0]);
        dst[3] = src[3];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigRecord;
    use crate::overlay::Offset;
    use image::Rgba;

    fn gradient(width: u32, height: u32, alpha: u8) -> ImageData {
        let pixels = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 20) as u8, (y * 30) as u8, 128, alpha])
        });
        ImageData::from_rgba(pixels)
    }

    fn state(offset: (i32, i32), scale_factor: f64, opacity: f64) -> OverlayState {
        let mut state = OverlayState::new("test.png");
        state.apply_config(&ConfigRecord {
            offset: Offset::new(offset.0, offset.1),
            scale_factor,
            opacity,
        });
        state
    }

    /// Bounding box of non-transparent pixels as (min_x, min_y, max_x, max_y)
    fn coverage(frame: &Frame) -> Option<(u32, u32, u32, u32)> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for y in 0..frame.height {
            for x in 0..frame.width {
                if frame.pixel(x, y)[3] > 0 {
                    bounds = Some(match bounds {
                        None => (x, y, x, y),
                        Some((a, b, c, d)) => (a.min(x), b.min(y), c.max(x), d.max(y)),
                    });
                }
            }
        }
        bounds
    }

    #[test]
    fn scaled_size_truncates() {
        assert_eq!(scaled_size(100, 50, 1.0), (100, 50));
        assert_eq!(scaled_size(100, 50, 0.99), (99, 49));
        assert_eq!(scaled_size(10, 10, 1.15), (11, 11));
        assert_eq!(scaled_size(10, 10, 0.01), (0, 0));
    }

    #[test]
    fn zero_opacity_renders_nothing_visible() {
        let mut renderer = OverlayRenderer::new(gradient(8, 6, 255));
        let mut s = state((2, 3), 1.0, 0.5);
        s.set_opacity(0);
        assert!(renderer.render(&s, 20, 20).is_transparent());
    }

    #[test]
    fn full_opacity_keeps_native_pixels() {
        let image = gradient(8, 6, 255);
        let mut pixels = image.pixels.clone();
        pixels.put_pixel(3, 2, Rgba([9, 8, 7, 42]));
        let mut renderer = OverlayRenderer::new(ImageData::from_rgba(pixels.clone()));
        let mut s = state((0, 0), 1.0, 0.5);
        s.set_opacity(100);

        let frame = renderer.render(&s, 10, 10);
        for y in 0..6 {
            for x in 0..8 {
                assert_eq!(frame.pixel(x, y), pixels.get_pixel(x, y).0, "({x}, {y})");
            }
        }
        assert_eq!(frame.pixel(8, 0)[3], 0);
        assert_eq!(frame.pixel(0, 6)[3], 0);
    }

    #[test]
    fn opacity_multiplies_alpha_without_touching_colour() {
        let image = gradient(4, 4, 200);
        let expected = image.pixels.get_pixel(2, 1).0;
        let mut renderer = OverlayRenderer::new(image);
        let frame = renderer.render(&state((0, 0), 1.0, 0.5), 4, 4);
        let px = frame.pixel(2, 1);
        assert_eq!(&px[..3], &expected[..3]);
        assert_eq!(px[3], 100);
    }

    #[test]
    fn offset_moves_top_left_corner() {
        let image = gradient(5, 5, 255);
        let corner = image.pixels.get_pixel(0, 0).0;
        let mut renderer = OverlayRenderer::new(image);
        let frame = renderer.render(&state((7, 4), 1.0, 1.0), 20, 20);
        assert_eq!(frame.pixel(7, 4), corner);
        assert_eq!(coverage(&frame), Some((7, 4, 11, 8)));
    }

    #[test]
    fn negative_offset_clips_image() {
        let image = gradient(6, 6, 255);
        let inner = image.pixels.get_pixel(2, 3).0;
        let mut renderer = OverlayRenderer::new(image);
        let frame = renderer.render(&state((-2, -3), 1.0, 1.0), 10, 10);
        assert_eq!(frame.pixel(0, 0), inner);
        assert_eq!(coverage(&frame), Some((0, 0, 3, 2)));
    }

    #[test]
    fn fully_offscreen_image_renders_nothing() {
        let mut renderer = OverlayRenderer::new(gradient(6, 6, 255));
        for offset in [(100, 0), (0, 100), (-6, 0), (0, -6), (i32::MAX, i32::MIN)] {
            assert!(renderer.render(&state(offset, 1.0, 1.0), 10, 10).is_transparent());
        }
    }

    #[test]
    fn upscale_covers_scaled_area() {
        let mut renderer = OverlayRenderer::new(gradient(4, 3, 255));
        let frame = renderer.render(&state((1, 1), 2.0, 1.0), 20, 20);
        assert_eq!(coverage(&frame), Some((1, 1, 8, 6)));
    }

    #[test]
    fn huge_upscale_only_touches_the_surface() {
        let mut renderer = OverlayRenderer::new(gradient(4, 4, 255));
        let frame = renderer.render(&state((0, 0), 1.0e6, 1.0), 16, 16);
        assert_eq!(coverage(&frame), Some((0, 0, 15, 15)));
    }

    #[test]
    fn downscale_covers_scaled_area_and_refreshes_cache() {
        let mut renderer = OverlayRenderer::new(gradient(10, 8, 255));
        let frame = renderer.render(&state((0, 0), 0.5, 1.0), 20, 20);
        assert_eq!(coverage(&frame), Some((0, 0, 4, 3)));

        let frame = renderer.render(&state((0, 0), 0.3, 1.0), 20, 20);
        assert_eq!(coverage(&frame), Some((0, 0, 2, 1)));
    }

    #[test]
    fn downscale_cache_reuses_matching_size() {
        let source = gradient(10, 8, 255).pixels;
        let mut cache = DownscaleCache::default();
        assert_eq!(cache.resized(&source, 5, 4).dimensions(), (5, 4));

        let first = cache.resized(&source, 5, 4).as_ptr();
        assert_eq!(cache.resized(&source, 5, 4).as_ptr(), first);
        assert_eq!(cache.resized(&source, 3, 2).dimensions(), (3, 2));
    }

    #[test]
    fn pixel_index_does_not_wrap_on_huge_images() {
        assert_eq!(pixel_index(2, 1, 4), 24);
        let side = 32_768;
        assert_eq!(
            pixel_index(side - 1, side - 1, side),
            (side as usize * side as usize - 1) * 4
        );
    }

    #[test]
    fn vanishing_scale_renders_nothing() {
        let mut renderer = OverlayRenderer::new(gradient(10, 10, 255));
        assert!(renderer.render(&state((0, 0), 1e-6, 1.0), 10, 10).is_transparent());
    }

    #[test]
    fn shm_conversion_premultiplies_and_swaps_channels() {
        let rgba = [200, 100, 50, 255, 200, 100, 50, 128, 10, 20, 30, 0];
        let mut canvas = [0u8; 12];
        write_argb8888(&rgba, &mut canvas);
        assert_eq!(&canvas[0..4], &[50, 100, 200, 255]);
        assert_eq!(&canvas[4..8], &[25, 50, 100, 128]);
        assert_eq!(&canvas[8..12], &[0, 0, 0, 0]);
    }
}
