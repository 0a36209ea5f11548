// Control panel layout and painting
// Widgets are stacked vertically; hit testing and drawing share the same layout

use crate::control::Action;
use crate::render::Frame;
use crate::text::TextRenderer;

/// Width of the panel surface
pub const PANEL_WIDTH: u32 = 200;

/// Distance kept between the panel and the right screen edge on startup
pub const PANEL_RIGHT_INSET: u32 = 220;

const OUTER_MARGIN: i32 = 8;
const INNER_PADDING: i32 = 10;
const SPACING: i32 = 5;
const BORDER: u32 = 2;
const BUTTON_HEIGHT: u32 = 26;
const LABEL_HEIGHT: u32 = 18;
const SLIDER_HEIGHT: u32 = 20;
const KNOB_WIDTH: u32 = 10;
const GROOVE_HEIGHT: u32 = 4;

// Straight-alpha RGBA colors
const BACKGROUND: [u8; 4] = [30, 30, 30, 200];
const BORDER_COLOR: [u8; 4] = [0x88, 0x88, 0x88, 255];
const BUTTON: [u8; 4] = [60, 60, 60, 200];
const BUTTON_HOVER: [u8; 4] = [90, 90, 90, 200];
const GROOVE: [u8; 4] = [110, 110, 110, 255];
const GROOVE_FILL: [u8; 4] = [200, 200, 200, 255];
const KNOB: [u8; 4] = [220, 220, 220, 255];
const KNOB_HOVER: [u8; 4] = [250, 250, 250, 255];
const TEXT: [u8; 4] = [255, 255, 255, 255];

/// Buttons in display order, split around the opacity controls
const TOP_BUTTONS: [(Action, &str); 6] = [
    (Action::MoveUp, "↑"),
    (Action::MoveDown, "↓"),
    (Action::MoveLeft, "←"),
    (Action::MoveRight, "→"),
    (Action::ZoomIn, "Zoom In"),
    (Action::ZoomOut, "Zoom Out"),
];
const BOTTOM_BUTTONS: [(Action, &str); 3] = [
    (Action::SaveConfig, "Create Config"),
    (Action::LoadConfig, "Load Config"),
    (Action::Close, "Close"),
];

/// Axis-aligned rectangle in panel surface coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x as f64
            && y >= self.y as f64
            && x < self.x as f64 + self.width as f64
            && y < self.y as f64 + self.height as f64
    }

    fn inset(&self, dx: u32, dy: u32) -> Rect {
        Rect::new(
            self.x + dx as i32,
            self.y + dy as i32,
            self.width.saturating_sub(2 * dx),
            self.height.saturating_sub(2 * dy),
        )
    }
}

/// Interactive or decorative element of the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    Button(Action),
    OpacityLabel,
    OpacitySlider,
}

/// Transient presentation state the panel is painted with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelView {
    pub hover: Option<Widget>,
    pub slider_value: u8,
}

/// Widget geometry of the control panel
#[derive(Debug, Clone)]
pub struct PanelLayout {
    width: u32,
    height: u32,
    inner: Rect,
    widgets: Vec<(Widget, Rect, &'static str)>,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelLayout {
    pub fn new() -> Self {
        let content_x = OUTER_MARGIN + INNER_PADDING;
        let content_width = PANEL_WIDTH - 2 * (OUTER_MARGIN + INNER_PADDING) as u32;
        let mut y = OUTER_MARGIN + INNER_PADDING;
        let mut widgets = Vec::new();

        let mut push = |widget: Widget, height: u32, label: &'static str| {
            widgets.push((widget, Rect::new(content_x, y, content_width, height), label));
            y += height as i32 + SPACING;
        };

        for (action, label) in TOP_BUTTONS {
            push(Widget::Button(action), BUTTON_HEIGHT, label);
        }
        push(Widget::OpacityLabel, LABEL_HEIGHT, "Opacity");
        push(Widget::OpacitySlider, SLIDER_HEIGHT, "");
        for (action, label) in BOTTOM_BUTTONS {
            push(Widget::Button(action), BUTTON_HEIGHT, label);
        }

        let height = (y - SPACING + INNER_PADDING + OUTER_MARGIN) as u32;
        let inner = Rect::new(
            OUTER_MARGIN,
            OUTER_MARGIN,
            PANEL_WIDTH - 2 * OUTER_MARGIN as u32,
            height - 2 * OUTER_MARGIN as u32,
        );

        Self {
            width: PANEL_WIDTH,
            height,
            inner,
            widgets,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[cfg(test)]
    pub fn widgets(&self) -> impl Iterator<Item = (Widget, Rect)> + '_ {
        self.widgets.iter().map(|&(widget, rect, _)| (widget, rect))
    }

    /// Widget under the pointer; `None` means panel background
    pub fn widget_at(&self, x: f64, y: f64) -> Option<Widget> {
        self.widgets
            .iter()
            .find(|(_, rect, _)| rect.contains(x, y))
            .map(|&(widget, _, _)| widget)
    }

    fn rect_of(&self, widget: Widget) -> Option<Rect> {
        self.widgets
            .iter()
            .find(|(w, _, _)| *w == widget)
            .map(|&(_, rect, _)| rect)
    }

    /// Horizontal span the slider knob center travels along
    fn slider_track(&self) -> (f64, f64) {
        let rect = self.rect_of(Widget::OpacitySlider).unwrap_or(self.inner);
        let half_knob = f64::from(KNOB_WIDTH) / 2.0;
        let left = f64::from(rect.x) + half_knob;
        let right = f64::from(rect.x) + f64::from(rect.width) - half_knob;
        (left, right)
    }

    /// Whole-percent slider value for a pointer at `x`
    pub fn slider_value_at(&self, x: f64) -> u8 {
        let (left, right) = self.slider_track();
        let t = ((x - left) / (right - left)).clamp(0.0, 1.0);
        (t * 100.0).round() as u8
    }

    /// Paint the full panel, labels included
    pub fn paint(&self, frame: &mut Frame, view: &PanelView, text: &mut TextRenderer) {
        self.paint_chrome(frame, view);
        for &(widget, rect, label) in &self.widgets {
            if !label.is_empty() && widget != Widget::OpacitySlider {
                text.draw_centered(frame, rect, label, TEXT);
            }
        }
    }

    /// Paint backgrounds, buttons and the slider without any text
    pub fn paint_chrome(&self, frame: &mut Frame, view: &PanelView) {
        frame.pixels.fill(0);
        fill_rect(frame, self.inner, BACKGROUND);
        stroke_rect(frame, self.inner, BORDER, BORDER_COLOR);

        for &(widget, rect, _) in &self.widgets {
            let hovered = view.hover == Some(widget);
            match widget {
                Widget::Button(_) => {
                    fill_rect(frame, rect, if hovered { BUTTON_HOVER } else { BUTTON });
                }
                Widget::OpacityLabel => {}
                Widget::OpacitySlider => self.paint_slider(frame, rect, view.slider_value, hovered),
            }
        }
    }

    fn paint_slider(&self, frame: &mut Frame, rect: Rect, value: u8, hovered: bool) {
        let (left, right) = self.slider_track();
        let knob_center = left + (right - left) * f64::from(value.min(100)) / 100.0;
        let groove_y = rect.y + (rect.height as i32 - GROOVE_HEIGHT as i32) / 2;

        fill_rect(
            frame,
            Rect::new(rect.x, groove_y, rect.width, GROOVE_HEIGHT),
            GROOVE,
        );
        let filled = (knob_center - f64::from(rect.x)).max(0.0) as u32;
        fill_rect(
            frame,
            Rect::new(rect.x, groove_y, filled, GROOVE_HEIGHT),
            GROOVE_FILL,
        );

        let knob_x = (knob_center - f64::from(KNOB_WIDTH) / 2.0).round() as i32;
        let knob = Rect::new(knob_x, rect.y, KNOB_WIDTH, rect.height).inset(0, 1);
        fill_rect(frame, knob, if hovered { KNOB_HOVER } else { KNOB });
    }
}

/// Composite one straight-alpha pixel over the frame (source-over)
pub fn blend_pixel(frame: &mut Frame, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x as u32 >= frame.width || y as u32 >= frame.height {
        return;
    }
    let idx = (y as usize * frame.width as usize + x as usize) * 4;
    let dst = &mut frame.pixels[idx..idx + 4];

    let sa = f32::from(color[3]) / 255.0;
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        dst.fill(0);
        return;
    }
    for c in 0..3 {
        let v = (f32::from(color[c]) * sa + f32::from(dst[c]) * da * (1.0 - sa)) / out_a;
        dst[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

pub fn fill_rect(frame: &mut Frame, rect: Rect, color: [u8; 4]) {
    for y in rect.y..rect.y + rect.height as i32 {
        for x in rect.x..rect.x + rect.width as i32 {
            blend_pixel(frame, x, y, color);
        }
    }
}

fn stroke_rect(frame: &mut Frame, rect: Rect, thickness: u32, color: [u8; 4]) {
    let t = thickness.min(rect.width / 2).min(rect.height / 2);
    let right = rect.x + rect.width as i32 - t as i32;
    let bottom = rect.y + rect.height as i32 - t as i32;
    fill_rect(frame, Rect::new(rect.x, rect.y, rect.width, t), color);
    fill_rect(frame, Rect::new(rect.x, bottom, rect.width, t), color);
    fill_rect(frame, Rect::new(rect.x, rect.y, t, rect.height), color);
    fill_rect(frame, Rect::new(right, rect.y, t, rect.height), color);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center(rect: Rect) -> (f64, f64) {
        (
            rect.x as f64 + rect.width as f64 / 2.0,
            rect.y as f64 + rect.height as f64 / 2.0,
        )
    }

    #[test]
    fn widgets_are_stacked_in_display_order() {
        let layout = PanelLayout::new();
        let order: Vec<Widget> = layout.widgets().map(|(w, _)| w).collect();
        assert_eq!(
            order,
            vec![
                Widget::Button(Action::MoveUp),
                Widget::Button(Action::MoveDown),
                Widget::Button(Action::MoveLeft),
                Widget::Button(Action::MoveRight),
                Widget::Button(Action::ZoomIn),
                Widget::Button(Action::ZoomOut),
                Widget::OpacityLabel,
                Widget::OpacitySlider,
                Widget::Button(Action::SaveConfig),
                Widget::Button(Action::LoadConfig),
                Widget::Button(Action::Close),
            ]
        );

        let rects: Vec<Rect> = layout.widgets().map(|(_, r)| r).collect();
        for pair in rects.windows(2) {
            assert!(pair[0].y + pair[0].height as i32 <= pair[1].y);
        }
        let (width, height) = layout.size();
        assert_eq!(width, PANEL_WIDTH);
        let last = rects[rects.len() - 1];
        assert!(last.y + last.height as i32 <= height as i32);
    }

    #[test]
    fn hit_testing_finds_each_widget() {
        let layout = PanelLayout::new();
        for (widget, rect) in layout.widgets() {
            let (x, y) = center(rect);
            assert_eq!(layout.widget_at(x, y), Some(widget));
        }
    }

    #[test]
    fn background_and_margins_hit_nothing() {
        let layout = PanelLayout::new();
        assert_eq!(layout.widget_at(1.0, 1.0), None);
        assert_eq!(layout.widget_at(OUTER_MARGIN as f64 + 2.0, 100.0), None);
        let (width, height) = layout.size();
        assert_eq!(layout.widget_at(width as f64 - 1.0, height as f64 - 1.0), None);
        assert_eq!(layout.widget_at(-5.0, 40.0), None);
    }

    #[test]
    fn slider_maps_pointer_to_whole_percent() {
        let layout = PanelLayout::new();
        let rect = layout.rect_of(Widget::OpacitySlider).unwrap();
        let (left, right) = layout.slider_track();
        assert_eq!(layout.slider_value_at(rect.x as f64 - 50.0), 0);
        assert_eq!(layout.slider_value_at(left), 0);
        assert_eq!(layout.slider_value_at((left + right) / 2.0), 50);
        assert_eq!(layout.slider_value_at(right), 100);
        assert_eq!(layout.slider_value_at(right + 500.0), 100);
    }

    #[test]
    fn blending_follows_source_over() {
        let mut frame = Frame::new(1, 1);
        blend_pixel(&mut frame, 0, 0, [10, 20, 30, 200]);
        assert_eq!(frame.pixel(0, 0), [10, 20, 30, 200]);

        blend_pixel(&mut frame, 0, 0, [250, 250, 250, 255]);
        assert_eq!(frame.pixel(0, 0), [250, 250, 250, 255]);

        let mut frame = Frame::new(1, 1);
        blend_pixel(&mut frame, 0, 0, [0, 0, 0, 255]);
        blend_pixel(&mut frame, 0, 0, [200, 100, 0, 128]);
        let px = frame.pixel(0, 0);
        assert_eq!(px[3], 255);
        assert_eq!(px[0], 100);
        assert_eq!(px[1], 50);
    }

    #[test]
    fn blending_outside_frame_is_ignored() {
        let mut frame = Frame::new(2, 2);
        blend_pixel(&mut frame, -1, 0, [255; 4]);
        blend_pixel(&mut frame, 2, 1, [255; 4]);
        assert!(frame.is_transparent());
    }

    #[test]
    fn chrome_highlights_hovered_button() {
        let layout = PanelLayout::new();
        let (width, height) = layout.size();
        let (zoom_in, rect) = layout
            .widgets()
            .find(|(w, _)| *w == Widget::Button(Action::ZoomIn))
            .unwrap();
        let (x, y) = center(rect);

        let mut plain = Frame::new(width, height);
        layout.paint_chrome(
            &mut plain,
            &PanelView {
                hover: None,
                slider_value: 50,
            },
        );
        let mut hovered = Frame::new(width, height);
        layout.paint_chrome(
            &mut hovered,
            &PanelView {
                hover: Some(zoom_in),
                slider_value: 50,
            },
        );

        assert_ne!(plain.pixel(x as u32, y as u32), hovered.pixel(x as u32, y as u32));
        assert_eq!(plain.pixel(0, 0)[3], 0);
        assert_eq!(plain.pixel(OUTER_MARGIN as u32, OUTER_MARGIN as u32), BORDER_COLOR);
    }

    #[test]
    fn slider_knob_tracks_value() {
        let layout = PanelLayout::new();
        let (width, height) = layout.size();
        let rect = layout.rect_of(Widget::OpacitySlider).unwrap();
        let (left, right) = layout.slider_track();
        let top = (rect.y + 2) as u32;

        let mut frame = Frame::new(width, height);
        layout.paint_chrome(
            &mut frame,
            &PanelView {
                hover: None,
                slider_value: 0,
            },
        );
        assert_eq!(frame.pixel(left as u32, top), KNOB);
        assert_ne!(frame.pixel(right as u32, top), KNOB);

        layout.paint_chrome(
            &mut frame,
            &PanelView {
                hover: None,
                slider_value: 100,
            },
        );
        assert_eq!(frame.pixel(right as u32, top), KNOB);
        assert_ne!(frame.pixel(left as u32, top), KNOB);
    }
}
