// Overlay state module
// Holds the placement parameters of the overlay image and the mutations on them

use crate::config::ConfigRecord;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Distance in pixels moved by one directional nudge
pub const NUDGE_STEP: i32 = 10;

/// Multiplier applied by one zoom-in step
pub const ZOOM_IN_FACTOR: f64 = 1.1;

/// Multiplier applied by one zoom-out step
pub const ZOOM_OUT_FACTOR: f64 = 0.9;

/// Opacity of a freshly opened overlay
pub const DEFAULT_OPACITY: f64 = 0.5;

/// Screen-space translation of the image's top-left corner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Mutable rendering parameters of the overlay.
///
/// All mutation happens on the event dispatch thread; callers are
/// responsible for requesting a redraw after each change.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayState {
    image_path: PathBuf,
    offset: Offset,
    scale_factor: f64,
    opacity: f64,
}

impl OverlayState {
    /// Create the state for a newly selected image with default placement
    pub fn new(image_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: image_path.into(),
            offset: Offset::default(),
            scale_factor: 1.0,
            opacity: DEFAULT_OPACITY,
        }
    }

    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Translate the image by (dx, dy) pixels. No bounds are enforced.
    pub fn nudge(&mut self, dx: i32, dy: i32) {
        self.offset.x = self.offset.x.saturating_add(dx);
        self.offset.y = self.offset.y.saturating_add(dy);
        debug!("Offset now ({}, {})", self.offset.x, self.offset.y);
    }

    /// Multiply the scale factor by `factor`.
    ///
    /// Returns false and leaves the state untouched when `factor` is not a
    /// finite positive number.
    pub fn zoom(&mut self, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            warn!("Ignoring invalid zoom factor {}", factor);
            return false;
        }
        self.scale_factor *= factor;
        debug!("Scale factor now {}", self.scale_factor);
        true
    }

    /// Set the opacity from a whole percentage (values above 100 saturate)
    pub fn set_opacity(&mut self, percent: u8) {
        self.opacity = f64::from(percent.min(100)) / 100.0;
        debug!("Opacity now {:.2}", self.opacity);
    }

    /// Snapshot of the persisted fields
    pub fn export_config(&self) -> ConfigRecord {
        ConfigRecord {
            offset: self.offset,
            scale_factor: self.scale_factor,
            opacity: self.opacity,
        }
    }

    /// Overwrite offset, scale factor and opacity from a validated record.
    ///
    /// Opacity is clamped to [0, 1]; the scale factor is taken as is since
    /// `ConfigStore::load` already rejects non-positive values.
    pub fn apply_config(&mut self, record: &ConfigRecord) {
        let opacity = if record.opacity.is_nan() {
            self.opacity
        } else {
            record.opacity.clamp(0.0, 1.0)
        };
        self.offset = record.offset;
        self.scale_factor = record.scale_factor;
        self.opacity = opacity;
        debug!(
            "Applied config: offset ({}, {}), scale {}, opacity {:.2}",
            self.offset.x, self.offset.y, self.scale_factor, self.opacity
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_uses_defaults() {
        let state = OverlayState::new("/tmp/cat.png");
        assert_eq!(state.image_path(), Path::new("/tmp/cat.png"));
        assert_eq!(state.offset(), Offset::new(0, 0));
        assert_eq!(state.scale_factor(), 1.0);
        assert_eq!(state.opacity(), DEFAULT_OPACITY);
    }

    #[test]
    fn nudges_accumulate_as_vector_sum() {
        let deltas = [(10, 0), (-30, 5), (0, -10), (7, 7), (-10, 0)];
        let mut forward = OverlayState::new("a.png");
        let mut backward = OverlayState::new("a.png");
        for &(dx, dy) in &deltas {
            forward.nudge(dx, dy);
        }
        for &(dx, dy) in deltas.iter().rev() {
            backward.nudge(dx, dy);
        }
        assert_eq!(forward.offset(), Offset::new(-23, 2));
        assert_eq!(forward.offset(), backward.offset());
    }

    #[test]
    fn nudge_scenario_from_cat_image() {
        let mut state = OverlayState::new("cat.png");
        state.nudge(0, -NUDGE_STEP);
        state.nudge(0, -NUDGE_STEP);
        state.nudge(NUDGE_STEP, 0);
        assert_eq!(state.offset(), Offset::new(10, -20));
    }

    #[test]
    fn nudge_allows_offscreen_offsets() {
        let mut state = OverlayState::new("a.png");
        state.nudge(-100_000, 250_000);
        assert_eq!(state.offset(), Offset::new(-100_000, 250_000));
    }

    #[test]
    fn zoom_is_multiplicative() {
        let factors = [1.1, 1.1, 0.9, 2.5, 0.3];
        let mut state = OverlayState::new("a.png");
        for &f in &factors {
            assert!(state.zoom(f));
        }
        let expected: f64 = factors.iter().product();
        assert!((state.scale_factor() - expected).abs() < 1e-12);
    }

    #[test]
    fn zoom_in_then_out_drifts_below_one() {
        let mut state = OverlayState::new("a.png");
        state.zoom(ZOOM_IN_FACTOR);
        state.zoom(ZOOM_OUT_FACTOR);
        assert!((state.scale_factor() - 0.99).abs() < 1e-9);
        assert_ne!(state.scale_factor(), 1.0);
    }

    #[test]
    fn zoom_rejects_non_positive_factors() {
        let mut state = OverlayState::new("a.png");
        assert!(!state.zoom(0.0));
        assert!(!state.zoom(-1.1));
        assert!(!state.zoom(f64::NAN));
        assert!(!state.zoom(f64::INFINITY));
        assert_eq!(state.scale_factor(), 1.0);
    }

    #[test]
    fn set_opacity_is_exact_percentage() {
        let mut state = OverlayState::new("a.png");
        for p in 0..=100u8 {
            state.set_opacity(p);
            assert_eq!(state.export_config().opacity, f64::from(p) / 100.0);
        }
        state.set_opacity(250);
        assert_eq!(state.opacity(), 1.0);
    }

    #[test]
    fn apply_of_export_is_a_no_op() {
        let mut state = OverlayState::new("a.png");
        state.nudge(-40, 90);
        state.zoom(ZOOM_OUT_FACTOR);
        state.zoom(ZOOM_OUT_FACTOR);
        state.set_opacity(37);
        let before = state.clone();
        let record = state.export_config();
        state.apply_config(&record);
        assert_eq!(state, before);
    }

    #[test]
    fn apply_config_overwrites_fields_and_clamps_opacity() {
        let mut state = OverlayState::new("a.png");
        state.apply_config(&ConfigRecord {
            offset: Offset::new(5, 6),
            scale_factor: 3.0,
            opacity: 1.7,
        });
        assert_eq!(state.offset(), Offset::new(5, 6));
        assert_eq!(state.scale_factor(), 3.0);
        assert_eq!(state.opacity(), 1.0);

        state.apply_config(&ConfigRecord {
            offset: Offset::new(0, 0),
            scale_factor: 1.0,
            opacity: -0.2,
        });
        assert_eq!(state.opacity(), 0.0);
    }
}
