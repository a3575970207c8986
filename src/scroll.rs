//! Page scroll tracking.
//!
//! The page is `pages` viewport heights tall. Scrolling moves a raw pixel
//! position over `(pages - 1) * viewport_height` pixels, which is normalized
//! to an offset in `[0, 1]`. A damped copy of the offset follows the raw one
//! so that the model and the overlay glide instead of jumping per wheel notch.

use std::f32::consts::PI;

/// Below this distance the damped offset snaps onto its target.
const SNAP_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    pub offset: f32,
}

#[derive(Debug, Clone)]
pub struct ScrollTracker {
    pages: f32,
    damping: f32,
    viewport_height: f32,
    scroll_px: f32,
    offset: f32,
}

impl ScrollTracker {
    pub fn new(pages: f32, damping: f32, viewport_height: f32) -> Self {
        Self {
            pages,
            damping: damping.max(0.0),
            viewport_height: viewport_height.max(0.0),
            scroll_px: 0.0,
            offset: 0.0,
        }
    }

    pub fn pages(&self) -> f32 {
        self.pages
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    /// Total distance the page can scroll, in pixels.
    pub fn scrollable_px(&self) -> f32 {
        ((self.pages - 1.0) * self.viewport_height).max(0.0)
    }

    pub fn scroll_px(&self) -> f32 {
        self.scroll_px
    }

    /// Undamped offset straight from the scroll position.
    pub fn target_offset(&self) -> f32 {
        let scrollable = self.scrollable_px();
        if scrollable <= 0.0 {
            return 0.0;
        }
        (self.scroll_px / scrollable).clamp(0.0, 1.0)
    }

    /// Damped offset, the value consumers render with.
    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn state(&self) -> ScrollState {
        ScrollState { offset: self.offset }
    }

    pub fn scroll_by(&mut self, delta_px: f32) {
        if delta_px.is_finite() {
            self.scroll_to(self.scroll_px + delta_px);
        }
    }

    pub fn scroll_to(&mut self, px: f32) {
        if px.is_finite() {
            self.scroll_px = px.clamp(0.0, self.scrollable_px());
        }
    }

    pub fn scroll_to_offset(&mut self, offset: f32) {
        if offset.is_finite() {
            self.scroll_px = offset.clamp(0.0, 1.0) * self.scrollable_px();
        }
    }

    /// Changes the viewport height while keeping the scroll offset.
    pub fn resize(&mut self, viewport_height: f32) {
        let offset = self.target_offset();
        self.viewport_height = viewport_height.max(0.0);
        self.scroll_px = offset * self.scrollable_px();
    }

    /// Moves the damped offset toward the target. `damping` is the time
    /// constant in seconds; zero snaps immediately.
    pub fn update(&mut self, dt: f32) {
        let target = self.target_offset();
        if self.damping <= 0.0 || !dt.is_finite() {
            self.offset = target;
            return;
        }

        let k = 1.0 - (-dt.max(0.0) / self.damping).exp();
        self.offset += (target - self.offset) * k;
        if (target - self.offset).abs() < SNAP_EPSILON {
            self.offset = target;
        }
        self.offset = self.offset.clamp(0.0, 1.0);
    }

    /// Progress through `[from, from + distance]`, clamped to `[0, 1]`.
    pub fn range(&self, from: f32, distance: f32) -> f32 {
        if distance <= 0.0 {
            return if self.offset >= from { 1.0 } else { 0.0 };
        }
        ((self.offset - from) / distance).clamp(0.0, 1.0)
    }

    /// Sine arc over the range: 0 at both ends, 1 in the middle.
    pub fn curve(&self, from: f32, distance: f32) -> f32 {
        (self.range(from, distance) * PI).sin()
    }

    pub fn visible(&self, from: f32, distance: f32) -> bool {
        self.offset >= from && self.offset <= from + distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> ScrollTracker {
        ScrollTracker::new(6.0, 0.0, 800.0)
    }

    #[test]
    fn offset_is_ratio_of_scrollable_distance() {
        let mut s = tracker();
        assert_eq!(s.scrollable_px(), 4000.0);
        s.scroll_to(400.0);
        s.update(0.016);
        assert!((s.offset() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn offset_clamps_at_extremes() {
        let mut s = tracker();
        s.scroll_by(-50.0);
        s.update(0.016);
        assert_eq!(s.offset(), 0.0);
        s.scroll_by(1.0e6);
        s.update(0.016);
        assert_eq!(s.offset(), 1.0);
    }

    #[test]
    fn degenerate_layouts_have_zero_offset() {
        let mut single = ScrollTracker::new(1.0, 0.0, 800.0);
        single.scroll_by(300.0);
        single.update(0.016);
        assert_eq!(single.offset(), 0.0);

        let mut flat = ScrollTracker::new(6.0, 0.0, 0.0);
        flat.scroll_by(300.0);
        flat.update(0.016);
        assert_eq!(flat.offset(), 0.0);
    }

    #[test]
    fn resize_keeps_offset() {
        let mut s = tracker();
        s.scroll_to_offset(0.5);
        s.resize(1000.0);
        assert!((s.target_offset() - 0.5).abs() < 1e-6);
        assert_eq!(s.scroll_px(), 2500.0);
    }

    #[test]
    fn damping_converges_without_overshoot() {
        let mut s = ScrollTracker::new(6.0, 0.1, 800.0);
        s.scroll_to_offset(1.0);
        let mut prev = 0.0;
        for _ in 0..120 {
            s.update(1.0 / 60.0);
            assert!(s.offset() >= prev);
            assert!(s.offset() <= 1.0);
            prev = s.offset();
        }
        assert_eq!(s.offset(), 1.0);
    }

    #[test]
    fn range_curve_visible() {
        let mut s = tracker();
        s.scroll_to_offset(0.25);
        s.update(0.0);
        assert!((s.range(0.0, 0.5) - 0.5).abs() < 1e-6);
        assert!((s.curve(0.0, 0.5) - 1.0).abs() < 1e-6);
        assert!(s.visible(0.2, 0.1));
        assert!(!s.visible(0.5, 0.1));
        assert_eq!(s.range(0.5, 0.2), 0.0);
    }
}
