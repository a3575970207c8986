use crate::scroll::ScrollState;
use crate::timeline::{Pose, Timeline};

/// Drives a [`Timeline`] from scroll progress instead of a clock.
///
/// The binder keeps no state between frames: every call maps the current
/// offset to `offset * duration` and seeks there.
#[derive(Debug, Clone)]
pub struct ScrollBinder {
    timeline: Timeline,
}

impl ScrollBinder {
    pub fn new(timeline: Timeline) -> Self {
        Self { timeline }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Time the timeline will be seeked to for `offset`.
    pub fn time_for(&self, offset: f32) -> f32 {
        offset.clamp(0.0, 1.0) * self.timeline.duration()
    }

    pub fn apply(&mut self, scroll: ScrollState, pose: &mut Pose) {
        let time = self.time_for(scroll.offset);
        self.timeline.seek(time, pose);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::product_keyframes;

    fn binder() -> ScrollBinder {
        let timeline = Timeline::builder()
            .entries(product_keyframes())
            .build(Pose::IDENTITY)
            .unwrap();
        ScrollBinder::new(timeline)
    }

    #[test]
    fn maps_offset_onto_duration() {
        let b = binder();
        assert_eq!(b.time_for(0.0), 0.0);
        assert_eq!(b.time_for(0.5), 10.0);
        assert_eq!(b.time_for(1.0), 20.0);
        assert_eq!(b.time_for(1.5), 20.0);
    }

    #[test]
    fn repeated_frames_are_stable() {
        let mut b = binder();
        let mut first = Pose::IDENTITY;
        let mut second = Pose::IDENTITY;
        b.apply(ScrollState { offset: 0.37 }, &mut first);
        b.apply(ScrollState { offset: 0.37 }, &mut second);
        assert_eq!(first.rotation.to_array().map(f32::to_bits), second.rotation.to_array().map(f32::to_bits));
        assert_eq!(first.position.to_array().map(f32::to_bits), second.position.to_array().map(f32::to_bits));
    }

    #[test]
    fn scrolling_back_restores_pose() {
        let mut b = binder();
        let mut pose = Pose::IDENTITY;
        b.apply(ScrollState { offset: 0.3 }, &mut pose);
        let at_030 = pose;
        b.apply(ScrollState { offset: 0.9 }, &mut pose);
        b.apply(ScrollState { offset: 0.3 }, &mut pose);
        assert_eq!(pose, at_030);
    }
}
