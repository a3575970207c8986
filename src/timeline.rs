//! Keyframed pose timeline.
//!
//! A timeline is a fixed list of `(target, value, at)` entries. Each entry
//! eases one pose component from its previous value to `value`, finishing
//! exactly at time `at`. The playback position is never advanced by a clock;
//! callers [`Timeline::seek`] to an absolute time and the whole pose is
//! recomputed from the entries, so equal times always give equal poses.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gfx::anim::{lerp, Ease};

pub const DEFAULT_SEGMENT_DURATION: f32 = 2.0;

/// Rotation (Euler XYZ, radians) and position of an object.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub rotation: Vec3,
    pub position: Vec3,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        rotation: Vec3::ZERO,
        position: Vec3::ZERO,
    };

    pub fn is_finite(&self) -> bool {
        self.rotation.is_finite() && self.position.is_finite()
    }
}

/// A single animatable component of a [`Pose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetPath {
    #[serde(rename = "rotation.x")]
    RotationX,
    #[serde(rename = "rotation.y")]
    RotationY,
    #[serde(rename = "rotation.z")]
    RotationZ,
    #[serde(rename = "position.x")]
    PositionX,
    #[serde(rename = "position.y")]
    PositionY,
    #[serde(rename = "position.z")]
    PositionZ,
}

impl TargetPath {
    pub const ALL: [TargetPath; 6] = [
        TargetPath::RotationX,
        TargetPath::RotationY,
        TargetPath::RotationZ,
        TargetPath::PositionX,
        TargetPath::PositionY,
        TargetPath::PositionZ,
    ];

    pub fn get(self, pose: &Pose) -> f32 {
        match self {
            TargetPath::RotationX => pose.rotation.x,
            TargetPath::RotationY => pose.rotation.y,
            TargetPath::RotationZ => pose.rotation.z,
            TargetPath::PositionX => pose.position.x,
            TargetPath::PositionY => pose.position.y,
            TargetPath::PositionZ => pose.position.z,
        }
    }

    pub fn set(self, pose: &mut Pose, value: f32) {
        match self {
            TargetPath::RotationX => pose.rotation.x = value,
            TargetPath::RotationY => pose.rotation.y = value,
            TargetPath::RotationZ => pose.rotation.z = value,
            TargetPath::PositionX => pose.position.x = value,
            TargetPath::PositionY => pose.position.y = value,
            TargetPath::PositionZ => pose.position.z = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub target: TargetPath,
    pub value: f32,
    /// Absolute time in seconds at which `value` is reached.
    pub at: f32,
}

impl TimelineEntry {
    pub fn new(target: TargetPath, value: f32, at: f32) -> Self {
        Self { target, value, at }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimelineError {
    #[error("keyframe {index} at {at}s comes before the previous keyframe at {previous}s")]
    OutOfOrder { index: usize, at: f32, previous: f32 },
    #[error("keyframe {index} has a non-finite value or time")]
    NonFinite { index: usize },
    #[error("keyframe {index} has negative time {at}s")]
    NegativeTime { index: usize, at: f32 },
    #[error("segment duration must be positive, got {0}")]
    InvalidSegmentDuration(f32),
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    start: f32,
    end: f32,
    from: f32,
    to: f32,
}

#[derive(Debug, Clone)]
struct Track {
    target: TargetPath,
    initial: f32,
    segments: Vec<Segment>,
}

impl Track {
    fn sample(&self, time: f32, ease: Ease) -> f32 {
        let mut value = self.initial;
        for seg in &self.segments {
            if time >= seg.end {
                value = seg.to;
                continue;
            }
            if time <= seg.start {
                return value;
            }
            let t = (time - seg.start) / (seg.end - seg.start);
            let (lo, hi) = (seg.from.min(seg.to), seg.from.max(seg.to));
            return lerp(seg.from, seg.to, ease.apply(t)).clamp(lo, hi);
        }
        value
    }
}

#[derive(Debug, Clone)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
    tracks: Vec<Track>,
    initial: Pose,
    segment_duration: f32,
    ease: Ease,
    duration: f32,
    position: f32,
}

impl Timeline {
    pub fn builder() -> TimelineBuilder {
        TimelineBuilder::default()
    }

    /// Validates the entries and precomputes one track per animated component.
    pub fn new(
        entries: Vec<TimelineEntry>,
        segment_duration: f32,
        ease: Ease,
        initial: Pose,
    ) -> Result<Self, TimelineError> {
        if !(segment_duration.is_finite() && segment_duration > 0.0) {
            return Err(TimelineError::InvalidSegmentDuration(segment_duration));
        }

        let mut previous = 0.0f32;
        for (index, entry) in entries.iter().enumerate() {
            if !entry.value.is_finite() || !entry.at.is_finite() {
                return Err(TimelineError::NonFinite { index });
            }
            if entry.at < 0.0 {
                return Err(TimelineError::NegativeTime { index, at: entry.at });
            }
            if entry.at < previous {
                return Err(TimelineError::OutOfOrder {
                    index,
                    at: entry.at,
                    previous,
                });
            }
            previous = entry.at;
        }

        let mut tracks: Vec<Track> = Vec::new();
        for entry in &entries {
            let idx = match tracks.iter().position(|t| t.target == entry.target) {
                Some(idx) => idx,
                None => {
                    tracks.push(Track {
                        target: entry.target,
                        initial: entry.target.get(&initial),
                        segments: Vec::new(),
                    });
                    tracks.len() - 1
                }
            };
            let track = &mut tracks[idx];
            let (prev_end, from) = track
                .segments
                .last()
                .map(|s| (s.end, s.to))
                .unwrap_or((0.0, track.initial));

            let start = (entry.at - segment_duration).max(prev_end).max(0.0);
            track.segments.push(Segment {
                start,
                end: entry.at,
                from,
                to: entry.value,
            });
        }

        let duration = entries.last().map(|e| e.at).unwrap_or(0.0);

        Ok(Self {
            entries,
            tracks,
            initial,
            segment_duration,
            ease,
            duration,
            position: 0.0,
        })
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn segment_duration(&self) -> f32 {
        self.segment_duration
    }

    pub fn ease(&self) -> Ease {
        self.ease
    }

    pub fn initial_pose(&self) -> Pose {
        self.initial
    }

    /// Sets the playback position, clamped to `[0, duration]`, and writes the
    /// pose at that position into `pose`.
    pub fn seek(&mut self, time: f32, pose: &mut Pose) {
        self.position = if time.is_finite() {
            time.clamp(0.0, self.duration)
        } else {
            0.0
        };
        *pose = self.pose_at(self.position);
    }

    /// Pose at `time` without touching the playback position.
    pub fn pose_at(&self, time: f32) -> Pose {
        let mut pose = self.initial;
        for track in &self.tracks {
            track.target.set(&mut pose, track.sample(time, self.ease));
        }
        pose
    }

    /// Smallest and largest value a component takes over the whole timeline.
    pub fn extent(&self, target: TargetPath) -> (f32, f32) {
        let initial = target.get(&self.initial);
        self.entries
            .iter()
            .filter(|e| e.target == target)
            .fold((initial, initial), |(lo, hi), e| (lo.min(e.value), hi.max(e.value)))
    }
}

/// Chained construction mirroring `to(target, value, at)` calls.
#[derive(Debug, Clone)]
pub struct TimelineBuilder {
    entries: Vec<TimelineEntry>,
    segment_duration: f32,
    ease: Ease,
}

impl Default for TimelineBuilder {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            segment_duration: DEFAULT_SEGMENT_DURATION,
            ease: Ease::Power1InOut,
        }
    }
}

impl TimelineBuilder {
    pub fn defaults(mut self, segment_duration: f32, ease: Ease) -> Self {
        self.segment_duration = segment_duration;
        self.ease = ease;
        self
    }

    pub fn to(mut self, target: TargetPath, value: f32, at: f32) -> Self {
        self.entries.push(TimelineEntry::new(target, value, at));
        self
    }

    pub fn entries(mut self, entries: impl IntoIterator<Item = TimelineEntry>) -> Self {
        self.entries.extend(entries);
        self
    }

    pub fn build(self, initial: Pose) -> Result<Timeline, TimelineError> {
        Timeline::new(self.entries, self.segment_duration, self.ease, initial)
    }
}

/// The product page script: swing right, swing left, then settle back to
/// the rest pose and hold until the end of the page.
pub fn product_keyframes() -> Vec<TimelineEntry> {
    use TargetPath::*;

    let mut entries = vec![
        TimelineEntry::new(RotationY, 0.6, 2.0),
        TimelineEntry::new(PositionX, 1.0, 2.0),
        TimelineEntry::new(RotationY, 2.0, 6.0),
        TimelineEntry::new(PositionX, -1.0, 6.0),
    ];
    for at in [11.0, 13.0, 16.0, 20.0] {
        entries.push(TimelineEntry::new(RotationY, 0.0, at));
        entries.push(TimelineEntry::new(RotationX, 0.0, at));
        entries.push(TimelineEntry::new(PositionX, 0.0, at));
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Timeline {
        Timeline::builder()
            .entries(product_keyframes())
            .build(Pose::IDENTITY)
            .unwrap()
    }

    #[test]
    fn duration_is_last_keyframe_time() {
        assert_eq!(product().duration(), 20.0);
    }

    #[test]
    fn segment_ends_on_keyframe_time() {
        let tl = product();
        let pose = tl.pose_at(2.0);
        assert_eq!(pose.rotation.y, 0.6);
        assert_eq!(pose.position.x, 1.0);
        let pose = tl.pose_at(6.0);
        assert_eq!(pose.rotation.y, 2.0);
        assert_eq!(pose.position.x, -1.0);
    }

    #[test]
    fn holds_between_segments() {
        let tl = product();
        let a = tl.pose_at(2.5);
        let b = tl.pose_at(3.9);
        assert_eq!(a, b);
        assert_eq!(a.rotation.y, 0.6);
    }

    #[test]
    fn midpoint_uses_easing() {
        let tl = product();
        // Segment 4..6 from 0.6 to 2.0; power1.inOut(0.5) == 0.5.
        let pose = tl.pose_at(5.0);
        assert!((pose.rotation.y - 1.3).abs() < 1e-5);
        // Quarter way in, quadratic ease gives 0.125.
        let pose = tl.pose_at(4.5);
        assert!((pose.rotation.y - (0.6 + 1.4 * 0.125)).abs() < 1e-5);
    }

    #[test]
    fn seek_clamps_position() {
        let mut tl = product();
        let mut pose = Pose::IDENTITY;
        tl.seek(-3.0, &mut pose);
        assert_eq!(tl.position(), 0.0);
        tl.seek(99.0, &mut pose);
        assert_eq!(tl.position(), 20.0);
        tl.seek(f32::NAN, &mut pose);
        assert_eq!(tl.position(), 0.0);
        assert_eq!(pose, Pose::IDENTITY);
    }

    #[test]
    fn untouched_components_keep_initial_value() {
        let initial = Pose {
            rotation: Vec3::new(0.0, 0.0, 0.3),
            position: Vec3::new(0.0, -0.5, 0.0),
        };
        let mut tl = Timeline::builder()
            .entries(product_keyframes())
            .build(initial)
            .unwrap();
        let mut pose = Pose::IDENTITY;
        tl.seek(7.0, &mut pose);
        assert_eq!(pose.rotation.z, 0.3);
        assert_eq!(pose.position.y, -0.5);
    }

    #[test]
    fn early_keyframe_starts_at_zero() {
        let tl = Timeline::builder()
            .to(TargetPath::PositionY, 1.0, 1.0)
            .build(Pose::IDENTITY)
            .unwrap();
        assert_eq!(tl.pose_at(0.0).position.y, 0.0);
        assert!((tl.pose_at(0.5).position.y - 0.5).abs() < 1e-6);
        assert_eq!(tl.pose_at(1.0).position.y, 1.0);
    }

    #[test]
    fn rejects_out_of_order_entries() {
        let err = Timeline::builder()
            .to(TargetPath::RotationY, 1.0, 4.0)
            .to(TargetPath::RotationY, 0.0, 2.0)
            .build(Pose::IDENTITY)
            .unwrap_err();
        assert_eq!(
            err,
            TimelineError::OutOfOrder {
                index: 1,
                at: 2.0,
                previous: 4.0
            }
        );
    }

    #[test]
    fn rejects_bad_values() {
        let nan = Timeline::builder()
            .to(TargetPath::RotationY, f32::NAN, 1.0)
            .build(Pose::IDENTITY);
        assert_eq!(nan.unwrap_err(), TimelineError::NonFinite { index: 0 });

        let negative = Timeline::builder()
            .to(TargetPath::RotationY, 1.0, -1.0)
            .build(Pose::IDENTITY);
        assert!(matches!(negative, Err(TimelineError::NegativeTime { .. })));

        let zero = Timeline::builder()
            .defaults(0.0, Ease::Linear)
            .to(TargetPath::RotationY, 1.0, 1.0)
            .build(Pose::IDENTITY);
        assert_eq!(zero.unwrap_err(), TimelineError::InvalidSegmentDuration(0.0));
    }

    #[test]
    fn empty_timeline_is_static() {
        let mut tl = Timeline::builder().build(Pose::IDENTITY).unwrap();
        let mut pose = Pose::IDENTITY;
        tl.seek(5.0, &mut pose);
        assert_eq!(tl.duration(), 0.0);
        assert_eq!(pose, Pose::IDENTITY);
    }

    #[test]
    fn extent_covers_initial_and_targets() {
        let tl = product();
        assert_eq!(tl.extent(TargetPath::RotationY), (0.0, 2.0));
        assert_eq!(tl.extent(TargetPath::PositionX), (-1.0, 1.0));
        assert_eq!(tl.extent(TargetPath::PositionZ), (0.0, 0.0));
    }

    #[test]
    fn wide_magnitude_segment_never_overshoots() {
        let from = -3.0e7f32;
        let to = 1.0e-3f32;
        let tl = Timeline::builder()
            .defaults(2.0, Ease::Linear)
            .to(TargetPath::PositionY, from, 0.0)
            .to(TargetPath::PositionY, to, 2.0)
            .build(Pose::IDENTITY)
            .unwrap();
        for i in 0..=2000 {
            let y = tl.pose_at(i as f32 / 1000.0).position.y;
            assert!(y >= from && y <= to, "position.y = {y} at step {i}");
        }
    }
}
