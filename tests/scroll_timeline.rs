//! Scroll-to-pose tests
//!
//! Tests for:
//! - Offset to timeline time mapping through the binder
//! - Boundary poses at the top and bottom of the page
//! - Bounded, finite poses across the whole scroll range
//! - Monotonic motion inside one segment
//! - Repeatable seeks and scrolling back

use product_viewer::binder::ScrollBinder;
use product_viewer::gfx::anim::Ease;
use product_viewer::scroll::{ScrollState, ScrollTracker};
use product_viewer::timeline::{product_keyframes, Pose, TargetPath, Timeline, TimelineEntry};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn product_binder() -> ScrollBinder {
    let timeline = Timeline::builder()
        .entries(product_keyframes())
        .build(Pose::IDENTITY)
        .unwrap();
    ScrollBinder::new(timeline)
}

fn pose_at_offset(binder: &mut ScrollBinder, offset: f32) -> Pose {
    let mut pose = Pose::IDENTITY;
    binder.apply(ScrollState { offset }, &mut pose);
    pose
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn top_of_page_is_rest_pose() {
    let mut binder = product_binder();
    assert_eq!(pose_at_offset(&mut binder, 0.0), Pose::IDENTITY);
}

#[test]
fn bottom_of_page_is_final_keyframe_pose() {
    let mut binder = product_binder();
    let pose = pose_at_offset(&mut binder, 1.0);
    assert_eq!(pose.rotation.x, 0.0);
    assert_eq!(pose.rotation.y, 0.0);
    assert_eq!(pose.position.x, 0.0);
}

#[test]
fn tenth_of_the_page_reaches_first_keyframe() {
    let mut tracker = ScrollTracker::new(6.0, 0.0, 900.0);
    tracker.scroll_to_offset(0.1);
    tracker.update(1.0 / 60.0);

    let mut binder = product_binder();
    assert!(approx(binder.time_for(tracker.offset()), 2.0));

    let mut pose = Pose::IDENTITY;
    binder.apply(tracker.state(), &mut pose);
    assert!(approx(pose.rotation.y, 0.6), "rotation.y = {}", pose.rotation.y);
    assert!(approx(pose.position.x, 1.0), "position.x = {}", pose.position.x);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn every_offset_gives_a_bounded_finite_pose() {
    let mut binder = product_binder();
    let timeline = Timeline::builder()
        .entries(product_keyframes())
        .build(Pose::IDENTITY)
        .unwrap();

    for i in 0..=1000 {
        let offset = i as f32 / 1000.0;
        let pose = pose_at_offset(&mut binder, offset);
        assert!(pose.is_finite(), "non-finite pose at offset {offset}");
        for target in TargetPath::ALL {
            let (lo, hi) = timeline.extent(target);
            let v = target.get(&pose);
            assert!(v >= lo - EPSILON && v <= hi + EPSILON, "{target:?} = {v} outside [{lo}, {hi}]");
        }
    }
}

#[test]
fn same_offset_twice_is_bit_identical() {
    let mut binder = product_binder();
    let a = pose_at_offset(&mut binder, 0.37);
    pose_at_offset(&mut binder, 0.81);
    let b = pose_at_offset(&mut binder, 0.37);
    assert_eq!(a.rotation.y.to_bits(), b.rotation.y.to_bits());
    assert_eq!(a.position.x.to_bits(), b.position.x.to_bits());
}

#[test]
fn motion_within_a_segment_is_monotonic() {
    let timeline = Timeline::builder()
        .entries(product_keyframes())
        .build(Pose::IDENTITY)
        .unwrap();

    // rotation.y climbs from 0.6 to 2.0 over [4, 6].
    let mut last = timeline.pose_at(4.0).rotation.y;
    for i in 1..=100 {
        let t = 4.0 + 2.0 * i as f32 / 100.0;
        let y = timeline.pose_at(t).rotation.y;
        assert!(y >= last, "rotation.y fell from {last} to {y} at t={t}");
        assert!(y <= 2.0);
        last = y;
    }
    assert_eq!(last, 2.0);
}

#[test]
fn scrolling_back_restores_earlier_pose() {
    let mut binder = product_binder();
    let early = pose_at_offset(&mut binder, 0.05);
    pose_at_offset(&mut binder, 0.9);
    assert_eq!(pose_at_offset(&mut binder, 0.05), early);
}

#[test]
fn degenerate_page_stays_at_rest() {
    let mut tracker = ScrollTracker::new(1.0, 0.0, 800.0);
    tracker.scroll_by(500.0);
    tracker.update(0.1);
    assert_eq!(tracker.offset(), 0.0);

    let mut binder = product_binder();
    let mut pose = Pose::IDENTITY;
    binder.apply(tracker.state(), &mut pose);
    assert_eq!(pose, Pose::IDENTITY);
}

#[test]
fn linear_ease_hits_the_midpoint() {
    let timeline = Timeline::builder()
        .defaults(2.0, Ease::Linear)
        .entries([TimelineEntry::new(TargetPath::PositionZ, 4.0, 2.0)])
        .build(Pose::IDENTITY)
        .unwrap();
    assert!(approx(timeline.pose_at(1.0).position.z, 2.0));
}
