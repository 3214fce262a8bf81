#![allow(clippy::float_cmp)]

use super::*;
use crate::consts::{ZOOM_MAX, ZOOM_MIN};

const EPSILON: f64 = 1e-10;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

// --- Defaults ---

#[test]
fn default_is_identity() {
    let cam = Camera::default();
    assert_eq!(cam.pan_x, 0.0);
    assert_eq!(cam.pan_y, 0.0);
    assert_eq!(cam.zoom, 1.0);
}

// --- screen_to_world / world_to_screen ---

#[test]
fn screen_to_world_identity() {
    let cam = Camera::default();
    let world = cam.screen_to_world(Point::new(50.0, 75.0));
    assert!(point_approx_eq(world, Point::new(50.0, 75.0)));
}

#[test]
fn screen_to_world_with_pan_and_zoom() {
    let cam = Camera { pan_x: 20.0, pan_y: 10.0, zoom: 2.0 };
    let world = cam.screen_to_world(Point::new(20.0, 10.0));
    assert!(point_approx_eq(world, Point::new(0.0, 0.0)));
}

#[test]
fn world_to_screen_with_pan_and_zoom() {
    let cam = Camera { pan_x: 20.0, pan_y: 10.0, zoom: 3.0 };
    let screen = cam.world_to_screen(Point::new(5.0, 5.0));
    assert!(approx_eq(screen.x, 35.0));
    assert!(approx_eq(screen.y, 25.0));
}

#[test]
fn round_trip_across_zoom_range() {
    // Round-trip law holds at both ends of the clamped zoom range.
    for zoom in [ZOOM_MIN, 0.75, 1.0, 2.5, ZOOM_MAX] {
        let cam = Camera { pan_x: 13.7, pan_y: -42.3, zoom };
        let world = Point::new(333.3, -999.9);
        let back = cam.screen_to_world(cam.world_to_screen(world));
        assert!(point_approx_eq(world, back), "zoom {zoom}");
    }
}

#[test]
fn screen_dist_to_world_scales_inverse() {
    let cam = Camera { pan_x: 999.0, pan_y: -999.0, zoom: 4.0 };
    assert!(approx_eq(cam.screen_dist_to_world(8.0), 2.0));
}

// --- pan_by ---

#[test]
fn pan_by_accumulates() {
    let mut cam = Camera::default();
    cam.pan_by(10.0, 5.0);
    cam.pan_by(3.0, 7.0);
    assert_eq!(cam.pan_x, 13.0);
    assert_eq!(cam.pan_y, 12.0);
}

#[test]
fn pan_by_does_not_touch_zoom() {
    let mut cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 2.5 };
    cam.pan_by(-50.0, 20.0);
    assert_eq!(cam.zoom, 2.5);
}

// --- zoom_at ---

#[test]
fn zoom_at_keeps_anchor_world_point_fixed() {
    let mut cam = Camera { pan_x: 30.0, pan_y: -20.0, zoom: 1.5 };
    let anchor = Point::new(400.0, 300.0);
    let before = cam.screen_to_world(anchor);
    cam.zoom_at(anchor, 1.3);
    let after = cam.screen_to_world(anchor);
    assert!((before.x - after.x).abs() < 1e-9);
    assert!((before.y - after.y).abs() < 1e-9);
}

#[test]
fn zoom_at_anchor_fixed_when_zooming_out() {
    let mut cam = Camera { pan_x: -5.0, pan_y: 80.0, zoom: 3.0 };
    let anchor = Point::new(120.0, 640.0);
    let before = cam.screen_to_world(anchor);
    cam.zoom_at(anchor, 0.6);
    let after = cam.screen_to_world(anchor);
    assert!(point_approx_eq(before, after));
}

#[test]
fn zoom_at_multiplies_zoom() {
    let mut cam = Camera::default();
    cam.zoom_at(Point::new(0.0, 0.0), 2.0);
    assert!(approx_eq(cam.zoom, 2.0));
}

#[test]
fn zoom_at_clamps_max() {
    let mut cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 9.5 };
    cam.zoom_at(Point::new(100.0, 100.0), 4.0);
    assert_eq!(cam.zoom, ZOOM_MAX);
}

#[test]
fn zoom_at_clamps_min() {
    let mut cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 0.15 };
    cam.zoom_at(Point::new(100.0, 100.0), 0.01);
    assert_eq!(cam.zoom, ZOOM_MIN);
}

#[test]
fn zoom_at_anchor_fixed_even_when_clamped() {
    let mut cam = Camera { pan_x: 12.0, pan_y: 34.0, zoom: 9.0 };
    let anchor = Point::new(200.0, 150.0);
    let before = cam.screen_to_world(anchor);
    cam.zoom_at(anchor, 100.0); // clamps to ZOOM_MAX
    let after = cam.screen_to_world(anchor);
    assert!(point_approx_eq(before, after));
}

// --- wheel_zoom_factor ---

#[test]
fn wheel_scroll_up_zooms_in() {
    assert!(wheel_zoom_factor(-100.0) > 1.0);
}

#[test]
fn wheel_scroll_down_zooms_out() {
    assert!(wheel_zoom_factor(100.0) < 1.0);
}

#[test]
fn wheel_zero_delta_is_identity() {
    assert!(approx_eq(wheel_zoom_factor(0.0), 1.0));
}

#[test]
fn wheel_small_deltas_compose() {
    // Two half-steps equal one full step: the exponential curve composes.
    let two_small = wheel_zoom_factor(-50.0) * wheel_zoom_factor(-50.0);
    let one_big = wheel_zoom_factor(-100.0);
    assert!(approx_eq(two_small, one_big));
}
