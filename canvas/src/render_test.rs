use frames::{BrushSettings, Point, Tool};

use super::*;

fn brush(color: &str, size: f64, opacity: f64) -> BrushSettings {
    BrushSettings { color: color.into(), size, opacity }
}

fn polyline(tool: Tool, points: &[(f64, f64)], settings: &BrushSettings) -> Path {
    let mut iter = points.iter();
    let (x, y) = iter.next().copied().unwrap_or((0.0, 0.0));
    let mut path = Path::begin(tool, Point::new(x, y), settings);
    for (x, y) in iter {
        path.points.push(Point::new(*x, *y));
    }
    path
}

fn alpha_at(renderer: &Renderer, x: u32, y: u32) -> u8 {
    renderer.pixmap().pixel(x, y).map_or(0, |p| p.alpha())
}

fn renderer_100() -> Renderer {
    Renderer::new(100, 100, 1.0).unwrap()
}

// =============================================================
// Construction
// =============================================================

#[test]
fn zero_size_is_an_error() {
    let err = Renderer::new(0, 100, 1.0).unwrap_err();
    assert!(err.to_string().contains("invalid render target size"));
}

#[test]
fn fresh_renderer_is_transparent() {
    let renderer = renderer_100();
    assert_eq!(alpha_at(&renderer, 50, 50), 0);
}

// =============================================================
// Full redraw
// =============================================================

#[test]
fn committed_stroke_covers_pixels() {
    let mut renderer = renderer_100();
    let mut store = PathStore::new();
    store.commit(polyline(Tool::Pencil, &[(10.0, 50.0), (90.0, 50.0)], &brush("#ff0000", 10.0, 1.0)));

    renderer.draw_scene(&store, None, &Camera::default(), None);
    assert!(alpha_at(&renderer, 50, 50) > 0);
    // Far from the stroke stays clear.
    assert_eq!(alpha_at(&renderer, 50, 10), 0);
}

#[test]
fn backdrop_fills_whole_buffer() {
    let mut renderer = renderer_100();
    renderer.draw_scene(&PathStore::new(), None, &Camera::default(), Some("#ffffff"));
    let corner = renderer.pixmap().pixel(0, 0).unwrap();
    assert_eq!(corner.alpha(), 255);
    assert_eq!(corner.red(), 255);
}

#[test]
fn redraw_clears_previous_frame() {
    let mut renderer = renderer_100();
    let mut store = PathStore::new();
    store.commit(polyline(Tool::Pencil, &[(10.0, 50.0), (90.0, 50.0)], &brush("#ff0000", 10.0, 1.0)));
    renderer.draw_scene(&store, None, &Camera::default(), None);
    assert!(alpha_at(&renderer, 50, 50) > 0);

    store.clear_all();
    renderer.draw_scene(&store, None, &Camera::default(), None);
    assert_eq!(alpha_at(&renderer, 50, 50), 0);
}

#[test]
fn live_and_current_paths_are_drawn() {
    let mut renderer = renderer_100();
    let mut store = PathStore::new();
    store.upsert_live("peer", polyline(Tool::Pencil, &[(10.0, 20.0), (90.0, 20.0)], &brush("#00ff00", 8.0, 1.0)));
    let current = polyline(Tool::Pencil, &[(10.0, 80.0), (90.0, 80.0)], &brush("#0000ff", 8.0, 1.0));

    renderer.draw_scene(&store, Some(&current), &Camera::default(), None);
    assert!(alpha_at(&renderer, 50, 20) > 0, "live path");
    assert!(alpha_at(&renderer, 50, 80) > 0, "current path");
}

// =============================================================
// Camera transform
// =============================================================

#[test]
fn zoom_and_pan_map_world_to_device() {
    let mut renderer = Renderer::new(200, 200, 1.0).unwrap();
    let mut store = PathStore::new();
    store.commit(polyline(Tool::Pencil, &[(10.0, 50.0), (40.0, 50.0)], &brush("#ff0000", 6.0, 1.0)));

    let camera = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 2.0 };
    renderer.draw_scene(&store, None, &camera, None);
    // World (25, 50) lands at device (50, 100).
    assert!(alpha_at(&renderer, 50, 100) > 0);
    // The untransformed position is clear.
    assert_eq!(alpha_at(&renderer, 25, 10), 0);
}

#[test]
fn dpr_scales_device_output() {
    let mut renderer = Renderer::new(200, 200, 2.0).unwrap();
    let mut store = PathStore::new();
    store.commit(polyline(Tool::Pencil, &[(30.0, 50.0), (70.0, 50.0)], &brush("#ff0000", 6.0, 1.0)));

    renderer.draw_scene(&store, None, &Camera::default(), None);
    // CSS (50, 50) is device (100, 100) at dpr 2.
    assert!(alpha_at(&renderer, 100, 100) > 0);
}

// =============================================================
// Compositing
// =============================================================

#[test]
fn eraser_erases_paths_drawn_before_it() {
    let mut renderer = renderer_100();
    let mut store = PathStore::new();
    store.commit(polyline(Tool::Pencil, &[(10.0, 50.0), (90.0, 50.0)], &brush("#ff0000", 8.0, 1.0)));
    store.commit(polyline(Tool::Eraser, &[(50.0, 10.0), (50.0, 90.0)], &brush("#ffffff", 12.0, 1.0)));

    renderer.draw_scene(&store, None, &Camera::default(), None);
    // The crossing point is punched out…
    assert_eq!(alpha_at(&renderer, 50, 50), 0);
    // …but the rest of the stroke survives.
    assert!(alpha_at(&renderer, 20, 50) > 0);
}

#[test]
fn eraser_does_not_affect_paths_drawn_after_it() {
    let mut renderer = renderer_100();
    let mut store = PathStore::new();
    store.commit(polyline(Tool::Eraser, &[(50.0, 10.0), (50.0, 90.0)], &brush("#ffffff", 12.0, 1.0)));
    store.commit(polyline(Tool::Pencil, &[(10.0, 50.0), (90.0, 50.0)], &brush("#ff0000", 8.0, 1.0)));

    renderer.draw_scene(&store, None, &Camera::default(), None);
    assert!(alpha_at(&renderer, 50, 50) > 0);
}

#[test]
fn opacity_reduces_stroke_alpha() {
    let mut renderer = renderer_100();
    let mut store = PathStore::new();
    store.commit(polyline(Tool::Pencil, &[(10.0, 50.0), (90.0, 50.0)], &brush("#ff0000", 10.0, 0.5)));

    renderer.draw_scene(&store, None, &Camera::default(), None);
    let alpha = alpha_at(&renderer, 50, 50);
    assert!(alpha > 100 && alpha < 160, "expected ~50% alpha, got {alpha}");
}

#[test]
fn malformed_color_falls_back_to_ink() {
    let mut renderer = renderer_100();
    let mut store = PathStore::new();
    store.commit(polyline(Tool::Pencil, &[(10.0, 50.0), (90.0, 50.0)], &brush("teal-ish", 10.0, 1.0)));

    renderer.draw_scene(&store, None, &Camera::default(), None);
    assert!(alpha_at(&renderer, 50, 50) > 0);
}

// =============================================================
// Shape geometry on screen
// =============================================================

#[test]
fn rectangle_strokes_its_outline_not_its_interior() {
    let mut renderer = renderer_100();
    let mut store = PathStore::new();
    store.commit(polyline(Tool::Rectangle, &[(20.0, 20.0), (80.0, 80.0)], &brush("#ff0000", 4.0, 1.0)));

    renderer.draw_scene(&store, None, &Camera::default(), None);
    // Edge midpoints covered.
    assert!(alpha_at(&renderer, 50, 20) > 0);
    assert!(alpha_at(&renderer, 20, 50) > 0);
    // Interior stays clear (shapes are stroked, not filled).
    assert_eq!(alpha_at(&renderer, 50, 50), 0);
}

#[test]
fn circle_strokes_at_its_radius() {
    let mut renderer = renderer_100();
    let mut store = PathStore::new();
    // Center (50, 50), radius 30.
    store.commit(polyline(Tool::Circle, &[(50.0, 50.0), (80.0, 50.0)], &brush("#ff0000", 4.0, 1.0)));

    renderer.draw_scene(&store, None, &Camera::default(), None);
    assert!(alpha_at(&renderer, 80, 50) > 0);
    assert!(alpha_at(&renderer, 20, 50) > 0);
    assert_eq!(alpha_at(&renderer, 50, 50), 0);
}

#[test]
fn single_point_pencil_renders_a_dot() {
    let mut renderer = renderer_100();
    let mut store = PathStore::new();
    store.commit(polyline(Tool::Pencil, &[(50.0, 50.0)], &brush("#ff0000", 10.0, 1.0)));

    renderer.draw_scene(&store, None, &Camera::default(), None);
    assert!(alpha_at(&renderer, 50, 50) > 0);
    assert_eq!(alpha_at(&renderer, 70, 50), 0);
}

#[test]
fn icon_stamp_draws_its_glyph_box() {
    let mut renderer = renderer_100();
    let mut store = PathStore::new();
    store.commit(Path::icon_stamp("cat", Point::new(50.0, 50.0), "#ff0000", 40.0));

    renderer.draw_scene(&store, None, &Camera::default(), None);
    // Box edge at x = 30.
    assert!(alpha_at(&renderer, 30, 50) > 0);
}

// =============================================================
// Incremental draw
// =============================================================

#[test]
fn segment_draw_strokes_without_clearing() {
    let mut renderer = renderer_100();
    let mut store = PathStore::new();
    store.commit(polyline(Tool::Pencil, &[(10.0, 20.0), (90.0, 20.0)], &brush("#ff0000", 8.0, 1.0)));
    renderer.draw_scene(&store, None, &Camera::default(), None);

    let pencil = polyline(Tool::Pencil, &[(10.0, 80.0)], &brush("#0000ff", 8.0, 1.0));
    renderer.draw_segment(&pencil, Point::new(10.0, 80.0), Point::new(90.0, 80.0), &Camera::default());

    // New segment drawn…
    assert!(alpha_at(&renderer, 50, 80) > 0);
    // …and the earlier frame content survived (no clear).
    assert!(alpha_at(&renderer, 50, 20) > 0);
}

#[test]
fn eraser_segment_erases_incrementally() {
    let mut renderer = renderer_100();
    let mut store = PathStore::new();
    store.commit(polyline(Tool::Pencil, &[(10.0, 50.0), (90.0, 50.0)], &brush("#ff0000", 8.0, 1.0)));
    renderer.draw_scene(&store, None, &Camera::default(), None);
    assert!(alpha_at(&renderer, 50, 50) > 0);

    let eraser = polyline(Tool::Eraser, &[(50.0, 10.0)], &brush("#ffffff", 12.0, 1.0));
    renderer.draw_segment(&eraser, Point::new(50.0, 10.0), Point::new(50.0, 90.0), &Camera::default());
    assert_eq!(alpha_at(&renderer, 50, 50), 0);
}

#[test]
fn segment_draw_respects_camera() {
    let mut renderer = Renderer::new(200, 200, 1.0).unwrap();
    let pencil = polyline(Tool::Pencil, &[(10.0, 50.0)], &brush("#ff0000", 6.0, 1.0));
    let camera = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 2.0 };
    renderer.draw_segment(&pencil, Point::new(10.0, 50.0), Point::new(40.0, 50.0), &camera);
    assert!(alpha_at(&renderer, 50, 100) > 0);
}
