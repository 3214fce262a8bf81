//! Rendering: rasterizes the scene into a pixel buffer.
//!
//! This module is the only place that touches `tiny_skia`. It receives
//! read-only views of document and camera state and produces pixels — it
//! never mutates application state.
//!
//! Two modes, mirroring the engine's render actions: a full redraw (clear,
//! apply the camera transform, draw committed paths in z-order, then live
//! peer paths, then the local in-progress path) and an incremental segment
//! stroke used for freehand input between full redraws. Eraser paths stroke
//! with a destination-out blend at full opacity, so they punch through
//! whatever was drawn before them in the same pass and nothing after.

#![allow(clippy::cast_possible_truncation)]

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use frames::{Path, Point, Tool};
use tiny_skia::{
    BlendMode, Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform,
};

use crate::camera::Camera;
use crate::doc::PathStore;

/// Fallback ink for unparseable colors; a bad peer gets black strokes, not a
/// dropped frame.
const INK_FALLBACK: (u8, u8, u8) = (0x1f, 0x1a, 0x17);

/// Error building a renderer.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The requested pixel buffer has a zero dimension.
    #[error("invalid render target size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}

/// Software renderer for one canvas.
#[derive(Debug)]
pub struct Renderer {
    pixmap: Pixmap,
    dpr: f32,
}

impl Renderer {
    /// Create a renderer with a device-pixel buffer of `width` × `height`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidSize`] when either dimension is zero.
    pub fn new(width: u32, height: u32, dpr: f64) -> Result<Self, RenderError> {
        let pixmap = Pixmap::new(width, height)
            .ok_or(RenderError::InvalidSize { width, height })?;
        Ok(Self { pixmap, dpr: dpr as f32 })
    }

    /// The rendered pixels (premultiplied RGBA), e.g. for export compositing.
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Full redraw: clear to the backdrop, then committed paths in z-order,
    /// then live peer paths, then the local in-progress path.
    pub fn draw_scene(
        &mut self,
        store: &PathStore,
        current: Option<&Path>,
        camera: &Camera,
        backdrop: Option<&str>,
    ) {
        let clear = backdrop.map_or(Color::TRANSPARENT, |c| parse_color(c, 1.0));
        self.pixmap.fill(clear);

        let ts = view_transform(camera, self.dpr);
        for path in store.committed() {
            draw_path(&mut self.pixmap, path, ts);
        }
        for path in store.live().values() {
            draw_path(&mut self.pixmap, path, ts);
        }
        if let Some(path) = current {
            draw_path(&mut self.pixmap, path, ts);
        }
    }

    /// Incremental freehand draw: stroke only the newest segment, without
    /// clearing. Only valid for pencil/eraser paths; shape previews need a
    /// full redraw to erase their previous frame.
    pub fn draw_segment(&mut self, path: &Path, from: Point, to: Point, camera: &Camera) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);
        let Some(segment) = pb.finish() else {
            return;
        };
        let paint = paint_for(path);
        let stroke = stroke_for(path);
        let ts = view_transform(camera, self.dpr);
        self.pixmap.stroke_path(&segment, &paint, &stroke, ts, None);
    }
}

/// World→device transform: the camera's world→screen affine scaled by the
/// device pixel ratio.
fn view_transform(camera: &Camera, dpr: f32) -> Transform {
    let scale = camera.zoom as f32 * dpr;
    Transform::from_row(
        scale,
        0.0,
        0.0,
        scale,
        camera.pan_x as f32 * dpr,
        camera.pan_y as f32 * dpr,
    )
}

fn draw_path(pixmap: &mut Pixmap, path: &Path, ts: Transform) {
    let paint = paint_for(path);

    // A freehand click with no drag is a dot, not an empty stroke.
    if path.tool.is_freehand() && path.points.len() == 1 {
        if let Some(anchor) = path.start() {
            let mut pb = PathBuilder::new();
            pb.push_circle(anchor.x as f32, anchor.y as f32, (path.size / 2.0) as f32);
            if let Some(dot) = pb.finish() {
                pixmap.fill_path(&dot, &paint, FillRule::Winding, ts, None);
            }
        }
        return;
    }

    let Some(geometry) = build_geometry(path) else {
        return;
    };
    let stroke = stroke_for(path);
    pixmap.stroke_path(&geometry, &paint, &stroke, ts, None);
}

/// Build the stroke geometry for a path in world coordinates.
fn build_geometry(path: &Path) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    match path.tool {
        Tool::Rectangle => {
            let b = path.shape_bounds()?;
            pb.move_to(b.x as f32, b.y as f32);
            pb.line_to((b.x + b.w) as f32, b.y as f32);
            pb.line_to((b.x + b.w) as f32, (b.y + b.h) as f32);
            pb.line_to(b.x as f32, (b.y + b.h) as f32);
            pb.close();
        }
        Tool::Circle => {
            let center = path.start()?;
            let radius = path.circle_radius()?;
            pb.push_circle(center.x as f32, center.y as f32, radius as f32);
        }
        Tool::Triangle => {
            let [apex, left, right] = path.triangle_vertices()?;
            pb.move_to(apex.x as f32, apex.y as f32);
            pb.line_to(left.x as f32, left.y as f32);
            pb.line_to(right.x as f32, right.y as f32);
            pb.close();
        }
        Tool::Line => {
            let start = path.start()?;
            let end = path.end()?;
            pb.move_to(start.x as f32, start.y as f32);
            pb.line_to(end.x as f32, end.y as f32);
        }
        Tool::Arrow => {
            let start = path.start()?;
            let end = path.end()?;
            let [head_a, head_b] = path.arrow_head()?;
            pb.move_to(start.x as f32, start.y as f32);
            pb.line_to(end.x as f32, end.y as f32);
            pb.line_to(head_a.x as f32, head_a.y as f32);
            pb.move_to(end.x as f32, end.y as f32);
            pb.line_to(head_b.x as f32, head_b.y as f32);
        }
        Tool::Pencil | Tool::Eraser => {
            let start = path.start()?;
            pb.move_to(start.x as f32, start.y as f32);
            for p in path.points.iter().skip(1) {
                pb.line_to(p.x as f32, p.y as f32);
            }
        }
        Tool::Icon => {
            // The glyph itself is host-rendered; the canvas draws its box.
            let anchor = path.start()?;
            let half = (path.size / 2.0) as f32;
            let (cx, cy) = (anchor.x as f32, anchor.y as f32);
            pb.move_to(cx - half, cy - half);
            pb.line_to(cx + half, cy - half);
            pb.line_to(cx + half, cy + half);
            pb.line_to(cx - half, cy + half);
            pb.close();
        }
    }
    pb.finish()
}

fn paint_for(path: &Path) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.anti_alias = true;
    if path.tool == Tool::Eraser {
        // Erasing ignores color and opacity: punch through at full strength.
        paint.set_color(Color::WHITE);
        paint.blend_mode = BlendMode::DestinationOut;
    } else {
        paint.set_color(parse_color(&path.color, path.opacity));
        paint.blend_mode = BlendMode::SourceOver;
    }
    paint
}

fn stroke_for(path: &Path) -> Stroke {
    Stroke {
        width: path.size as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    }
}

/// Parse `#rrggbb` / `#rgb` into a color with the given opacity, falling back
/// to the default ink on anything unparseable.
fn parse_color(color: &str, opacity: f64) -> Color {
    let (r, g, b) = parse_rgb(color).unwrap_or(INK_FALLBACK);
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::from_rgba8(r, g, b, alpha)
}

fn parse_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
            let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
            let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
            Some((r, g, b))
        }
        3 => {
            let nibble = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v * 17);
            Some((
                nibble(hex.get(0..1)?)?,
                nibble(hex.get(1..2)?)?,
                nibble(hex.get(2..3)?)?,
            ))
        }
        _ => None,
    }
}
