//! Path model: tools, geometry points, and per-path style.
//!
//! A [`Path`] is the unit of everything drawn on the board — one freehand
//! stroke, one shape, or one icon stamp. It is also the unit that travels on
//! the wire, so the serde shape here *is* the wire shape. Committed paths are
//! append-only: nothing mutates a path after it has been committed; edits are
//! new paths or removals.

#[cfg(test)]
#[path = "path_test.rs"]
mod path_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A point in world coordinates (pan/zoom independent).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// The drawing tool a path was made with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Freehand stroke (default).
    #[default]
    Pencil,
    /// Freehand stroke that punches through earlier paths.
    Eraser,
    /// Axis-aligned rectangle spanning start→end.
    Rectangle,
    /// Circle centered on start with radius |start→end|.
    Circle,
    /// Isoceles triangle: apex above the midpoint, base along end.y.
    Triangle,
    /// Straight segment with a two-stroke arrowhead at the end.
    Arrow,
    /// Straight segment.
    Line,
    /// Icon stamp anchored at a single point.
    Icon,
}

impl Tool {
    /// Whether this tool is a two-point shape (start + rubber-banded end).
    #[must_use]
    pub fn is_shape(self) -> bool {
        matches!(
            self,
            Self::Rectangle | Self::Circle | Self::Triangle | Self::Arrow | Self::Line
        )
    }

    /// Whether this tool accumulates freehand points.
    #[must_use]
    pub fn is_freehand(self) -> bool {
        matches!(self, Self::Pencil | Self::Eraser)
    }
}

/// Brush settings applied to every new path at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrushSettings {
    /// Stroke color as an RGB hex string, e.g. `"#ff6b6b"`.
    pub color: String,
    /// Stroke width (or stamp scale) in world units.
    pub size: f64,
    /// Stroke opacity in `[0, 1]`.
    pub opacity: f64,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self { color: "#1f1a17".into(), size: 4.0, opacity: 1.0 }
    }
}

/// Axis-aligned bounding box in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// One drawable unit: a committed or in-progress stroke, shape, or stamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// Unique identifier, generated when the path is started.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub tool: Tool,
    /// Sampled points in order. Shape tools hold `[start, end]`; icon stamps
    /// hold a single anchor.
    #[serde(default)]
    pub points: Vec<Point>,
    pub color: String,
    pub size: f64,
    pub opacity: f64,
    /// Icon name, present only for [`Tool::Icon`] paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Path {
    /// Start a new path at `start` with the given brush.
    #[must_use]
    pub fn begin(tool: Tool, start: Point, brush: &BrushSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            tool,
            points: vec![start],
            color: brush.color.clone(),
            size: brush.size,
            opacity: brush.opacity,
            icon: None,
        }
    }

    /// Create an icon stamp anchored at `anchor`.
    #[must_use]
    pub fn icon_stamp(name: &str, anchor: Point, color: &str, size: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            tool: Tool::Icon,
            points: vec![anchor],
            color: color.into(),
            size,
            opacity: 1.0,
            icon: Some(name.into()),
        }
    }

    /// The anchor (first) point, if any.
    #[must_use]
    pub fn start(&self) -> Option<Point> {
        self.points.first().copied()
    }

    /// The rubber-banded end point of a shape, if any.
    #[must_use]
    pub fn end(&self) -> Option<Point> {
        self.points.get(1).copied()
    }

    /// Bounding box of a shape path spanning start→end, normalized so width
    /// and height are non-negative. `None` unless both endpoints exist.
    #[must_use]
    pub fn shape_bounds(&self) -> Option<Bounds> {
        let start = self.start()?;
        let end = self.end()?;
        Some(Bounds {
            x: start.x.min(end.x),
            y: start.y.min(end.y),
            w: (end.x - start.x).abs(),
            h: (end.y - start.y).abs(),
        })
    }

    /// Circle radius: distance from start to end.
    #[must_use]
    pub fn circle_radius(&self) -> Option<f64> {
        Some(self.start()?.distance_to(self.end()?))
    }

    /// Triangle vertices: apex above the horizontal midpoint, base corners on
    /// `end.y`.
    #[must_use]
    pub fn triangle_vertices(&self) -> Option<[Point; 3]> {
        let start = self.start()?;
        let end = self.end()?;
        Some([
            Point::new(start.x + (end.x - start.x) / 2.0, start.y),
            Point::new(start.x, end.y),
            Point::new(end.x, end.y),
        ])
    }

    /// The two free endpoints of the arrowhead strokes, computed at the end
    /// point from the segment's angle.
    #[must_use]
    pub fn arrow_head(&self) -> Option<[Point; 2]> {
        let start = self.start()?;
        let end = self.end()?;
        let angle = (end.y - start.y).atan2(end.x - start.x);
        let left = angle - ARROW_HEAD_ANGLE;
        let right = angle + ARROW_HEAD_ANGLE;
        Some([
            Point::new(
                end.x - ARROW_HEAD_LEN * left.cos(),
                end.y - ARROW_HEAD_LEN * left.sin(),
            ),
            Point::new(
                end.x - ARROW_HEAD_LEN * right.cos(),
                end.y - ARROW_HEAD_LEN * right.sin(),
            ),
        ])
    }

    /// A shape committed without a drag (one point, or identical endpoints)
    /// is degenerate and gets discarded. Freehand paths are never degenerate:
    /// a single-point pencil stroke is kept as a dot.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        if !self.tool.is_shape() {
            return self.points.is_empty();
        }
        match (self.start(), self.end()) {
            (Some(start), Some(end)) => start == end,
            _ => true,
        }
    }

    /// Whether the path is structurally sound enough to apply from the wire:
    /// non-empty finite points, positive size, opacity in `[0, 1]`. A peer
    /// that sends anything else gets ignored, not a crash.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.points.is_empty()
            && self.points.iter().all(|p| p.x.is_finite() && p.y.is_finite())
            && self.size.is_finite()
            && self.size > 0.0
            && (0.0..=1.0).contains(&self.opacity)
    }
}

/// Arrowhead length in world units.
pub const ARROW_HEAD_LEN: f64 = 10.0;

/// Arrowhead half-angle in radians (30°).
pub const ARROW_HEAD_ANGLE: f64 = std::f64::consts::PI / 6.0;
