// SPDX-License-Identifier: MIT OR Apache-2.0
//! Layout math shared by the store, viewport and router.
//!
//! Everything here is a pure function over canvas or screen coordinates.

use egui::{Pos2, Rect};
use serde::{Deserialize, Serialize};

/// Default snapping grid in canvas units
pub const GRID_SIZE: f32 = 20.0;

/// Minimum horizontal control-point offset for connection curves
pub const BEZIER_MIN_OFFSET: f32 = 50.0;

/// Maximum horizontal control-point offset for connection curves
pub const BEZIER_MAX_OFFSET: f32 = 150.0;

/// Round a coordinate to the nearest multiple of `grid`.
///
/// A non-positive grid disables snapping.
pub fn snap(value: f32, grid: f32) -> f32 {
    if grid <= 0.0 {
        return value;
    }
    (value / grid).round() * grid
}

/// Snap both axes of a position
pub fn snap_pos(pos: Pos2, grid: f32) -> Pos2 {
    Pos2::new(snap(pos.x, grid), snap(pos.y, grid))
}

/// Whether two rectangles overlap (touching edges count)
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.intersects(b)
}

/// Vertical offset of handle `index` out of `count` handles on a node of `height`
pub fn handle_offset_y(height: f32, count: usize, index: usize) -> f32 {
    height / (count as f32 + 1.0) * (index as f32 + 1.0)
}

/// Horizontal distance of both control points from their endpoints
pub fn bezier_offset(source_x: f32, target_x: f32) -> f32 {
    ((target_x - source_x).abs() * 0.5).clamp(BEZIER_MIN_OFFSET, BEZIER_MAX_OFFSET)
}

/// Implied on-canvas size of a node card.
///
/// Nodes have a fixed width; the height grows so every handle gets its own row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeLayout {
    /// Card width
    pub width: f32,
    /// Minimum card height
    pub min_height: f32,
    /// Vertical space reserved per handle row
    pub handle_spacing: f32,
}

impl NodeLayout {
    /// Card size for a node with the given handle counts
    pub fn size(&self, inputs: usize, outputs: usize) -> egui::Vec2 {
        let rows = inputs.max(outputs) as f32 + 1.0;
        egui::vec2(self.width, self.min_height.max(rows * self.handle_spacing))
    }
}

impl Default for NodeLayout {
    fn default() -> Self {
        Self {
            width: 180.0,
            min_height: 80.0,
            handle_spacing: 20.0,
        }
    }
}

/// A cubic bezier connection curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierPath {
    /// Start point (source handle)
    pub start: Pos2,
    /// Control point leaving the source
    pub ctrl1: Pos2,
    /// Control point entering the target
    pub ctrl2: Pos2,
    /// End point (target handle)
    pub end: Pos2,
}

impl BezierPath {
    /// Curve that leaves `start` to the right and enters `end` from the left.
    ///
    /// This holds whatever the relative position of the endpoints is, so a
    /// backwards edge loops around instead of taking the shortest route.
    pub fn between(start: Pos2, end: Pos2) -> Self {
        let offset = bezier_offset(start.x, end.x);
        Self {
            start,
            ctrl1: Pos2::new(start.x + offset, start.y),
            ctrl2: Pos2::new(end.x - offset, end.y),
            end,
        }
    }

    /// Point on the curve at parameter `t` in `[0, 1]`
    pub fn point_at(&self, t: f32) -> Pos2 {
        let t = t.clamp(0.0, 1.0);
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        let x = mt3 * self.start.x
            + 3.0 * mt2 * t * self.ctrl1.x
            + 3.0 * mt * t2 * self.ctrl2.x
            + t3 * self.end.x;
        let y = mt3 * self.start.y
            + 3.0 * mt2 * t * self.ctrl1.y
            + 3.0 * mt * t2 * self.ctrl2.y
            + t3 * self.end.y;

        Pos2::new(x, y)
    }

    /// Polyline approximation with `segments + 1` points
    pub fn sample(&self, segments: usize) -> Vec<Pos2> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| self.point_at(i as f32 / segments as f32))
            .collect()
    }

    /// SVG path data (`M ... C ...`)
    pub fn to_svg(&self) -> String {
        format!(
            "M {} {} C {} {} {} {} {} {}",
            self.start.x,
            self.start.y,
            self.ctrl1.x,
            self.ctrl1.y,
            self.ctrl2.x,
            self.ctrl2.y,
            self.end.x,
            self.end.y
        )
    }

    /// Axis-aligned box around the endpoints and control points
    pub fn bounding_rect(&self) -> Rect {
        Rect::from_points(&[self.start, self.ctrl1, self.ctrl2, self.end])
    }
}
