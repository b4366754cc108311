// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pan/zoom transform between canvas space and screen space.
//!
//! `screen = container.min + translation + canvas * scale`

use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed zoom
pub const MIN_ZOOM: f32 = 0.1;
/// Largest allowed zoom
pub const MAX_ZOOM: f32 = 3.0;
/// Margin kept around content by [`Viewport::fit_view`]
pub const FIT_PADDING: f32 = 100.0;
/// Multiplier applied by one zoom-in step
pub const ZOOM_STEP: f32 = 1.2;

/// Zoom and fit limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    /// Lower zoom bound
    pub min_zoom: f32,
    /// Upper zoom bound
    pub max_zoom: f32,
    /// Per-step zoom multiplier
    pub zoom_step: f32,
    /// Fit-view padding in canvas units
    pub fit_padding: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_step: ZOOM_STEP,
            fit_padding: FIT_PADDING,
        }
    }
}

/// The viewport transform
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Translation in container-local pixels
    pub translation: Vec2,
    /// Current zoom
    pub scale: f32,
    /// Container bounds on screen
    pub container: Rect,
    limits: ZoomLimits,
}

impl Viewport {
    /// Viewport with the canvas origin centered in `container`
    pub fn new(container: Rect) -> Self {
        Self::with_limits(container, ZoomLimits::default())
    }

    /// Viewport with custom limits
    pub fn with_limits(container: Rect, limits: ZoomLimits) -> Self {
        let mut viewport = Self {
            translation: Vec2::ZERO,
            scale: 1.0,
            container,
            limits,
        };
        viewport.reset();
        viewport
    }

    /// Current limits
    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    /// Clamp a zoom value into the allowed range
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.limits.min_zoom, self.limits.max_zoom)
    }

    /// Change the container bounds (window resize)
    pub fn set_container(&mut self, container: Rect) {
        self.container = container;
    }

    /// Convert screen position to canvas position
    pub fn screen_to_canvas(&self, screen: Pos2) -> Pos2 {
        Pos2::new(
            (screen.x - self.container.left() - self.translation.x) / self.scale,
            (screen.y - self.container.top() - self.translation.y) / self.scale,
        )
    }

    /// Convert canvas position to screen position
    pub fn canvas_to_screen(&self, canvas: Pos2) -> Pos2 {
        Pos2::new(
            canvas.x * self.scale + self.translation.x + self.container.left(),
            canvas.y * self.scale + self.translation.y + self.container.top(),
        )
    }

    /// Project a canvas rectangle to screen space
    pub fn canvas_rect_to_screen(&self, rect: Rect) -> Rect {
        Rect::from_min_max(self.canvas_to_screen(rect.min), self.canvas_to_screen(rect.max))
    }

    /// Whether a screen point lies inside the container
    pub fn contains_screen(&self, screen: Pos2) -> bool {
        self.container.contains(screen)
    }

    /// Zoom to `scale` keeping the canvas point under `pivot` fixed on screen
    pub fn zoom_at_point(&mut self, scale: f32, pivot: Pos2) {
        let scale = self.clamp_scale(scale);
        let anchor = self.screen_to_canvas(pivot);
        let local = pivot - self.container.min;

        self.scale = scale;
        self.translation = local - anchor.to_vec2() * scale;
    }

    /// Zoom anchored at the container center
    pub fn set_zoom(&mut self, scale: f32) {
        self.zoom_at_point(scale, self.container.center());
    }

    /// One step in
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.scale * self.limits.zoom_step);
    }

    /// One step out
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.scale / self.limits.zoom_step);
    }

    /// Move the canvas by a screen-space delta
    pub fn pan_by(&mut self, delta: Vec2) {
        self.translation += delta;
    }

    /// Scale 1 with the canvas origin at the container center
    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.translation = self.container.size() * 0.5;
    }

    /// Fit canvas-space content bounds into the container.
    ///
    /// Never zooms past 100%. `None` (no content) resets the view.
    pub fn fit_view(&mut self, content: Option<Rect>) {
        let Some(content) = content else {
            self.reset();
            return;
        };

        let padded = content.expand(self.limits.fit_padding);
        let scale_x = self.container.width() / padded.width();
        let scale_y = self.container.height() / padded.height();
        let scale = self.clamp_scale(scale_x.min(scale_y).min(1.0));

        self.scale = scale;
        self.translation = self.container.size() * 0.5 - padded.center().to_vec2() * scale;
    }
}
