//! Screen/canvas coordinate mapping and zoom bounds.

/// Smallest supported zoom factor.
pub const MIN_ZOOM: f64 = 0.5;
/// Largest supported zoom factor.
pub const MAX_ZOOM: f64 = 2.0;
pub const DEFAULT_ZOOM: f64 = 1.0;

/// Clamps a zoom factor into `[MIN_ZOOM, MAX_ZOOM]`.
pub fn clamp_zoom(zoom: f64) -> f64 {
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Pointer position in screen (window) pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Position in canvas space, where nodes live.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CanvasPoint {
    pub x: f64,
    pub y: f64,
}

impl CanvasPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset_from(self, other: CanvasPoint) -> CanvasPoint {
        CanvasPoint::new(self.x - other.x, self.y - other.y)
    }
}

/// Placement of the canvas inside the window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    /// Screen position of the canvas top-left corner.
    pub origin: ScreenPoint,
}

impl Viewport {
    pub fn new(origin: ScreenPoint) -> Self {
        Self { origin }
    }

    /// Pointer minus canvas origin, divided by zoom.
    pub fn screen_to_canvas(&self, point: ScreenPoint, zoom: f64) -> CanvasPoint {
        let zoom = effective_zoom(zoom);
        CanvasPoint::new(
            (point.x - self.origin.x) / zoom,
            (point.y - self.origin.y) / zoom,
        )
    }

    pub fn canvas_to_screen(&self, point: CanvasPoint, zoom: f64) -> ScreenPoint {
        let zoom = effective_zoom(zoom);
        ScreenPoint::new(
            point.x * zoom + self.origin.x,
            point.y * zoom + self.origin.y,
        )
    }
}

fn effective_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() {
        clamp_zoom(zoom)
    } else {
        DEFAULT_ZOOM
    }
}

#[cfg(test)]
mod tests {
    use super::{clamp_zoom, CanvasPoint, ScreenPoint, Viewport, MAX_ZOOM, MIN_ZOOM};

    #[test]
    fn clamp_bounds_any_delta_sequence() {
        let mut zoom = 1.0;
        for delta in [0.7, 0.7, -3.0, 10.0, -0.25, f64::MAX, -f64::MAX] {
            zoom = clamp_zoom(zoom + delta);
            assert!((MIN_ZOOM..=MAX_ZOOM).contains(&zoom));
        }
    }

    #[test]
    fn screen_canvas_mapping_roundtrips_under_zoom() {
        let viewport = Viewport::new(ScreenPoint::new(40.0, 20.0));
        let canvas = viewport.screen_to_canvas(ScreenPoint::new(240.0, 120.0), 2.0);
        assert_eq!(canvas, CanvasPoint::new(100.0, 50.0));
        assert_eq!(
            viewport.canvas_to_screen(canvas, 2.0),
            ScreenPoint::new(240.0, 120.0)
        );
    }
}
