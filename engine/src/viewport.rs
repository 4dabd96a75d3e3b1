use atlas_shared::geometry::Bounds;

/// Viewport manages the pan/zoom transformation from geographic coordinates
/// (lon/lat degrees) to screen pixels. North is up, so the latitude axis is
/// flipped relative to screen y.
#[derive(Debug, Clone)]
pub struct Viewport {
    pub offset_x: f64,
    pub offset_y: f64,
    /// Pixels per degree.
    pub scale: f64,
}

const MIN_SCALE: f64 = 0.1;
const MAX_SCALE: f64 = 5000.0;
const ZOOM_SENSITIVITY: f64 = 0.001;

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 8.0,
        }
    }
}

impl Viewport {
    /// Convert geographic coordinates to screen coordinates.
    pub fn world_to_screen(&self, lon: f64, lat: f64) -> (f64, f64) {
        (
            lon * self.scale + self.offset_x,
            -lat * self.scale + self.offset_y,
        )
    }

    /// Convert screen coordinates to geographic coordinates.
    pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
        (
            (sx - self.offset_x) / self.scale,
            (self.offset_y - sy) / self.scale,
        )
    }

    /// Zoom toward a focus point (screen coordinates).
    pub fn zoom_at(&mut self, delta: f64, screen_x: f64, screen_y: f64) {
        let factor = (-delta * ZOOM_SENSITIVITY).exp();
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let ratio = new_scale / self.scale;

        // Adjust offset so the point under the cursor stays fixed
        self.offset_x = screen_x - (screen_x - self.offset_x) * ratio;
        self.offset_y = screen_y - (screen_y - self.offset_y) * ratio;
        self.scale = new_scale;
    }

    /// Pan by screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Fit the viewport to the given geographic bounds with a fixed pixel
    /// padding on every side. Degenerate bounds or an unusably small canvas
    /// leave the viewport untouched.
    pub fn fit_bounds(&mut self, bounds: Bounds, canvas_w: f64, canvas_h: f64, padding_px: f64) {
        let world_w = bounds.width();
        let world_h = bounds.height();
        let usable_w = canvas_w - padding_px * 2.0;
        let usable_h = canvas_h - padding_px * 2.0;

        if world_w <= 0.0 || world_h <= 0.0 || usable_w <= 0.0 || usable_h <= 0.0 {
            return;
        }

        let scale_x = usable_w / world_w;
        let scale_y = usable_h / world_h;
        self.scale = scale_x.min(scale_y).clamp(MIN_SCALE, MAX_SCALE);

        let (center_x, center_y) = bounds.center();
        self.offset_x = canvas_w / 2.0 - center_x * self.scale;
        self.offset_y = canvas_h / 2.0 + center_y * self.scale;
    }
}
