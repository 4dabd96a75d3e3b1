use atlas_shared::geometry::Bounds;
use atlas_shared::join::JoinedFeature;

/// Identifiers for the three district layers, bottom to top.
pub const FILL_LAYER: &str = "district-fill";
pub const OUTLINE_LAYER: &str = "district-outline";
pub const HOVER_LAYER: &str = "district-hover";

/// Paint contract shared by every surface implementation.
pub const FILL_OPACITY: f64 = 0.75;
pub const OUTLINE_COLOR: &str = "#0f172a";
pub const OUTLINE_WIDTH_SELECTED: f64 = 2.5;
pub const OUTLINE_WIDTH_BASE: f64 = 1.0;
pub const HOVER_COLOR: &str = "#111827";
pub const HOVER_WIDTH: f64 = 3.0;

/// Pixel padding applied when fitting the camera to a dataset.
pub const FIT_PADDING_PX: f64 = 40.0;

/// Predicate for the hover layer. `MatchNothing` is the rest state and also
/// covers hovered features without a district identifier, which must never
/// light up other identifier-less features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverFilter {
    District(String),
    MatchNothing,
}

/// Rendering backend for the district map. The engine drives one of these;
/// implementations range from a real canvas to the SVG writer used for
/// server-side previews.
pub trait MapSurface {
    /// Replace the rendered dataset with freshly joined features.
    fn set_dataset(&mut self, features: &[JoinedFeature]);

    /// Restrict the hover layer to a single district, or hide it.
    fn set_hover_filter(&mut self, filter: HoverFilter);

    /// Widen the outline of the selected district. `None` restores the base
    /// width everywhere.
    fn set_selected_district(&mut self, district: Option<&str>);

    /// Move the camera to frame the given geographic bounds.
    fn fit_bounds(&mut self, bounds: Bounds, padding_px: f64);

    /// Release the surface. Further calls after teardown are a bug in the
    /// caller, not the surface.
    fn teardown(&mut self);
}

/// Operations observed by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    DatasetReplaced { features: usize },
    HoverFilter(HoverFilter),
    SelectedDistrict(Option<String>),
    FitBounds { bounds: Bounds, padding_px: f64 },
    Teardown,
}

/// A surface that records every call, for driving the view in tests.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<SurfaceOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, SurfaceOp::FitBounds { .. }))
            .count()
    }
}

impl MapSurface for RecordingSurface {
    fn set_dataset(&mut self, features: &[JoinedFeature]) {
        self.ops.push(SurfaceOp::DatasetReplaced {
            features: features.len(),
        });
    }

    fn set_hover_filter(&mut self, filter: HoverFilter) {
        self.ops.push(SurfaceOp::HoverFilter(filter));
    }

    fn set_selected_district(&mut self, district: Option<&str>) {
        self.ops
            .push(SurfaceOp::SelectedDistrict(district.map(str::to_string)));
    }

    fn fit_bounds(&mut self, bounds: Bounds, padding_px: f64) {
        self.ops.push(SurfaceOp::FitBounds { bounds, padding_px });
    }

    fn teardown(&mut self) {
        self.ops.push(SurfaceOp::Teardown);
    }
}
