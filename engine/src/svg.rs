use std::fmt::Write as _;

use atlas_shared::classify::classify_margin;
use atlas_shared::format::format_lean;
use atlas_shared::geometry::Bounds;
use atlas_shared::join::JoinedFeature;
use geo::LineString;

use crate::surface::{
    FILL_LAYER, FILL_OPACITY, HOVER_COLOR, HOVER_LAYER, HOVER_WIDTH, HoverFilter, MapSurface,
    OUTLINE_COLOR, OUTLINE_LAYER, OUTLINE_WIDTH_BASE, OUTLINE_WIDTH_SELECTED,
};
use crate::viewport::Viewport;

const BACKGROUND_COLOR: &str = "#f8fafc";

/// A [`MapSurface`] that draws the district layers into an SVG document.
/// Used for server-side map previews; the layer order and paint values match
/// the interactive surface.
pub struct SvgSurface {
    width: f64,
    height: f64,
    viewport: Viewport,
    features: Vec<JoinedFeature>,
    hover: HoverFilter,
    selected: Option<String>,
    torn_down: bool,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            viewport: Viewport::default(),
            features: Vec::new(),
            hover: HoverFilter::MatchNothing,
            selected: None,
            torn_down: false,
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Render the current dataset as a complete SVG document. Layers are
    /// written bottom to top: fills, outlines, then the hover ring. Each fill
    /// carries a `<title>` tooltip naming the district and its lean.
    pub fn render(&self) -> String {
        let mut body = String::new();
        let _ = writeln!(body, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        let _ = writeln!(
            body,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height,
        );
        let _ = writeln!(
            body,
            r#"<rect width="100%" height="100%" fill="{BACKGROUND_COLOR}"/>"#
        );

        let _ = writeln!(body, r#"<g id="{FILL_LAYER}">"#);
        for feature in &self.features {
            let path = self.feature_path(feature);
            if path.is_empty() {
                continue;
            }
            let fill = classify_margin(feature.properties.dem_margin).fill_color();
            let title = xml_escape(&feature_title(feature));
            let _ = writeln!(
                body,
                r#"<path d="{path}" fill="{fill}" fill-opacity="{FILL_OPACITY}" fill-rule="evenodd"><title>{title}</title></path>"#
            );
        }
        let _ = writeln!(body, "</g>");

        let _ = writeln!(body, r#"<g id="{OUTLINE_LAYER}">"#);
        for feature in &self.features {
            let path = self.feature_path(feature);
            if path.is_empty() {
                continue;
            }
            let width = if self.is_selected(feature) {
                OUTLINE_WIDTH_SELECTED
            } else {
                OUTLINE_WIDTH_BASE
            };
            let _ = writeln!(
                body,
                r#"<path d="{path}" fill="none" stroke="{OUTLINE_COLOR}" stroke-width="{width}"/>"#
            );
        }
        let _ = writeln!(body, "</g>");

        if let HoverFilter::District(district) = &self.hover {
            let _ = writeln!(body, r#"<g id="{HOVER_LAYER}">"#);
            for feature in &self.features {
                if feature.properties.district.as_deref() != Some(district.as_str()) {
                    continue;
                }
                let path = self.feature_path(feature);
                if path.is_empty() {
                    continue;
                }
                let _ = writeln!(
                    body,
                    r#"<path d="{path}" fill="none" stroke="{HOVER_COLOR}" stroke-width="{HOVER_WIDTH}"/>"#
                );
            }
            let _ = writeln!(body, "</g>");
        }

        let _ = writeln!(body, "</svg>");
        body
    }

    fn is_selected(&self, feature: &JoinedFeature) -> bool {
        match &self.selected {
            Some(district) => feature.properties.district.as_deref() == Some(district.as_str()),
            None => false,
        }
    }

    /// Build a compact path string covering every ring of the feature,
    /// exteriors and holes alike. Empty for unsupported geometry.
    fn feature_path(&self, feature: &JoinedFeature) -> String {
        let mut out = String::new();
        for polygon in feature.geometry.polygons() {
            out.push_str(&self.ring_path(polygon.exterior()));
            for interior in polygon.interiors() {
                out.push_str(&self.ring_path(interior));
            }
        }
        out
    }

    fn ring_path(&self, ring: &LineString<f64>) -> String {
        let mut out = String::new();
        let mut coords = ring
            .coords()
            .map(|coord| self.viewport.world_to_screen(coord.x, coord.y));
        if let Some((x, y)) = coords.next() {
            let _ = write!(out, " M{x:.2},{y:.2}");
            for (x, y) in coords {
                let _ = write!(out, " L{x:.2},{y:.2}");
            }
            out.push('Z');
        }
        out
    }
}

/// Tooltip text for a district fill, `Example West 3: D+7.5`.
fn feature_title(feature: &JoinedFeature) -> String {
    let props = &feature.properties;
    let place = match (&props.name, &props.district) {
        (Some(name), _) => name.clone(),
        (None, Some(district)) => format!("{} {district}", props.state),
        (None, None) => props.state.clone(),
    };
    format!("{place}: {}", format_lean(props.dem_margin))
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

impl MapSurface for SvgSurface {
    fn set_dataset(&mut self, features: &[JoinedFeature]) {
        self.features = features.to_vec();
    }

    fn set_hover_filter(&mut self, filter: HoverFilter) {
        self.hover = filter;
    }

    fn set_selected_district(&mut self, district: Option<&str>) {
        self.selected = district.map(str::to_string);
    }

    fn fit_bounds(&mut self, bounds: Bounds, padding_px: f64) {
        self.viewport
            .fit_bounds(bounds, self.width, self.height, padding_px);
    }

    fn teardown(&mut self) {
        self.features.clear();
        self.torn_down = true;
    }
}
