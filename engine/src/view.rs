use atlas_shared::geometry::{BoundaryCollection, BoundaryFeature, dataset_bounds};
use atlas_shared::join::{
    DistrictLookup, JoinReport, JoinedFeature, JoinedProperties, join_features,
};
use tracing::{debug, warn};

use crate::boundaries::{BoundarySource, load_boundaries};
use crate::config::INITIAL_BOUNDS;
use crate::error::LoadError;
use crate::interaction::{
    InteractionOutput, InteractionState, PointerEvent, ScreenPoint, transition,
};
use crate::spatial::SpatialIndex;
use crate::surface::{FIT_PADDING_PX, HoverFilter, MapSurface};
use crate::viewport::Viewport;

/// Callbacks into the embedding application. Hover fires on every pointer
/// move over a district; select fires when the persistent selection changes.
pub trait AtlasHost {
    fn on_hover(&mut self, district: Option<&JoinedProperties>, point: Option<ScreenPoint>);
    fn on_select(&mut self, district: Option<&JoinedProperties>);
}

/// Host that ignores every callback, for headless rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

impl AtlasHost for NoopHost {
    fn on_hover(&mut self, _district: Option<&JoinedProperties>, _point: Option<ScreenPoint>) {}

    fn on_select(&mut self, _district: Option<&JoinedProperties>) {}
}

/// The interactive district map: one boundary dataset joined against the
/// stat lookup, rendered through a [`MapSurface`], with hover and selection
/// driven by pointer events.
///
/// Loads are guarded by a generation counter. A host starts a load with
/// [`MapView::begin_load`], fetches however it likes, and hands the outcome
/// to [`MapView::apply_load`]; if another load started in between, the stale
/// result is discarded instead of clobbering the newer dataset.
pub struct MapView<S: MapSurface, H: AtlasHost> {
    surface: S,
    host: H,
    viewport: Viewport,
    canvas_w: f64,
    canvas_h: f64,
    boundaries: Vec<BoundaryFeature>,
    features: Vec<JoinedFeature>,
    index: SpatialIndex,
    state: InteractionState,
    lookup: DistrictLookup,
    report: JoinReport,
    load_generation: u64,
    first_fit_done: bool,
    closed: bool,
}

impl<S: MapSurface, H: AtlasHost> MapView<S, H> {
    pub fn new(surface: S, host: H, canvas_w: f64, canvas_h: f64) -> Self {
        let mut viewport = Viewport::default();
        viewport.fit_bounds(INITIAL_BOUNDS, canvas_w, canvas_h, 0.0);
        Self {
            surface,
            host,
            viewport,
            canvas_w,
            canvas_h,
            boundaries: Vec::new(),
            features: Vec::new(),
            index: SpatialIndex::build(&[]),
            state: InteractionState::default(),
            lookup: DistrictLookup::new(),
            report: JoinReport::default(),
            load_generation: 0,
            first_fit_done: false,
            closed: false,
        }
    }

    /// Start a boundary load and return its generation token.
    pub fn begin_load(&mut self) -> u64 {
        self.load_generation = self.load_generation.wrapping_add(1);
        self.load_generation
    }

    /// Apply the outcome of a load started with [`MapView::begin_load`].
    /// Stale generations are discarded; a failed load keeps the previous
    /// dataset and selection on screen.
    pub fn apply_load(&mut self, generation: u64, result: Result<BoundaryCollection, LoadError>) {
        if self.closed {
            debug!(generation, "load result after close discarded");
            return;
        }
        if generation != self.load_generation {
            debug!(
                generation,
                current = self.load_generation,
                "stale load result discarded"
            );
            return;
        }
        match result {
            Ok(collection) => self.install_dataset(collection),
            Err(err) => {
                warn!(error = %err, "boundary load failed; keeping previous dataset");
            }
        }
    }

    /// Fetch and install a dataset in one step. Hosts that juggle
    /// overlapping loads use [`MapView::begin_load`]/[`MapView::apply_load`]
    /// directly.
    pub async fn load<B: BoundarySource>(
        &mut self,
        source: &B,
        path: &str,
    ) -> Result<(), LoadError> {
        let generation = self.begin_load();
        let collection = load_boundaries(source, path).await?;
        self.apply_load(generation, Ok(collection));
        Ok(())
    }

    fn install_dataset(&mut self, collection: BoundaryCollection) {
        self.boundaries = collection.features;
        self.rejoin();
        self.index = SpatialIndex::build(&self.features);
        self.surface.set_dataset(&self.features);

        let (state, outputs) = transition(&self.state, PointerEvent::DatasetChanged);
        self.state = state;
        self.apply_outputs(outputs);

        // The camera refits once; later dataset switches keep the pan/zoom
        // the user has settled on.
        if !self.first_fit_done && self.refit() {
            self.first_fit_done = true;
        }
    }

    /// Replace the stat lookup and re-join the current boundaries. Feature
    /// order and geometry are unchanged, so the spatial index, hover and
    /// selection all stay valid.
    pub fn set_stat_lookup(&mut self, lookup: DistrictLookup) {
        self.lookup = lookup;
        self.rejoin();
        self.surface.set_dataset(&self.features);
    }

    fn rejoin(&mut self) {
        let (features, report) = join_features(&self.boundaries, &self.lookup);
        if !report.is_clean() {
            warn!(
                matched = report.matched,
                unmatched_features = report.unmatched_features,
                unused_rows = report.unused_rows,
                "stat join left gaps"
            );
        }
        self.features = features;
        self.report = report;
    }

    /// Set the persistent selection from outside the map, without firing the
    /// host callback back at the caller.
    pub fn set_selected_district(&mut self, district: Option<&str>) {
        self.state.selected = district.and_then(|d| self.district_index(d));
        self.surface.set_selected_district(district);
    }

    /// Refit the camera to the current dataset. `false` when there is
    /// nothing usable to frame.
    pub fn refit(&mut self) -> bool {
        match dataset_bounds(self.features.iter().map(|f| &f.geometry)) {
            Some(bounds) => {
                self.viewport
                    .fit_bounds(bounds, self.canvas_w, self.canvas_h, FIT_PADDING_PX);
                self.surface.fit_bounds(bounds, FIT_PADDING_PX);
                true
            }
            None => false,
        }
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        if self.closed {
            return;
        }
        let feature = self.hit_test(x, y);
        self.dispatch(PointerEvent::Move {
            point: ScreenPoint { x, y },
            feature,
        });
    }

    pub fn pointer_left(&mut self) {
        if self.closed {
            return;
        }
        self.dispatch(PointerEvent::Leave);
    }

    pub fn clicked(&mut self, x: f64, y: f64) {
        if self.closed {
            return;
        }
        let feature = self.hit_test(x, y);
        self.dispatch(PointerEvent::Click { feature });
    }

    pub fn zoom_at(&mut self, delta: f64, x: f64, y: f64) {
        if self.closed {
            return;
        }
        self.viewport.zoom_at(delta, x, y);
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        if self.closed {
            return;
        }
        self.viewport.pan(dx, dy);
    }

    pub fn resize(&mut self, canvas_w: f64, canvas_h: f64) {
        self.canvas_w = canvas_w;
        self.canvas_h = canvas_h;
    }

    /// Release the surface. Idempotent; pointer events and load results
    /// arriving afterwards are ignored.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.surface.teardown();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn interaction_state(&self) -> InteractionState {
        self.state
    }

    pub fn last_join_report(&self) -> JoinReport {
        self.report
    }

    pub fn features(&self) -> &[JoinedFeature] {
        &self.features
    }

    /// Camera used for hit-testing. Embedding hosts that draw the dataset
    /// themselves read their transform from here.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn hit_test(&self, x: f64, y: f64) -> Option<usize> {
        let (wx, wy) = self.viewport.screen_to_world(x, y);
        self.index.find_at(&self.features, wx, wy)
    }

    fn dispatch(&mut self, event: PointerEvent) {
        let (state, outputs) = transition(&self.state, event);
        self.state = state;
        self.apply_outputs(outputs);
    }

    fn apply_outputs(&mut self, outputs: Vec<InteractionOutput>) {
        for output in outputs {
            match output {
                InteractionOutput::SetHoverFilter(idx) => {
                    // A hovered feature without an identifier must not light
                    // up other identifier-less features, so it maps to the
                    // match-nothing filter.
                    let filter = match idx.and_then(|i| self.district_of(i)) {
                        Some(district) => HoverFilter::District(district),
                        None => HoverFilter::MatchNothing,
                    };
                    self.surface.set_hover_filter(filter);
                }
                InteractionOutput::SetSelectedDistrict(idx) => {
                    let district = idx.and_then(|i| self.district_of(i));
                    self.surface.set_selected_district(district.as_deref());
                }
                InteractionOutput::NotifyHover { feature, point } => {
                    let properties = feature
                        .and_then(|i| self.features.get(i))
                        .map(|f| &f.properties);
                    self.host.on_hover(properties, point);
                }
                InteractionOutput::NotifySelect(feature) => {
                    let properties = feature
                        .and_then(|i| self.features.get(i))
                        .map(|f| &f.properties);
                    self.host.on_select(properties);
                }
            }
        }
    }

    fn district_of(&self, idx: usize) -> Option<String> {
        self.features
            .get(idx)
            .and_then(|f| f.properties.district.clone())
    }

    fn district_index(&self, district: &str) -> Option<usize> {
        self.features
            .iter()
            .position(|f| f.properties.district.as_deref() == Some(district))
    }
}

impl<S: MapSurface, H: AtlasHost> Drop for MapView<S, H> {
    fn drop(&mut self) {
        self.close();
    }
}
