use atlas_shared::geometry::{Bounds, dataset_bounds};
use atlas_shared::join::JoinedFeature;
use geo::{Contains, Point};

const GRID_COLS: usize = 50;
const GRID_ROWS: usize = 50;
const GRID_PADDING: f64 = 0.001;

/// A flat 2D spatial grid over geographic space for district hit-testing.
/// Rebuilt only when the boundary dataset changes.
pub struct SpatialIndex {
    cells: Vec<Vec<usize>>,
    bboxes: Vec<Option<Bounds>>,
    min_x: f64,
    min_y: f64,
    cell_w: f64,
    cell_h: f64,
}

impl SpatialIndex {
    pub fn build(features: &[JoinedFeature]) -> Self {
        let bboxes: Vec<Option<Bounds>> = features
            .iter()
            .map(|f| dataset_bounds(std::iter::once(&f.geometry)))
            .collect();

        let mut extent: Option<Bounds> = None;
        for bbox in bboxes.iter().flatten() {
            match &mut extent {
                Some(b) => {
                    b.extend(bbox.west, bbox.south);
                    b.extend(bbox.east, bbox.north);
                }
                None => extent = Some(*bbox),
            }
        }

        let Some(extent) = extent else {
            return Self {
                cells: Vec::new(),
                bboxes,
                min_x: 0.0,
                min_y: 0.0,
                cell_w: 1.0,
                cell_h: 1.0,
            };
        };

        // Pad slightly to avoid edge issues
        let min_x = extent.west - GRID_PADDING;
        let min_y = extent.south - GRID_PADDING;
        let max_x = extent.east + GRID_PADDING;
        let max_y = extent.north + GRID_PADDING;

        let cell_w = (max_x - min_x) / GRID_COLS as f64;
        let cell_h = (max_y - min_y) / GRID_ROWS as f64;

        let mut cells = vec![Vec::new(); GRID_COLS * GRID_ROWS];
        for (idx, bbox) in bboxes.iter().enumerate() {
            let Some(bbox) = bbox else { continue };

            // Insert into all overlapping grid cells
            let col_start = ((bbox.west - min_x) / cell_w).floor().max(0.0) as usize;
            let col_end = ((bbox.east - min_x) / cell_w).ceil().min(GRID_COLS as f64) as usize;
            let row_start = ((bbox.south - min_y) / cell_h).floor().max(0.0) as usize;
            let row_end = ((bbox.north - min_y) / cell_h).ceil().min(GRID_ROWS as f64) as usize;

            for row in row_start..row_end {
                for col in col_start..col_end {
                    cells[row * GRID_COLS + col].push(idx);
                }
            }
        }

        Self {
            cells,
            bboxes,
            min_x,
            min_y,
            cell_w,
            cell_h,
        }
    }

    /// Find the feature under a geographic coordinate. `features` must be the
    /// same slice the index was built from. When features overlap, the last
    /// one in dataset order wins, matching render stacking.
    pub fn find_at(&self, features: &[JoinedFeature], wx: f64, wy: f64) -> Option<usize> {
        if self.cells.is_empty() {
            return None;
        }

        let col = ((wx - self.min_x) / self.cell_w).floor() as isize;
        let row = ((wy - self.min_y) / self.cell_h).floor() as isize;

        if col < 0 || row < 0 || col >= GRID_COLS as isize || row >= GRID_ROWS as isize {
            return None;
        }

        let point = Point::new(wx, wy);
        let cell = &self.cells[row as usize * GRID_COLS + col as usize];
        for &idx in cell.iter().rev() {
            let Some(bbox) = &self.bboxes[idx] else {
                continue;
            };
            if wx < bbox.west || wx > bbox.east || wy < bbox.south || wy > bbox.north {
                continue;
            }
            let contained = features[idx]
                .geometry
                .polygons()
                .iter()
                .any(|polygon| polygon.contains(&point));
            if contained {
                return Some(idx);
            }
        }
        None
    }
}
