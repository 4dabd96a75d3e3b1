pub mod boundaries;
pub mod config;
pub mod error;
pub mod http;
pub mod interaction;
pub mod spatial;
pub mod stats;
pub mod surface;
pub mod svg;
pub mod view;
pub mod viewport;

pub use boundaries::{BoundarySource, HttpBoundarySource, load_boundaries};
pub use error::{FetchError, LoadError, StatError};
pub use http::build_http_client;
pub use interaction::{InteractionOutput, InteractionState, PointerEvent, ScreenPoint};
pub use spatial::SpatialIndex;
pub use stats::{HttpTableSource, StatCache, TableSource};
pub use surface::{HoverFilter, MapSurface, RecordingSurface, SurfaceOp};
pub use svg::SvgSurface;
pub use view::{AtlasHost, MapView, NoopHost};
pub use viewport::Viewport;
