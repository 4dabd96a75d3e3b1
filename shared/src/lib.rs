pub mod catalog;
pub mod classify;
pub mod format;
pub mod geometry;
pub mod join;
pub mod key;
pub mod stats;

pub use catalog::{CATALOG, MapCategory, MapDescriptor, MapLevel};
pub use classify::{MarginClass, classify_margin};
pub use geometry::*;
pub use join::*;
pub use key::CompositeKey;
pub use stats::*;
