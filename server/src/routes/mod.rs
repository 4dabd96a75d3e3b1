pub mod api;
pub mod preview;
