// Card layout: font metrics, canvas geometry, block flow and pagination.
// The paginator and the exporter share this module so page breaks match the exported PNGs.

pub mod canvas;
pub mod flow;
pub mod font_metrics;
pub mod paginator;

pub use canvas::CanvasConfig;
pub use paginator::paginate;
