//! TUI widgets.

mod filter;
mod header;
mod help;
mod overview;
mod raster;
mod tables;

pub use filter::render_filter;
pub use header::render_header;
pub use help::render_help;
pub use overview::{OverviewCanvas, render_overview};
pub use raster::RasterView;
pub use tables::{render_applications, render_failover, render_sessions};
