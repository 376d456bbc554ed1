//! Pixel rendering of live metrics.
//!
//! Renderers are stateless functions of their spec; they paint into anything
//! implementing [`Surface`]. Two surfaces ship with the crate:
//! - [`DisplayList`] records draw operations for inspection
//! - [`Raster`] rasterizes them into an RGBA pixel buffer

mod color;
mod display_list;
mod gauge;
mod raster;
mod surface;
mod trend;

pub use color::{ParseColorError, Rgba};
pub use display_list::{DisplayList, DrawOp};
pub use gauge::{
    GAUGE_START_ANGLE, GAUGE_SWEEP, GaugeRenderer, GaugeSpec, GaugeStyle, gauge_end_angle,
    gauge_fraction,
};
pub use raster::Raster;
pub use surface::{ArcSegment, Fill, Glow, LineCap, Path, Point, Stroke, Surface};
pub use trend::{TrendRenderer, TrendSpec, TrendStyle, local_max, trend_points};
