//! Terminal dashboard for the appliance.
//!
//! Overview tab shows live gauges and the request-rate trend driven by the
//! [`Sampler`](crate::sampler::Sampler); the list tabs fetch on demand.

mod app;
mod event;
mod input;
mod render;
pub(crate) mod state;
pub(crate) mod style;
mod widgets;

pub use app::App;
pub use state::{AppState, PopupState, Tab};
