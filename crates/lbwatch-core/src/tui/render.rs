//! Main rendering logic for TUI.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::sampler::LiveMetrics;

use super::state::{AppState, PopupState, Tab};
use super::widgets::{
    render_applications, render_failover, render_filter, render_header, render_help,
    render_overview, render_sessions,
};

/// Main render function.
pub fn render(frame: &mut Frame, state: &mut AppState, metrics: &LiveMetrics) {
    let area = frame.area();

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Min(8),    // Content area
    ])
    .split(area);

    render_header(frame, chunks[0], state);

    match state.current_tab {
        Tab::Overview => render_overview(frame, chunks[1], state, metrics),
        Tab::Applications => render_applications(frame, chunks[1], state),
        Tab::Failover => render_failover(frame, chunks[1], state),
        Tab::Sessions => render_sessions(frame, chunks[1], state),
    }

    // Popups last, over everything.
    match state.popup {
        PopupState::None => {}
        PopupState::Help => render_help(frame, area, state.current_tab),
        PopupState::Filter => {
            if let Some(form) = &state.filter_form {
                render_filter(frame, area, form);
            }
        }
    }
}
