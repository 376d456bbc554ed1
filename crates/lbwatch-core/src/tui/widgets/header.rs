//! Header widget showing time, node, tabs and status.

use chrono::Local;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::fmt::format_clock;
use crate::tui::state::{AppState, Tab};
use crate::tui::style::Styles;

/// Renders the header bar.
pub fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::horizontal([
        Constraint::Length(10), // Time
        Constraint::Length(24), // Node
        Constraint::Min(40),    // Tabs
        Constraint::Length(48), // Status
    ])
    .split(area);

    frame.render_widget(
        Paragraph::new(format!(" {}", format_clock(Local::now()))).style(Styles::header()),
        chunks[0],
    );

    let node = format!(
        " {} ({}){} ",
        state.node,
        state.capabilities.mode_for(state.node),
        if state.demo { " DEMO" } else { "" }
    );
    frame.render_widget(Paragraph::new(node).style(Styles::header()), chunks[1]);

    let tabs: Vec<Span> = Tab::all()
        .iter()
        .enumerate()
        .flat_map(|(i, tab)| {
            let style = if *tab == state.current_tab {
                Styles::tab_active()
            } else {
                Styles::tab_inactive()
            };
            vec![
                Span::styled(format!(" {}:", i + 1), Styles::dim()),
                Span::styled(format!("{} ", tab.name()), style),
            ]
        })
        .collect();
    frame.render_widget(
        Paragraph::new(Line::from(tabs)).style(Styles::header()),
        chunks[2],
    );

    let (text, style) = if let Some(url) = &state.auth_redirect {
        (format!("Login required: {}", url), Styles::critical())
    } else if let Some(msg) = &state.status_message {
        (msg.clone(), Styles::warning())
    } else {
        (
            format!("every {}s · ? help", state.poll_interval_secs),
            Styles::header(),
        )
    };
    frame.render_widget(Paragraph::new(text).style(style), chunks[3]);
}
