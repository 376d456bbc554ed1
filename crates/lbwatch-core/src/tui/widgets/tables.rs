//! List tabs: applications and services, failover history and user
//! sessions.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, TableState};

use crate::fmt::{or_na, truncate};
use crate::telemetry::{ListFilter, ServiceRow};
use crate::tui::state::{AppState, ListView};
use crate::tui::style::Styles;

/// Header labels and widths of a list table.
struct Columns<'a> {
    header: &'a [&'static str],
    widths: &'a [Constraint],
}

/// Applications on top, their services and service groups below. Selection
/// keys move through the applications.
pub fn render_applications(frame: &mut Frame, area: Rect, state: &AppState) {
    let [apps_area, services_area] =
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

    let mode = state.capabilities.mode_for(state.node).to_ascii_uppercase();
    render_list(
        frame,
        apps_area,
        format!("Applications · mode {}", mode),
        &state.applications,
        Columns {
            header: &["Name", "VIP", "Port", "State"],
            widths: &[
                Constraint::Min(20),
                Constraint::Length(18),
                Constraint::Length(7),
                Constraint::Length(14),
            ],
        },
        true,
        |app| {
            Row::new([
                Span::raw(or_na(&app.name).to_string()),
                Span::raw(or_na(&app.vip).to_string()),
                Span::raw(port_text(app.port)),
                Span::styled(or_na(&app.state).to_string(), Styles::state(&app.state)),
            ])
        },
    );

    render_list(
        frame,
        services_area,
        "Services".to_string(),
        &state.services,
        Columns {
            header: &["Kind", "Name", "IP", "Port", "State"],
            widths: &[
                Constraint::Length(7),
                Constraint::Min(20),
                Constraint::Length(18),
                Constraint::Length(9),
                Constraint::Length(14),
            ],
        },
        false,
        |row| match row {
            ServiceRow::Service(svc) => Row::new([
                Span::styled("SVC", Styles::dim()),
                Span::raw(or_na(&svc.name).to_string()),
                Span::raw(or_na(&svc.ip).to_string()),
                Span::raw(port_text(svc.port)),
                Span::styled(or_na(&svc.state).to_string(), Styles::state(&svc.state)),
            ]),
            ServiceRow::Group(group) => Row::new([
                Span::styled("SVCGRP", Styles::warning()),
                Span::raw(or_na(&group.name).to_string()),
                Span::raw("-"),
                Span::raw(format!("{} bound", group.bound_members)),
                Span::styled(or_na(&group.state).to_string(), Styles::state(&group.state)),
            ]),
        },
    );
}

pub fn render_failover(frame: &mut Frame, area: Rect, state: &AppState) {
    render_list(
        frame,
        area,
        filtered_title("Failover history", &state.failover_filter),
        &state.failover,
        Columns {
            header: &["Time", "Type", "Reason", "Role change"],
            widths: &[
                Constraint::Length(20),
                Constraint::Length(12),
                Constraint::Min(24),
                Constraint::Length(24),
            ],
        },
        true,
        |event| {
            Row::new([
                Span::raw(or_na(&event.timestamp).to_string()),
                Span::raw(or_na(&event.kind).to_string()),
                Span::raw(truncate(or_na(&event.reason), 60)),
                Span::raw(or_na(&event.role_change).to_string()),
            ])
        },
    );
}

pub fn render_sessions(frame: &mut Frame, area: Rect, state: &AppState) {
    render_list(
        frame,
        area,
        filtered_title("User sessions", &state.session_filter),
        &state.sessions,
        Columns {
            header: &["User", "Type", "Status", "Duration", "IP", "Node", "Start"],
            widths: &[
                Constraint::Min(12),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(16),
                Constraint::Length(10),
                Constraint::Length(20),
            ],
        },
        true,
        |session| {
            Row::new([
                Span::raw(or_na(&session.user).to_string()),
                Span::raw(or_na(&session.kind).to_string()),
                Span::styled(or_na(&session.status).to_string(), Styles::state(&session.status)),
                Span::raw(or_na(&session.duration).to_string()),
                Span::raw(or_na(&session.ip).to_string()),
                Span::raw(or_na(&session.node).to_string()),
                Span::raw(or_na(&session.start).to_string()),
            ])
        },
    );
}

fn port_text(port: Option<u16>) -> String {
    port.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string())
}

fn filtered_title(title: &str, filter: &ListFilter) -> String {
    if filter.is_empty() {
        title.to_string()
    } else {
        format!("{} [{}]", title, filter.summary())
    }
}

fn render_list<T>(
    frame: &mut Frame,
    area: Rect,
    title: String,
    list: &ListView<T>,
    columns: Columns<'_>,
    highlight: bool,
    row: impl Fn(&T) -> Row<'static>,
) {
    let mut title = format!(" {} ({}) ", title, list.items.len());
    if list.loading {
        title.push_str("loading… ");
    } else if list.error.is_some() && !list.items.is_empty() {
        title.push_str("stale ");
    }
    let block = Block::default().title(title).borders(Borders::ALL);

    if list.items.is_empty() {
        let message = match (&list.error, list.loading) {
            (_, true) => Span::styled("Loading…", Styles::dim()),
            (Some(e), false) => Span::styled(format!("Failed to load: {}", e), Styles::critical()),
            (None, false) => Span::styled("No entries", Styles::dim()),
        };
        frame.render_widget(Paragraph::new(message).block(block), area);
        return;
    }

    let header = Row::new(columns.header.iter().copied()).style(Styles::table_header());
    let table = Table::new(list.items.iter().map(row), columns.widths.iter().copied())
        .header(header)
        .block(block)
        .row_highlight_style(Styles::selected());
    let mut table_state = TableState::default().with_selected(highlight.then_some(list.selected));
    frame.render_stateful_widget(table, area, &mut table_state);
}
