//! Help popup listing key bindings.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::state::Tab;
use crate::tui::style::Styles;

const KEYS: &[(&str, &str)] = &[
    ("1-4", "switch tab"),
    ("Tab / Shift-Tab", "next / previous tab"),
    ("n", "toggle node"),
    ("p / s", "primary / secondary node"),
    ("r", "refresh now"),
    ("f", "filter list (Failover, Sessions)"),
    ("x", "clear filter"),
    ("e", "export filtered list as CSV"),
    ("↑↓ j k", "move selection"),
    ("PgUp PgDn g G", "page / first / last row"),
    ("?", "toggle this help"),
    ("q / Esc / Ctrl-C", "quit"),
];

/// Renders a centered help popup.
pub fn render_help(frame: &mut Frame, area: Rect, tab: Tab) {
    let popup_width = (area.width * 60 / 100).clamp(44, 64).min(area.width);
    let popup_height = (KEYS.len() as u16 + 6).min(area.height);
    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines = vec![
        Line::from(Span::styled(format!("{} tab", tab.name()), Styles::section_header())),
        Line::from(""),
    ];
    lines.extend(KEYS.iter().map(|(key, what)| {
        Line::from(vec![
            Span::styled(format!("{:>18}", key), Styles::help_key()),
            Span::styled(format!("  {}", what), Styles::dim()),
        ])
    }));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Esc or ? → close", Styles::dim())));

    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Left),
        inner,
    );
}
