//! Filter form popup for the failover and session lists.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::state::FilterForm;
use crate::tui::style::Styles;

/// Renders a centered filter form.
pub fn render_filter(frame: &mut Frame, area: Rect, form: &FilterForm) {
    let popup_width = (area.width * 70 / 100).clamp(50, 80).min(area.width);
    let popup_height = (form.fields.len() as u16 + 7).min(area.height);
    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" Filter {} ", form.tab.name()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines: Vec<Line> = form
        .fields
        .iter()
        .enumerate()
        .map(|(i, (field, value))| {
            let focused = i == form.focus;
            let label_style = if focused {
                Styles::help_key()
            } else {
                Styles::label()
            };
            let mut spans = vec![
                Span::styled(format!("{:>8}: ", field.label()), label_style),
                Span::styled(
                    value.clone(),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
            ];
            if focused {
                spans.push(Span::styled("█", Styles::dim()));
            }
            if value.is_empty() {
                spans.push(Span::styled(format!("  {}", field.hint()), Styles::dim()));
            }
            Line::from(spans)
        })
        .collect();

    lines.push(Line::from(""));
    if let Some(err) = &form.error {
        lines.push(Line::from(Span::styled(
            format!("Error: {err}"),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Blank fields are not filtered on.",
            Styles::dim(),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Enter", Styles::help_key()),
        Span::styled(" → apply", Styles::dim()),
        Span::styled("   Tab/↑↓", Styles::help_key()),
        Span::styled(" → field", Styles::dim()),
        Span::styled("   Ctrl-U", Styles::help_key()),
        Span::styled(" → clear", Styles::dim()),
        Span::styled("   Esc", Styles::help_key()),
        Span::styled(" → cancel", Styles::dim()),
    ]));

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Left), inner);
}
