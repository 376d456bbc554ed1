//! Overview tab: CPU and memory gauges, request-rate trend, node identity
//! and HA status.

use chrono::Local;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table};
use tracing::debug;

use crate::config::ChartColors;
use crate::fmt::{FmtStyle, NOT_AVAILABLE, format_age, format_percent, format_rate, or_na};
use crate::render::{
    GaugeRenderer, GaugeSpec, GaugeStyle, Raster, TrendRenderer, TrendSpec, TrendStyle, local_max,
};
use crate::sampler::LiveMetrics;
use crate::tui::state::AppState;
use crate::tui::style::{Palette, Styles};
use crate::viewport::{ViewportTracker, WidthListener};

use super::RasterView;

/// Pixel surfaces of the overview, redrawn only when the metrics revision
/// or a surface size changes.
///
/// Lives only while the Overview tab is mounted; dropping it detaches its
/// viewport listener.
pub struct OverviewCanvas {
    colors: ChartColors,
    cpu: Raster,
    mem: Raster,
    trend: Raster,
    rendered_revision: Option<u64>,
    width: WidthListener,
    redraws: u64,
}

impl OverviewCanvas {
    pub fn new(viewport: &ViewportTracker, colors: ChartColors) -> Self {
        Self {
            colors,
            cpu: Raster::new(0, 0),
            mem: Raster::new(0, 0),
            trend: Raster::new(0, 0),
            rendered_revision: None,
            width: viewport.subscribe(),
            redraws: 0,
        }
    }

    /// Brings the surfaces up to date. The trend width is taken from the
    /// viewport; `gauge_px` and `trend_height` come from the current layout.
    /// Returns true when anything was redrawn.
    pub fn sync(&mut self, metrics: &LiveMetrics, gauge_px: u32, trend_height: u32) -> bool {
        let mut dirty = self.rendered_revision != Some(metrics.revision);
        if let Some(width) = self.width.changed() {
            debug!(width, "trend width changed");
            dirty = true;
        }
        let trend_width = self.width.width();
        dirty |= self.cpu.resize(gauge_px, gauge_px);
        dirty |= self.mem.resize(gauge_px, gauge_px);
        dirty |= self.trend.resize(trend_width, trend_height);
        if !dirty {
            return false;
        }

        let gauge_style = GaugeStyle::for_size(gauge_px);
        GaugeRenderer::render_styled(
            &mut self.cpu,
            &GaugeSpec::new(metrics.cpu_percent)
                .with_size(gauge_px)
                .with_color(self.colors.cpu)
                .with_background(Palette::track()),
            &gauge_style,
        );
        GaugeRenderer::render_styled(
            &mut self.mem,
            &GaugeSpec::new(metrics.mem_percent)
                .with_size(gauge_px)
                .with_color(self.colors.mem)
                .with_background(Palette::track()),
            &gauge_style,
        );
        TrendRenderer::render_styled(
            &mut self.trend,
            &TrendSpec::new(metrics.history.as_slice(), trend_width, trend_height)
                .with_color(self.colors.http),
            &TrendStyle::compact(),
        );

        self.rendered_revision = Some(metrics.revision);
        self.redraws += 1;
        true
    }

    pub fn cpu(&self) -> &Raster {
        &self.cpu
    }

    pub fn mem(&self) -> &Raster {
        &self.mem
    }

    pub fn trend(&self) -> &Raster {
        &self.trend
    }

    /// Number of full redraws so far.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }
}

/// Renders the overview tab.
pub fn render_overview(frame: &mut Frame, area: Rect, state: &mut AppState, metrics: &LiveMetrics) {
    let rows = Layout::vertical([Constraint::Percentage(60), Constraint::Min(7)]).split(area);
    let top = Layout::horizontal([
        Constraint::Percentage(22),
        Constraint::Percentage(22),
        Constraint::Min(20),
    ])
    .split(rows[0]);
    let bottom =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).split(rows[1]);

    let cpu_block = Block::default().title(" CPU ").borders(Borders::ALL);
    let mem_block = Block::default().title(" Memory ").borders(Borders::ALL);
    let trend_block = Block::default().title(" HTTP requests ").borders(Borders::ALL);
    let cpu_inner = cpu_block.inner(top[0]);
    let mem_inner = mem_block.inner(top[1]);
    let trend_inner = trend_block.inner(top[2]);
    frame.render_widget(cpu_block, top[0]);
    frame.render_widget(mem_block, top[1]);
    frame.render_widget(trend_block, top[2]);

    let [cpu_canvas, cpu_label] = split_label(cpu_inner);
    let [mem_canvas, mem_label] = split_label(mem_inner);
    let [trend_canvas, trend_label] = split_label(trend_inner);

    let gauge_px = gauge_pixels(cpu_canvas).min(gauge_pixels(mem_canvas));
    state.viewport.observe(u32::from(trend_canvas.width));
    let colors = state.colors;
    let canvas = state
        .overview
        .get_or_insert_with(|| OverviewCanvas::new(&state.viewport, colors));
    canvas.sync(metrics, gauge_px, u32::from(trend_canvas.height) * 2);

    frame.render_widget(RasterView::new(canvas.cpu()), centered(cpu_canvas, gauge_px));
    frame.render_widget(RasterView::new(canvas.mem()), centered(mem_canvas, gauge_px));
    frame.render_widget(RasterView::new(canvas.trend()), trend_canvas);

    let (cpu_text, mem_text, rate_text) = if metrics.loading {
        ("…".to_string(), "…".to_string(), "loading…".to_string())
    } else {
        (
            format_percent(metrics.cpu_percent),
            format_percent(metrics.mem_percent),
            format_rate(metrics.http_request_rate, FmtStyle::Detail),
        )
    };
    frame.render_widget(
        Paragraph::new(Span::styled(cpu_text, Styles::metric(colors.cpu))).alignment(Alignment::Center),
        cpu_label,
    );
    frame.render_widget(
        Paragraph::new(Span::styled(mem_text, Styles::metric(colors.mem))).alignment(Alignment::Center),
        mem_label,
    );
    let scale = format_rate(local_max(metrics.history.as_slice()), FmtStyle::Compact);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(rate_text, Styles::metric(colors.http)),
            Span::styled(
                format!(
                    "  peak {} · {}/{} samples",
                    scale,
                    metrics.history.len(),
                    metrics.history.capacity()
                ),
                Styles::dim(),
            ),
        ]))
        .alignment(Alignment::Center),
        trend_label,
    );

    render_node_stats(frame, bottom[0], state, metrics);
    render_ha_nodes(frame, bottom[1], metrics);
}

fn split_label(area: Rect) -> [Rect; 2] {
    let chunks = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);
    [chunks[0], chunks[1]]
}

/// Largest square gauge, in pixels, that fits `area` at two pixels per row.
fn gauge_pixels(area: Rect) -> u32 {
    u32::from(area.width).min(u32::from(area.height) * 2)
}

fn centered(area: Rect, px: u32) -> Rect {
    let (cols, rows) = RasterView::cell_size(px, px);
    let cols = cols.min(area.width);
    let rows = rows.min(area.height);
    Rect::new(
        area.x + (area.width - cols) / 2,
        area.y + (area.height - rows) / 2,
        cols,
        rows,
    )
}

fn render_node_stats(frame: &mut Frame, area: Rect, state: &AppState, metrics: &LiveMetrics) {
    let field = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<12}", label), Styles::label()),
            Span::styled(value, Styles::default()),
        ])
    };

    let (ip, hostname, version, role) = match &metrics.identity {
        Some(id) => (
            or_na(&id.ip).to_string(),
            or_na(&id.hostname).to_string(),
            or_na(&id.version).to_string(),
            id.ha_role.label().to_string(),
        ),
        None => (
            NOT_AVAILABLE.to_string(),
            NOT_AVAILABLE.to_string(),
            NOT_AVAILABLE.to_string(),
            "Unknown".to_string(),
        ),
    };

    let mut lines = vec![
        field("Node", state.node.to_string()),
        field("IP address", ip),
        field("Hostname", hostname),
        field("Version", version),
        field("HA role", role),
        field("API mode", state.capabilities.mode_for(state.node).to_string()),
        field("Last sample", format_age(metrics.last_sample_at, Local::now())),
    ];
    if metrics.consecutive_failures > 0 {
        lines.push(Line::from(Span::styled(
            format!("{} failed poll(s), showing last values", metrics.consecutive_failures),
            Styles::warning(),
        )));
    }

    let block = Block::default()
        .title(" Node statistics ")
        .borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_ha_nodes(frame: &mut Frame, area: Rect, metrics: &LiveMetrics) {
    let block = Block::default().title(" HA nodes ").borders(Borders::ALL);
    if metrics.ha_nodes.is_empty() {
        let text = if metrics.loading {
            "Loading…"
        } else {
            "No HA nodes reported"
        };
        frame.render_widget(Paragraph::new(Span::styled(text, Styles::dim())).block(block), area);
        return;
    }

    let header = Row::new(["IP", "Hostname", "State", "Sync"]).style(Styles::table_header());
    let rows = metrics.ha_nodes.iter().map(|node| {
        Row::new([
            Span::raw(or_na(&node.ip).to_string()),
            Span::raw(or_na(&node.hostname).to_string()),
            Span::styled(or_na(&node.state).to_string(), Styles::state(&node.state)),
            Span::styled(or_na(&node.sync_status).to_string(), Styles::state(&node.sync_status)),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Min(12),
            Constraint::Length(12),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(block);
    frame.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MetricHistory;
    use crate::render::Surface;

    fn metrics(revision: u64, samples: &[f64]) -> LiveMetrics {
        LiveMetrics {
            cpu_percent: 23.5,
            mem_percent: 45.2,
            http_request_rate: samples.last().copied().unwrap_or(0.0),
            history: samples.iter().copied().collect::<MetricHistory>(),
            revision,
            ..LiveMetrics::default()
        }
    }

    #[test]
    fn test_sync_redraws_only_on_revision_or_size_change() {
        let viewport = ViewportTracker::new(60);
        let mut canvas = OverviewCanvas::new(&viewport, ChartColors::default());
        let m = metrics(1, &[100.0, 300.0, 200.0]);

        assert!(canvas.sync(&m, 20, 16));
        assert!(!canvas.sync(&m, 20, 16));
        assert_eq!(canvas.redraws(), 1);

        assert!(canvas.sync(&metrics(2, &[100.0, 300.0, 200.0, 250.0]), 20, 16));
        let m = metrics(2, &[100.0, 300.0, 200.0, 250.0]);
        assert!(!canvas.sync(&m, 20, 16));

        assert!(canvas.sync(&m, 24, 16));
        assert_eq!(canvas.cpu().width(), 24);
        assert_eq!(canvas.redraws(), 3);
    }

    #[test]
    fn test_viewport_change_rerenders_trend_at_new_width() {
        let viewport = ViewportTracker::new(40);
        let mut canvas = OverviewCanvas::new(&viewport, ChartColors::default());
        let m = metrics(1, &[10.0, 50.0, 20.0]);
        canvas.sync(&m, 20, 16);
        assert_eq!(canvas.trend().width(), 40);
        assert!(!canvas.trend().is_blank());

        viewport.observe(80);
        assert!(canvas.sync(&m, 20, 16));
        assert_eq!(canvas.trend().width(), 80);
        assert!(!canvas.trend().is_blank());
    }

    #[test]
    fn test_gauges_paint_and_single_sample_trend_stays_blank() {
        let viewport = ViewportTracker::new(40);
        let mut canvas = OverviewCanvas::new(&viewport, ChartColors::default());
        canvas.sync(&metrics(1, &[10.0]), 40, 16);
        assert!(!canvas.cpu().is_blank());
        assert!(!canvas.mem().is_blank());
        assert!(canvas.trend().is_blank());
    }

    #[test]
    fn test_dropping_canvas_detaches_listener() {
        let viewport = ViewportTracker::new(40);
        let canvas = OverviewCanvas::new(&viewport, ChartColors::default());
        assert_eq!(viewport.listener_count(), 1);
        drop(canvas);
        assert_eq!(viewport.listener_count(), 0);
    }

    #[test]
    fn test_gauge_pixels_and_centering() {
        let area = Rect::new(2, 3, 30, 10);
        assert_eq!(gauge_pixels(area), 20);
        let rect = centered(area, 20);
        assert_eq!(rect, Rect::new(7, 3, 20, 10));
    }
}
