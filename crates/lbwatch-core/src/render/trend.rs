//! Auto-scaled area chart of recent samples.

use super::{Fill, Path, Point, Rgba, Stroke, Surface};

/// Lower bound of the vertical scale, so flat-zero series stay on the baseline.
const SCALE_FLOOR: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendSpec<'a> {
    pub samples: &'a [f64],
    pub color: Rgba,
    pub width: u32,
    pub height: u32,
}

impl<'a> TrendSpec<'a> {
    pub fn new(samples: &'a [f64], width: u32, height: u32) -> Self {
        Self {
            samples,
            color: Rgba::from_hsl(217.0, 0.91, 0.60),
            width,
            height,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendStyle {
    pub padding: f64,
    pub line_width: f64,
    pub glow_blur: f64,
    pub fill_top_alpha: f32,
    pub fill_bottom_alpha: f32,
}

impl Default for TrendStyle {
    fn default() -> Self {
        Self {
            padding: 10.0,
            line_width: 2.0,
            glow_blur: 8.0,
            fill_top_alpha: 0.30,
            fill_bottom_alpha: 0.02,
        }
    }
}

impl TrendStyle {
    /// Thin variant for surfaces only a few dozen pixels tall.
    pub fn compact() -> Self {
        Self {
            padding: 1.0,
            line_width: 1.0,
            glow_blur: 2.0,
            ..Self::default()
        }
    }
}

/// Largest finite sample, never below the scale floor.
pub fn local_max(samples: &[f64]) -> f64 {
    samples
        .iter()
        .copied()
        .filter(|s| s.is_finite())
        .fold(SCALE_FLOOR, f64::max)
}

/// Polyline vertices for `samples`, oldest on the left.
///
/// Empty when fewer than two samples are given or the padding leaves no room.
pub fn trend_points(samples: &[f64], width: u32, height: u32, padding: f64) -> Vec<Point> {
    let (width, height) = (f64::from(width), f64::from(height));
    let plot_w = width - 2.0 * padding;
    let plot_h = height - 2.0 * padding;
    if samples.len() < 2 || plot_w <= 0.0 || plot_h <= 0.0 {
        return Vec::new();
    }

    let max = local_max(samples);
    let spacing = plot_w / (samples.len() - 1) as f64;
    samples
        .iter()
        .enumerate()
        .map(|(i, &sample)| {
            let sample = if sample.is_finite() { sample } else { 0.0 };
            Point::new(
                padding + i as f64 * spacing,
                height - padding - (sample / max) * plot_h,
            )
        })
        .collect()
}

pub struct TrendRenderer;

impl TrendRenderer {
    pub fn render<S: Surface + ?Sized>(surface: &mut S, spec: &TrendSpec<'_>) {
        Self::render_styled(surface, spec, &TrendStyle::default());
    }

    pub fn render_styled<S: Surface + ?Sized>(surface: &mut S, spec: &TrendSpec<'_>, style: &TrendStyle) {
        surface.clear();

        let points = trend_points(spec.samples, spec.width, spec.height, style.padding);
        let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) else {
            return;
        };
        let baseline = f64::from(spec.height) - style.padding;

        let mut area = Vec::with_capacity(points.len() + 2);
        area.push(Point::new(first.x, baseline));
        area.extend_from_slice(&points);
        area.push(Point::new(last.x, baseline));
        surface.fill_path(
            &Path::closed(area),
            &Fill::VerticalGradient {
                top: spec.color.with_alpha(style.fill_top_alpha),
                bottom: spec.color.with_alpha(style.fill_bottom_alpha),
                y0: 0.0,
                y1: f64::from(spec.height),
            },
        );

        surface.stroke_path(
            &Path::open(points),
            &Stroke::round(spec.color, style.line_width).with_glow(spec.color, style.glow_blur),
        );
    }
}
