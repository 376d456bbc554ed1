//! Circular gauge: a 270° track open at the bottom with a glowing value arc.

use std::f64::consts::PI;

use super::{ArcSegment, Point, Rgba, Stroke, Surface};

/// Angle of the empty end of the track (bottom left).
pub const GAUGE_START_ANGLE: f64 = 0.75 * PI;
/// Angular span of a full gauge.
pub const GAUGE_SWEEP: f64 = 1.5 * PI;

const DEFAULT_SIZE: u32 = 140;
const DEFAULT_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeSpec {
    pub value: f64,
    pub max: f64,
    pub color: Rgba,
    pub background_color: Rgba,
    /// Edge length of the square drawing area, in pixels.
    pub size: u32,
}

impl GaugeSpec {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            max: DEFAULT_MAX,
            color: Rgba::from_hsl(24.0, 0.95, 0.53),
            background_color: Rgba::from_hsl(217.0, 0.33, 0.17),
            size: DEFAULT_SIZE,
        }
    }

    #[must_use]
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = max;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_background(mut self, color: Rgba) -> Self {
        self.background_color = color;
        self
    }

    #[must_use]
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn fraction(&self) -> f64 {
        gauge_fraction(self.value, self.max)
    }
}

/// Stroke geometry, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeStyle {
    pub line_width: f64,
    pub glow_width: f64,
    pub glow_blur: f64,
    /// Distance between the drawing area edge and the arc centerline.
    pub inset: f64,
}

impl Default for GaugeStyle {
    fn default() -> Self {
        Self {
            line_width: 12.0,
            glow_width: 2.0,
            glow_blur: 10.0,
            inset: 15.0,
        }
    }
}

impl GaugeStyle {
    /// Default proportions scaled to a `size` pixel drawing area.
    pub fn for_size(size: u32) -> Self {
        let base = Self::default();
        let scale = f64::from(size) / f64::from(DEFAULT_SIZE);
        Self {
            line_width: (base.line_width * scale).max(1.0),
            glow_width: (base.glow_width * scale).max(1.0),
            glow_blur: (base.glow_blur * scale).max(1.0),
            inset: base.inset * scale,
        }
    }
}

/// Filled share of the gauge, clamped to `0.0..=1.0`.
///
/// A non-positive or non-finite `max` yields an empty gauge.
pub fn gauge_fraction(value: f64, max: f64) -> f64 {
    if !max.is_finite() || max <= 0.0 || value.is_nan() {
        return 0.0;
    }
    (value / max).clamp(0.0, 1.0)
}

/// End angle of the value arc for a filled share.
pub fn gauge_end_angle(fraction: f64) -> f64 {
    GAUGE_START_ANGLE + fraction.clamp(0.0, 1.0) * GAUGE_SWEEP
}

pub struct GaugeRenderer;

impl GaugeRenderer {
    pub fn render<S: Surface + ?Sized>(surface: &mut S, spec: &GaugeSpec) {
        Self::render_styled(surface, spec, &GaugeStyle::default());
    }

    /// Paints a full frame: track, value arc and the glowing highlight over it.
    pub fn render_styled<S: Surface + ?Sized>(surface: &mut S, spec: &GaugeSpec, style: &GaugeStyle) {
        surface.clear();

        let half = f64::from(spec.size) / 2.0;
        let radius = (half - style.inset).max(0.0);
        if radius <= 0.0 {
            return;
        }
        let center = Point::new(half, half);

        let track = ArcSegment {
            center,
            radius,
            start: GAUGE_START_ANGLE,
            end: GAUGE_START_ANGLE + GAUGE_SWEEP,
        };
        surface.stroke_arc(&track, &Stroke::round(spec.background_color, style.line_width));

        let fraction = spec.fraction();
        if fraction <= 0.0 {
            return;
        }
        let value = ArcSegment {
            end: gauge_end_angle(fraction),
            ..track
        };
        surface.stroke_arc(&value, &Stroke::round(spec.color, style.line_width));
        surface.stroke_arc(
            &value,
            &Stroke::round(spec.color, style.glow_width).with_glow(spec.color, style.glow_blur),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DisplayList, DrawOp, Raster};

    fn record(spec: &GaugeSpec) -> DisplayList {
        let mut list = DisplayList::new(spec.size, spec.size);
        GaugeRenderer::render(&mut list, spec);
        list
    }

    #[test]
    fn test_value_arc_sweep() {
        let list = record(&GaugeSpec::new(23.5));
        let arcs: Vec<_> = list.arcs().collect();
        assert_eq!(arcs.len(), 3);

        let (value, _) = arcs[1];
        let expected = 0.75 * PI + 0.235 * 1.5 * PI;
        assert!((value.start - 0.75 * PI).abs() < 1e-12);
        assert!((value.end - expected).abs() < 1e-12);
        assert_eq!(value.radius, 55.0);
        assert_eq!(value.center, Point::new(70.0, 70.0));
    }

    #[test]
    fn test_track_has_no_glow() {
        let list = record(&GaugeSpec::new(50.0));
        assert_eq!(list.ops()[0], DrawOp::Clear);

        let arcs: Vec<_> = list.arcs().collect();
        let (track, track_stroke) = arcs[0];
        assert!((track.end - 2.25 * PI).abs() < 1e-12);
        assert!(track_stroke.glow.is_none());
        assert_eq!(track_stroke.width, 12.0);

        let (_, value_stroke) = arcs[1];
        assert!(value_stroke.glow.is_none());

        let (_, glow_stroke) = arcs[2];
        let glow = glow_stroke.glow.unwrap();
        assert_eq!(glow.blur, 10.0);
        assert_eq!(glow_stroke.width, 2.0);
    }

    #[test]
    fn test_zero_and_overflow() {
        let empty = record(&GaugeSpec::new(0.0));
        assert_eq!(empty.arcs().count(), 1);

        let full = record(&GaugeSpec::new(250.0));
        let (value, _) = full.arcs().nth(1).unwrap();
        assert!((value.end - 2.25 * PI).abs() < 1e-12);

        let zero_max = record(&GaugeSpec::new(40.0).with_max(0.0));
        assert_eq!(zero_max.arcs().count(), 1);
    }

    #[test]
    fn test_fraction_edges() {
        assert_eq!(gauge_fraction(50.0, 100.0), 0.5);
        assert_eq!(gauge_fraction(-5.0, 100.0), 0.0);
        assert_eq!(gauge_fraction(5.0, -1.0), 0.0);
        assert_eq!(gauge_fraction(5.0, f64::NAN), 0.0);
        assert_eq!(gauge_fraction(f64::NAN, 100.0), 0.0);
        assert_eq!(gauge_fraction(f64::INFINITY, 100.0), 1.0);
    }

    #[test]
    fn test_tiny_gauge_draws_nothing_but_clear() {
        let list = record(&GaugeSpec::new(50.0).with_size(20));
        assert_eq!(list.ops(), &[DrawOp::Clear]);
    }

    #[test]
    fn test_scaled_style_keeps_minimum_width() {
        let style = GaugeStyle::for_size(14);
        assert!((style.line_width - 1.2).abs() < 1e-12);
        assert_eq!(style.glow_width, 1.0);
        assert_eq!(style.glow_blur, 1.0);
        assert!((style.inset - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_rasterized_gauge_leaves_bottom_open() {
        let spec = GaugeSpec::new(100.0).with_size(60);
        let mut raster = Raster::new(60, 60);
        GaugeRenderer::render_styled(&mut raster, &spec, &GaugeStyle::for_size(60));

        // Left and top of the ring are painted, the gap below the center is not.
        assert!(raster.pixel(7, 30).a > 0.5);
        assert!(raster.pixel(30, 7).a > 0.5);
        assert!(raster.pixel(30, 52).is_transparent());
    }
}
