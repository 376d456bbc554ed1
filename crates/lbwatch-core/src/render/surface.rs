use std::f64::consts::PI;

use super::Rgba;

/// Point in surface pixel space; y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Circular arc. Angles are radians measured clockwise from the positive x axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSegment {
    pub center: Point,
    pub radius: f64,
    pub start: f64,
    pub end: f64,
}

impl ArcSegment {
    pub fn sweep(&self) -> f64 {
        self.end - self.start
    }

    pub fn point_at(&self, angle: f64) -> Point {
        Point::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        )
    }

    /// Approximates the arc with a polyline whose segments are at most
    /// `max_segment_len` pixels long.
    pub fn flatten(&self, max_segment_len: f64) -> Vec<Point> {
        let length = (self.sweep() * self.radius).abs();
        let step = max_segment_len.max(0.25);
        let segments = ((length / step).ceil() as usize).clamp(1, 4096);
        (0..=segments)
            .map(|i| self.point_at(self.start + self.sweep() * i as f64 / segments as f64))
            .collect()
    }

    /// True when the arc covers a full turn.
    pub fn is_full_circle(&self) -> bool {
        self.sweep().abs() >= 2.0 * PI - f64::EPSILON
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub points: Vec<Point>,
    pub closed: bool,
}

impl Path {
    pub fn open(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    pub fn closed(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    Butt,
    #[default]
    Round,
}

/// Soft halo drawn behind a stroke. Belongs to a single stroke and never
/// carries over to later draw calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub color: Rgba,
    pub blur: f64,
}

/// Stroke parameters. Joins between path segments are always round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f64,
    pub cap: LineCap,
    pub glow: Option<Glow>,
}

impl Stroke {
    pub fn round(color: Rgba, width: f64) -> Self {
        Self {
            color,
            width,
            cap: LineCap::Round,
            glow: None,
        }
    }

    #[must_use]
    pub fn with_glow(mut self, color: Rgba, blur: f64) -> Self {
        self.glow = Some(Glow { color, blur });
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Solid(Rgba),
    /// Linear gradient from `top` at `y0` to `bottom` at `y1`, clamped outside.
    VerticalGradient {
        top: Rgba,
        bottom: Rgba,
        y0: f64,
        y1: f64,
    },
}

impl Fill {
    pub fn color_at(&self, y: f64) -> Rgba {
        match *self {
            Fill::Solid(color) => color,
            Fill::VerticalGradient { top, bottom, y0, y1 } => {
                let span = y1 - y0;
                if span.abs() < f64::EPSILON {
                    return top;
                }
                top.lerp(bottom, ((y - y0) / span) as f32)
            }
        }
    }
}

/// Drawing target for the renderers.
///
/// `clear` must discard everything painted since the previous clear, so a
/// frame never depends on the frame before it.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn clear(&mut self);
    fn stroke_arc(&mut self, arc: &ArcSegment, stroke: &Stroke);
    fn stroke_path(&mut self, path: &Path, stroke: &Stroke);
    fn fill_path(&mut self, path: &Path, fill: &Fill);
}
