use super::{ArcSegment, Fill, LineCap, Path, Point, Rgba, Stroke, Surface};

/// Peak opacity of a glow halo relative to its color alpha.
const GLOW_OPACITY: f32 = 0.6;
/// Maximum length of a flattened arc segment, in pixels.
const ARC_TOLERANCE: f64 = 1.5;

/// RGBA pixel buffer with antialiased strokes and even-odd polygon fills.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width as usize * height as usize],
        }
    }

    /// Resizes and clears the buffer. Returns false when the size is unchanged.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if self.width == width && self.height == height {
            return false;
        }
        *self = Self::new(width, height);
        true
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        if x >= self.width || y >= self.height {
            return Rgba::TRANSPARENT;
        }
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(Rgba::is_transparent)
    }

    /// Number of pixels with alpha above `threshold`.
    pub fn coverage(&self, threshold: f32) -> usize {
        self.pixels.iter().filter(|p| p.a > threshold).count()
    }

    fn blend(&mut self, x: usize, y: usize, color: Rgba) {
        if color.is_transparent() {
            return;
        }
        let idx = y * self.width as usize + x;
        self.pixels[idx] = color.over(self.pixels[idx]);
    }

    fn stroke_polyline(&mut self, points: &[Point], closed: bool, stroke: &Stroke) {
        if points.is_empty() || self.width == 0 || self.height == 0 || stroke.width <= 0.0 {
            return;
        }
        let half = stroke.width / 2.0;
        let blur = stroke.glow.map(|g| g.blur.max(0.0)).unwrap_or(0.0);
        let reach = half + blur + 1.0;

        let Some((x0, y0, x1, y1)) = self.bounds(points, reach) else {
            return;
        };
        let bw = x1 - x0;
        let mut dist = vec![f64::INFINITY; bw * (y1 - y0)];

        let mut segments: Vec<(Point, Point)> = points.windows(2).map(|w| (w[0], w[1])).collect();
        if closed && points.len() > 2 {
            segments.push((points[points.len() - 1], points[0]));
        }
        if segments.is_empty() {
            segments.push((points[0], points[0]));
        }
        let last = segments.len() - 1;
        let round = stroke.cap == LineCap::Round;

        for (i, &(a, b)) in segments.iter().enumerate() {
            let extend_start = round || closed || i > 0;
            let extend_end = round || closed || i < last;
            let Some((sx0, sy0, sx1, sy1)) = self.bounds(&[a, b], reach) else {
                continue;
            };
            for y in sy0..sy1 {
                for x in sx0..sx1 {
                    let p = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                    let d = segment_distance(p, a, b, extend_start, extend_end);
                    let slot = &mut dist[(y - y0) * bw + (x - x0)];
                    if d < *slot {
                        *slot = d;
                    }
                }
            }
        }

        for y in y0..y1 {
            for x in x0..x1 {
                let d = dist[(y - y0) * bw + (x - x0)];
                if !d.is_finite() {
                    continue;
                }
                if let Some(glow) = stroke.glow
                    && blur > 0.0
                    && d > half
                    && d < half + blur
                {
                    let falloff = 1.0 - ((d - half) / blur) as f32;
                    let alpha = glow.color.a * GLOW_OPACITY * falloff * falloff;
                    self.blend(x, y, glow.color.with_alpha(alpha));
                }
                let core = (half + 0.5 - d).clamp(0.0, 1.0) as f32;
                if core > 0.0 {
                    self.blend(x, y, stroke.color.with_alpha(stroke.color.a * core));
                }
            }
        }
    }

    /// Pixel bounding box of `points` grown by `margin`, clipped to the buffer.
    fn bounds(&self, points: &[Point], margin: f64) -> Option<(usize, usize, usize, usize)> {
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points.iter().filter(|p| p.x.is_finite() && p.y.is_finite()) {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        if !min_x.is_finite() {
            return None;
        }
        let clip = |v: f64, limit: u32| v.clamp(0.0, f64::from(limit)) as usize;
        let x0 = clip((min_x - margin).floor(), self.width);
        let y0 = clip((min_y - margin).floor(), self.height);
        let x1 = clip((max_x + margin).ceil(), self.width);
        let y1 = clip((max_y + margin).ceil(), self.height);
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }
}

/// Distance from `p` to segment `ab`. A side that is not extended acts as a
/// butt end: points projecting past it are infinitely far away.
fn segment_distance(p: Point, a: Point, b: Point, extend_start: bool, extend_end: bool) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let mut t = if len_sq > 0.0 {
        ((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq
    } else {
        0.0
    };
    if t < 0.0 {
        if !extend_start {
            return f64::INFINITY;
        }
        t = 0.0;
    } else if t > 1.0 {
        if !extend_end {
            return f64::INFINITY;
        }
        t = 1.0;
    }
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

impl Surface for Raster {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self) {
        self.pixels.fill(Rgba::TRANSPARENT);
    }

    fn stroke_arc(&mut self, arc: &ArcSegment, stroke: &Stroke) {
        if arc.radius <= 0.0 {
            return;
        }
        let points = arc.flatten(ARC_TOLERANCE);
        self.stroke_polyline(&points, arc.is_full_circle(), stroke);
    }

    fn stroke_path(&mut self, path: &Path, stroke: &Stroke) {
        self.stroke_polyline(&path.points, path.closed, stroke);
    }

    fn fill_path(&mut self, path: &Path, fill: &Fill) {
        let points = &path.points;
        if points.len() < 3 {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.bounds(points, 0.0) else {
            return;
        };
        let edges: Vec<(Point, Point)> = points
            .iter()
            .zip(points.iter().cycle().skip(1))
            .map(|(a, b)| (*a, *b))
            .collect();

        let mut crossings = Vec::new();
        for y in y0..y1 {
            let yc = y as f64 + 0.5;
            crossings.clear();
            for &(a, b) in &edges {
                if (a.y <= yc && yc < b.y) || (b.y <= yc && yc < a.y) {
                    crossings.push(a.x + (yc - a.y) * (b.x - a.x) / (b.y - a.y));
                }
            }
            crossings.sort_by(f64::total_cmp);
            let color = fill.color_at(yc);
            for span in crossings.chunks_exact(2) {
                for x in x0..x1 {
                    let xc = x as f64 + 0.5;
                    if xc >= span[0] && xc < span[1] {
                        self.blend(x, y, color);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white() -> Rgba {
        Rgba::new(1.0, 1.0, 1.0, 1.0)
    }

    #[test]
    fn test_stroke_paints_along_line() {
        let mut raster = Raster::new(20, 10);
        raster.stroke_path(
            &Path::open(vec![Point::new(2.0, 5.0), Point::new(18.0, 5.0)]),
            &Stroke::round(white(), 2.0),
        );
        assert!(raster.pixel(10, 4).a > 0.9);
        assert!(raster.pixel(10, 5).a > 0.9);
        assert!(raster.pixel(10, 0).is_transparent());
        assert!(raster.pixel(10, 9).is_transparent());
    }

    #[test]
    fn test_butt_cap_stops_at_endpoint() {
        let line = Path::open(vec![Point::new(5.0, 5.0), Point::new(15.0, 5.0)]);
        let mut round = Raster::new(20, 10);
        round.stroke_path(&line, &Stroke::round(white(), 4.0));
        let mut butt = Raster::new(20, 10);
        butt.stroke_path(
            &line,
            &Stroke {
                cap: LineCap::Butt,
                ..Stroke::round(white(), 4.0)
            },
        );
        assert!(round.pixel(3, 5).a > 0.5);
        assert!(butt.pixel(3, 5).is_transparent());
    }

    #[test]
    fn test_glow_extends_beyond_stroke() {
        let line = Path::open(vec![Point::new(2.0, 10.0), Point::new(28.0, 10.0)]);
        let mut plain = Raster::new(30, 20);
        plain.stroke_path(&line, &Stroke::round(white(), 2.0));
        let mut glowing = Raster::new(30, 20);
        glowing.stroke_path(&line, &Stroke::round(white(), 2.0).with_glow(white(), 6.0));

        assert!(plain.pixel(15, 14).is_transparent());
        let halo = glowing.pixel(15, 14);
        assert!(halo.a > 0.0 && halo.a < 0.6);
        assert!(glowing.coverage(0.0) > plain.coverage(0.0));
    }

    #[test]
    fn test_clear_resets_pixels() {
        let mut raster = Raster::new(8, 8);
        raster.fill_path(
            &Path::closed(vec![
                Point::new(0.0, 0.0),
                Point::new(8.0, 0.0),
                Point::new(8.0, 8.0),
                Point::new(0.0, 8.0),
            ]),
            &Fill::Solid(white()),
        );
        assert_eq!(raster.coverage(0.99), 64);
        raster.clear();
        assert!(raster.is_blank());
    }

    #[test]
    fn test_fill_triangle_even_odd() {
        let mut raster = Raster::new(10, 10);
        raster.fill_path(
            &Path::closed(vec![
                Point::new(0.0, 10.0),
                Point::new(10.0, 10.0),
                Point::new(10.0, 0.0),
            ]),
            &Fill::Solid(white()),
        );
        assert!(raster.pixel(9, 1).a > 0.9);
        assert!(raster.pixel(1, 9).a > 0.9);
        assert!(raster.pixel(1, 1).is_transparent());
    }

    #[test]
    fn test_gradient_fill_fades_downwards() {
        let mut raster = Raster::new(4, 100);
        let top = white().with_alpha(0.3);
        raster.fill_path(
            &Path::closed(vec![
                Point::new(0.0, 0.0),
                Point::new(4.0, 0.0),
                Point::new(4.0, 100.0),
                Point::new(0.0, 100.0),
            ]),
            &Fill::VerticalGradient {
                top,
                bottom: top.with_alpha(0.02),
                y0: 0.0,
                y1: 100.0,
            },
        );
        let upper = raster.pixel(1, 2).a;
        let lower = raster.pixel(1, 97).a;
        assert!(upper > 0.25 && upper <= 0.3);
        assert!(lower < 0.05);
    }

    #[test]
    fn test_resize_reports_change() {
        let mut raster = Raster::new(4, 4);
        assert!(!raster.resize(4, 4));
        assert!(raster.resize(6, 2));
        assert_eq!(raster.pixels().len(), 12);
        assert_eq!(raster.pixel(10, 10), Rgba::TRANSPARENT);
    }
}
