use super::{ArcSegment, Fill, Path, Stroke, Surface};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    StrokeArc { arc: ArcSegment, stroke: Stroke },
    StrokePath { path: Path, stroke: Stroke },
    FillPath { path: Path, fill: Fill },
}

/// Surface that records draw calls instead of painting them.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    width: u32,
    height: u32,
    ops: Vec<DrawOp>,
}

impl DisplayList {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn arcs(&self) -> impl Iterator<Item = (&ArcSegment, &Stroke)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::StrokeArc { arc, stroke } => Some((arc, stroke)),
            _ => None,
        })
    }

    pub fn strokes(&self) -> impl Iterator<Item = (&Path, &Stroke)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::StrokePath { path, stroke } => Some((path, stroke)),
            _ => None,
        })
    }

    pub fn fills(&self) -> impl Iterator<Item = (&Path, &Fill)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::FillPath { path, fill } => Some((path, fill)),
            _ => None,
        })
    }
}

impl Surface for DisplayList {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear);
    }

    fn stroke_arc(&mut self, arc: &ArcSegment, stroke: &Stroke) {
        self.ops.push(DrawOp::StrokeArc {
            arc: *arc,
            stroke: *stroke,
        });
    }

    fn stroke_path(&mut self, path: &Path, stroke: &Stroke) {
        self.ops.push(DrawOp::StrokePath {
            path: path.clone(),
            stroke: *stroke,
        });
    }

    fn fill_path(&mut self, path: &Path, fill: &Fill) {
        self.ops.push(DrawOp::FillPath {
            path: path.clone(),
            fill: *fill,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Point, Rgba};

    #[test]
    fn test_clear_discards_previous_frame() {
        let mut list = DisplayList::new(10, 10);
        list.clear();
        list.stroke_path(
            &Path::open(vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)]),
            &Stroke::round(Rgba::from_rgb8(255, 0, 0), 1.0),
        );
        assert_eq!(list.ops().len(), 2);

        list.clear();
        assert_eq!(list.ops(), &[DrawOp::Clear]);
        assert_eq!(list.strokes().count(), 0);
    }
}
