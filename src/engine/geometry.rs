//! Local-space outlines of the three shape kinds.

use euclid::default::Point2D;

/// sin(60°), the horizontal reach of the lower triangle vertices per unit radius.
const HALF_SQRT_3: f64 = 0.866_025_403_784_438_6;

#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    /// Axis-aligned box centered on the local origin.
    Rect { width: f64, height: f64 },
    /// Disk whose bounding box starts at the local origin, so its center sits
    /// at `(radius, radius)` rather than on the origin.
    Disk { radius: f64 },
    /// Point-up equilateral triangle, vertices at -90°, 30° and 150°.
    Triangle { vertices: [Point2D<f64>; 3] },
}

impl Outline {
    pub fn rect(width: f64, height: f64) -> Self {
        Outline::Rect { width, height }
    }

    pub fn disk(radius: f64) -> Self {
        Outline::Disk { radius }
    }

    pub fn triangle(radius: f64) -> Self {
        let dx = radius * HALF_SQRT_3;
        Outline::Triangle {
            vertices: [
                Point2D::new(0.0, -radius),
                Point2D::new(dx, radius / 2.0),
                Point2D::new(-dx, radius / 2.0),
            ],
        }
    }

    /// Whether a local-space point lies inside the outline (edges included).
    pub fn contains(&self, p: Point2D<f64>) -> bool {
        match self {
            Outline::Rect { width, height } => {
                p.x.abs() <= width.abs() / 2.0 && p.y.abs() <= height.abs() / 2.0
            }
            Outline::Disk { radius } => {
                let r = radius.abs();
                let (dx, dy) = (p.x - r, p.y - r);
                dx * dx + dy * dy <= r * r
            }
            Outline::Triangle { vertices: [a, b, c] } => {
                let d1 = edge_side(*a, *b, p);
                let d2 = edge_side(*b, *c, p);
                let d3 = edge_side(*c, *a, p);
                let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
                let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
                !(has_neg && has_pos)
            }
        }
    }
}

fn edge_side(a: Point2D<f64>, b: Point2D<f64>, p: Point2D<f64>) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}
