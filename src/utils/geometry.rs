//! Projective mapping between the module lattice and image pixels.
//!
//! The fit is closed-form: each corner set defines a map from the unit
//! square, and the symbol-to-image transform is the destination map
//! composed with the adjugate of the source map. Homogeneous coordinates
//! are scale-free, so the adjugate stands in for the inverse and nothing
//! is divided until a point is actually mapped.

use crate::models::Point;

/// Homogeneous 3x3 map, row-major, applied to column vectors (u, v, 1)
pub struct PerspectiveTransform {
    m: [[f64; 3]; 3],
}

impl PerspectiveTransform {
    /// Fit the map sending `src[i]` onto `dst[i]`.
    ///
    /// Corners are ordered top-left, top-right, bottom-left, bottom-right.
    /// `None` when either quadrilateral is degenerate.
    pub fn from_points(src: &[Point; 4], dst: &[Point; 4]) -> Option<Self> {
        let to_src = Self::unit_square_to(src)?;
        let to_dst = Self::unit_square_to(dst)?;
        let fitted = to_dst.compose(&to_src.adjugate());
        fitted.is_invertible().then_some(fitted)
    }

    /// Map a source-space point through the homography
    pub fn transform(&self, p: &Point) -> Point {
        let (u, v) = (f64::from(p.x), f64::from(p.y));
        let m = &self.m;
        let w = m[2][0] * u + m[2][1] * v + m[2][2];
        if w.abs() < 1e-12 {
            return Point::new(0.0, 0.0);
        }
        Point::new(
            ((m[0][0] * u + m[0][1] * v + m[0][2]) / w) as f32,
            ((m[1][0] * u + m[1][1] * v + m[1][2]) / w) as f32,
        )
    }

    /// Closed-form map from the unit square onto an arbitrary quad.
    ///
    /// Anchoring (0,0) at `q0` fixes the constant column, the unit corners
    /// fix the rest once the projective row (g, h) is known, and (g, h)
    /// falls out of a 2x2 system in the far-corner edge vectors and the
    /// quad's excess over a parallelogram. Zero excess lands on g = h = 0,
    /// so the affine case needs no special branch.
    fn unit_square_to(quad: &[Point; 4]) -> Option<Self> {
        let [q0, q1, q2, q3] = quad.map(|p| (f64::from(p.x), f64::from(p.y)));

        let (ex1, ey1) = (q1.0 - q3.0, q1.1 - q3.1);
        let (ex2, ey2) = (q2.0 - q3.0, q2.1 - q3.1);
        let excess_x = q0.0 - q1.0 - q2.0 + q3.0;
        let excess_y = q0.1 - q1.1 - q2.1 + q3.1;

        let det = ex1 * ey2 - ex2 * ey1;
        let span = ex1.abs().max(ey1.abs()).max(ex2.abs()).max(ey2.abs());
        if det.abs() <= 1e-10 * span * span {
            return None;
        }
        let g = (excess_x * ey2 - ex2 * excess_y) / det;
        let h = (ex1 * excess_y - excess_x * ey1) / det;

        Some(Self {
            m: [
                [q1.0 * (g + 1.0) - q0.0, q2.0 * (h + 1.0) - q0.0, q0.0],
                [q1.1 * (g + 1.0) - q0.1, q2.1 * (h + 1.0) - q0.1, q0.1],
                [g, h, 1.0],
            ],
        })
    }

    /// self after inner: (self . inner)(p) = self(inner(p))
    fn compose(&self, inner: &Self) -> Self {
        let mut m = [[0.0f64; 3]; 3];
        for (row, out) in m.iter_mut().enumerate() {
            for (col, cell) in out.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.m[row][k] * inner.m[k][col]).sum();
            }
        }
        Self { m }
    }

    /// Transposed cofactor matrix; inverts up to scale, which is all a
    /// homogeneous map needs
    fn adjugate(&self) -> Self {
        let m = &self.m;
        Self {
            m: [
                [
                    m[1][1] * m[2][2] - m[1][2] * m[2][1],
                    m[0][2] * m[2][1] - m[0][1] * m[2][2],
                    m[0][1] * m[1][2] - m[0][2] * m[1][1],
                ],
                [
                    m[1][2] * m[2][0] - m[1][0] * m[2][2],
                    m[0][0] * m[2][2] - m[0][2] * m[2][0],
                    m[0][2] * m[1][0] - m[0][0] * m[1][2],
                ],
                [
                    m[1][0] * m[2][1] - m[1][1] * m[2][0],
                    m[0][1] * m[2][0] - m[0][0] * m[2][1],
                    m[0][0] * m[1][1] - m[0][1] * m[1][0],
                ],
            ],
        }
    }

    fn is_invertible(&self) -> bool {
        let m = &self.m;
        let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);
        let norm = m
            .iter()
            .flatten()
            .fold(0.0f64, |acc, &cell| acc.max(cell.abs()));
        det.abs() > 1e-9 * norm * norm * norm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_aligned_scaling() {
        let src = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
        ];
        let dst = [
            Point::new(5.0, 5.0),
            Point::new(45.0, 5.0),
            Point::new(5.0, 45.0),
            Point::new(45.0, 45.0),
        ];
        let transform = PerspectiveTransform::from_points(&src, &dst).unwrap();
        let mid = transform.transform(&Point::new(5.0, 5.0));
        assert!((mid.x - 25.0).abs() < 0.01);
        assert!((mid.y - 25.0).abs() < 0.01);
    }

    #[test]
    fn test_degenerate_points_rejected() {
        let collapsed = [Point::new(1.0, 1.0); 4];
        let dst = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
        ];
        assert!(PerspectiveTransform::from_points(&collapsed, &dst).is_none());

        // three corners on one line pin no projective map either
        let collinear = [
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(0.0, 2.0),
            Point::new(1.0, 1.0),
        ];
        assert!(PerspectiveTransform::from_points(&collinear, &dst).is_none());
    }

    #[test]
    fn test_projective_warp_maps_corners() {
        let src = [
            Point::new(0.0, 0.0),
            Point::new(21.0, 0.0),
            Point::new(0.0, 21.0),
            Point::new(21.0, 21.0),
        ];
        let dst = [
            Point::new(10.0, 12.0),
            Point::new(90.0, 8.0),
            Point::new(14.0, 95.0),
            Point::new(99.0, 88.0),
        ];
        let transform = PerspectiveTransform::from_points(&src, &dst).unwrap();
        for (s, d) in src.iter().zip(dst.iter()) {
            let mapped = transform.transform(s);
            assert!((mapped.x - d.x).abs() < 0.05 && (mapped.y - d.y).abs() < 0.05);
        }
    }

    #[test]
    fn test_rotation_keeps_interior_points() {
        // 90-degree rotation of a square, expressed corner by corner
        let src = [
            Point::new(0.0, 0.0),
            Point::new(8.0, 0.0),
            Point::new(0.0, 8.0),
            Point::new(8.0, 8.0),
        ];
        let dst = [
            Point::new(8.0, 0.0),
            Point::new(8.0, 8.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 8.0),
        ];
        let transform = PerspectiveTransform::from_points(&src, &dst).unwrap();
        let mapped = transform.transform(&Point::new(2.0, 1.0));
        assert!((mapped.x - 7.0).abs() < 0.01);
        assert!((mapped.y - 2.0).abs() < 0.01);
    }
}
