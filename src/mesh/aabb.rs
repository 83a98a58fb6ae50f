use crate::math::{Point3, Vector3};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Creates a bounding box from two corners.
    #[must_use]
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing all points, or `None` if there are none.
    #[must_use]
    pub fn from_points(points: &[Point3]) -> Option<Self> {
        let first = points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min = min.inf(p);
            max = max.sup(p);
        }
        Some(Self { min, max })
    }

    /// Centre of the box.
    #[must_use]
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Size along each axis.
    #[must_use]
    pub fn dimensions(&self) -> Vector3 {
        self.max - self.min
    }

    /// Length of the main diagonal.
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        self.dimensions().norm()
    }

    /// Width of the box's projection onto a direction.
    #[must_use]
    pub fn extent_along(&self, direction: &Vector3) -> f64 {
        let d = self.dimensions();
        let n = direction.normalize();
        d.x * n.x.abs() + d.y * n.y.abs() + d.z * n.z.abs()
    }

    /// Returns `true` if both corners match within `tolerance`.
    #[must_use]
    pub fn approx_eq(&self, other: &Aabb, tolerance: f64) -> bool {
        (self.min - other.min).amax() <= tolerance && (self.max - other.max).amax() <= tolerance
    }

    /// Returns `true` if the boxes overlap (touching counts).
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn from_points_spans_all() {
        let b = Aabb::from_points(&[
            Point3::new(1.0, -2.0, 0.0),
            Point3::new(-1.0, 4.0, 3.0),
            Point3::new(0.0, 0.0, -1.0),
        ])
        .unwrap();
        assert_relative_eq!(b.min, Point3::new(-1.0, -2.0, -1.0));
        assert_relative_eq!(b.max, Point3::new(1.0, 4.0, 3.0));
        assert_relative_eq!(b.center(), Point3::new(0.0, 1.0, 1.0));
    }

    #[test]
    fn extent_along_axis_and_diagonal() {
        let b = Aabb::new(Point3::origin(), Point3::new(100.0, 50.0, 30.0));
        assert_relative_eq!(b.extent_along(&Vector3::y()), 50.0);
        assert_relative_eq!(b.extent_along(&-Vector3::x()), 100.0);
        let d = Vector3::new(1.0, 1.0, 0.0);
        assert_relative_eq!(b.extent_along(&d), 150.0 / 2f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn approx_eq_respects_tolerance() {
        let a = Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(0.0, 0.0, 1e-9), Point3::new(1.0, 1.0, 1.0));
        assert!(a.approx_eq(&b, 1e-6));
        assert!(!a.approx_eq(&b, 1e-12));
    }
}
