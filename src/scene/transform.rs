use crate::math::{euler_xyz, Matrix4, Rotation3, Vector3};

/// Object transform: location, XYZ Euler rotation in radians, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub location: Vector3,
    pub rotation: Vector3,
    pub scale: Vector3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            location: Vector3::zeros(),
            rotation: Vector3::zeros(),
            scale: Vector3::repeat(1.0),
        }
    }
}

impl Transform {
    /// Identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Transform with only a location.
    #[must_use]
    pub fn at(location: Vector3) -> Self {
        Self {
            location,
            ..Self::default()
        }
    }

    /// Rotation part.
    #[must_use]
    pub fn rotation(&self) -> Rotation3 {
        euler_xyz(&self.rotation)
    }

    /// Rotation followed by scale, without translation.
    #[must_use]
    pub fn rotation_scale_matrix(&self) -> Matrix4 {
        self.rotation().to_homogeneous() * Matrix4::new_nonuniform_scaling(&self.scale)
    }

    /// Full local-to-world matrix (translate * rotate * scale).
    #[must_use]
    pub fn matrix(&self) -> Matrix4 {
        Matrix4::new_translation(&self.location) * self.rotation_scale_matrix()
    }

    /// Returns `true` if rotation is zero and scale is one.
    #[must_use]
    pub fn has_unit_rotation_scale(&self) -> bool {
        self.rotation == Vector3::zeros() && self.scale == Vector3::repeat(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{transform_point, Point3};
    use approx::assert_relative_eq;

    #[test]
    fn matrix_scales_then_rotates_then_translates() {
        let t = Transform {
            location: Vector3::new(0.0, 10.0, 0.0),
            rotation: Vector3::new(std::f64::consts::FRAC_PI_2, 0.0, 0.0),
            scale: Vector3::repeat(2.0),
        };
        let p = transform_point(&t.matrix(), &Point3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(p, Point3::new(0.0, 8.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn default_is_identity() {
        let t = Transform::identity();
        assert!(t.has_unit_rotation_scale());
        assert_relative_eq!(t.matrix(), Matrix4::identity());
    }
}
