/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 4x4 transformation matrix.
pub type Matrix4 = nalgebra::Matrix4<f64>;

/// 3D rotation.
pub type Rotation3 = nalgebra::Rotation3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Builds an XYZ Euler rotation (applied X first, then Y, then Z) from radians.
#[must_use]
pub fn euler_xyz(angles: &Vector3) -> Rotation3 {
    Rotation3::from_euler_angles(angles.x, angles.y, angles.z)
}

/// XYZ Euler rotation from per-axis angles in degrees.
#[must_use]
pub fn euler_xyz_degrees(degrees: [f64; 3]) -> Rotation3 {
    euler_xyz(&degrees_to_radians(degrees))
}

/// Converts a per-axis rotation in degrees to radians.
#[must_use]
pub fn degrees_to_radians(degrees: [f64; 3]) -> Vector3 {
    Vector3::new(
        degrees[0].to_radians(),
        degrees[1].to_radians(),
        degrees[2].to_radians(),
    )
}

/// Transforms a point by a 4x4 matrix (homogeneous coordinates).
#[must_use]
pub fn transform_point(matrix: &Matrix4, point: &Point3) -> Point3 {
    let v = matrix * nalgebra::Vector4::new(point.x, point.y, point.z, 1.0);
    Point3::new(v.x, v.y, v.z)
}
