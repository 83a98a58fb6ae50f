use crate::kernel::NoiseField;

/// A pending, non-destructive construction step attached to a solid.
///
/// Modifiers do not change the solid's mesh until they are baked by a
/// [`GeometryKernel`](crate::kernel::GeometryKernel).
#[derive(Debug, Clone)]
pub enum Modifier {
    /// Simple subdivision; each level splits every n-gon into n quads.
    Subdivide { levels: u32 },
    /// Displacement along vertex normals by `(noise - 0.5) * strength`.
    Displace { noise: NoiseField, strength: f64 },
    /// Thickens an open surface into a closed shell.
    Solidify { thickness: f64, offset: f64 },
    /// Splits every polygon into triangles.
    Triangulate,
}

impl Modifier {
    /// Short name used in diagnostics.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Subdivide { .. } => "subdivide",
            Self::Displace { .. } => "displace",
            Self::Solidify { .. } => "solidify",
            Self::Triangulate => "triangulate",
        }
    }
}
