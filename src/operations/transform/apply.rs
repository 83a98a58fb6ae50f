use crate::error::{KernelError, Result};
use crate::math::Vector3;
use crate::scene::{SceneStore, SolidId, Transform};

/// Bakes selected components of a solid's transform into its mesh.
///
/// The world-space geometry is unchanged: components that are applied are
/// reset on the object (location to zero, rotation to zero, scale to one)
/// and the mesh is re-expressed relative to what remains.
pub struct ApplyTransform {
    solid: SolidId,
    location: bool,
    rotation: bool,
    scale: bool,
}

impl ApplyTransform {
    /// Creates a new `ApplyTransform` operation that applies nothing until
    /// components are selected.
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        Self {
            solid,
            location: false,
            rotation: false,
            scale: false,
        }
    }

    /// Selects whether the location is applied.
    #[must_use]
    pub fn location(mut self, apply: bool) -> Self {
        self.location = apply;
        self
    }

    /// Selects whether the rotation is applied.
    #[must_use]
    pub fn rotation(mut self, apply: bool) -> Self {
        self.rotation = apply;
        self
    }

    /// Selects whether the scale is applied.
    #[must_use]
    pub fn scale(mut self, apply: bool) -> Self {
        self.scale = apply;
        self
    }

    /// Executes the operation, modifying the solid in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid is not in the scene, or if the
    /// components left on the object are not invertible (zero scale).
    pub fn execute(&self, scene: &mut SceneStore) -> Result<()> {
        let solid = scene.get_mut(self.solid)?;
        let full = solid.transform.matrix();
        let kept = Transform {
            location: if self.location {
                Vector3::zeros()
            } else {
                solid.transform.location
            },
            rotation: if self.rotation {
                Vector3::zeros()
            } else {
                solid.transform.rotation
            },
            scale: if self.scale {
                Vector3::repeat(1.0)
            } else {
                solid.transform.scale
            },
        };
        let inverse = kept.matrix().try_inverse().ok_or_else(|| {
            KernelError::Degenerate(format!(
                "transform left on '{}' is not invertible",
                solid.name()
            ))
        })?;
        solid.mesh.transform(&(inverse * full));
        solid.transform = kept;
        Ok(())
    }
}
