use crate::error::Result;
use crate::scene::{SceneStore, SolidId};

/// Computes the enclosed volume of a solid in world units.
///
/// Sums the signed tetrahedra spanned by each face fan and a reference
/// point, so only closed meshes give meaningful results. Returns the
/// absolute value.
pub struct Volume {
    solid: SolidId,
}

impl Volume {
    /// Creates a new `Volume` query.
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        Self { solid }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid is not in the scene.
    pub fn execute(&self, scene: &SceneStore) -> Result<f64> {
        Ok(scene.world_mesh(self.solid)?.signed_volume().abs())
    }
}
