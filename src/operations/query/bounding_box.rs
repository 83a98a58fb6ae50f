use crate::error::Result;
use crate::mesh::Aabb;
use crate::scene::{SceneStore, SolidId};

/// Computes the world-space axis-aligned bounding box of a solid.
pub struct BoundingBox {
    solid: SolidId,
}

impl BoundingBox {
    /// Creates a new `BoundingBox` query.
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        Self { solid }
    }

    /// Executes the query; `None` for solids without geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid is not in the scene.
    pub fn execute(&self, scene: &SceneStore) -> Result<Option<Aabb>> {
        Ok(scene.world_bounding_box(self.solid)?)
    }
}
