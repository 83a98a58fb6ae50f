use crate::math::TOLERANCE;
use crate::scene::{SceneStore, SolidId};

/// Checks that a solid is a usable boolean operand: a mesh object whose
/// surface is closed, edge-manifold, and encloses volume.
pub struct IsValid {
    solid: SolidId,
}

impl IsValid {
    /// Creates a new `IsValid` query.
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        Self { solid }
    }

    /// Executes the validation, returning `true` if the solid is valid.
    /// Stale handles are invalid.
    #[must_use]
    pub fn execute(&self, scene: &SceneStore) -> bool {
        let Ok(solid) = scene.get(self.solid) else {
            return false;
        };
        let mesh = &solid.mesh;
        solid.is_mesh()
            && mesh.is_closed()
            && mesh.non_manifold_edge_count() == 0
            && mesh.signed_volume().abs() > TOLERANCE
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::mesh::Mesh;
    use crate::scene::SolidData;

    #[test]
    fn cube_is_valid() {
        let mut scene = SceneStore::new();
        let id = scene
            .add(SolidData::new("Cube", Mesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0))))
            .unwrap();
        assert!(IsValid::new(id).execute(&scene));
    }

    #[test]
    fn open_surface_is_invalid() {
        let mut scene = SceneStore::new();
        let id = scene.add(SolidData::new("Plane", Mesh::plane(2.0))).unwrap();
        assert!(!IsValid::new(id).execute(&scene));
    }

    #[test]
    fn removed_solid_is_invalid() {
        let mut scene = SceneStore::new();
        let id = scene
            .add(SolidData::new("Cube", Mesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0))))
            .unwrap();
        scene.remove(id);
        assert!(!IsValid::new(id).execute(&scene));
    }
}
