use crate::mesh::{Aabb, Mesh};

use super::modifier::Modifier;
use super::transform::Transform;

slotmap::new_key_type! {
    /// Unique identifier for a solid in the scene store.
    pub struct SolidId;
}

/// The kind of scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// A polygon mesh.
    Mesh,
    /// A placeholder without geometry (locator, empty).
    Empty,
}

/// Data associated with a named scene object.
#[derive(Debug, Clone)]
pub struct SolidData {
    /// Display and lookup name; unique within the store.
    pub(crate) name: String,
    /// Object kind.
    pub kind: ObjectKind,
    /// Geometry in local coordinates.
    pub mesh: Mesh,
    /// Local-to-world transform.
    pub transform: Transform,
    /// Construction history not yet baked into `mesh`.
    pub modifiers: Vec<Modifier>,
}

impl SolidData {
    /// Creates a mesh object with an identity transform.
    #[must_use]
    pub fn new(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            kind: ObjectKind::Mesh,
            mesh,
            transform: Transform::identity(),
            modifiers: Vec::new(),
        }
    }

    /// Creates a geometry-less placeholder object.
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            kind: ObjectKind::Empty,
            ..Self::new(name, Mesh::new())
        }
    }

    /// Sets the transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Current name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` for mesh objects.
    #[must_use]
    pub fn is_mesh(&self) -> bool {
        self.kind == ObjectKind::Mesh
    }

    /// Mesh in world coordinates.
    #[must_use]
    pub fn world_mesh(&self) -> Mesh {
        self.mesh.transformed(&self.transform.matrix())
    }

    /// World-space bounding box, or `None` without geometry.
    #[must_use]
    pub fn world_bounding_box(&self) -> Option<Aabb> {
        self.world_mesh().bounding_box()
    }

    /// Moves the local origin to the centre of the geometry's bounding box
    /// without moving the geometry in world space.
    ///
    /// Rotation and scale must already be applied.
    pub fn origin_to_geometry(&mut self) {
        let Some(bbox) = self.mesh.bounding_box() else {
            return;
        };
        let center = bbox.center().coords;
        self.mesh.translate(&-center);
        self.transform.location += center;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point3, Vector3};
    use approx::assert_relative_eq;

    #[test]
    fn origin_to_geometry_keeps_world_position() {
        let mesh = Mesh::cuboid(Point3::new(10.0, 0.0, 0.0), Point3::new(12.0, 4.0, 2.0));
        let mut solid = SolidData::new("Part", mesh);
        let before = solid.world_bounding_box().unwrap();
        solid.origin_to_geometry();
        let after = solid.world_bounding_box().unwrap();

        assert!(before.approx_eq(&after, 1e-12));
        assert_relative_eq!(solid.transform.location, Vector3::new(11.0, 2.0, 1.0));
        assert_relative_eq!(solid.mesh.bounding_box().unwrap().center(), Point3::origin());
    }

    #[test]
    fn empty_object_is_not_a_mesh() {
        let marker = SolidData::empty("Marker");
        assert!(!marker.is_mesh());
        assert!(marker.world_bounding_box().is_none());
    }
}
