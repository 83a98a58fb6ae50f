use crate::error::Result;
use crate::math::Point3;
use crate::mesh::Mesh;
use crate::scene::{SceneStore, SolidData, SolidId, Transform};

/// Creates a named box solid from two corner points.
///
/// The mesh is centred on the object origin, which is placed at the box
/// centre.
pub struct MakeBox {
    name: String,
    min_corner: Point3,
    max_corner: Point3,
}

impl MakeBox {
    /// Creates a new `MakeBox` operation.
    #[must_use]
    pub fn new(name: impl Into<String>, min_corner: Point3, max_corner: Point3) -> Self {
        Self {
            name: name.into(),
            min_corner,
            max_corner,
        }
    }

    /// Executes the operation, adding the box to the scene.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already taken.
    pub fn execute(&self, scene: &mut SceneStore) -> Result<SolidId> {
        let min = self.min_corner.inf(&self.max_corner);
        let max = self.min_corner.sup(&self.max_corner);
        let center = nalgebra::center(&min, &max);
        let half = (max - min) / 2.0;
        let mesh = Mesh::cuboid(Point3::from(-half), Point3::from(half));
        let solid = SolidData::new(self.name.clone(), mesh).with_transform(Transform::at(center.coords));
        Ok(scene.add(solid)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{SceneError, SeamcutError};
    use approx::assert_relative_eq;

    #[test]
    fn box_lands_at_requested_corners() {
        let mut scene = SceneStore::new();
        let id = MakeBox::new("Body", Point3::new(-50.0, 0.0, -15.0), Point3::new(50.0, 50.0, 15.0))
            .execute(&mut scene)
            .unwrap();
        let bbox = scene.world_bounding_box(id).unwrap().unwrap();
        assert_relative_eq!(bbox.min, Point3::new(-50.0, 0.0, -15.0));
        assert_relative_eq!(bbox.max, Point3::new(50.0, 50.0, 15.0));
        assert_relative_eq!(scene.get(id).unwrap().mesh.signed_volume(), 150_000.0, epsilon = 1e-6);
    }

    #[test]
    fn swapped_corners_are_normalized() {
        let mut scene = SceneStore::new();
        let id = MakeBox::new("B", Point3::new(1.0, 1.0, 1.0), Point3::origin())
            .execute(&mut scene)
            .unwrap();
        assert!(scene.get(id).unwrap().mesh.signed_volume() > 0.0);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut scene = SceneStore::new();
        let op = MakeBox::new("Body", Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        op.execute(&mut scene).unwrap();
        assert!(matches!(
            op.execute(&mut scene),
            Err(SeamcutError::Scene(SceneError::NamingCollision(_)))
        ));
    }
}
