use tracing::{debug, info};

use crate::error::CutError;
use crate::kernel::GeometryKernel;
use crate::operations::transform::ApplyTransform;
use crate::scene::{SceneStore, SolidId};

use super::config::HealParams;
use super::narrow;

/// What the healing pass changed on a target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealReport {
    /// Pending modifiers baked into the mesh.
    pub modifiers_baked: usize,
    /// Vertices removed by welding.
    pub vertices_merged: usize,
    /// Loose elements removed.
    pub loose_removed: usize,
    /// Boundary loops capped.
    pub holes_filled: usize,
}

impl HealReport {
    /// Returns `true` if the pass changed nothing.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Brings a target into boolean-ready shape.
///
/// Bakes pending modifiers, applies rotation and scale (location stays on
/// the object), welds near-duplicate vertices, deletes loose geometry,
/// caps small holes, makes normals consistent, and triangulates. Running it
/// twice changes nothing the second time.
pub struct Precondition<'a> {
    target: SolidId,
    params: &'a HealParams,
}

impl<'a> Precondition<'a> {
    /// Creates a new `Precondition` operation.
    #[must_use]
    pub fn new(target: SolidId, params: &'a HealParams) -> Self {
        Self { target, params }
    }

    /// Executes the healing pass.
    ///
    /// # Errors
    ///
    /// Returns [`CutError::NotAMesh`] for geometry-less objects,
    /// [`CutError::EmptyMesh`] if the target has (or is left with) no
    /// faces, and propagates kernel failures.
    pub fn execute<K: GeometryKernel + ?Sized>(
        &self,
        kernel: &K,
        scene: &mut SceneStore,
    ) -> Result<HealReport, CutError> {
        let solid = scene.get(self.target)?;
        let name = solid.name().to_owned();
        if !solid.is_mesh() {
            return Err(CutError::NotAMesh(name));
        }
        if solid.mesh.is_empty() {
            return Err(CutError::EmptyMesh(name));
        }
        info!(solid = %name, "preconditioning target");

        let mut report = HealReport {
            modifiers_baked: kernel.bake_modifiers(scene.get_mut(self.target)?)?,
            ..HealReport::default()
        };

        ApplyTransform::new(self.target)
            .rotation(true)
            .scale(true)
            .execute(scene)
            .map_err(narrow)?;

        let mesh = &mut scene.get_mut(self.target)?.mesh;
        report.vertices_merged = kernel.merge_by_distance(mesh, self.params.merge_distance)?;
        report.loose_removed = kernel.remove_loose(mesh)?;
        report.holes_filled = kernel.fill_holes(mesh, self.params.fill_hole_max_sides)?;
        kernel.recalculate_normals(mesh)?;
        kernel.triangulate(mesh)?;

        if mesh.is_empty() {
            return Err(CutError::EmptyMesh(name));
        }
        debug!(
            solid = %name,
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            merged = report.vertices_merged,
            loose = report.loose_removed,
            holes = report.holes_filled,
            "target healed"
        );
        Ok(report)
    }
}
