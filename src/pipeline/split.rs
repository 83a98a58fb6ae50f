use tracing::{debug, error, info, warn};

use crate::error::CutError;
use crate::kernel::{BooleanOp, BooleanSolver, GeometryKernel};
use crate::mesh::{Aabb, Mesh};
use crate::scene::{SceneStore, SolidData, SolidId, Transform};

use super::config::{HealParams, NamingParams};

/// Bounding boxes closer than this count as "the same box" when checking
/// whether a solver returned its input uncut.
const UNCHANGED_TOLERANCE: f64 = 1e-6;

/// Outcome of one split.
///
/// Part A is always the difference (target minus tool) and part B always
/// the intersection, wherever they sit in space.
#[derive(Debug, Default)]
pub struct CutResult {
    /// Both parts were produced and validated.
    pub success: bool,
    /// Difference result, if an object was produced.
    pub part_a: Option<SolidId>,
    /// Intersection result, if an object was produced.
    pub part_b: Option<SolidId>,
    /// Solver that produced part A.
    pub tier_a: Option<BooleanSolver>,
    /// Solver that produced part B.
    pub tier_b: Option<BooleanSolver>,
    /// One line per attempt and decision.
    pub diagnostic: Vec<String>,
    /// Why the split failed.
    pub failure: Option<CutError>,
}

/// What a cut result is checked against.
struct Reference {
    bbox: Aabb,
}

impl Reference {
    fn check(&self, mesh: &Mesh, part: &str, op: BooleanOp) -> Result<(), CutError> {
        let Some(bbox) = mesh.bounding_box().filter(|_| mesh.face_count() > 0) else {
            return Err(CutError::BooleanEmptyResult {
                part: part.to_owned(),
                op: op.to_string(),
            });
        };
        // Re-meshed or merely notched copies keep the target's box.
        if bbox.approx_eq(&self.bbox, UNCHANGED_TOLERANCE) {
            return Err(CutError::BooleanFullResult {
                part: part.to_owned(),
                op: op.to_string(),
            });
        }
        Ok(())
    }
}

/// One boolean operation to solve for one part.
struct Pass<'m> {
    op: BooleanOp,
    part: &'m str,
    source: SolidId,
    tool: &'m Mesh,
    reference: &'m Reference,
}

enum Verdict {
    Accepted(SolidId),
    Rejected(SolidId),
}

/// Splits a preconditioned target with a cutting tool.
///
/// The intersection (part B) is solved first. The target is then renamed
/// aside with the processed suffix and the difference (part A) solved
/// against it. Each operation tries the exact solver, validates the result,
/// and falls back to the approximate solver once.
///
/// Parts stay under the `.NNN` names of their duplicates; the final names
/// are handed out afterwards by [`ResolveIdentity`](super::ResolveIdentity).
/// On success the renamed parent is deleted. On any failure after the
/// rename, including errors, the target gets its name back; whatever was
/// produced is left under `.NNN` variant names.
pub struct RobustSplit<'a> {
    target: SolidId,
    tool: SolidId,
    part_a: &'a str,
    part_b: &'a str,
    heal: &'a HealParams,
    naming: &'a NamingParams,
}

impl<'a> RobustSplit<'a> {
    /// Creates a new `RobustSplit` operation.
    #[must_use]
    pub fn new(
        target: SolidId,
        tool: SolidId,
        part_a: &'a str,
        part_b: &'a str,
        heal: &'a HealParams,
        naming: &'a NamingParams,
    ) -> Self {
        Self {
            target,
            tool,
            part_a,
            part_b,
            heal,
            naming,
        }
    }

    /// Executes the split.
    ///
    /// A failed split is reported through [`CutResult::success`] and
    /// [`CutResult::failure`], not as an error.
    ///
    /// # Errors
    ///
    /// Returns an error only if the scene itself misbehaves (stale handles,
    /// exhausted variant names) or the target has no geometry.
    pub fn execute<K: GeometryKernel + ?Sized>(
        &self,
        kernel: &K,
        scene: &mut SceneStore,
    ) -> Result<CutResult, CutError> {
        let original_name = scene.get(self.target)?.name().to_owned();
        let source = scene.world_mesh(self.target)?;
        let reference = Reference {
            bbox: source
                .bounding_box()
                .ok_or_else(|| CutError::EmptyMesh(original_name.clone()))?,
        };
        let tool = scene.world_mesh(self.tool)?;
        let mut result = CutResult::default();

        let b = Pass {
            op: BooleanOp::Intersection,
            part: self.part_b,
            source: self.target,
            tool: &tool,
            reference: &reference,
        };
        let (part_b, tier_b) = self.solve(kernel, scene, &b, &mut result.diagnostic)?;
        result.part_b = Some(part_b);
        result.tier_b = tier_b;
        if tier_b.is_none() {
            result.failure = Some(CutError::CriticalSplitFailure {
                part: self.part_b.to_owned(),
                op: b.op.to_string(),
            });
            return Ok(result);
        }

        let processed = self.naming.processed_name(&original_name);
        if let Some(stale) = scene.id_of(&processed).filter(|&id| id != self.target) {
            warn!(name = %processed, "removed stale processed parent");
            scene.remove(stale);
        }
        scene.rename(self.target, &processed)?;
        debug!(from = %original_name, to = %processed, "target renamed aside");

        let a = Pass {
            op: BooleanOp::Difference,
            part: self.part_a,
            ..b
        };
        let (part_a, tier_a) = match self.solve(kernel, scene, &a, &mut result.diagnostic) {
            Ok(solved) => solved,
            Err(e) => {
                error!(solid = %original_name, error = %e, "difference pass aborted");
                self.restore(scene, &original_name, part_b, &mut result.diagnostic)?;
                return Err(e);
            }
        };
        result.part_a = Some(part_a);
        result.tier_a = tier_a;
        if tier_a.is_none() {
            self.restore(scene, &original_name, part_b, &mut result.diagnostic)?;
            result.failure = Some(CutError::CriticalSplitFailure {
                part: self.part_a.to_owned(),
                op: a.op.to_string(),
            });
            return Ok(result);
        }

        scene.remove(self.target);
        info!(
            solid = %original_name,
            part_a = scene.get(part_a)?.name(),
            part_b = scene.get(part_b)?.name(),
            "split complete"
        );
        result.success = true;
        Ok(result)
    }

    /// Gives the target its name back and leaves part B as debris.
    fn restore(
        &self,
        scene: &mut SceneStore,
        original_name: &str,
        part_b: SolidId,
        diagnostic: &mut Vec<String>,
    ) -> Result<(), CutError> {
        scene.rename(self.target, original_name)?;
        let leftover = scene.demote(part_b)?;
        diagnostic.push(format!(
            "restored '{original_name}'; intersection result left as '{leftover}'"
        ));
        Ok(())
    }

    /// Solves one pass, exact first. Returns the produced object and the
    /// tier that succeeded, or `None` if both were rejected.
    fn solve<K: GeometryKernel + ?Sized>(
        &self,
        kernel: &K,
        scene: &mut SceneStore,
        pass: &Pass<'_>,
        diagnostic: &mut Vec<String>,
    ) -> Result<(SolidId, Option<BooleanSolver>), CutError> {
        match self.attempt(kernel, scene, pass, BooleanSolver::Exact, diagnostic)? {
            Verdict::Accepted(id) => return Ok((id, Some(BooleanSolver::Exact))),
            Verdict::Rejected(id) => {
                scene.remove(id);
            }
        }
        warn!(op = %pass.op, part = pass.part, "falling back to approximate solver");
        match self.attempt(kernel, scene, pass, BooleanSolver::Approximate, diagnostic)? {
            Verdict::Accepted(id) => Ok((id, Some(BooleanSolver::Approximate))),
            Verdict::Rejected(id) => {
                let leftover = scene.demote(id)?;
                error!(op = %pass.op, part = pass.part, leftover = %leftover, "both solvers failed");
                diagnostic.push(format!(
                    "{} for '{}' failed on both solvers; result left as '{leftover}'",
                    pass.op, pass.part
                ));
                Ok((id, None))
            }
        }
    }

    /// Runs one solver on a fresh copy of the source and validates it.
    fn attempt<K: GeometryKernel + ?Sized>(
        &self,
        kernel: &K,
        scene: &mut SceneStore,
        pass: &Pass<'_>,
        tier: BooleanSolver,
        diagnostic: &mut Vec<String>,
    ) -> Result<Verdict, CutError> {
        let input = scene.world_mesh(pass.source)?;
        let (mesh, check) = match kernel.boolean(&input, pass.tool, pass.op, tier) {
            Ok(mesh) => {
                let check = pass.reference.check(&mesh, pass.part, pass.op);
                (mesh, check)
            }
            Err(e) => (Mesh::new(), Err(CutError::Kernel(e))),
        };

        let attempt = scene.duplicate(pass.source)?;
        let solid = scene.get_mut(attempt)?;
        solid.mesh = mesh;
        solid.transform = Transform::identity();
        solid.modifiers.clear();

        if let Err(e) = check {
            warn!(op = %pass.op, %tier, part = pass.part, error = %e, "boolean result rejected");
            diagnostic.push(format!("{tier} solver rejected: {e}"));
            return Ok(Verdict::Rejected(attempt));
        }

        self.post_process(kernel, solid)?;
        let solid = scene.get(attempt)?;
        debug!(
            part = pass.part,
            name = solid.name(),
            vertices = solid.mesh.vertex_count(),
            dimensions = ?solid.mesh.dimensions(),
            "part post-processed"
        );
        info!(op = %pass.op, %tier, part = pass.part, "boolean solved");
        diagnostic.push(format!("{} for '{}' solved by {tier} solver", pass.op, pass.part));
        Ok(Verdict::Accepted(attempt))
    }

    fn post_process<K: GeometryKernel + ?Sized>(
        &self,
        kernel: &K,
        solid: &mut SolidData,
    ) -> Result<(), CutError> {
        kernel.triangulate(&mut solid.mesh)?;
        kernel.merge_by_distance(&mut solid.mesh, self.heal.post_merge_distance)?;
        kernel.recalculate_normals(&mut solid.mesh)?;
        solid.origin_to_geometry();
        Ok(())
    }
}
