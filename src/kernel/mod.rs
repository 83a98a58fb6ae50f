//! Geometry capabilities the cut pipeline consumes.
//!
//! The pipeline only talks to [`GeometryKernel`]. [`MeshKernel`] is the
//! in-process implementation over [`Mesh`]: grid and simple subdivision,
//! noise displacement, solidify, repair passes, and BSP booleans.

mod bsp;
mod deform;
mod grid;
mod holes;
mod noise;
mod normals;
mod repair;
mod triangulate;

pub use deform::vertex_normals;
pub use holes::{boundary_loops, BoundaryLoop};
pub use noise::NoiseField;

use std::fmt;

use tracing::debug;

use crate::error::KernelError;
use crate::mesh::Mesh;
use crate::scene::{Modifier, SolidData};

/// Boolean set operation between a target and a tool solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    /// Target minus tool.
    Difference,
    /// Volume common to target and tool.
    Intersection,
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Difference => f.write_str("difference"),
            Self::Intersection => f.write_str("intersection"),
        }
    }
}

/// Boolean solver tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanSolver {
    /// Precise, but may return an empty or unchanged result on bad input.
    Exact,
    /// Tolerant of dirty geometry, less precise.
    Approximate,
}

impl fmt::Display for BooleanSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => f.write_str("exact"),
            Self::Approximate => f.write_str("approximate"),
        }
    }
}

/// Mesh-level geometry primitives.
///
/// Implementations mutate meshes in place. Object bookkeeping (naming,
/// duplication, deletion, origins) is the scene store's job, not the
/// kernel's.
pub trait GeometryKernel {
    /// Creates the square seed surface of the given edge length, normal +Z.
    ///
    /// # Errors
    ///
    /// Fails for a non-positive size.
    fn seed_plane(&self, size: f64) -> Result<Mesh, KernelError>;

    /// Cuts every edge `cuts` times and fills faces with the grid.
    ///
    /// # Errors
    ///
    /// Fails on faces the kernel cannot grid.
    fn subdivide(&self, mesh: &mut Mesh, cuts: u32) -> Result<(), KernelError>;

    /// Simple subdivision surface of `levels` levels.
    ///
    /// # Errors
    ///
    /// Kernel-specific.
    fn subdivide_simple(&self, mesh: &mut Mesh, levels: u32) -> Result<(), KernelError>;

    /// Displaces vertices along their normals by `(noise - 0.5) * strength`.
    ///
    /// # Errors
    ///
    /// Kernel-specific.
    fn displace(&self, mesh: &mut Mesh, noise: &NoiseField, strength: f64)
        -> Result<(), KernelError>;

    /// Thickens a surface into a closed shell.
    ///
    /// # Errors
    ///
    /// Fails for bad parameters or a surface without a normal.
    fn solidify(&self, mesh: &mut Mesh, thickness: f64, offset: f64) -> Result<(), KernelError>;

    /// Splits every face into triangles.
    ///
    /// # Errors
    ///
    /// Kernel-specific.
    fn triangulate(&self, mesh: &mut Mesh) -> Result<(), KernelError>;

    /// Makes winding consistent and outward.
    ///
    /// # Errors
    ///
    /// Kernel-specific.
    fn recalculate_normals(&self, mesh: &mut Mesh) -> Result<(), KernelError>;

    /// Welds vertices closer than `distance`; returns vertices removed.
    ///
    /// # Errors
    ///
    /// Kernel-specific.
    fn merge_by_distance(&self, mesh: &mut Mesh, distance: f64) -> Result<usize, KernelError>;

    /// Deletes geometry not part of any face; returns elements removed.
    ///
    /// # Errors
    ///
    /// Kernel-specific.
    fn remove_loose(&self, mesh: &mut Mesh) -> Result<usize, KernelError>;

    /// Caps boundary loops of up to `max_sides` edges; returns holes filled.
    ///
    /// # Errors
    ///
    /// Kernel-specific.
    fn fill_holes(&self, mesh: &mut Mesh, max_sides: usize) -> Result<usize, KernelError>;

    /// Computes `target op tool`. Both meshes are in the same (world) frame.
    ///
    /// A solver may "succeed" with an empty or unchanged mesh; callers are
    /// expected to validate the result.
    ///
    /// # Errors
    ///
    /// Fails if the solver rejects its input outright.
    fn boolean(
        &self,
        target: &Mesh,
        tool: &Mesh,
        op: BooleanOp,
        solver: BooleanSolver,
    ) -> Result<Mesh, KernelError>;

    /// Bakes one modifier into a mesh.
    ///
    /// # Errors
    ///
    /// Propagates the primitive's error.
    fn apply_modifier(&self, mesh: &mut Mesh, modifier: &Modifier) -> Result<(), KernelError> {
        match modifier {
            Modifier::Subdivide { levels } => self.subdivide_simple(mesh, *levels),
            Modifier::Displace { noise, strength } => self.displace(mesh, noise, *strength),
            Modifier::Solidify { thickness, offset } => self.solidify(mesh, *thickness, *offset),
            Modifier::Triangulate => self.triangulate(mesh),
        }
    }

    /// Bakes a solid's pending modifiers in stack order and clears the stack.
    /// Returns the number of modifiers applied.
    ///
    /// # Errors
    ///
    /// Stops at the first failing modifier; the stack is cleared regardless.
    fn bake_modifiers(&self, solid: &mut SolidData) -> Result<usize, KernelError> {
        let modifiers = std::mem::take(&mut solid.modifiers);
        for modifier in &modifiers {
            self.apply_modifier(&mut solid.mesh, modifier)?;
            debug!(
                solid = solid.name(),
                modifier = modifier.label(),
                vertices = solid.mesh.vertex_count(),
                "baked modifier"
            );
        }
        Ok(modifiers.len())
    }
}

/// Plane and weld tolerances of [`MeshKernel`]'s boolean solvers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BooleanTolerances {
    /// Plane-side epsilon of the exact solver.
    pub exact_epsilon: f64,
    /// Plane-side epsilon of the approximate solver.
    pub approximate_epsilon: f64,
    /// Distance at which the approximate solver welds its inputs and output.
    pub approximate_weld: f64,
}

impl Default for BooleanTolerances {
    fn default() -> Self {
        Self {
            exact_epsilon: 1e-7,
            approximate_epsilon: 1e-5,
            approximate_weld: 1e-4,
        }
    }
}

/// In-process reference kernel over indexed polygon meshes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshKernel {
    tolerances: BooleanTolerances,
}

impl MeshKernel {
    /// Creates a kernel with default tolerances.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the boolean tolerances.
    #[must_use]
    pub fn with_tolerances(mut self, tolerances: BooleanTolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    /// Current boolean tolerances.
    #[must_use]
    pub fn tolerances(&self) -> &BooleanTolerances {
        &self.tolerances
    }
}

impl GeometryKernel for MeshKernel {
    fn seed_plane(&self, size: f64) -> Result<Mesh, KernelError> {
        if size <= 0.0 || !size.is_finite() {
            return Err(KernelError::InvalidInput(format!(
                "seed plane size must be positive, got {size}"
            )));
        }
        Ok(Mesh::plane(size))
    }

    fn subdivide(&self, mesh: &mut Mesh, cuts: u32) -> Result<(), KernelError> {
        grid::subdivide(mesh, cuts)
    }

    fn subdivide_simple(&self, mesh: &mut Mesh, levels: u32) -> Result<(), KernelError> {
        grid::subdivide_simple(mesh, levels);
        Ok(())
    }

    fn displace(
        &self,
        mesh: &mut Mesh,
        noise: &NoiseField,
        strength: f64,
    ) -> Result<(), KernelError> {
        deform::displace(mesh, noise, strength);
        Ok(())
    }

    fn solidify(&self, mesh: &mut Mesh, thickness: f64, offset: f64) -> Result<(), KernelError> {
        deform::solidify(mesh, thickness, offset)
    }

    fn triangulate(&self, mesh: &mut Mesh) -> Result<(), KernelError> {
        triangulate::triangulate(mesh);
        Ok(())
    }

    fn recalculate_normals(&self, mesh: &mut Mesh) -> Result<(), KernelError> {
        let flipped = normals::recalculate_normals(mesh);
        if flipped > 0 {
            debug!(flipped, "reoriented faces");
        }
        Ok(())
    }

    fn merge_by_distance(&self, mesh: &mut Mesh, distance: f64) -> Result<usize, KernelError> {
        Ok(repair::merge_by_distance(mesh, distance))
    }

    fn remove_loose(&self, mesh: &mut Mesh) -> Result<usize, KernelError> {
        Ok(repair::remove_loose(mesh))
    }

    fn fill_holes(&self, mesh: &mut Mesh, max_sides: usize) -> Result<usize, KernelError> {
        Ok(holes::fill_holes(mesh, max_sides))
    }

    fn boolean(
        &self,
        target: &Mesh,
        tool: &Mesh,
        op: BooleanOp,
        solver: BooleanSolver,
    ) -> Result<Mesh, KernelError> {
        if target.is_empty() {
            return Err(KernelError::InvalidInput("boolean target has no geometry".into()));
        }
        if tool.is_empty() {
            return Err(KernelError::InvalidInput("boolean tool has no geometry".into()));
        }

        let mut target = target.clone();
        let mut tool = tool.clone();
        triangulate::triangulate(&mut target);
        triangulate::triangulate(&mut tool);

        let (epsilon, weld) = match solver {
            BooleanSolver::Exact => {
                for (role, mesh) in [("target", &target), ("tool", &tool)] {
                    let bad = mesh.non_manifold_edge_count();
                    if bad > 0 {
                        return Err(KernelError::NonManifoldInput(format!(
                            "{role} has {bad} edges shared by more than two faces"
                        )));
                    }
                }
                (self.tolerances.exact_epsilon, self.tolerances.exact_epsilon * 10.0)
            }
            BooleanSolver::Approximate => {
                let weld = self.tolerances.approximate_weld;
                repair::merge_by_distance(&mut target, weld);
                repair::merge_by_distance(&mut tool, weld);
                repair::remove_loose(&mut target);
                repair::remove_loose(&mut tool);
                (self.tolerances.approximate_epsilon, weld)
            }
        };

        let overlap = match (target.bounding_box(), tool.bounding_box()) {
            (Some(a), Some(b)) => a.overlaps(&b),
            _ => false,
        };
        if !overlap {
            debug!(%op, %solver, "boolean operands do not overlap");
            return Ok(match op {
                BooleanOp::Difference => target,
                BooleanOp::Intersection => Mesh::new(),
            });
        }

        let polygons = match op {
            BooleanOp::Difference => bsp::difference(&target, &tool, epsilon),
            BooleanOp::Intersection => bsp::intersection(&target, &tool, epsilon),
        };
        let mut result = bsp::mesh_of(&polygons);
        repair::merge_by_distance(&mut result, weld);
        repair::remove_loose(&mut result);
        debug!(
            %op,
            %solver,
            vertices = result.vertex_count(),
            faces = result.face_count(),
            "boolean solved"
        );
        Ok(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;

    fn cube(min: [f64; 3], max: [f64; 3]) -> Mesh {
        Mesh::cuboid(
            Point3::new(min[0], min[1], min[2]),
            Point3::new(max[0], max[1], max[2]),
        )
    }

    #[test]
    fn exact_boolean_splits_cube() {
        let kernel = MeshKernel::new();
        let target = cube([0.0, 0.0, 0.0], [4.0, 2.0, 2.0]);
        let tool = cube([2.0, -1.0, -1.0], [6.0, 3.0, 3.0]);
        let a = kernel
            .boolean(&target, &tool, BooleanOp::Difference, BooleanSolver::Exact)
            .unwrap();
        let b = kernel
            .boolean(&target, &tool, BooleanOp::Intersection, BooleanSolver::Exact)
            .unwrap();
        assert!((a.signed_volume() - 8.0).abs() < 1e-9);
        assert!((b.signed_volume() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn exact_rejects_non_manifold_input() {
        let kernel = MeshKernel::new();
        let mut target = cube([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        target.faces.push(vec![0, 1, 6]);
        let tool = cube([0.5, 0.0, 0.0], [2.0, 1.0, 1.0]);
        assert!(matches!(
            kernel.boolean(&target, &tool, BooleanOp::Difference, BooleanSolver::Exact),
            Err(KernelError::NonManifoldInput(_))
        ));
        assert!(kernel
            .boolean(&target, &tool, BooleanOp::Difference, BooleanSolver::Approximate)
            .is_ok());
    }

    #[test]
    fn disjoint_operands_short_circuit() {
        let kernel = MeshKernel::new();
        let target = cube([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let tool = cube([3.0, 3.0, 3.0], [4.0, 4.0, 4.0]);
        let a = kernel
            .boolean(&target, &tool, BooleanOp::Difference, BooleanSolver::Exact)
            .unwrap();
        let b = kernel
            .boolean(&target, &tool, BooleanOp::Intersection, BooleanSolver::Exact)
            .unwrap();
        assert_eq!(a.vertex_count(), 8);
        assert!(b.is_empty());
    }

    #[test]
    fn empty_operand_is_invalid() {
        let kernel = MeshKernel::new();
        let target = cube([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        assert!(matches!(
            kernel.boolean(&target, &Mesh::new(), BooleanOp::Intersection, BooleanSolver::Exact),
            Err(KernelError::InvalidInput(_))
        ));
    }

    #[test]
    fn modifier_stack_bakes_in_order() {
        let kernel = MeshKernel::new();
        let mut solid = SolidData::new("Tool", kernel.seed_plane(10.0).unwrap());
        solid.modifiers = vec![
            Modifier::Subdivide { levels: 1 },
            Modifier::Displace {
                noise: NoiseField::new(Some(5), 5.0, 1),
                strength: 0.5,
            },
            Modifier::Solidify {
                thickness: 4.0,
                offset: 1.0,
            },
            Modifier::Triangulate,
        ];
        assert_eq!(kernel.bake_modifiers(&mut solid).unwrap(), 4);
        assert!(solid.modifiers.is_empty());
        assert!(solid.mesh.is_triangulated());
        assert!(solid.mesh.is_closed());
        assert!(solid.mesh.signed_volume() > 0.0);
    }

    #[test]
    fn seed_plane_rejects_bad_size() {
        assert!(MeshKernel::new().seed_plane(0.0).is_err());
    }
}
