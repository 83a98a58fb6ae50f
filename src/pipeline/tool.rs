use tracing::{debug, info, warn};

use crate::error::CutError;
use crate::kernel::{GeometryKernel, NoiseField};
use crate::math::{degrees_to_radians, euler_xyz, Vector3};
use crate::operations::query::IsValid;
use crate::operations::transform::ApplyTransform;
use crate::scene::{Modifier, SceneStore, SolidData, SolidId, Transform};

use super::config::{NamingParams, ToolParams};

/// Edge length of the unscaled seed primitive.
const SEED_PRIMITIVE_SIZE: f64 = 2.0;

/// A synthesized cutting tool in the scene.
#[derive(Debug, Clone)]
pub struct CuttingTool {
    /// The tool solid.
    pub id: SolidId,
    /// World-space direction the shell grows towards when `offset = 1`.
    pub normal: Vector3,
    /// Edge length of the seed plane.
    pub plane_size: f64,
    /// Shell thickness.
    pub thickness: f64,
    /// Noise seed the texture was generated with.
    pub noise_seed: u64,
}

/// Builds the textured, closed cutting solid for one cut.
///
/// A seed plane is placed at the cut location, duplicated into the tool,
/// and the seed removed. The tool's scale is applied, then it is
/// grid-subdivided, smoothed, displaced by noise, solidified, reoriented,
/// and triangulated. The tool keeps its location and rotation on the
/// object; its mesh is in the rotated local frame.
pub struct SynthesizeTool<'a> {
    target: SolidId,
    location: Vector3,
    rotation_deg: [f64; 3],
    offset: f64,
    params: &'a ToolParams,
    naming: &'a NamingParams,
}

impl<'a> SynthesizeTool<'a> {
    /// Creates a new `SynthesizeTool` operation sized for `target`.
    #[must_use]
    pub fn new(
        target: SolidId,
        location: Vector3,
        rotation_deg: [f64; 3],
        offset: f64,
        params: &'a ToolParams,
        naming: &'a NamingParams,
    ) -> Self {
        Self {
            target,
            location,
            rotation_deg,
            offset,
            params,
            naming,
        }
    }

    /// Executes the synthesis. On failure nothing is left in the scene.
    ///
    /// # Errors
    ///
    /// Returns [`CutError::ToolSynthesisFailure`] if any step fails or the
    /// result is not a closed, manifold solid.
    pub fn execute<K: GeometryKernel + ?Sized>(
        &self,
        kernel: &K,
        scene: &mut SceneStore,
    ) -> Result<CuttingTool, CutError> {
        let bbox = scene
            .world_bounding_box(self.target)?
            .ok_or_else(|| CutError::ToolSynthesisFailure("target has no geometry".into()))?;

        let rotation = degrees_to_radians(self.rotation_deg);
        let normal = euler_xyz(&rotation) * Vector3::z();
        let plane_size = self.params.plane_size(bbox.diagonal());
        let thickness = self.params.shell_thickness(bbox.extent_along(&normal));
        debug!(
            plane_size,
            thickness,
            normal = ?normal,
            target_dimensions = ?bbox.dimensions(),
            "sizing cutting tool"
        );

        for reserved in [&self.naming.seed_name, &self.naming.tool_name] {
            if scene.remove_named(reserved).is_some() {
                warn!(name = %reserved, "removed stale object holding a reserved name");
            }
        }

        let seed_mesh = kernel
            .seed_plane(SEED_PRIMITIVE_SIZE)
            .map_err(|e| CutError::ToolSynthesisFailure(e.to_string()))?;
        let seed = scene.add(
            SolidData::new(self.naming.seed_name.clone(), seed_mesh).with_transform(Transform {
                location: self.location,
                rotation,
                scale: Vector3::repeat(plane_size / SEED_PRIMITIVE_SIZE),
            }),
        )?;
        let tool = scene.duplicate(seed);
        scene.remove(seed);
        let tool = tool?;

        match self.shape(kernel, scene, tool, thickness) {
            Ok(noise_seed) => {
                info!(
                    tool = %self.naming.tool_name,
                    vertices = scene.get(tool)?.mesh.vertex_count(),
                    "cutting tool ready"
                );
                Ok(CuttingTool {
                    id: tool,
                    normal,
                    plane_size,
                    thickness,
                    noise_seed,
                })
            }
            Err(e) => {
                scene.remove(tool);
                Err(e)
            }
        }
    }

    /// Turns the duplicated seed into the final tool; returns the noise seed.
    fn shape<K: GeometryKernel + ?Sized>(
        &self,
        kernel: &K,
        scene: &mut SceneStore,
        tool: SolidId,
        thickness: f64,
    ) -> Result<u64, CutError> {
        let fail = |e: &dyn std::fmt::Display| CutError::ToolSynthesisFailure(e.to_string());

        scene.rename(tool, &self.naming.tool_name)?;
        ApplyTransform::new(tool)
            .scale(true)
            .execute(scene)
            .map_err(|e| fail(&e))?;

        let noise = NoiseField::new(
            self.params.noise_seed,
            self.params.noise_scale,
            self.params.noise_depth,
        );
        let noise_seed = noise.seed();

        let solid = scene.get_mut(tool)?;
        kernel
            .subdivide(&mut solid.mesh, self.params.subdivision_cuts)
            .map_err(|e| fail(&e))?;
        solid.modifiers.extend([
            Modifier::Subdivide {
                levels: self.params.smoothing_levels,
            },
            Modifier::Displace {
                noise,
                strength: self.params.noise_strength,
            },
            Modifier::Solidify {
                thickness,
                offset: self.offset,
            },
        ]);
        kernel.bake_modifiers(solid).map_err(|e| fail(&e))?;
        kernel
            .recalculate_normals(&mut solid.mesh)
            .map_err(|e| fail(&e))?;
        solid.modifiers.push(Modifier::Triangulate);
        kernel.bake_modifiers(solid).map_err(|e| fail(&e))?;

        if !IsValid::new(tool).execute(scene) {
            let mesh = &scene.get(tool)?.mesh;
            return Err(CutError::ToolSynthesisFailure(format!(
                "tool is not a closed solid ({} open edges, {} non-manifold edges)",
                mesh.boundary_edge_count(),
                mesh.non_manifold_edge_count()
            )));
        }
        Ok(noise_seed)
    }
}
