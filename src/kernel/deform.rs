use crate::error::KernelError;
use crate::math::{Vector3, TOLERANCE};
use crate::mesh::{directed_edges, edge_face_counts, edge_key, Mesh};

use super::noise::NoiseField;

/// Area-weighted vertex normals (zero for vertices on no face).
#[must_use]
pub fn vertex_normals(mesh: &Mesh) -> Vec<Vector3> {
    let mut normals = vec![Vector3::zeros(); mesh.vertices.len()];
    for face in &mesh.faces {
        let n = mesh.face_normal(face);
        for &i in face {
            normals[i as usize] += n;
        }
    }
    for n in &mut normals {
        if n.norm() > TOLERANCE {
            n.normalize_mut();
        }
    }
    normals
}

/// Pushes each vertex along its normal by `(noise - 0.5) * strength`.
pub fn displace(mesh: &mut Mesh, noise: &NoiseField, strength: f64) {
    let normals = vertex_normals(mesh);
    for (v, n) in mesh.vertices.iter_mut().zip(&normals) {
        let amount = (noise.sample(v) - 0.5) * strength;
        *v += n * amount;
    }
}

/// Thickens a surface into a closed shell along its mean normal.
///
/// The original surface is copied into two layers at `thickness * (offset - 1) / 2`
/// and `thickness * (offset + 1) / 2` along the area-weighted mean normal, so
/// `offset = 1` grows the shell entirely on the normal side and `-1` entirely
/// on the back side. Boundary edges are bridged with rim quads. The outer
/// layer keeps the original winding and the inner layer is reversed.
///
/// # Errors
///
/// Returns [`KernelError::InvalidInput`] for a non-positive thickness or an
/// offset outside `[-1, 1]`, and [`KernelError::Degenerate`] if the surface
/// has no defined normal.
#[allow(clippy::cast_possible_truncation)]
pub fn solidify(mesh: &mut Mesh, thickness: f64, offset: f64) -> Result<(), KernelError> {
    if thickness <= 0.0 || !thickness.is_finite() {
        return Err(KernelError::InvalidInput(format!(
            "solidify thickness must be positive, got {thickness}"
        )));
    }
    if !(-1.0..=1.0).contains(&offset) {
        return Err(KernelError::InvalidInput(format!(
            "solidify offset must lie in [-1, 1], got {offset}"
        )));
    }
    if mesh.is_empty() {
        return Err(KernelError::Degenerate("cannot solidify an empty mesh".into()));
    }

    let normal_sum: Vector3 = mesh.faces.iter().map(|f| mesh.face_normal(f)).sum();
    if normal_sum.norm() < TOLERANCE {
        return Err(KernelError::Degenerate(
            "surface has no mean normal to solidify along".into(),
        ));
    }
    let normal = normal_sum.normalize();
    let outer_shift = normal * (thickness * (offset + 1.0) / 2.0);
    let inner_shift = normal * (thickness * (offset - 1.0) / 2.0);

    let n = mesh.vertices.len() as u32;
    let counts = edge_face_counts(&mesh.faces);
    let mut rims = Vec::new();
    for face in &mesh.faces {
        for (a, b) in directed_edges(face) {
            if counts.get(&edge_key(a, b)) == Some(&1) {
                rims.push(vec![b, a, a + n, b + n]);
            }
        }
    }

    let inner: Vec<_> = mesh.vertices.iter().map(|v| v + inner_shift).collect();
    for v in &mut mesh.vertices {
        *v += outer_shift;
    }
    mesh.vertices.extend(inner);

    let back: Vec<Vec<u32>> = mesh
        .faces
        .iter()
        .map(|f| f.iter().rev().map(|&i| i + n).collect())
        .collect();
    mesh.faces.extend(back);
    mesh.faces.extend(rims);
    Ok(())
}
