use std::collections::HashMap;

use crate::error::KernelError;
use crate::math::{Point3, Vector3};
use crate::mesh::{directed_edges, edge_key, EdgeKey, Mesh};

use super::repair::merge_by_distance;

/// Relative distance used to join coincident vertices along shared edges.
const SEAM_WELD: f64 = 1e-9;

/// Cuts every edge `cuts` times and fills each face with the resulting grid.
///
/// Quads become `(cuts + 1)^2` quads laid out bilinearly; triangles become
/// `(cuts + 1)^2` triangles.
///
/// # Errors
///
/// Returns [`KernelError::InvalidInput`] for faces with more than four sides.
#[allow(clippy::cast_possible_truncation)]
pub fn subdivide(mesh: &mut Mesh, cuts: u32) -> Result<(), KernelError> {
    if cuts == 0 || mesh.is_empty() {
        return Ok(());
    }
    let n = cuts as usize + 1;
    let mut out = Mesh::new();
    for face in &mesh.faces {
        let corners: Vec<Point3> = face.iter().map(|&i| mesh.vertices[i as usize]).collect();
        match corners.as_slice() {
            [a, b, c] => grid_triangle(&mut out, [a, b, c], n),
            [a, b, c, d] => grid_quad(&mut out, [a, b, c, d], n),
            _ => {
                return Err(KernelError::InvalidInput(format!(
                    "cannot grid-subdivide a {}-sided face",
                    face.len()
                )))
            }
        }
    }
    let diagonal = mesh.bounding_box().map_or(1.0, |b| b.diagonal().max(1.0));
    merge_by_distance(&mut out, diagonal * SEAM_WELD);
    *mesh = out;
    Ok(())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn grid_quad(out: &mut Mesh, [a, b, c, d]: [&Point3; 4], n: usize) {
    let base = out.vertices.len() as u32;
    let stride = n as u32 + 1;
    for j in 0..=n {
        let v = j as f64 / n as f64;
        for i in 0..=n {
            let u = i as f64 / n as f64;
            let p = a.coords * ((1.0 - u) * (1.0 - v))
                + b.coords * (u * (1.0 - v))
                + c.coords * (u * v)
                + d.coords * ((1.0 - u) * v);
            out.vertices.push(Point3::from(p));
        }
    }
    for j in 0..n as u32 {
        for i in 0..n as u32 {
            let k = base + j * stride + i;
            out.faces.push(vec![k, k + 1, k + 1 + stride, k + stride]);
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn grid_triangle(out: &mut Mesh, [a, b, c]: [&Point3; 3], n: usize) {
    let mut index: HashMap<(usize, usize), u32> = HashMap::new();
    for j in 0..=n {
        for i in 0..=n - j {
            let (u, v) = (i as f64 / n as f64, j as f64 / n as f64);
            let p = a + (b - a) * u + (c - a) * v;
            index.insert((i, j), out.vertices.len() as u32);
            out.vertices.push(p);
        }
    }
    let at = |i: usize, j: usize| index[&(i, j)];
    for j in 0..n {
        for i in 0..n - j {
            out.faces.push(vec![at(i, j), at(i + 1, j), at(i, j + 1)]);
            if i + j + 2 <= n {
                out.faces.push(vec![at(i + 1, j), at(i + 1, j + 1), at(i, j + 1)]);
            }
        }
    }
}

/// Simple (non-smoothing) subdivision surface, applied `levels` times.
///
/// Every n-gon is split into n quads through its centroid and the midpoints
/// of its edges. Vertex positions on the original surface are kept.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn subdivide_simple(mesh: &mut Mesh, levels: u32) {
    for _ in 0..levels {
        let mut vertices = mesh.vertices.clone();
        let mut midpoints: HashMap<EdgeKey, u32> = HashMap::new();
        let mut faces = Vec::with_capacity(mesh.faces.len() * 4);

        for face in &mesh.faces {
            if face.len() < 3 {
                continue;
            }
            let mids: Vec<u32> = directed_edges(face)
                .map(|(a, b)| {
                    *midpoints.entry(edge_key(a, b)).or_insert_with(|| {
                        let (pa, pb) = (&mesh.vertices[a as usize], &mesh.vertices[b as usize]);
                        vertices.push(nalgebra::center(pa, pb));
                        vertices.len() as u32 - 1
                    })
                })
                .collect();
            let centroid = face
                .iter()
                .fold(Vector3::zeros(), |acc, &i| acc + mesh.vertices[i as usize].coords)
                / face.len() as f64;
            let center = vertices.len() as u32;
            vertices.push(Point3::from(centroid));

            let k = face.len();
            for i in 0..k {
                let prev = mids[(i + k - 1) % k];
                faces.push(vec![face[i], mids[i], center, prev]);
            }
        }
        mesh.vertices = vertices;
        mesh.faces = faces;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn plane_grid_has_expected_counts() {
        let mut mesh = Mesh::plane(10.0);
        subdivide(&mut mesh, 3).unwrap();
        assert_eq!(mesh.face_count(), 16);
        assert_eq!(mesh.vertex_count(), 25);
        assert_eq!(mesh.boundary_edge_count(), 16);
        for face in &mesh.faces {
            assert!(mesh.face_normal(face).z > 0.0);
        }
    }

    #[test]
    fn cube_grid_stays_closed() {
        let mut mesh = Mesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        subdivide(&mut mesh, 2).unwrap();
        assert_eq!(mesh.face_count(), 54);
        assert!(mesh.is_closed());
        assert!((mesh.signed_volume() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn triangle_grid_tiles_face() {
        let mut mesh = Mesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![vec![0, 1, 2]],
        );
        subdivide(&mut mesh, 2).unwrap();
        assert_eq!(mesh.face_count(), 9);
        assert_eq!(mesh.vertex_count(), 10);
        let area: f64 = mesh.faces.iter().map(|f| mesh.face_normal(f).norm() / 2.0).sum();
        assert!((area - 0.5).abs() < 1e-12);
    }

    #[test]
    fn ngons_are_rejected() {
        let mut mesh = Mesh::from_parts(
            (0..5).map(|k| Point3::new(f64::from(k), f64::from(k * k), 0.0)).collect(),
            vec![vec![0, 1, 2, 3, 4]],
        );
        assert!(matches!(
            subdivide(&mut mesh, 1),
            Err(KernelError::InvalidInput(_))
        ));
    }

    #[test]
    fn simple_level_quadruples_quads() {
        let mut mesh = Mesh::plane(2.0);
        subdivide_simple(&mut mesh, 2);
        assert_eq!(mesh.face_count(), 16);
        assert_eq!(mesh.vertex_count(), 25);
        assert_eq!(mesh.boundary_edge_count(), 16);
    }

    #[test]
    fn simple_subdivision_keeps_cube_closed() {
        let mut mesh = Mesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        subdivide_simple(&mut mesh, 1);
        assert_eq!(mesh.face_count(), 24);
        assert_eq!(mesh.vertex_count(), 26);
        assert!(mesh.is_closed());
        assert!((mesh.signed_volume() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn simple_subdivision_turns_triangle_into_quads() {
        let mut mesh = Mesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![vec![0, 1, 2]],
        );
        subdivide_simple(&mut mesh, 1);
        assert_eq!(mesh.face_count(), 3);
        assert!(mesh.faces.iter().all(|f| f.len() == 4));
    }
}
