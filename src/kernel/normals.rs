use std::collections::{HashMap, VecDeque};

use crate::math::Vector3;
use crate::mesh::{directed_edges, edge_key, EdgeKey, Mesh};

/// Makes face winding consistent and outward-facing.
///
/// Each edge-connected component is made consistent by walking from a seed
/// face and flipping neighbours that traverse a shared edge in the same
/// direction. A closed component whose enclosed volume then comes out
/// negative is flipped as a whole; open components keep the orientation of
/// their seed face. Non-manifold edges do not propagate orientation.
///
/// Returns the number of faces flipped.
pub fn recalculate_normals(mesh: &mut Mesh) -> usize {
    let mut edge_faces: HashMap<EdgeKey, Vec<usize>> = HashMap::new();
    for (fi, face) in mesh.faces.iter().enumerate() {
        for (a, b) in directed_edges(face) {
            edge_faces.entry(edge_key(a, b)).or_default().push(fi);
        }
    }

    let mut flipped = vec![false; mesh.faces.len()];
    let mut visited = vec![false; mesh.faces.len()];
    for seed in 0..mesh.faces.len() {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        let mut component = vec![seed];
        let mut closed = true;
        let mut queue = VecDeque::from([seed]);
        while let Some(fi) = queue.pop_front() {
            let edges: Vec<(u32, u32)> = directed_edges(&mesh.faces[fi]).collect();
            for (a, b) in edges {
                let Some(neighbours) = edge_faces.get(&edge_key(a, b)) else {
                    continue;
                };
                if neighbours.len() != 2 {
                    closed = false;
                    continue;
                }
                let Some(&other) = neighbours.iter().find(|&&g| g != fi) else {
                    continue;
                };
                if visited[other] {
                    continue;
                }
                visited[other] = true;
                if traverses(&mesh.faces[other], a, b) {
                    mesh.faces[other].reverse();
                    flipped[other] = !flipped[other];
                }
                component.push(other);
                queue.push_back(other);
            }
        }

        if closed && component_volume(mesh, &component) < 0.0 {
            for &fi in &component {
                mesh.faces[fi].reverse();
                flipped[fi] = !flipped[fi];
            }
        }
    }
    flipped.iter().filter(|&&f| f).count()
}

/// Returns `true` if the face walks the directed edge `a -> b`.
fn traverses(face: &[u32], a: u32, b: u32) -> bool {
    directed_edges(face).any(|e| e == (a, b))
}

fn component_volume(mesh: &Mesh, faces: &[usize]) -> f64 {
    let Some(first) = faces.first().and_then(|&f| mesh.faces[f].first()) else {
        return 0.0;
    };
    let reference = mesh.vertices[*first as usize];
    let mut volume = 0.0;
    for &fi in faces {
        let face = &mesh.faces[fi];
        if face.len() < 3 {
            continue;
        }
        let a: Vector3 = mesh.vertices[face[0] as usize] - reference;
        for k in 1..face.len() - 1 {
            let b = mesh.vertices[face[k] as usize] - reference;
            let c = mesh.vertices[face[k + 1] as usize] - reference;
            volume += a.dot(&b.cross(&c));
        }
    }
    volume / 6.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Point3;

    #[test]
    fn consistent_outward_cube_is_untouched() {
        let mut mesh = Mesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(recalculate_normals(&mut mesh), 0);
    }

    #[test]
    fn single_flipped_face_is_repaired() {
        let mut mesh = Mesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        mesh.faces[3].reverse();
        assert_eq!(recalculate_normals(&mut mesh), 1);
        assert!((mesh.signed_volume() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn inside_out_mesh_is_turned_outward() {
        let mut mesh = Mesh::cuboid(Point3::origin(), Point3::new(2.0, 1.0, 1.0));
        mesh.flip();
        assert_eq!(recalculate_normals(&mut mesh), 6);
        assert!((mesh.signed_volume() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn components_are_oriented_independently() {
        let mut a = Mesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let mut b = Mesh::cuboid(Point3::new(3.0, 0.0, 0.0), Point3::new(4.0, 1.0, 1.0));
        b.flip();
        a.append(&b);
        recalculate_normals(&mut a);
        assert!((a.signed_volume() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn open_patch_keeps_seed_orientation() {
        let mut mesh = Mesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        mesh.faces.truncate(5);
        mesh.flip();
        assert_eq!(recalculate_normals(&mut mesh), 0);
    }
}
