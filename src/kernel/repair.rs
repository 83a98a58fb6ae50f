use std::collections::HashMap;

use tracing::debug;

use crate::math::Point3;
use crate::mesh::Mesh;

/// Merges vertices closer than `distance` and drops faces collapsed by the
/// merge. Returns the number of vertices removed.
///
/// Uses a spatial hash with cells of twice the merge distance, so only the
/// 27 neighbouring cells are searched per vertex.
#[allow(clippy::cast_possible_truncation)]
pub fn merge_by_distance(mesh: &mut Mesh, distance: f64) -> usize {
    let original = mesh.vertices.len();
    if original == 0 || distance <= 0.0 {
        return 0;
    }

    let cell_size = distance * 2.0;
    let mut grid: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
    for (idx, v) in mesh.vertices.iter().enumerate() {
        grid.entry(cell_of(v, cell_size)).or_default().push(idx as u32);
    }

    let mut remap: Vec<u32> = (0..original as u32).collect();
    let mut merged = 0usize;
    for (idx, v) in mesh.vertices.iter().enumerate() {
        let idx = idx as u32;
        if remap[idx as usize] != idx {
            continue;
        }
        let (cx, cy, cz) = cell_of(v, cell_size);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(candidates) = grid.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &other in candidates {
                        if other <= idx || remap[other as usize] != other {
                            continue;
                        }
                        if (mesh.vertices[other as usize] - v).norm() < distance {
                            remap[other as usize] = idx;
                            merged += 1;
                        }
                    }
                }
            }
        }
    }

    if merged == 0 {
        return 0;
    }

    for face in &mut mesh.faces {
        for i in face.iter_mut() {
            *i = remap[*i as usize];
        }
    }
    let collapsed = mesh.remove_degenerate_faces();
    let removed = mesh.remove_unreferenced_vertices();
    debug!(merged, collapsed, removed, "merged vertices by distance");
    removed
}

/// Deletes geometry not part of any face: degenerate faces and the vertices
/// nothing references. Returns the number of elements removed.
pub fn remove_loose(mesh: &mut Mesh) -> usize {
    let faces = mesh.remove_degenerate_faces();
    let vertices = mesh.remove_unreferenced_vertices();
    if faces + vertices > 0 {
        debug!(faces, vertices, "removed loose geometry");
    }
    faces + vertices
}

#[allow(clippy::cast_possible_truncation)]
fn cell_of(p: &Point3, cell_size: f64) -> (i64, i64, i64) {
    (
        (p.x / cell_size).floor() as i64,
        (p.y / cell_size).floor() as i64,
        (p.z / cell_size).floor() as i64,
    )
}
