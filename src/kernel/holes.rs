use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::{FixedFaceHandle, InnerTag};
use spade::{ConstrainedDelaunayTriangulation, Point2 as SpadePoint2, Triangulation};
use tracing::{debug, warn};

use crate::math::{Point3, Vector3, TOLERANCE};
use crate::mesh::{directed_edges, edge_face_counts, edge_key, newell_normal, Mesh};

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Closed loop of boundary vertices, in the direction the bordering faces
/// traverse them.
#[derive(Debug, Clone)]
pub struct BoundaryLoop {
    pub vertices: Vec<u32>,
}

/// Traces every closed boundary loop of the mesh.
///
/// Open chains (boundary runs that do not return to their start) are
/// skipped.
#[must_use]
pub fn boundary_loops(mesh: &Mesh) -> Vec<BoundaryLoop> {
    let counts = edge_face_counts(&mesh.faces);
    let mut outgoing: HashMap<u32, Vec<u32>> = HashMap::new();
    for face in &mesh.faces {
        for (a, b) in directed_edges(face) {
            if counts.get(&edge_key(a, b)) == Some(&1) {
                outgoing.entry(a).or_default().push(b);
            }
        }
    }

    let mut used: HashSet<(u32, u32)> = HashSet::new();
    let mut starts: Vec<(u32, u32)> = outgoing
        .iter()
        .flat_map(|(&a, targets)| targets.iter().map(move |&b| (a, b)))
        .collect();
    starts.sort_unstable();

    let mut loops = Vec::new();
    for (a, b) in starts {
        if used.contains(&(a, b)) {
            continue;
        }
        used.insert((a, b));
        let mut vertices = vec![a];
        let mut current = b;
        let mut closed = false;
        while vertices.len() <= outgoing.len() {
            if current == a {
                closed = true;
                break;
            }
            vertices.push(current);
            let next = outgoing
                .get(&current)
                .and_then(|targets| targets.iter().find(|&&t| !used.contains(&(current, t))));
            let Some(&next) = next else {
                break;
            };
            used.insert((current, next));
            current = next;
        }
        if closed && vertices.len() >= 3 {
            loops.push(BoundaryLoop { vertices });
        }
    }
    loops
}

/// Caps boundary loops of up to `max_sides` edges with triangles.
///
/// Each loop is projected onto its best-fit plane and filled with a
/// constrained Delaunay triangulation, so concave holes are capped
/// correctly. Loops with no enclosed area (slits left by T-junctions) and
/// loops that self-intersect in projection are left open. Returns the
/// number of holes filled.
pub fn fill_holes(mesh: &mut Mesh, max_sides: usize) -> usize {
    let mut filled = 0;
    for hole in boundary_loops(mesh) {
        if hole.vertices.len() > max_sides {
            debug!(sides = hole.vertices.len(), max_sides, "hole too large to fill");
            continue;
        }
        match cap_loop(&mesh.vertices, &hole.vertices) {
            Some(triangles) => {
                mesh.faces.extend(triangles);
                filled += 1;
            }
            None => debug!(sides = hole.vertices.len(), "left boundary loop open"),
        }
    }
    filled
}

/// Triangulates one loop; triangles wind opposite to the loop so they face
/// the same way as the surrounding surface.
fn cap_loop(vertices: &[Point3], hole: &[u32]) -> Option<Vec<Vec<u32>>> {
    let points: Vec<Point3> = hole.iter().map(|&i| vertices[i as usize]).collect();
    let loop_normal = newell_normal(&points);
    if loop_normal.norm() < TOLERANCE {
        return None;
    }
    let cap_normal = -loop_normal.normalize();
    if hole.len() == 3 {
        return Some(vec![vec![hole[2], hole[1], hole[0]]]);
    }

    let (u_dir, v_dir) = plane_basis(&cap_normal);
    let origin = points[0];
    let mut cdt = Cdt::new();
    let mut handle_to_vertex: HashMap<usize, u32> = HashMap::new();
    let mut handles = Vec::with_capacity(hole.len());
    for (p, &vi) in points.iter().zip(hole) {
        let d = p - origin;
        let h = match cdt.insert(SpadePoint2::new(d.dot(&u_dir), d.dot(&v_dir))) {
            Ok(h) => h,
            Err(e) => {
                warn!(error = %e, "hole vertex rejected by triangulator");
                return None;
            }
        };
        if handle_to_vertex.insert(h.index(), vi).is_some() {
            // Two loop vertices project onto the same point.
            return None;
        }
        handles.push(h);
    }
    for i in 0..handles.len() {
        let (from, to) = (handles[i], handles[(i + 1) % handles.len()]);
        if !cdt.can_add_constraint(from, to) {
            return None;
        }
        cdt.add_constraint(from, to);
    }

    let interior = classify_interior_faces(&cdt);
    let mut triangles = Vec::new();
    for face in cdt.inner_faces() {
        if !interior.contains(&face.fix().index()) {
            continue;
        }
        let mut tri = Vec::with_capacity(3);
        for vh in face.vertices() {
            tri.push(*handle_to_vertex.get(&vh.fix().index())?);
        }
        let n = newell_normal(tri.iter().map(|&i| &vertices[i as usize]));
        if n.dot(&cap_normal) < 0.0 {
            tri.reverse();
        }
        triangles.push(tri);
    }
    (!triangles.is_empty()).then_some(triangles)
}

/// Two orthonormal vectors spanning the plane perpendicular to `normal`.
fn plane_basis(normal: &Vector3) -> (Vector3, Vector3) {
    let helper = if normal.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = normal.cross(&helper).normalize();
    let v = normal.cross(&u);
    (u, v)
}

/// Flood-fills the triangulation from the outer face, counting constraint
/// crossings. Faces at odd depth are inside the loop.
fn classify_interior_faces(cdt: &Cdt) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_map: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();

    let outer_fix = cdt.outer_face().fix();
    for edge in cdt.directed_edges() {
        if edge.face().fix() != outer_fix {
            continue;
        }
        let Some(inner) = edge.rev().face().as_inner() else {
            continue;
        };
        let idx = inner.fix().index();
        if depth_map.contains_key(&idx) {
            continue;
        }
        let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
        depth_map.insert(idx, depth);
        if depth % 2 == 1 {
            interior.insert(idx);
        }
        queue.push_back((inner.fix(), depth));
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        for edge in cdt.face(face_fix).adjacent_edges() {
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let n_idx = neighbor.fix().index();
            if depth_map.contains_key(&n_idx) {
                continue;
            }
            let next = depth + u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(n_idx, next);
            if next % 2 == 1 {
                interior.insert(n_idx);
            }
            queue.push_back((neighbor.fix(), next));
        }
    }

    interior
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_box() -> Mesh {
        let mut mesh = Mesh::cuboid(Point3::origin(), Point3::new(2.0, 2.0, 2.0));
        mesh.faces.remove(1); // +Z cap
        mesh
    }

    #[test]
    fn open_box_has_one_square_loop() {
        let loops = boundary_loops(&open_box());
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].vertices.len(), 4);
    }

    #[test]
    fn closed_mesh_has_no_loops() {
        let mesh = Mesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        assert!(boundary_loops(&mesh).is_empty());
    }

    #[test]
    fn filling_closes_box_with_outward_cap() {
        let mut mesh = open_box();
        assert_eq!(fill_holes(&mut mesh, 64), 1);
        assert!(mesh.is_closed());
        assert!(mesh.signed_volume() > 7.99);
        for face in &mesh.faces[5..] {
            assert!(mesh.face_normal(face).z > 0.0);
        }
    }

    #[test]
    fn concave_hole_is_capped_inside_outline() {
        // L-shaped prism with its top removed.
        let outline = [
            (0.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 2.0),
            (0.0, 2.0),
        ];
        let n = outline.len() as u32;
        let mut vertices = Vec::new();
        for &(x, y) in &outline {
            vertices.push(Point3::new(x, y, 0.0));
        }
        for &(x, y) in &outline {
            vertices.push(Point3::new(x, y, 1.0));
        }
        let mut faces = vec![(0..n).rev().collect::<Vec<u32>>()];
        for i in 0..n {
            let j = (i + 1) % n;
            faces.push(vec![i, j, j + n, i + n]);
        }
        let mut mesh = Mesh::from_parts(vertices, faces);

        assert_eq!(fill_holes(&mut mesh, 64), 1);
        assert!(mesh.is_closed());
        assert!((mesh.signed_volume() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn loops_over_limit_stay_open() {
        let mut mesh = open_box();
        assert_eq!(fill_holes(&mut mesh, 3), 0);
        assert_eq!(mesh.boundary_edge_count(), 4);
    }

    #[test]
    fn zero_area_slit_is_skipped() {
        // Collinear sliver: its boundary loop encloses no area.
        let mut mesh = Mesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ],
            vec![vec![0, 1, 2]],
        );
        assert_eq!(boundary_loops(&mesh).len(), 1);
        assert_eq!(fill_holes(&mut mesh, 64), 0);
        assert_eq!(mesh.face_count(), 1);
    }
}
