mod aabb;
mod edges;

pub use aabb::Aabb;
pub use edges::{directed_edges, edge_face_counts, edge_key, EdgeKey};

use std::collections::HashMap;

use crate::math::{transform_point, Matrix4, Point3, Vector3, TOLERANCE};

/// An indexed polygon mesh.
///
/// Faces are vertex-index loops wound counter-clockwise when seen from
/// outside. Faces may have any number of vertices; boolean input is expected
/// to be triangulated first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Polygon vertex-index loops.
    pub faces: Vec<Vec<u32>>,
}

impl Mesh {
    /// Creates an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh from raw parts.
    #[must_use]
    pub fn from_parts(vertices: Vec<Point3>, faces: Vec<Vec<u32>>) -> Self {
        Self { vertices, faces }
    }

    /// Creates an axis-aligned box with outward-facing quads.
    #[must_use]
    pub fn cuboid(min: Point3, max: Point3) -> Self {
        let vertices = vec![
            Point3::new(min.x, min.y, min.z),
            Point3::new(max.x, min.y, min.z),
            Point3::new(max.x, max.y, min.z),
            Point3::new(min.x, max.y, min.z),
            Point3::new(min.x, min.y, max.z),
            Point3::new(max.x, min.y, max.z),
            Point3::new(max.x, max.y, max.z),
            Point3::new(min.x, max.y, max.z),
        ];
        let faces = vec![
            vec![0, 3, 2, 1], // -Z
            vec![4, 5, 6, 7], // +Z
            vec![0, 1, 5, 4], // -Y
            vec![2, 3, 7, 6], // +Y
            vec![0, 4, 7, 3], // -X
            vec![1, 2, 6, 5], // +X
        ];
        Self { vertices, faces }
    }

    /// Creates a square seed plane of the given edge length, centred on the
    /// origin in the local XY plane with its normal along +Z.
    #[must_use]
    pub fn plane(size: f64) -> Self {
        let h = size * 0.5;
        let vertices = vec![
            Point3::new(-h, -h, 0.0),
            Point3::new(h, -h, 0.0),
            Point3::new(h, h, 0.0),
            Point3::new(-h, h, 0.0),
        ];
        Self {
            vertices,
            faces: vec![vec![0, 1, 2, 3]],
        }
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns `true` if the mesh has no geometry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Returns `true` if every face is a triangle.
    #[must_use]
    pub fn is_triangulated(&self) -> bool {
        self.faces.iter().all(|f| f.len() == 3)
    }

    /// Axis-aligned bounding box of all vertices, or `None` for an empty mesh.
    #[must_use]
    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices)
    }

    /// Size of the bounding box along each axis (zero for an empty mesh).
    #[must_use]
    pub fn dimensions(&self) -> Vector3 {
        self.bounding_box()
            .map_or_else(Vector3::zeros, |b| b.dimensions())
    }

    /// Newell normal of a face (unnormalized; length is twice the face area).
    #[must_use]
    pub fn face_normal(&self, face: &[u32]) -> Vector3 {
        newell_normal(face.iter().map(|&i| &self.vertices[i as usize]))
    }

    /// Signed enclosed volume, positive when faces wind outward.
    ///
    /// Only meaningful for closed meshes.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let reference = self
            .bounding_box()
            .map_or_else(Point3::origin, |b| b.center());
        let mut volume = 0.0;
        for face in &self.faces {
            if face.len() < 3 {
                continue;
            }
            let a = self.vertices[face[0] as usize] - reference;
            for k in 1..face.len() - 1 {
                let b = self.vertices[face[k] as usize] - reference;
                let c = self.vertices[face[k + 1] as usize] - reference;
                volume += a.dot(&b.cross(&c));
            }
        }
        volume / 6.0
    }

    /// Number of edges used by exactly one face.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        edge_face_counts(&self.faces)
            .values()
            .filter(|&&n| n == 1)
            .count()
    }

    /// Number of edges shared by more than two faces.
    #[must_use]
    pub fn non_manifold_edge_count(&self) -> usize {
        edge_face_counts(&self.faces)
            .values()
            .filter(|&&n| n > 2)
            .count()
    }

    /// Returns `true` if every edge is shared by exactly two faces.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        !self.is_empty()
            && edge_face_counts(&self.faces).values().all(|&n| n == 2)
    }

    /// Transforms all vertices by a 4x4 matrix in place.
    pub fn transform(&mut self, matrix: &Matrix4) {
        for v in &mut self.vertices {
            *v = transform_point(matrix, v);
        }
    }

    /// Returns a transformed copy.
    #[must_use]
    pub fn transformed(&self, matrix: &Matrix4) -> Self {
        let mut copy = self.clone();
        copy.transform(matrix);
        copy
    }

    /// Translates all vertices in place.
    pub fn translate(&mut self, offset: &Vector3) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    /// Appends another mesh, re-indexing its faces.
    #[allow(clippy::cast_possible_truncation)]
    pub fn append(&mut self, other: &Mesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|f| f.iter().map(|&i| i + base).collect()),
        );
    }

    /// Reverses the winding of every face.
    pub fn flip(&mut self) {
        for face in &mut self.faces {
            face.reverse();
        }
    }

    /// Removes vertices no face references and compacts the vertex array.
    ///
    /// Returns the number of vertices removed.
    #[allow(clippy::cast_possible_truncation)]
    pub fn remove_unreferenced_vertices(&mut self) -> usize {
        let original = self.vertices.len();
        let mut used = vec![false; original];
        for face in &self.faces {
            for &i in face {
                used[i as usize] = true;
            }
        }
        if used.iter().all(|&u| u) {
            return 0;
        }

        let mut remap: HashMap<u32, u32> = HashMap::new();
        let mut compact = Vec::with_capacity(original);
        for (old, v) in self.vertices.iter().enumerate() {
            if used[old] {
                remap.insert(old as u32, compact.len() as u32);
                compact.push(*v);
            }
        }
        for face in &mut self.faces {
            for i in face.iter_mut() {
                *i = remap[&*i];
            }
        }
        self.vertices = compact;
        original - self.vertices.len()
    }

    /// Drops faces with fewer than three distinct consecutive vertices.
    ///
    /// Returns the number of faces removed.
    pub fn remove_degenerate_faces(&mut self) -> usize {
        let original = self.faces.len();
        for face in &mut self.faces {
            face.dedup();
            while face.len() > 1 && face.first() == face.last() {
                face.pop();
            }
        }
        self.faces.retain(|f| f.len() >= 3);
        original - self.faces.len()
    }
}

/// Newell's method over an ordered polygon loop.
pub(crate) fn newell_normal<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Vector3 {
    let pts: Vec<&Point3> = points.into_iter().collect();
    let n = pts.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let cur = pts[i];
        let next = pts[(i + 1) % n];
        normal.x += (cur.y - next.y) * (cur.z + next.z);
        normal.y += (cur.z - next.z) * (cur.x + next.x);
        normal.z += (cur.x - next.x) * (cur.y + next.y);
    }
    if normal.norm() < TOLERANCE {
        Vector3::zeros()
    } else {
        normal
    }
}
