//! Binary space partitioning solids for mesh booleans.
//!
//! Trees live in a flat node arena and are built and clipped with explicit
//! work stacks, so deep trees from finely subdivided tools cannot overflow
//! the call stack.

use std::mem;

use crate::math::{Point3, Vector3, TOLERANCE};
use crate::mesh::{newell_normal, Mesh};

/// Oriented plane `normal . p = w`.
#[derive(Debug, Clone, Copy)]
struct Plane {
    normal: Vector3,
    w: f64,
}

impl Plane {
    fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    fn distance(&self, p: &Point3) -> f64 {
        self.normal.dot(&p.coords) - self.w
    }
}

/// Convex polygon carrying its supporting plane.
#[derive(Debug, Clone)]
pub(crate) struct Polygon {
    vertices: Vec<Point3>,
    plane: Plane,
}

impl Polygon {
    /// Builds a polygon, or `None` if it encloses no area.
    #[allow(clippy::cast_precision_loss)]
    fn new(vertices: Vec<Point3>) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let normal = newell_normal(&vertices);
        if normal.norm() < TOLERANCE {
            return None;
        }
        let normal = normal.normalize();
        let centroid: Vector3 =
            vertices.iter().map(|v| v.coords).sum::<Vector3>() / vertices.len() as f64;
        Some(Self {
            plane: Plane {
                normal,
                w: normal.dot(&centroid),
            },
            vertices,
        })
    }

    fn with_plane(vertices: Vec<Point3>, plane: Plane) -> Option<Self> {
        (vertices.len() >= 3).then_some(Self { vertices, plane })
    }

    fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }
}

/// Where a polygon lies relative to a splitting plane.
enum Split {
    CoplanarFront(Polygon),
    CoplanarBack(Polygon),
    Front(Polygon),
    Back(Polygon),
    Spanning {
        front: Option<Polygon>,
        back: Option<Polygon>,
    },
}

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

fn split_polygon(plane: &Plane, polygon: Polygon, epsilon: f64) -> Split {
    let sides: Vec<u8> = polygon
        .vertices
        .iter()
        .map(|v| {
            let t = plane.distance(v);
            if t < -epsilon {
                BACK
            } else if t > epsilon {
                FRONT
            } else {
                COPLANAR
            }
        })
        .collect();
    let kind = sides.iter().fold(COPLANAR, |acc, s| acc | s);

    match kind {
        COPLANAR if plane.normal.dot(&polygon.plane.normal) > 0.0 => Split::CoplanarFront(polygon),
        COPLANAR => Split::CoplanarBack(polygon),
        FRONT => Split::Front(polygon),
        BACK => Split::Back(polygon),
        _ => {
            let n = polygon.vertices.len();
            let mut front = Vec::with_capacity(n + 1);
            let mut back = Vec::with_capacity(n + 1);
            for i in 0..n {
                let j = (i + 1) % n;
                let (si, sj) = (sides[i], sides[j]);
                let (vi, vj) = (polygon.vertices[i], polygon.vertices[j]);
                if si != BACK {
                    front.push(vi);
                }
                if si != FRONT {
                    back.push(vi);
                }
                if si | sj == SPANNING {
                    let edge = vj - vi;
                    let t = (plane.w - plane.normal.dot(&vi.coords)) / plane.normal.dot(&edge);
                    let v = vi + edge * t;
                    front.push(v);
                    back.push(v);
                }
            }
            Split::Spanning {
                front: Polygon::with_plane(front, polygon.plane),
                back: Polygon::with_plane(back, polygon.plane),
            }
        }
    }
}

#[derive(Debug, Default)]
struct Node {
    plane: Option<Plane>,
    front: Option<usize>,
    back: Option<usize>,
    polygons: Vec<Polygon>,
}

/// A BSP tree over the polygons of one solid.
#[derive(Debug)]
pub(crate) struct BspTree {
    nodes: Vec<Node>,
    epsilon: f64,
}

impl BspTree {
    pub(crate) fn new(polygons: Vec<Polygon>, epsilon: f64) -> Self {
        let mut tree = Self {
            nodes: vec![Node::default()],
            epsilon,
        };
        tree.build(polygons);
        tree
    }

    /// Inserts polygons, growing the tree as needed.
    fn build(&mut self, polygons: Vec<Polygon>) {
        let mut stack = vec![(0usize, polygons)];
        while let Some((idx, polygons)) = stack.pop() {
            let mut polygons = polygons.into_iter();
            let plane = match self.nodes[idx].plane {
                Some(plane) => plane,
                None => {
                    let Some(first) = polygons.next() else {
                        continue;
                    };
                    let plane = first.plane;
                    self.nodes[idx].plane = Some(plane);
                    self.nodes[idx].polygons.push(first);
                    plane
                }
            };

            let mut front = Vec::new();
            let mut back = Vec::new();
            for polygon in polygons {
                match split_polygon(&plane, polygon, self.epsilon) {
                    Split::CoplanarFront(p) | Split::CoplanarBack(p) => {
                        self.nodes[idx].polygons.push(p);
                    }
                    Split::Front(p) => front.push(p),
                    Split::Back(p) => back.push(p),
                    Split::Spanning { front: f, back: b } => {
                        front.extend(f);
                        back.extend(b);
                    }
                }
            }
            if !front.is_empty() {
                let child = self.child(idx, true);
                stack.push((child, front));
            }
            if !back.is_empty() {
                let child = self.child(idx, false);
                stack.push((child, back));
            }
        }
    }

    fn child(&mut self, idx: usize, front: bool) -> usize {
        let existing = if front {
            self.nodes[idx].front
        } else {
            self.nodes[idx].back
        };
        if let Some(child) = existing {
            return child;
        }
        let child = self.nodes.len();
        self.nodes.push(Node::default());
        if front {
            self.nodes[idx].front = Some(child);
        } else {
            self.nodes[idx].back = Some(child);
        }
        child
    }

    /// Swaps solid and empty space.
    pub(crate) fn invert(&mut self) {
        for node in &mut self.nodes {
            for polygon in &mut node.polygons {
                polygon.flip();
            }
            if let Some(plane) = node.plane.as_mut() {
                plane.flip();
            }
            mem::swap(&mut node.front, &mut node.back);
        }
    }

    /// Removes the parts of `polygons` inside this solid.
    fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let mut kept = Vec::new();
        let mut stack = vec![(0usize, polygons)];
        while let Some((idx, polygons)) = stack.pop() {
            let node = &self.nodes[idx];
            let Some(plane) = node.plane else {
                kept.extend(polygons);
                continue;
            };
            let mut front = Vec::new();
            let mut back = Vec::new();
            for polygon in polygons {
                match split_polygon(&plane, polygon, self.epsilon) {
                    Split::CoplanarFront(p) | Split::Front(p) => front.push(p),
                    Split::CoplanarBack(p) | Split::Back(p) => back.push(p),
                    Split::Spanning { front: f, back: b } => {
                        front.extend(f);
                        back.extend(b);
                    }
                }
            }
            match node.front {
                Some(child) => stack.push((child, front)),
                None => kept.extend(front),
            }
            if let Some(child) = node.back {
                stack.push((child, back));
            }
        }
        kept
    }

    /// Removes every part of this tree's polygons inside `other`.
    pub(crate) fn clip_to(&mut self, other: &BspTree) {
        for node in &mut self.nodes {
            let polygons = mem::take(&mut node.polygons);
            node.polygons = other.clip_polygons(polygons);
        }
    }

    pub(crate) fn all_polygons(&self) -> Vec<Polygon> {
        self.nodes
            .iter()
            .flat_map(|n| n.polygons.iter().cloned())
            .collect()
    }
}

/// Converts mesh faces into BSP polygons, dropping zero-area faces.
pub(crate) fn polygons_of(mesh: &Mesh) -> Vec<Polygon> {
    mesh.faces
        .iter()
        .filter_map(|face| {
            Polygon::new(face.iter().map(|&i| mesh.vertices[i as usize]).collect())
        })
        .collect()
}

/// Collects polygons into an unwelded mesh.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn mesh_of(polygons: &[Polygon]) -> Mesh {
    let mut mesh = Mesh::new();
    for polygon in polygons {
        let base = mesh.vertices.len() as u32;
        mesh.vertices.extend_from_slice(&polygon.vertices);
        mesh.faces
            .push((base..base + polygon.vertices.len() as u32).collect());
    }
    mesh
}

/// `a - b`.
pub(crate) fn difference(a: &Mesh, b: &Mesh, epsilon: f64) -> Vec<Polygon> {
    let mut a = BspTree::new(polygons_of(a), epsilon);
    let mut b = BspTree::new(polygons_of(b), epsilon);
    a.invert();
    a.clip_to(&b);
    b.clip_to(&a);
    b.invert();
    b.clip_to(&a);
    b.invert();
    a.build(b.all_polygons());
    a.invert();
    a.all_polygons()
}

/// `a & b`.
pub(crate) fn intersection(a: &Mesh, b: &Mesh, epsilon: f64) -> Vec<Polygon> {
    let mut a = BspTree::new(polygons_of(a), epsilon);
    let mut b = BspTree::new(polygons_of(b), epsilon);
    a.invert();
    b.clip_to(&a);
    b.invert();
    a.clip_to(&b);
    b.clip_to(&a);
    a.build(b.all_polygons());
    a.invert();
    a.all_polygons()
}
