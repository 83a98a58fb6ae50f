use crate::mesh::Mesh;

/// Splits every polygon into triangles in place.
///
/// Quads are split along their shorter diagonal; larger polygons are fanned
/// from their first vertex, which is exact for the convex faces the kernel
/// produces. Returns the number of faces that were split.
pub fn triangulate(mesh: &mut Mesh) -> usize {
    if mesh.is_triangulated() {
        return 0;
    }
    let mut split = 0;
    let mut faces = Vec::with_capacity(mesh.faces.len() * 2);
    for face in mesh.faces.drain(..) {
        match face.len() {
            0..=2 => {}
            3 => faces.push(face),
            4 => {
                split += 1;
                let p = |k: usize| mesh.vertices[face[k] as usize];
                let d02 = (p(2) - p(0)).norm_squared();
                let d13 = (p(3) - p(1)).norm_squared();
                if d02 <= d13 {
                    faces.push(vec![face[0], face[1], face[2]]);
                    faces.push(vec![face[0], face[2], face[3]]);
                } else {
                    faces.push(vec![face[0], face[1], face[3]]);
                    faces.push(vec![face[1], face[2], face[3]]);
                }
            }
            n => {
                split += 1;
                for k in 1..n - 1 {
                    faces.push(vec![face[0], face[k], face[k + 1]]);
                }
            }
        }
    }
    mesh.faces = faces;
    split
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Point3;

    #[test]
    fn cube_becomes_twelve_triangles() {
        let mut mesh = Mesh::cuboid(Point3::origin(), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(triangulate(&mut mesh), 6);
        assert_eq!(mesh.face_count(), 12);
        assert!(mesh.is_triangulated());
        assert!(mesh.is_closed());
        assert!((mesh.signed_volume() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn already_triangulated_is_untouched() {
        let mut mesh = Mesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        triangulate(&mut mesh);
        let before = mesh.clone();
        assert_eq!(triangulate(&mut mesh), 0);
        assert_eq!(mesh, before);
    }

    #[test]
    fn quad_splits_along_short_diagonal() {
        let mut mesh = Mesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(4.0, 0.0, 0.0),
                Point3::new(5.0, 1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
            vec![vec![0, 1, 2, 3]],
        );
        triangulate(&mut mesh);
        assert_eq!(mesh.faces, vec![vec![0, 1, 3], vec![1, 2, 3]]);
    }

    #[test]
    fn pentagon_fans() {
        let mut mesh = Mesh::from_parts(
            (0..5)
                .map(|k| {
                    let a = f64::from(k) * std::f64::consts::TAU / 5.0;
                    Point3::new(a.cos(), a.sin(), 0.0)
                })
                .collect(),
            vec![vec![0, 1, 2, 3, 4]],
        );
        triangulate(&mut mesh);
        assert_eq!(mesh.face_count(), 3);
        for face in &mesh.faces {
            assert!(mesh.face_normal(face).z > 0.0);
        }
    }
}
