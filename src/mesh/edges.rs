use std::collections::HashMap;

/// Undirected edge key with the smaller index first.
pub type EdgeKey = (u32, u32);

/// Canonical key for the edge between two vertices.
#[must_use]
pub fn edge_key(a: u32, b: u32) -> EdgeKey {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Counts how many faces use each undirected edge.
#[must_use]
pub fn edge_face_counts(faces: &[Vec<u32>]) -> HashMap<EdgeKey, usize> {
    let mut counts: HashMap<EdgeKey, usize> = HashMap::new();
    for face in faces {
        for (a, b) in directed_edges(face) {
            *counts.entry(edge_key(a, b)).or_default() += 1;
        }
    }
    counts
}

/// Iterates the directed edges of a polygon loop, closing it.
pub fn directed_edges(face: &[u32]) -> impl Iterator<Item = (u32, u32)> + '_ {
    let n = face.len();
    (0..n).map(move |i| (face[i], face[(i + 1) % n]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_shares_edge_with_neighbour() {
        let faces = vec![vec![0, 1, 2, 3], vec![1, 4, 5, 2]];
        let counts = edge_face_counts(&faces);
        assert_eq!(counts[&(1, 2)], 2);
        assert_eq!(counts[&(0, 1)], 1);
        assert_eq!(counts.len(), 7);
    }

    #[test]
    fn directed_edges_close_loop() {
        let edges: Vec<_> = directed_edges(&[3, 4, 5]).collect();
        assert_eq!(edges, vec![(3, 4), (4, 5), (5, 3)]);
    }
}
