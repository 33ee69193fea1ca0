use super::cell::Neighbour;
use crate::error::{Error, MeshDefect};
use std::collections::HashMap;

/// An index from an unordered pair of point indices to the cells referencing
/// both endpoints. Each triangle contributes its three corner-order edges and
/// each boundary segment its single edge. In a well-formed mesh no edge is
/// referenced by more than two cells.
pub struct EdgeIndex {
    edges: HashMap<(usize, usize), Vec<Neighbour>>,
}

fn key(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

impl EdgeIndex {
    pub fn build(triangles: &[[usize; 3]], lines: &[[usize; 2]]) -> Result<Self, Error> {
        let mut edges: HashMap<(usize, usize), Vec<Neighbour>> = HashMap::new();

        for (t, corners) in triangles.iter().enumerate() {
            for (a, b) in triangle_edges(corners) {
                edges.entry(key(a, b)).or_default().push(Neighbour::Triangle(t));
            }
        }
        for (l, endpoints) in lines.iter().enumerate() {
            edges
                .entry(key(endpoints[0], endpoints[1]))
                .or_default()
                .push(Neighbour::Line(l));
        }

        for (edge, users) in &edges {
            if users.len() > 2 {
                return Err(Error::MeshIllFormed(MeshDefect::SharedEdgeOverflow {
                    edge: *edge,
                    cells: users.len(),
                }));
            }
        }
        Ok(Self { edges })
    }

    /// The single cell other than `me` sharing the edge between points `a`
    /// and `b`, if any. Edges with no partner belong to an open piece of the
    /// boundary and carry no interface.
    pub fn partner(&self, a: usize, b: usize, me: Neighbour) -> Option<Neighbour> {
        self.edges
            .get(&key(a, b))
            .into_iter()
            .flat_map(|users| users.iter())
            .find(|&&user| user != me)
            .copied()
    }

    /// Whether the edge between points `a` and `b` is referenced by at least
    /// one triangle.
    pub fn touches_triangle(&self, a: usize, b: usize) -> bool {
        self.edges
            .get(&key(a, b))
            .into_iter()
            .flat_map(|users| users.iter())
            .any(|user| matches!(user, Neighbour::Triangle(_)))
    }
}

/// The corner-order edges of a triangle.
pub fn triangle_edges(corners: &[usize; 3]) -> [(usize, usize); 3] {
    [
        (corners[0], corners[1]),
        (corners[1], corners[2]),
        (corners[2], corners[0]),
    ]
}

/// Adjacency between boundary segments under the one-point rule: two
/// segments are neighbours when they share exactly one endpoint.
pub fn line_neighbours(lines: &[[usize; 2]]) -> Vec<Vec<usize>> {
    let mut by_point: HashMap<usize, Vec<usize>> = HashMap::new();

    for (l, endpoints) in lines.iter().enumerate() {
        for &p in endpoints {
            by_point.entry(p).or_default().push(l);
        }
    }

    lines
        .iter()
        .enumerate()
        .map(|(l, endpoints)| {
            let mut neighbours: Vec<usize> = endpoints
                .iter()
                .flat_map(|p| by_point[p].iter().copied())
                .filter(|&other| {
                    other != l && shared_points(lines[other], lines[l]) == 1
                })
                .collect();
            neighbours.sort_unstable();
            neighbours.dedup();
            neighbours
        })
        .collect()
}

fn shared_points(a: [usize; 2], b: [usize; 2]) -> usize {
    a.iter().filter(|p| b.contains(p)).count()
}
