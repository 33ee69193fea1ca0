use crate::geometry::{Point, Vector2d};
use serde::{Deserialize, Serialize};

/// The cell on the far side of a triangle interface. The payload is a
/// position into the owning mesh's triangle or line array, not a global cell
/// index; the variant is resolved once when the topology is built, so the
/// flux sweep branches on a plain tag instead of a runtime type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Neighbour {
    Triangle(usize),
    Line(usize),
}

/// One shared edge between a triangle and a neighbouring cell, carrying the
/// geometry the flux kernel needs. `edge_vector` points from the first to the
/// second shared corner in the triangle's own corner order, and `normal` is
/// the unit vector perpendicular to it pointing away from the triangle's
/// centroid.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Interface {
    pub neighbour: Neighbour,
    pub edge_vector: Vector2d,
    pub edge_length: f64,
    pub normal: Vector2d,
}

/// A triangular cell with its derived geometric attributes. All fields are
/// frozen once the mesh is built; the transported concentration lives in a
/// separate column owned by the simulation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TriangleCell {
    /// Global cell index, shared with the restart format.
    pub index: usize,
    /// Corner point indices in input order.
    pub points: [usize; 3],
    pub midpoint: Point,
    pub area: f64,
    /// The prescribed flow field sampled at the midpoint.
    pub velocity: Vector2d,
    /// One record per neighbour sharing an edge, in corner-traversal order.
    pub interfaces: Vec<Interface>,
}

/// A boundary segment. Carries no concentration and acts as a solid wall;
/// its neighbour list (other segments sharing one endpoint) exists for
/// boundary traversal only and is never consulted by the flux kernel.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LineCell {
    /// Global cell index, shared with the restart format.
    pub index: usize,
    /// Endpoint point indices in input order.
    pub points: [usize; 2],
    /// Positions of adjacent segments in the owning mesh's line array.
    pub neighbours: Vec<usize>,
}

impl TriangleCell {
    /// The positions of the neighbouring triangles in the mesh's triangle
    /// array, one per interior interface.
    pub fn triangle_neighbours(&self) -> impl Iterator<Item = usize> + '_ {
        self.interfaces.iter().filter_map(|i| match i.neighbour {
            Neighbour::Triangle(n) => Some(n),
            Neighbour::Line(_) => None,
        })
    }

    /// Whether any interface faces a boundary segment.
    pub fn is_boundary(&self) -> bool {
        self.interfaces
            .iter()
            .any(|i| matches!(i.neighbour, Neighbour::Line(_)))
    }
}

/// Centroid of a triangle given its corner points.
pub fn centroid(a: Point, b: Point, c: Point) -> Point {
    Point::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0)
}

/// Unsigned area of a triangle given its corner points.
pub fn area(a: Point, b: Point, c: Point) -> f64 {
    0.5 * ((a.x - c.x) * (b.y - a.y) - (a.x - b.x) * (c.y - a.y)).abs()
}

/// Construct the interface geometry for the oriented edge from `pa` to `pb`
/// of a triangle centred on `midpoint`: the edge vector, its length, and the
/// unit normal pointing away from the centroid.
pub fn oriented_edge(pa: Point, pb: Point, midpoint: Point) -> (Vector2d, f64, Vector2d) {
    let edge_vector = pb - pa;
    let edge_length = edge_vector.norm();
    let normal = edge_vector.perp().unit();

    // The perpendicular can face either way; keep the one pointing from the
    // centroid toward the edge.
    if normal.dot(pa - midpoint) < 0.0 {
        (edge_vector, edge_length, -normal)
    } else {
        (edge_vector, edge_length, normal)
    }
}
