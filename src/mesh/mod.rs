pub mod cell;
pub mod reader;
pub mod topology;

use self::cell::{Interface, LineCell, Neighbour, TriangleCell};
use self::topology::EdgeIndex;
use crate::error::{Error, MeshDefect};
use crate::geometry::{Point, Vector2d};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// The parsed mesh triple handed over by a mesh reader: a point table and
/// the point-index tuples of the triangle and boundary-line cells, all
/// 0-based.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MeshData {
    pub points: Vec<Point>,
    pub triangles: Vec<[usize; 3]>,
    pub lines: Vec<[usize; 2]>,
}

/// The prescribed steady current over the bay.
pub fn bay_current(p: Point) -> Vector2d {
    Vector2d::new(p.y - 0.2 * p.x, -p.x)
}

/// The frozen mesh aggregate: the point table plus dense cell arrays with
/// fully resolved topology. Built once at load; nothing here mutates during
/// a run, so it is safe to share by reference across any number of readers.
///
/// Global cell indices cover boundary segments first, `[0, num_lines)`, then
/// triangles, `[num_lines, num_lines + num_triangles)`, matching the order
/// in which mesh files list their element blocks. The restart format
/// addresses this global index space.
#[derive(Clone, Debug)]
pub struct Mesh {
    points: Vec<Point>,
    triangles: Vec<TriangleCell>,
    lines: Vec<LineCell>,
}

impl Mesh {
    /// Build the topology with the bay current as the velocity field.
    pub fn build(data: MeshData) -> Result<Self, Error> {
        Self::build_with(data, bay_current)
    }

    /// Build the topology, sampling the given velocity field at every
    /// triangle midpoint.
    pub fn build_with<F>(data: MeshData, velocity: F) -> Result<Self, Error>
    where
        F: Fn(Point) -> Vector2d + Sync,
    {
        let MeshData {
            points,
            triangles,
            lines,
        } = data;
        let num_lines = lines.len();

        for (t, corners) in triangles.iter().enumerate() {
            for &p in corners {
                if p >= points.len() {
                    return Err(Error::MeshIllFormed(MeshDefect::PointOutOfRange {
                        cell: num_lines + t,
                        point: p,
                    }));
                }
            }
        }
        for (l, endpoints) in lines.iter().enumerate() {
            for &p in endpoints {
                if p >= points.len() {
                    return Err(Error::MeshIllFormed(MeshDefect::PointOutOfRange {
                        cell: l,
                        point: p,
                    }));
                }
            }
        }

        let edge_index = EdgeIndex::build(&triangles, &lines)?;

        for (l, endpoints) in lines.iter().enumerate() {
            if !edge_index.touches_triangle(endpoints[0], endpoints[1]) {
                return Err(Error::MeshIllFormed(MeshDefect::DanglingLine { line: l }));
            }
        }

        // Each triangle's attributes depend only on the point table and the
        // edge index, so the geometry pass is data-parallel.
        let triangle_cells = triangles
            .par_iter()
            .enumerate()
            .map(|(t, corners)| {
                let a = points[corners[0]];
                let b = points[corners[1]];
                let c = points[corners[2]];

                let area = cell::area(a, b, c);
                if !(area > 0.0) {
                    return Err(Error::DegenerateTriangle {
                        triangle: num_lines + t,
                    });
                }
                let midpoint = cell::centroid(a, b, c);

                let interfaces = topology::triangle_edges(corners)
                    .iter()
                    .filter_map(|&(pa, pb)| {
                        edge_index
                            .partner(pa, pb, Neighbour::Triangle(t))
                            .map(|neighbour| {
                                let (edge_vector, edge_length, normal) =
                                    cell::oriented_edge(points[pa], points[pb], midpoint);
                                Interface {
                                    neighbour,
                                    edge_vector,
                                    edge_length,
                                    normal,
                                }
                            })
                    })
                    .collect();

                Ok(TriangleCell {
                    index: num_lines + t,
                    points: *corners,
                    midpoint,
                    area,
                    velocity: velocity(midpoint),
                    interfaces,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let line_cells = topology::line_neighbours(&lines)
            .into_iter()
            .zip(&lines)
            .enumerate()
            .map(|(l, (neighbours, endpoints))| LineCell {
                index: l,
                points: *endpoints,
                neighbours,
            })
            .collect();

        Ok(Self {
            points,
            triangles: triangle_cells,
            lines: line_cells,
        })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn triangles(&self) -> &[TriangleCell] {
        &self.triangles
    }

    pub fn lines(&self) -> &[LineCell] {
        &self.lines
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn total_cells(&self) -> usize {
        self.triangles.len() + self.lines.len()
    }

    /// The triangle-array position of a global cell index, if the index
    /// names a triangle rather than a boundary segment.
    pub fn triangle_slot(&self, cell_index: usize) -> Option<usize> {
        cell_index
            .checked_sub(self.lines.len())
            .filter(|&slot| slot < self.triangles.len())
    }
}
