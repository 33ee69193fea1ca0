use crate::error::{Error, RestartDefect};
use crate::geometry::Point;
use crate::mesh::Mesh;
use crate::restart::Snapshot;

/// Spatial spread of the initial spill profile.
const SPILL_SPREAD: f64 = 0.01;

/// The Gaussian seed: a bell centred on the spill location, evaluated at
/// every triangle midpoint. A triangle whose centroid coincides with the
/// centre starts at exactly 1.
pub fn gaussian(mesh: &Mesh, center: Point) -> Vec<f64> {
    mesh.triangles()
        .iter()
        .map(|tri| {
            let d = tri.midpoint - center;
            (-d.norm_squared() / SPILL_SPREAD).exp()
        })
        .collect()
}

/// Replay a solution checkpoint onto the mesh, producing the triangle
/// concentration column. Cells the checkpoint does not list default to
/// zero; amounts recorded for boundary segments are accepted and stay on
/// zero. The advisory header time, when present, must agree with the
/// configured start time.
pub fn from_snapshot(mesh: &Mesh, snapshot: &Snapshot, t_start: f64) -> Result<Vec<f64>, Error> {
    if let Some(header) = snapshot.time {
        let scale = header.abs().max(t_start.abs()).max(1.0);
        if (header - t_start).abs() > 1e-9 * scale {
            return Err(Error::RestartMismatch(RestartDefect::TimeMismatch {
                header,
                configured: t_start,
            }));
        }
    }

    let mut oil = vec![0.0; mesh.num_triangles()];
    for (&cell, &amount) in &snapshot.amounts {
        if cell >= mesh.total_cells() {
            return Err(Error::RestartMismatch(RestartDefect::IndexOutOfRange {
                cell,
                total: mesh.total_cells(),
            }));
        }
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidConcentration {
                cell,
                step: 0,
                value: amount,
            });
        }
        if let Some(slot) = mesh.triangle_slot(cell) {
            oil[slot] = amount;
        }
    }
    Ok(oil)
}
