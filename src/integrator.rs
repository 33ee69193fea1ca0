use crate::error::Error;
use crate::flux;
use crate::mesh::cell::Neighbour;
use crate::mesh::Mesh;
use rayon::prelude::*;

/// One explicit forward-Euler sweep. Every triangle reads neighbour
/// concentrations from `oil` and writes its updated value into `next`, so
/// the result is a function of the read buffer alone and independent of
/// sweep order; the sweep runs data-parallel over triangles. Boundary
/// segments reflect the triangle's own state back at it.
pub fn advance(mesh: &Mesh, oil: &[f64], next: &mut [f64], dt: f64) {
    let triangles = mesh.triangles();

    next.par_iter_mut()
        .zip(triangles.par_iter())
        .enumerate()
        .for_each(|(slot, (out, tri))| {
            let u_own = oil[slot];
            let mut du = 0.0;

            for iface in &tri.interfaces {
                let (u_ngh, v_ngh) = match iface.neighbour {
                    Neighbour::Triangle(n) => (oil[n], triangles[n].velocity),
                    Neighbour::Line(_) => (u_own, tri.velocity),
                };
                du += flux::interface_delta(tri, iface, u_own, u_ngh, v_ngh, dt);
            }
            *out = u_own + du;
        });
}

/// Scan a freshly written buffer for values the scheme must never produce.
/// A negative or non-finite concentration is fatal at the step that wrote
/// it.
pub fn validate(mesh: &Mesh, next: &[f64], step: u64) -> Result<(), Error> {
    for (slot, &value) in next.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::InvalidConcentration {
                cell: mesh.triangles()[slot].index,
                step,
                value,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::{advance, validate};
    use crate::error::Error;
    use crate::geometry::{Point, Vector2d};
    use crate::mesh::{Mesh, MeshData};

    fn unit_square() -> MeshData {
        MeshData {
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(0.0, 1.0),
                Point::new(1.0, 1.0),
            ],
            triangles: vec![[0, 1, 2], [1, 3, 2]],
            lines: vec![[0, 1], [1, 3], [3, 2], [2, 0]],
        }
    }

    fn lone_triangle() -> MeshData {
        MeshData {
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(0.0, 1.0),
            ],
            triangles: vec![[0, 1, 2]],
            lines: vec![[0, 1], [1, 2], [2, 0]],
        }
    }

    #[test]
    fn a_walled_in_triangle_keeps_its_oil() {
        // With every edge reflecting the triangle's own state, the scaled
        // normals of a closed triangle sum to zero and the update cancels.
        let mesh = Mesh::build(lone_triangle()).unwrap();
        let mut oil = vec![1.0];
        let mut next = vec![0.0];

        for _ in 0..200 {
            advance(&mesh, &oil, &mut next, 0.01);
            std::mem::swap(&mut oil, &mut next);
        }
        assert!((oil[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_velocity_preserves_any_field() {
        let mesh =
            Mesh::build_with(unit_square(), |_| Vector2d::new(0.0, 0.0)).unwrap();
        let mut oil = vec![0.7, 0.3];
        let mut next = vec![0.0, 0.0];

        for _ in 0..50 {
            advance(&mesh, &oil, &mut next, 0.1);
            std::mem::swap(&mut oil, &mut next);
        }
        assert_eq!(oil, vec![0.7, 0.3]);
    }

    #[test]
    fn mass_is_conserved_across_an_interior_edge() {
        // Uniform rightward flow on an open square: the only interface that
        // moves anything is the shared diagonal, and what leaves one
        // triangle enters the other.
        let data = MeshData {
            lines: vec![],
            ..unit_square()
        };
        let mesh = Mesh::build_with(data, |_| Vector2d::new(1.0, 0.0)).unwrap();

        let areas: Vec<f64> = mesh.triangles().iter().map(|t| t.area).collect();
        let mut oil = vec![1.0, 0.0];
        let mut next = vec![0.0, 0.0];
        let mass = |u: &[f64]| u[0] * areas[0] + u[1] * areas[1];
        let initial = mass(&oil);

        for _ in 0..100 {
            advance(&mesh, &oil, &mut next, 0.001);
            std::mem::swap(&mut oil, &mut next);
            assert!((mass(&oil) - initial).abs() < 1e-9);
        }
        assert!(oil[1] > 0.0);
    }

    #[test]
    fn a_cfl_respecting_step_keeps_the_field_non_negative() {
        let mesh = Mesh::build(unit_square()).unwrap();
        let mut oil = vec![1.0, 0.0];
        let mut next = vec![0.0, 0.0];

        for step in 0..500 {
            advance(&mesh, &oil, &mut next, 1e-3);
            validate(&mesh, &next, step).unwrap();
            std::mem::swap(&mut oil, &mut next);
        }
    }

    #[test]
    fn sweeps_are_deterministic() {
        let mesh = Mesh::build(unit_square()).unwrap();

        let run = || {
            let mut oil = vec![0.9, 0.1];
            let mut next = vec![0.0, 0.0];
            for _ in 0..100 {
                advance(&mesh, &oil, &mut next, 1e-3);
                std::mem::swap(&mut oil, &mut next);
            }
            oil
        };
        let a = run();
        let b = run();
        assert_eq!(a[0].to_bits(), b[0].to_bits());
        assert_eq!(a[1].to_bits(), b[1].to_bits());
    }

    #[test]
    fn negative_values_are_reported_with_the_global_cell_index() {
        let mesh = Mesh::build(unit_square()).unwrap();

        match validate(&mesh, &[0.5, -0.1], 7) {
            Err(Error::InvalidConcentration {
                cell: 5,
                step: 7,
                value,
            }) => assert_eq!(value, -0.1),
            other => panic!("expected InvalidConcentration, got {:?}", other),
        }
    }
}
