use crate::geometry::Vector2d;
use crate::mesh::cell::{Interface, TriangleCell};

/// Upwind flux through one interface. `nu` is the outward normal scaled by
/// the edge length and `v_face` the face-centred average velocity; the
/// transported value is taken from the side the flow comes from.
pub fn upwind(u_own: f64, u_ngh: f64, nu: Vector2d, v_face: Vector2d) -> f64 {
    let s = nu.dot(v_face);
    if s > 0.0 {
        u_own * s
    } else {
        u_ngh * s
    }
}

/// The contribution of one interface to the owning triangle's concentration
/// over one step of size `dt`.
pub fn interface_delta(
    tri: &TriangleCell,
    iface: &Interface,
    u_own: f64,
    u_ngh: f64,
    v_ngh: Vector2d,
    dt: f64,
) -> f64 {
    let v_face = (tri.velocity + v_ngh) * 0.5;
    let nu = iface.normal * iface.edge_length;
    -(dt / tri.area) * upwind(u_own, u_ngh, nu, v_face)
}
