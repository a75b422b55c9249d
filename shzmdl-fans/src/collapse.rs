//! Ring collapse: turn a fan back into plain triangles
//!
//! Only the blade ring is triangulated; the center vertex is dropped.

use shzmdl_core::{Error, Model, Result, Triangle, VertexRef};
use tracing::info;

/// Triangulate a closed polygon ring by repeated halving.
///
/// An odd ring first loses vertex 1 to the triangle (0, 1, 2). An even
/// ring then emits one triangle per stride-2 step, wrapping, and keeps the
/// even positions for the next round. A ring of `n >= 3` vertices yields
/// exactly `n - 2` triangles wound like the ring.
pub fn triangulate_ring(ring: &[VertexRef]) -> Vec<Triangle> {
    let mut ring = ring.to_vec();
    let mut out = Vec::with_capacity(ring.len().saturating_sub(2));

    while ring.len() >= 3 {
        if ring.len() == 3 {
            out.push(Triangle::new(ring[0], ring[1], ring[2]));
            break;
        }
        if ring.len() % 2 == 1 {
            out.push(Triangle::new(ring[0], ring[1], ring[2]));
            ring.remove(1);
        }
        let m = ring.len();
        let mut next = Vec::with_capacity(m / 2);
        for i in (0..m).step_by(2) {
            out.push(Triangle::new(ring[i], ring[i + 1], ring[(i + 2) % m]));
            next.push(ring[i]);
        }
        ring = next;
    }
    out
}

/// Remove `model.fans[fan_index]` and append the triangulation of its
/// blade ring to `model.triangles`. Returns the number of triangles added.
pub fn collapse_fan(model: &mut Model, fan_index: usize) -> Result<usize> {
    let blades = model.fan(fan_index)?.len();
    if blades < 3 {
        return Err(Error::InvalidParameter(format!(
            "cannot collapse a fan of {} blades",
            blades
        )));
    }

    let fan = model.fans.remove(fan_index);
    let triangles = triangulate_ring(&fan.blades);
    let added = triangles.len();
    model.triangles.extend(triangles);

    info!(fan = fan_index, triangles = added, "fan collapsed");
    Ok(added)
}
