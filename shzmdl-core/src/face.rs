//! Index-based face records

use crate::point::VertexRef;
use serde::{Deserialize, Serialize};

/// A triangle; winding order decides the sign of its normal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub corners: [VertexRef; 3],
}

/// A quad made of the triangles (v0, v1, v2) and (v0, v2, v3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quad {
    pub corners: [VertexRef; 4],
}

/// A closed triangle fan: one center plus a cyclic ring of blades.
///
/// Each pair of consecutive blades (wrapping) forms a triangle with the
/// center, wound `(center, previous, current)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fan {
    pub center: VertexRef,
    pub blades: Vec<VertexRef>,
}

/// Reserved for strip records; nothing produces or encodes them yet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strip {
    pub vertices: Vec<VertexRef>,
}

impl Triangle {
    pub fn new(v0: VertexRef, v1: VertexRef, v2: VertexRef) -> Self {
        Self {
            corners: [v0, v1, v2],
        }
    }

    /// Triangle from bare position indices
    pub fn from_positions(p0: usize, p1: usize, p2: usize) -> Self {
        Self::new(VertexRef::new(p0), VertexRef::new(p1), VertexRef::new(p2))
    }

    pub fn positions(&self) -> [usize; 3] {
        self.corners.map(|c| c.position)
    }
}

impl Quad {
    pub fn new(v0: VertexRef, v1: VertexRef, v2: VertexRef, v3: VertexRef) -> Self {
        Self {
            corners: [v0, v1, v2, v3],
        }
    }

    pub fn from_positions(p0: usize, p1: usize, p2: usize, p3: usize) -> Self {
        Self::new(
            VertexRef::new(p0),
            VertexRef::new(p1),
            VertexRef::new(p2),
            VertexRef::new(p3),
        )
    }

    /// The two triangles the quad is drawn as, split along v0-v2
    pub fn split(&self) -> [Triangle; 2] {
        let [v0, v1, v2, v3] = self.corners;
        [Triangle::new(v0, v1, v2), Triangle::new(v0, v2, v3)]
    }
}

impl Fan {
    pub fn new(center: VertexRef) -> Self {
        Self {
            center,
            blades: Vec::new(),
        }
    }

    pub fn with_blades(center: VertexRef, blades: Vec<VertexRef>) -> Self {
        Self { center, blades }
    }

    pub fn add_blade(&mut self, blade: VertexRef) {
        self.blades.push(blade);
    }

    /// Number of blades, which is also the number of triangles
    pub fn len(&self) -> usize {
        self.blades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blades.is_empty()
    }

    /// `(previous, current)` blade pairs, starting with the pair that ends
    /// on blade 0, so the ring is closed.
    pub fn edges(&self) -> impl Iterator<Item = (VertexRef, VertexRef)> + '_ {
        let n = self.blades.len();
        (0..n).map(move |i| (self.blades[(i + n - 1) % n], self.blades[i]))
    }

    /// The triangles this fan stands for
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.edges()
            .map(move |(prev, cur)| Triangle::new(self.center, prev, cur))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_split() {
        let quad = Quad::from_positions(0, 1, 2, 3);
        let [a, b] = quad.split();
        assert_eq!(a.positions(), [0, 1, 2]);
        assert_eq!(b.positions(), [0, 2, 3]);
    }

    #[test]
    fn test_fan_edges_close_ring() {
        let fan = Fan::with_blades(
            VertexRef::new(0),
            vec![VertexRef::new(1), VertexRef::new(2), VertexRef::new(3)],
        );
        let edges: Vec<(usize, usize)> = fan
            .edges()
            .map(|(p, c)| (p.position, c.position))
            .collect();
        assert_eq!(edges, vec![(3, 1), (1, 2), (2, 3)]);

        let tris: Vec<[usize; 3]> = fan.triangles().map(|t| t.positions()).collect();
        assert_eq!(tris, vec![[0, 3, 1], [0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_empty_fan_has_no_edges() {
        let fan = Fan::new(VertexRef::new(0));
        assert!(fan.is_empty());
        assert_eq!(fan.edges().count(), 0);
    }
}
