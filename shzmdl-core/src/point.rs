//! Point, vector and vertex reference types

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// Normalize `v`, mapping a zero-length vector to the zero vector.
pub fn normalize_or_zero(v: Vector3f) -> Vector3f {
    v.try_normalize(0.0).unwrap_or_else(Vector3f::zeros)
}

/// A texture coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TexCoord2 {
    pub u: f32,
    pub v: f32,
}

impl TexCoord2 {
    pub fn new(u: f32, v: f32) -> Self {
        Self { u, v }
    }
}

/// Reference to one corner of a face.
///
/// The position index is always present. Normal and texture coordinate
/// indices are optional; `None` marks an attribute the source did not
/// supply, so an absent slot can never be used as an array index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexRef {
    pub position: usize,
    pub normal: Option<usize>,
    pub tex_coord: Option<usize>,
}

impl VertexRef {
    /// A reference carrying only a position index
    pub fn new(position: usize) -> Self {
        Self {
            position,
            normal: None,
            tex_coord: None,
        }
    }

    /// A reference with every attribute index specified
    pub fn with_attributes(position: usize, normal: Option<usize>, tex_coord: Option<usize>) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }

    /// Same normal and texture coordinate indices, different position
    pub fn with_position(self, position: usize) -> Self {
        Self { position, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_zero_vector() {
        assert_eq!(normalize_or_zero(Vector3f::zeros()), Vector3f::zeros());
    }

    #[test]
    fn test_normalize_unit_length() {
        let n = normalize_or_zero(Vector3f::new(0.0, 3.0, 4.0));
        assert!((n.norm() - 1.0).abs() < 1e-6);
        assert!((n.y - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_vertex_ref_equality_is_structural() {
        let a = VertexRef::with_attributes(1, Some(2), None);
        let b = VertexRef::with_attributes(1, Some(2), None);
        let c = VertexRef::with_attributes(1, None, None);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.with_position(9).normal, Some(2));
    }
}
