//! The geometry store

use crate::{face::*, point::*, traits::Face, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Vertex attribute arrays plus the face collections that index them.
///
/// Attribute arrays only ever grow: passes append positions but never
/// remove or reorder them, so a [`VertexRef`] stays valid for the life of
/// the model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Model {
    pub positions: Vec<Point3f>,
    pub normals: Vec<Vector3f>,
    pub tex_coords: Vec<TexCoord2>,
    pub triangles: Vec<Triangle>,
    pub quads: Vec<Quad>,
    pub fans: Vec<Fan>,
    pub strips: Vec<Strip>,
}

impl Model {
    /// Create a new empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a position, returning its index
    pub fn add_position(&mut self, position: Point3f) -> usize {
        self.positions.push(position);
        self.positions.len() - 1
    }

    pub fn add_normal(&mut self, normal: Vector3f) -> usize {
        self.normals.push(normal);
        self.normals.len() - 1
    }

    pub fn add_tex_coord(&mut self, tex_coord: TexCoord2) -> usize {
        self.tex_coords.push(tex_coord);
        self.tex_coords.len() - 1
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn add_quad(&mut self, quad: Quad) {
        self.quads.push(quad);
    }

    pub fn add_fan(&mut self, fan: Fan) {
        self.fans.push(fan);
    }

    /// Look up a position
    pub fn position(&self, index: usize) -> Result<Point3f> {
        self.positions
            .get(index)
            .copied()
            .ok_or(Error::IndexOutOfRange {
                kind: "position",
                index,
                len: self.positions.len(),
            })
    }

    /// Look up a vertex normal
    pub fn vertex_normal(&self, index: usize) -> Result<Vector3f> {
        self.normals
            .get(index)
            .copied()
            .ok_or(Error::IndexOutOfRange {
                kind: "normal",
                index,
                len: self.normals.len(),
            })
    }

    /// Look up a texture coordinate
    pub fn tex_coord(&self, index: usize) -> Result<TexCoord2> {
        self.tex_coords
            .get(index)
            .copied()
            .ok_or(Error::IndexOutOfRange {
                kind: "texcoord",
                index,
                len: self.tex_coords.len(),
            })
    }

    /// Positions of a fixed-size set of corners
    pub fn positions_of<const N: usize>(&self, corners: &[VertexRef; N]) -> Result<[Point3f; N]> {
        let mut out = [Point3f::origin(); N];
        for (slot, corner) in out.iter_mut().zip(corners) {
            *slot = self.position(corner.position)?;
        }
        Ok(out)
    }

    /// Unit normal of a triangle or quad
    pub fn normal<F: Face>(&self, face: &F) -> Result<Vector3f> {
        face.normal_in(self)
    }

    /// Borrow a fan, failing on a bad index
    pub fn fan(&self, index: usize) -> Result<&Fan> {
        let len = self.fans.len();
        self.fans.get(index).ok_or(Error::IndexOutOfRange {
            kind: "fan",
            index,
            len,
        })
    }

    /// Plain triangles followed by the triangles every fan stands for
    pub fn expanded_triangles(&self) -> Vec<Triangle> {
        let mut out = self.triangles.clone();
        for fan in &self.fans {
            out.extend(fan.triangles());
        }
        out
    }

    /// Number of triangles a triangle-soup encoding of this model holds
    pub fn soup_triangle_count(&self) -> usize {
        self.triangles.len()
            + self.quads.len() * 2
            + self.fans.iter().map(Fan::len).sum::<usize>()
    }

    /// Check if the model has no faces at all
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
            && self.quads.is_empty()
            && self.fans.is_empty()
            && self.strips.is_empty()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Model(vertices={}, normals={}, texcoords={}, triangles={}, quads={}, fans={})",
            self.positions.len(),
            self.normals.len(),
            self.tex_coords.len(),
            self.triangles.len(),
            self.quads.len(),
            self.fans.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_with_fan() -> Model {
        let mut model = Model::new();
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.5, 0.5)] {
            model.add_position(Point3f::new(x, y, 0.0));
        }
        model.add_triangle(Triangle::from_positions(0, 1, 2));
        model.add_quad(Quad::from_positions(0, 1, 2, 3));
        model.add_fan(Fan::with_blades(
            VertexRef::new(4),
            (0..4).map(VertexRef::new).collect(),
        ));
        model
    }

    #[test]
    fn test_add_position_returns_index() {
        let mut model = Model::new();
        assert_eq!(model.add_position(Point3f::origin()), 0);
        assert_eq!(model.add_position(Point3f::new(1.0, 0.0, 0.0)), 1);
        assert!(model.is_empty());
    }

    #[test]
    fn test_lookups_report_out_of_range() {
        let model = square_with_fan();
        assert!(model.position(4).is_ok());
        assert!(matches!(
            model.position(5),
            Err(Error::IndexOutOfRange { kind: "position", index: 5, len: 5 })
        ));
        assert!(model.vertex_normal(0).is_err());
        assert!(model.tex_coord(0).is_err());
        assert!(model.fan(1).is_err());
    }

    #[test]
    fn test_expanded_triangles_include_fans() {
        let model = square_with_fan();
        let tris = model.expanded_triangles();
        assert_eq!(tris.len(), 1 + 4);
        assert_eq!(tris[1].positions(), [4, 3, 0]);
        assert_eq!(model.soup_triangle_count(), 1 + 2 + 4);
    }

    #[test]
    fn test_display_summary() {
        let model = square_with_fan();
        assert_eq!(
            model.to_string(),
            "Model(vertices=5, normals=0, texcoords=0, triangles=1, quads=1, fans=1)"
        );
    }
}
