//! Core traits for shzmdl

use crate::{face::*, mesh::Model, point::*, Result};

/// A polygon whose corners index into a [`Model`]
pub trait Face {
    /// Corner references in winding order
    fn corners(&self) -> &[VertexRef];

    /// Unit face normal; degenerate faces give the zero vector
    fn normal_in(&self, model: &Model) -> Result<Vector3f>;
}

impl Face for Triangle {
    fn corners(&self) -> &[VertexRef] {
        &self.corners
    }

    fn normal_in(&self, model: &Model) -> Result<Vector3f> {
        let [p0, p1, p2] = model.positions_of(&self.corners)?;
        Ok(normalize_or_zero((p1 - p0).cross(&(p2 - p0))))
    }
}

impl Face for Quad {
    fn corners(&self) -> &[VertexRef] {
        &self.corners
    }

    /// Computed from the diagonals, so it does not depend on the split.
    fn normal_in(&self, model: &Model) -> Result<Vector3f> {
        let [p0, p1, p2, p3] = model.positions_of(&self.corners)?;
        Ok(normalize_or_zero((p0 - p2).cross(&(p1 - p3))))
    }
}
