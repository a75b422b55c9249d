//! Core data structures and traits for shzmdl
//!
//! This crate provides the geometry store shared by every shzmdl pass:
//! vertex attribute arrays, index-based vertex references, and the
//! triangle, quad and fan face records that point into them.

pub mod point;
pub mod face;
pub mod mesh;
pub mod traits;
pub mod error;

pub use point::*;
pub use face::*;
pub use mesh::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};
