//! Triangle fan passes
//!
//! This crate rewrites the faces of a [`shzmdl_core::Model`] in place:
//! - Fan extraction: high-valence vertices become fan records
//! - Shedding: inset a fan's ring, bridging the gap with quads
//! - Collapse: turn a fan's ring back into plain triangles

pub mod extraction;
pub mod shed;
pub mod collapse;

pub use extraction::*;
pub use shed::*;
pub use collapse::*;
