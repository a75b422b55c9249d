//! # shzmdl
//!
//! Triangle fan extraction and block-aligned model encoding for
//! fixed-function renderers.
//!
//! This is the umbrella crate that provides convenient access to all shzmdl
//! functionality. You can use this crate to get everything in one place, or
//! use individual crates for more granular control over dependencies.
//!
//! ## Crates
//!
//! - **Core**: model, vertex references and face types
//! - **Fans**: fan extraction, shedding and collapse
//! - **I/O**: OBJ, binary STL and `.shzmdl`
//!
//! ## Quick Start
//!
//! ```no_run
//! use shzmdl::prelude::*;
//!
//! # fn main() -> shzmdl::Result<()> {
//! let mut pipeline = Pipeline::from_obj("sphere.obj")?;
//! let report = pipeline.extract_fans();
//! println!("{} fans", report.fans_created);
//!
//! pipeline.write_legacy("sphere.stl")?;
//! pipeline.write_native("sphere.shzmdl")?;
//! # Ok(())
//! # }
//! ```

pub mod pipeline;

// Re-export core functionality
pub use shzmdl_core::*;

// Re-export sub-crates
pub use shzmdl_fans as fans;
pub use shzmdl_io as io;

pub use pipeline::{Pipeline, PipelineConfig};

/// Convenient imports for common use cases
pub mod prelude {
    pub use shzmdl_core::*;
    pub use shzmdl_fans::*;
    pub use shzmdl_io::*;

    pub use crate::pipeline::{Pipeline, PipelineConfig};
}
