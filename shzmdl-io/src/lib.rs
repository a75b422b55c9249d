//! Model file formats
//!
//! Wavefront OBJ for reading and writing, binary STL as the legacy
//! triangle-soup output, and the block-aligned `.shzmdl` native encoding.

mod binary;
pub mod native;
pub mod obj;
pub mod stl;

pub use native::{
    FanRecord, ModelType, NativeFile, NativeHeader, NativeLayout, NativeReader, NativeWriteOptions,
    NativeWriter, SectionOffsets,
};
pub use obj::{ObjReadOptions, ObjReader, ObjWriter, PolygonPolicy};
pub use stl::{StlWriteOptions, StlWriter};

use shzmdl_core::{Error, Model, Result};
use std::path::Path;

/// Trait for reading models from files
pub trait ModelReader {
    fn read_model<P: AsRef<Path>>(path: P) -> Result<Model>;
}

/// Trait for writing models to files
pub trait ModelWriter {
    fn write_model<P: AsRef<Path>>(model: &Model, path: P) -> Result<()>;
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
}

/// Auto-detect format and read a model
pub fn read_model<P: AsRef<Path>>(path: P) -> Result<Model> {
    let path = path.as_ref();
    match extension(path).as_deref() {
        Some("obj") => ObjReader::read_model(path),
        _ => Err(Error::UnsupportedFormat(format!(
            "Unsupported model input format: {:?}",
            path.extension()
        ))),
    }
}

/// Auto-detect format and write a model
pub fn write_model<P: AsRef<Path>>(model: &Model, path: P) -> Result<()> {
    let path = path.as_ref();
    match extension(path).as_deref() {
        Some("obj") => ObjWriter::write_model(model, path),
        Some("stl") => StlWriter::write_model(model, path),
        Some("shzmdl") => NativeWriter::write_model(model, path),
        _ => Err(Error::UnsupportedFormat(format!(
            "Unsupported model output format: {:?}",
            path.extension()
        ))),
    }
}
