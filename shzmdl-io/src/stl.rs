//! Binary STL output
//!
//! Layout: an 80-byte header, a little-endian `u32` triangle count at
//! offset 80, then one 50-byte record per triangle (normal, three
//! vertices, a zero `u16` attribute). The count is patched in after the
//! body has been written.
//!
//! Quads become two records split along v0-v2, both carrying the quad's
//! diagonal normal. Each fan becomes one record per blade,
//! `(center, previous, current)`.

use crate::binary::{write_point, write_vec3};
use crate::ModelWriter;
use byteorder::{LittleEndian, WriteBytesExt};
use serde::{Deserialize, Serialize};
use shzmdl_core::{Model, Result, Triangle, Vector3f};
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::info;

pub const STL_HEADER_LEN: usize = 80;
pub const STL_RECORD_LEN: usize = 50;

/// Options for STL output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StlWriteOptions {
    /// Text for the header region, truncated to 80 bytes and zero padded
    pub header: String,
}

impl StlWriteOptions {
    pub fn with_header<S: Into<String>>(mut self, header: S) -> Self {
        self.header = header.into();
        self
    }
}

pub struct StlWriter;

impl StlWriter {
    /// Write the model, returning the number of triangle records
    pub fn write_to<W: Write + Seek>(model: &Model, w: &mut W, options: &StlWriteOptions) -> Result<u32> {
        let base = w.stream_position()?;

        let mut header = [0u8; STL_HEADER_LEN];
        let text = options.header.as_bytes();
        let len = text.len().min(STL_HEADER_LEN);
        header[..len].copy_from_slice(&text[..len]);
        w.write_all(&header)?;
        w.write_u32::<LittleEndian>(0)?;

        let mut count = 0u32;
        for tri in &model.triangles {
            write_record(w, model, tri, model.normal(tri)?)?;
            count += 1;
        }
        for quad in &model.quads {
            let normal = model.normal(quad)?;
            for half in quad.split() {
                write_record(w, model, &half, normal)?;
                count += 1;
            }
        }
        for fan in &model.fans {
            for tri in fan.triangles() {
                write_record(w, model, &tri, model.normal(&tri)?)?;
                count += 1;
            }
        }

        let end = w.stream_position()?;
        w.seek(SeekFrom::Start(base + STL_HEADER_LEN as u64))?;
        w.write_u32::<LittleEndian>(count)?;
        w.seek(SeekFrom::Start(end))?;

        info!(triangles = count, "stl written");
        Ok(count)
    }

    /// Encode the model into a byte vector
    pub fn to_bytes(model: &Model, options: &StlWriteOptions) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        Self::write_to(model, &mut cursor, options)?;
        Ok(cursor.into_inner())
    }

    /// Write the model to `path`, returning the number of triangle records
    pub fn write_with_options<P: AsRef<Path>>(model: &Model, path: P, options: &StlWriteOptions) -> Result<u32> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let count = Self::write_to(model, &mut writer, options)?;
        writer.flush()?;
        Ok(count)
    }
}

impl ModelWriter for StlWriter {
    fn write_model<P: AsRef<Path>>(model: &Model, path: P) -> Result<()> {
        Self::write_with_options(model, path, &StlWriteOptions::default()).map(|_| ())
    }
}

fn write_record<W: Write>(w: &mut W, model: &Model, tri: &Triangle, normal: Vector3f) -> Result<()> {
    write_vec3(w, &normal)?;
    for p in &model.positions_of(&tri.corners)? {
        write_point(w, p)?;
    }
    w.write_u16::<LittleEndian>(0)?;
    Ok(())
}
