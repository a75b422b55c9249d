//! Block-aligned `.shzmdl` encoding
//!
//! Every section starts on a 32-byte block boundary and the header
//! addresses sections in block units, so a consumer can jump straight to
//! any section.
//!
//! ```text
//! header (1 block)
//!   u32 version
//!   u32 offset[4]        triangles, quads, fans, strips (blocks)
//!   u32 triangle_count
//!   u32 quad_count
//!   u8  model_type
//!   u8  _pad[3]
//! triangles              48 bytes each: normal, v0, v1, v2; section padded
//! quads                  64 bytes each: normal, v0..v3, 4 zero bytes
//! fans                   linked records, each padded to whole blocks:
//!   u32 vertex_count
//!   f32 center[3]
//!   f32 normal[3]        always zero
//!   u32 next             block offset of the next record, 0 for the last
//!   { f32 position[3], f32 normal[3] } * vertex_count
//! ```
//!
//! An empty section takes the offset of the first non-empty section after
//! it. When no later section holds data its offset is 0, so a file with no
//! faces at all has an all-zero offset table.

use crate::binary::{read_point, read_vec3, to_u32, write_point, write_vec3, write_zeros};
use crate::ModelWriter;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use shzmdl_core::{Error, Fan, Model, Point3f, Result, Triangle, Vector3f};
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::info;

pub const BLOCK_SIZE: usize = 32;
pub const HEADER_SIZE: usize = BLOCK_SIZE;
/// Header bytes holding fields; the rest of the block is zero padding
pub const HEADER_FIELDS_SIZE: usize = 4 + 4 * 4 + 4 + 4 + 1;
pub const TRIANGLE_RECORD_SIZE: usize = 48;
pub const QUAD_RECORD_SIZE: usize = 64;
pub const FAN_HEADER_SIZE: usize = 32;
pub const FAN_ENTRY_SIZE: usize = 24;
pub const FORMAT_VERSION: u32 = 1;

/// Vertex attribute flags stored in the header's type byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ModelType {
    Untextured = 0,
    TextureCoords = 1,
    VertexNormals = 2,
    #[default]
    FaceNormals = 4,
}

impl ModelType {
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Untextured),
            1 => Some(Self::TextureCoords),
            2 => Some(Self::VertexNormals),
            4 => Some(Self::FaceNormals),
            _ => None,
        }
    }
}

/// Options for native output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeWriteOptions {
    pub version: u32,
    pub model_type: ModelType,
}

impl Default for NativeWriteOptions {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            model_type: ModelType::default(),
        }
    }
}

/// Number of whole blocks needed for `bytes`
pub fn blocks_for(bytes: usize) -> usize {
    bytes.div_ceil(BLOCK_SIZE)
}

/// Header offset table, in blocks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionOffsets {
    pub triangles: u32,
    pub quads: u32,
    pub fans: u32,
    pub strips: u32,
}

impl SectionOffsets {
    fn as_array(&self) -> [u32; 4] {
        [self.triangles, self.quads, self.fans, self.strips]
    }
}

/// Placement of one fan record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanRecordLayout {
    /// Block offset of the record
    pub offset: u32,
    pub blocks: u32,
    /// Block offset of the following record, 0 for the last
    pub next: u32,
}

/// Every offset and size of a native file, computed before writing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeLayout {
    pub offsets: SectionOffsets,
    pub triangle_count: u32,
    pub quad_count: u32,
    pub triangle_blocks: u32,
    pub quad_blocks: u32,
    pub fans: Vec<FanRecordLayout>,
    pub total_blocks: u32,
}

impl NativeLayout {
    /// Lay out the sections for the model's current faces
    pub fn plan(model: &Model) -> Result<Self> {
        let triangle_count = to_u32(model.triangles.len(), "triangle count")?;
        let quad_count = to_u32(model.quads.len(), "quad count")?;
        let triangle_blocks = blocks_for(model.triangles.len() * TRIANGLE_RECORD_SIZE);
        let quad_blocks = blocks_for(model.quads.len() * QUAD_RECORD_SIZE);

        let mut cursor = blocks_for(HEADER_SIZE);
        let triangle_start = cursor;
        cursor += triangle_blocks;
        let quad_start = cursor;
        cursor += quad_blocks;
        let fan_start = cursor;

        let mut fans = Vec::with_capacity(model.fans.len());
        for (i, fan) in model.fans.iter().enumerate() {
            let blocks = fan_record_blocks(fan);
            let offset = to_u32(cursor, "fan offset")?;
            cursor += blocks;
            let next = if i + 1 < model.fans.len() {
                to_u32(cursor, "fan offset")?
            } else {
                0
            };
            fans.push(FanRecordLayout {
                offset,
                blocks: to_u32(blocks, "fan size")?,
                next,
            });
        }
        // strips are never encoded
        let strip_start = cursor;

        let starts = [triangle_start, quad_start, fan_start, strip_start];
        let present = [
            !model.triangles.is_empty(),
            !model.quads.is_empty(),
            !model.fans.is_empty(),
            false,
        ];
        let mut offsets = [0u32; 4];
        for i in 0..4 {
            if present[i..].iter().any(|&p| p) {
                offsets[i] = to_u32(starts[i], "section offset")?;
            }
        }

        Ok(Self {
            offsets: SectionOffsets {
                triangles: offsets[0],
                quads: offsets[1],
                fans: offsets[2],
                strips: offsets[3],
            },
            triangle_count,
            quad_count,
            triangle_blocks: to_u32(triangle_blocks, "triangle section size")?,
            quad_blocks: to_u32(quad_blocks, "quad section size")?,
            fans,
            total_blocks: to_u32(cursor, "file size")?,
        })
    }

    pub fn total_bytes(&self) -> usize {
        self.total_blocks as usize * BLOCK_SIZE
    }
}

fn fan_record_blocks(fan: &Fan) -> usize {
    blocks_for(FAN_HEADER_SIZE + fan.len() * FAN_ENTRY_SIZE)
}

/// Zero bytes that round `bytes` up to a whole block
fn padding_for(bytes: usize) -> usize {
    blocks_for(bytes) * BLOCK_SIZE - bytes
}

pub struct NativeWriter;

impl NativeWriter {
    /// Write the model and return the layout that was used
    pub fn write_to<W: Write>(model: &Model, w: &mut W, options: &NativeWriteOptions) -> Result<NativeLayout> {
        let layout = NativeLayout::plan(model)?;

        w.write_u32::<LittleEndian>(options.version)?;
        for offset in layout.offsets.as_array() {
            w.write_u32::<LittleEndian>(offset)?;
        }
        w.write_u32::<LittleEndian>(layout.triangle_count)?;
        w.write_u32::<LittleEndian>(layout.quad_count)?;
        w.write_u8(options.model_type.tag())?;
        write_zeros(w, HEADER_SIZE - HEADER_FIELDS_SIZE)?;

        for tri in &model.triangles {
            write_vec3(w, &model.normal(tri)?)?;
            for p in &model.positions_of(&tri.corners)? {
                write_point(w, p)?;
            }
        }
        write_zeros(w, padding_for(model.triangles.len() * TRIANGLE_RECORD_SIZE))?;

        for quad in &model.quads {
            write_vec3(w, &model.normal(quad)?)?;
            for p in &model.positions_of(&quad.corners)? {
                write_point(w, p)?;
            }
            write_zeros(w, 4)?;
        }

        for (fan, record) in model.fans.iter().zip(&layout.fans) {
            let center = model.position(fan.center.position)?;
            w.write_u32::<LittleEndian>(to_u32(fan.len(), "fan vertex count")?)?;
            write_point(w, &center)?;
            write_vec3(w, &Vector3f::zeros())?;
            w.write_u32::<LittleEndian>(record.next)?;
            for (prev, cur) in fan.edges() {
                write_point(w, &model.position(cur.position)?)?;
                write_vec3(w, &model.normal(&Triangle::new(fan.center, prev, cur))?)?;
            }
            write_zeros(w, padding_for(FAN_HEADER_SIZE + fan.len() * FAN_ENTRY_SIZE))?;
        }

        info!(
            triangles = layout.triangle_count,
            quads = layout.quad_count,
            fans = layout.fans.len(),
            bytes = layout.total_bytes(),
            "shzmdl written"
        );
        Ok(layout)
    }

    /// Encode the model into a byte vector
    pub fn to_bytes(model: &Model, options: &NativeWriteOptions) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        Self::write_to(model, &mut out, options)?;
        Ok(out)
    }

    /// Write the model to `path`, returning the layout that was used
    pub fn write_with_options<P: AsRef<Path>>(
        model: &Model,
        path: P,
        options: &NativeWriteOptions,
    ) -> Result<NativeLayout> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let layout = Self::write_to(model, &mut writer, options)?;
        writer.flush()?;
        Ok(layout)
    }
}

impl ModelWriter for NativeWriter {
    fn write_model<P: AsRef<Path>>(model: &Model, path: P) -> Result<()> {
        Self::write_with_options(model, path, &NativeWriteOptions::default()).map(|_| ())
    }
}

/// Decoded header block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeHeader {
    pub version: u32,
    pub offsets: SectionOffsets,
    pub triangle_count: u32,
    pub quad_count: u32,
    /// Raw type byte; see [`ModelType::from_tag`]
    pub model_type: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleRecord {
    pub normal: Vector3f,
    pub vertices: [Point3f; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadRecord {
    pub normal: Vector3f,
    pub vertices: [Point3f; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BladeRecord {
    pub position: Point3f,
    /// Normal of the triangle ending on this blade
    pub normal: Vector3f,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FanRecord {
    /// Block offset the record was read from
    pub offset: u32,
    pub center: Point3f,
    pub next: u32,
    pub blades: Vec<BladeRecord>,
}

/// A decoded `.shzmdl` file
#[derive(Debug, Clone, PartialEq)]
pub struct NativeFile {
    pub header: NativeHeader,
    pub triangles: Vec<TriangleRecord>,
    pub quads: Vec<QuadRecord>,
    pub fans: Vec<FanRecord>,
}

/// Reads `.shzmdl` data the way the renderer walks it: straight to each
/// section through the header, then along the fan chain.
pub struct NativeReader;

impl NativeReader {
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<NativeFile> {
        let bytes = std::fs::read(path)?;
        Self::read_bytes(&bytes)
    }

    pub fn read_bytes(bytes: &[u8]) -> Result<NativeFile> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::InvalidData(format!(
                "shzmdl data is {} bytes, shorter than its header",
                bytes.len()
            )));
        }
        let mut r = Cursor::new(bytes);
        let version = r.read_u32::<LittleEndian>()?;
        let mut offsets = [0u32; 4];
        for offset in offsets.iter_mut() {
            *offset = r.read_u32::<LittleEndian>()?;
        }
        let triangle_count = r.read_u32::<LittleEndian>()?;
        let quad_count = r.read_u32::<LittleEndian>()?;
        let model_type = r.read_u8()?;
        let header = NativeHeader {
            version,
            offsets: SectionOffsets {
                triangles: offsets[0],
                quads: offsets[1],
                fans: offsets[2],
                strips: offsets[3],
            },
            triangle_count,
            quad_count,
            model_type,
        };

        let triangles = read_section(&mut r, header.offsets.triangles, triangle_count, TRIANGLE_RECORD_SIZE, "triangle", |r| {
            Ok(TriangleRecord {
                normal: read_vec3(r)?,
                vertices: [read_point(r)?, read_point(r)?, read_point(r)?],
            })
        })?;
        let quads = read_section(&mut r, header.offsets.quads, quad_count, QUAD_RECORD_SIZE, "quad", |r| {
            Ok(QuadRecord {
                normal: read_vec3(r)?,
                vertices: [read_point(r)?, read_point(r)?, read_point(r)?, read_point(r)?],
            })
        })?;

        let mut fans = Vec::new();
        let mut offset = header.offsets.fans;
        while offset != 0 {
            let fan = read_fan(&mut r, offset)?;
            if fan.next != 0 && fan.next <= offset {
                return Err(Error::InvalidData(format!(
                    "fan record at block {} links backwards to block {}",
                    offset, fan.next
                )));
            }
            offset = fan.next;
            fans.push(fan);
        }

        Ok(NativeFile {
            header,
            triangles,
            quads,
            fans,
        })
    }
}

fn seek_block(r: &mut Cursor<&[u8]>, block: u32, bytes: usize, what: &str) -> Result<()> {
    let start = block as usize * BLOCK_SIZE;
    if start + bytes > r.get_ref().len() {
        return Err(Error::InvalidData(format!(
            "{} data at block {} runs past the end of the file",
            what, block
        )));
    }
    r.seek(SeekFrom::Start(start as u64))?;
    Ok(())
}

fn read_section<'a, T>(
    r: &mut Cursor<&'a [u8]>,
    block: u32,
    count: u32,
    record_size: usize,
    what: &str,
    mut read: impl FnMut(&mut Cursor<&'a [u8]>) -> std::io::Result<T>,
) -> Result<Vec<T>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    if block == 0 {
        return Err(Error::InvalidData(format!(
            "{} count is {} but the section is absent",
            what, count
        )));
    }
    seek_block(r, block, count as usize * record_size, what)?;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let start = r.position();
        out.push(read(r)?);
        r.seek(SeekFrom::Start(start + record_size as u64))?;
    }
    Ok(out)
}

fn read_fan(r: &mut Cursor<&[u8]>, offset: u32) -> Result<FanRecord> {
    seek_block(r, offset, FAN_HEADER_SIZE, "fan")?;
    let count = r.read_u32::<LittleEndian>()? as usize;
    let center = read_point(r)?;
    let _normal = read_vec3(r)?;
    let next = r.read_u32::<LittleEndian>()?;
    seek_block(r, offset, FAN_HEADER_SIZE + count * FAN_ENTRY_SIZE, "fan")?;
    r.seek(SeekFrom::Current(FAN_HEADER_SIZE as i64))?;

    let mut blades = Vec::with_capacity(count);
    for _ in 0..count {
        blades.push(BladeRecord {
            position: read_point(r)?,
            normal: read_vec3(r)?,
        });
    }
    Ok(FanRecord {
        offset,
        center,
        next,
        blades,
    })
}
