//! OBJ format support
//!
//! Reads `v`, `vn`, `vt` and `f` records. Face corners are
//! `position[/texcoord[/normal]]` groups with 1-based indices; a missing
//! or empty texcoord/normal field leaves that attribute unset. Other
//! record kinds (comments, groups, materials) are ignored.
//!
//! Writing emits the same record kinds. Fans have no OBJ equivalent and are
//! written out as their triangles.

use crate::{ModelReader, ModelWriter};
use serde::{Deserialize, Serialize};
use shzmdl_core::{Error, Model, Point3f, Quad, Result, TexCoord2, Triangle, Vector3f, VertexRef};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::SplitWhitespace;
use tracing::{info, warn};

pub struct ObjReader;
pub struct ObjWriter;

/// What to do with faces that are neither triangles nor quads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PolygonPolicy {
    /// Drop the face and log a warning
    #[default]
    Skip,
    /// Fail with a decode error
    Reject,
}

/// Options for reading OBJ files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjReadOptions {
    pub polygon_policy: PolygonPolicy,
}

impl ObjReadOptions {
    pub fn with_polygon_policy(mut self, policy: PolygonPolicy) -> Self {
        self.polygon_policy = policy;
        self
    }
}

/// A parsed face waiting for its indices to be checked
struct PendingFace {
    line: usize,
    corners: Vec<VertexRef>,
}

impl ObjReader {
    /// Read an OBJ file with explicit options
    pub fn read_with_options<P: AsRef<Path>>(path: P, options: &ObjReadOptions) -> Result<Model> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file), options)
    }

    /// Parse OBJ text from any buffered reader
    pub fn read_from<R: BufRead>(mut reader: R, options: &ObjReadOptions) -> Result<Model> {
        let mut model = Model::new();
        let mut faces = Vec::new();
        let mut skipped = 0usize;
        let mut buf = Vec::new();
        let mut line_no = 0usize;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;
            let line = std::str::from_utf8(&buf)
                .map_err(|e| Error::decode(line_no, format!("line is not valid UTF-8: {}", e)))?;
            let mut parts = line.split_whitespace();
            let Some(tag) = parts.next() else {
                continue;
            };
            match tag {
                "v" => {
                    let [x, y, z] = parse_floats::<3>(parts, line_no, "vertex")?;
                    model.add_position(Point3f::new(x, y, z));
                }
                "vn" => {
                    let [x, y, z] = parse_floats::<3>(parts, line_no, "normal")?;
                    model.add_normal(Vector3f::new(x, y, z));
                }
                "vt" => {
                    let [u, v] = parse_floats::<2>(parts, line_no, "texcoord")?;
                    model.add_tex_coord(TexCoord2::new(u, v));
                }
                "f" => {
                    let corners = parts
                        .map(|group| parse_group(group, line_no))
                        .collect::<Result<Vec<_>>>()?;
                    match corners.len() {
                        0..=2 => {
                            return Err(Error::decode(
                                line_no,
                                format!("face needs at least 3 vertices, got {}", corners.len()),
                            ))
                        }
                        3 | 4 => faces.push(PendingFace {
                            line: line_no,
                            corners,
                        }),
                        n => match options.polygon_policy {
                            PolygonPolicy::Skip => {
                                warn!(line = line_no, vertices = n, "skipping polygon face");
                                skipped += 1;
                            }
                            PolygonPolicy::Reject => {
                                return Err(Error::decode(
                                    line_no,
                                    format!("faces of {} vertices are not supported", n),
                                ))
                            }
                        },
                    }
                }
                _ => {}
            }
        }

        for face in faces {
            for corner in &face.corners {
                check_corner(&model, corner, face.line)?;
            }
            match face.corners[..] {
                [a, b, c] => model.add_triangle(Triangle::new(a, b, c)),
                [a, b, c, d] => model.add_quad(Quad::new(a, b, c, d)),
                _ => {}
            }
        }

        info!(model = %model, skipped, "obj read");
        Ok(model)
    }
}

impl ModelReader for ObjReader {
    fn read_model<P: AsRef<Path>>(path: P) -> Result<Model> {
        Self::read_with_options(path, &ObjReadOptions::default())
    }
}

impl ObjWriter {
    /// Write OBJ text to any writer
    pub fn write_to<W: Write>(model: &Model, w: &mut W) -> Result<()> {
        writeln!(w, "# {}", model)?;
        for p in &model.positions {
            writeln!(w, "v {} {} {}", p.x, p.y, p.z)?;
        }
        for n in &model.normals {
            writeln!(w, "vn {} {} {}", n.x, n.y, n.z)?;
        }
        for t in &model.tex_coords {
            writeln!(w, "vt {} {}", t.u, t.v)?;
        }
        for tri in &model.triangles {
            write_face(w, &tri.corners)?;
        }
        for quad in &model.quads {
            write_face(w, &quad.corners)?;
        }
        for fan in &model.fans {
            for tri in fan.triangles() {
                write_face(w, &tri.corners)?;
            }
        }
        Ok(())
    }
}

impl ModelWriter for ObjWriter {
    fn write_model<P: AsRef<Path>>(model: &Model, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(model, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

fn parse_floats<const N: usize>(
    mut parts: SplitWhitespace<'_>,
    line: usize,
    what: &str,
) -> Result<[f32; N]> {
    let mut out = [0.0; N];
    for slot in out.iter_mut() {
        let token = parts
            .next()
            .ok_or_else(|| Error::decode(line, format!("{} needs {} components", what, N)))?;
        *slot = token
            .parse()
            .map_err(|_| Error::decode(line, format!("invalid {} component `{}`", what, token)))?;
    }
    Ok(out)
}

/// Parse one `v[/t[/n]]` corner group into 0-based indices
fn parse_group(group: &str, line: usize) -> Result<VertexRef> {
    let mut fields = group.split('/');
    let position = match fields.next() {
        Some(s) if !s.is_empty() => parse_index(s, group, line)?,
        _ => {
            return Err(Error::decode(
                line,
                format!("index group `{}` has no position", group),
            ))
        }
    };
    let tex_coord = parse_optional_index(fields.next(), group, line)?;
    let normal = parse_optional_index(fields.next(), group, line)?;
    if fields.next().is_some() {
        return Err(Error::decode(
            line,
            format!("index group `{}` has too many fields", group),
        ));
    }
    Ok(VertexRef::with_attributes(position, normal, tex_coord))
}

fn parse_optional_index(field: Option<&str>, group: &str, line: usize) -> Result<Option<usize>> {
    match field {
        Some(s) if !s.is_empty() => parse_index(s, group, line).map(Some),
        _ => Ok(None),
    }
}

fn parse_index(field: &str, group: &str, line: usize) -> Result<usize> {
    match field.parse::<usize>() {
        Ok(0) => Err(Error::decode(
            line,
            format!("index group `{}` uses 0, indices are 1-based", group),
        )),
        Ok(i) => Ok(i - 1),
        Err(_) => Err(Error::decode(
            line,
            format!("invalid index `{}` in group `{}`", field, group),
        )),
    }
}

fn check_corner(model: &Model, corner: &VertexRef, line: usize) -> Result<()> {
    let out_of_range = |kind: &str, index: usize, len: usize| {
        Error::decode(
            line,
            format!("{} index {} out of range ({} defined)", kind, index + 1, len),
        )
    };
    if corner.position >= model.positions.len() {
        return Err(out_of_range("position", corner.position, model.positions.len()));
    }
    if let Some(n) = corner.normal.filter(|&n| n >= model.normals.len()) {
        return Err(out_of_range("normal", n, model.normals.len()));
    }
    if let Some(t) = corner.tex_coord.filter(|&t| t >= model.tex_coords.len()) {
        return Err(out_of_range("texcoord", t, model.tex_coords.len()));
    }
    Ok(())
}

fn write_face<W: Write>(w: &mut W, corners: &[VertexRef]) -> Result<()> {
    write!(w, "f")?;
    for c in corners {
        match (c.tex_coord, c.normal) {
            (None, None) => write!(w, " {}", c.position + 1)?,
            (Some(t), None) => write!(w, " {}/{}", c.position + 1, t + 1)?,
            (None, Some(n)) => write!(w, " {}//{}", c.position + 1, n + 1)?,
            (Some(t), Some(n)) => write!(w, " {}/{}/{}", c.position + 1, t + 1, n + 1)?,
        }
    }
    writeln!(w)?;
    Ok(())
}
