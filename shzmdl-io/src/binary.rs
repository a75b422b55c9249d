//! Little-endian helpers shared by the binary writers and reader

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use shzmdl_core::{Error, Point3f, Result, Vector3f};
use std::io::{self, Read, Write};

pub(crate) fn write_vec3<W: Write>(w: &mut W, v: &Vector3f) -> io::Result<()> {
    w.write_f32::<LittleEndian>(v.x)?;
    w.write_f32::<LittleEndian>(v.y)?;
    w.write_f32::<LittleEndian>(v.z)
}

pub(crate) fn write_point<W: Write>(w: &mut W, p: &Point3f) -> io::Result<()> {
    write_vec3(w, &p.coords)
}

pub(crate) fn write_zeros<W: Write>(w: &mut W, len: usize) -> io::Result<()> {
    const ZEROS: [u8; 32] = [0; 32];
    let mut left = len;
    while left > 0 {
        let n = left.min(ZEROS.len());
        w.write_all(&ZEROS[..n])?;
        left -= n;
    }
    Ok(())
}

pub(crate) fn read_vec3<R: Read>(r: &mut R) -> io::Result<Vector3f> {
    let x = r.read_f32::<LittleEndian>()?;
    let y = r.read_f32::<LittleEndian>()?;
    let z = r.read_f32::<LittleEndian>()?;
    Ok(Vector3f::new(x, y, z))
}

pub(crate) fn read_point<R: Read>(r: &mut R) -> io::Result<Point3f> {
    read_vec3(r).map(Point3f::from)
}

/// Narrow a count or offset to the 32-bit fields the formats store
pub(crate) fn to_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| Error::InvalidData(format!("{} {} does not fit in 32 bits", what, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_vec3_is_little_endian() {
        let mut buf = Vec::new();
        write_vec3(&mut buf, &Vector3f::new(1.0, -2.0, 0.5)).unwrap();
        assert_eq!(buf.len(), 12);
        assert_eq!(&buf[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&buf[4..8], &(-2.0f32).to_le_bytes());

        let back = read_point(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(back, Point3f::new(1.0, -2.0, 0.5));
    }

    #[test]
    fn test_write_zeros_spans_chunks() {
        let mut buf = Vec::new();
        write_zeros(&mut buf, 70).unwrap();
        assert_eq!(buf, vec![0u8; 70]);
    }
}
