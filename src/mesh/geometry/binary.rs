//! Binary elevation-grid serialization
//!
//! Layout (big-endian, no padding):
//! - `width: i32`, `height: i32`
//! - `x_resolution: f32`, `z_resolution: f32`
//! - `height` rows of `width` elevations (`f32`), top row first
//!
//! The grid consumer reads this layout verbatim, so field order and byte
//! order must not change.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// Size of the fixed header in bytes
pub const GRID_HEADER_LEN: usize = 16;

/// Fixed header of a binary elevation grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridHeader {
    pub width: i32,
    pub height: i32,
    pub x_resolution: f32,
    pub z_resolution: f32,
}

/// Write a header followed by rows of elevations
pub fn write_grid_binary<W: Write>(
    writer: &mut W,
    header: &GridHeader,
    rows: &[Vec<f32>],
) -> io::Result<()> {
    writer.write_i32::<BigEndian>(header.width)?;
    writer.write_i32::<BigEndian>(header.height)?;
    writer.write_f32::<BigEndian>(header.x_resolution)?;
    writer.write_f32::<BigEndian>(header.z_resolution)?;
    for row in rows {
        for &elevation in row {
            writer.write_f32::<BigEndian>(elevation)?;
        }
    }
    Ok(())
}

/// Read a grid back into its header and the flat elevation list
///
/// Exactly `width * height` samples are read; a payload that ends early,
/// even part way through a sample, is an `UnexpectedEof` error.
pub fn read_grid_binary<R: Read>(reader: &mut R) -> io::Result<(GridHeader, Vec<f32>)> {
    let header = GridHeader {
        width: reader.read_i32::<BigEndian>()?,
        height: reader.read_i32::<BigEndian>()?,
        x_resolution: reader.read_f32::<BigEndian>()?,
        z_resolution: reader.read_f32::<BigEndian>()?,
    };
    if header.width < 0 || header.height < 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("negative grid size {}x{}", header.width, header.height),
        ));
    }

    let count = header.width as usize * header.height as usize;
    let mut elevations = vec![0.0f32; count];
    reader.read_f32_into::<BigEndian>(&mut elevations)?;
    Ok((header, elevations))
}
