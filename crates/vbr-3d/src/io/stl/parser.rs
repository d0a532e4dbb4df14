use std::io::Read;
use std::path::Path;

use super::StlError;
use crate::pointcloud::PointCloud;

const HEADER_SIZE: usize = 80;
const FACET_SIZE: usize = 50;
// normal (3 x f32) precedes the three vertices of every facet
const NORMAL_SIZE: usize = 12;
const VERTEX_SIZE: usize = 12;

/// Read a little-endian f32 from a byte buffer
#[inline]
fn read_f32(buf: &[u8], offset: usize) -> Result<f32, StlError> {
    let slice = buf.get(offset..offset + 4).ok_or(StlError::Truncated)?;
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(slice);
    Ok(f32::from_le_bytes(bytes))
}

/// Read a little-endian u32 from a byte buffer
#[inline]
fn read_u32(buf: &[u8], offset: usize) -> Result<u32, StlError> {
    let slice = buf.get(offset..offset + 4).ok_or(StlError::Truncated)?;
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(slice);
    Ok(u32::from_le_bytes(bytes))
}

/// Number of facets announced by a binary header, if the payload length agrees with it.
fn binary_facet_count(bytes: &[u8]) -> Option<usize> {
    let count = read_u32(bytes, HEADER_SIZE).ok()? as usize;
    let expected = count
        .checked_mul(FACET_SIZE)?
        .checked_add(HEADER_SIZE + 4)?;
    (expected == bytes.len()).then_some(count)
}

fn parse_binary(bytes: &[u8], facet_count: usize) -> Result<Vec<[f64; 3]>, StlError> {
    let mut points = Vec::with_capacity(facet_count * 3);

    for facet in 0..facet_count {
        let facet_offset = HEADER_SIZE + 4 + facet * FACET_SIZE + NORMAL_SIZE;
        for vertex in 0..3 {
            let offset = facet_offset + vertex * VERTEX_SIZE;
            points.push([
                read_f32(bytes, offset)? as f64,
                read_f32(bytes, offset + 4)? as f64,
                read_f32(bytes, offset + 8)? as f64,
            ]);
        }
    }

    Ok(points)
}

fn parse_ascii(text: &str) -> Result<Vec<[f64; 3]>, StlError> {
    let mut points = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let mut it = line.split_whitespace();
        if it.next() != Some("vertex") {
            continue;
        }

        let coords = it
            .map(|v| v.parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| StlError::MalformedAscii { line: i + 1 })?;

        match coords.as_slice() {
            [x, y, z] => points.push([*x, *y, *z]),
            _ => return Err(StlError::MalformedAscii { line: i + 1 }),
        }
    }

    Ok(points)
}

/// Parse an in-memory STL payload into a point cloud.
///
/// Binary STL is recognised by its length (`84 + 50 * facet_count` bytes);
/// anything else must be ASCII STL starting with `solid`. Every facet
/// contributes its three vertices in order, shared vertices are not merged.
///
/// # Arguments
///
/// * `bytes` - The full contents of an STL file.
///
/// # Returns
///
/// The point cloud holding `3 * facet_count` points.
pub fn parse_stl(bytes: &[u8]) -> Result<PointCloud, StlError> {
    if let Some(facet_count) = binary_facet_count(bytes) {
        log::debug!("binary STL with {} facets", facet_count);
        return Ok(PointCloud::new(parse_binary(bytes, facet_count)?));
    }

    let text = std::str::from_utf8(bytes).map_err(|_| StlError::Truncated)?;
    if !text.trim_start().starts_with("solid") {
        return Err(StlError::Truncated);
    }

    let points = parse_ascii(text)?;
    log::debug!("ASCII STL with {} vertices", points.len());

    Ok(PointCloud::new(points))
}

/// Read an STL file (binary or ASCII) into a point cloud.
///
/// # Arguments
///
/// * `path` - Path to a file with the `.stl` extension (any case).
///
/// Example:
///
/// ```no_run
/// use vbr_3d::io::stl::read_stl;
///
/// let cloud = read_stl("vertebra_L1.stl").unwrap();
/// println!("#{} points", cloud.len());
/// ```
pub fn read_stl(path: impl AsRef<Path>) -> Result<PointCloud, StlError> {
    let Some(file_ext) = path.as_ref().extension() else {
        return Err(StlError::InvalidFileExtension("".into()));
    };

    if !file_ext.eq_ignore_ascii_case("stl") {
        return Err(StlError::InvalidFileExtension(
            file_ext.to_string_lossy().to_string(),
        ));
    }

    let mut file = std::fs::File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    parse_stl(&bytes)
}
