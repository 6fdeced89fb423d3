//! Binary container (GLB) framing.
//!
//! Layout, all little-endian:
//!
//! ```text
//! +-------+---------+-------------+
//! | magic | version | totalLength |   12-byte preamble
//! +-------+---------+-------------+
//! | chunkLength | chunkType | payload (chunkLength bytes) |   chunk 0: JSON
//! | chunkLength | chunkType | payload (chunkLength bytes) |   chunk 1: BIN
//! | ...                                                   |   ignored
//! ```
//!
//! Parsing borrows from the input and never copies a payload.

use super::error::GltfError;

/// Container magic, `"glTF"` read as a little-endian `u32`.
pub const GLB_MAGIC: u32 = 0x4654_6C67;

/// Chunk type tag of the metadata chunk (`"JSON"`).
pub const CHUNK_TYPE_JSON: u32 = 0x4E4F_534A;

/// Chunk type tag of the binary payload chunk (`"BIN\0"`).
pub const CHUNK_TYPE_BIN: u32 = 0x004E_4942;

/// Container version this loader was written against.
pub const SUPPORTED_VERSION: u32 = 2;

const PREAMBLE_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

/// A validated container: the metadata text and the binary payload.
#[derive(Debug, Clone, Copy)]
pub struct Container<'a> {
    /// Version field from the preamble.
    pub version: u32,
    /// Chunk 0 payload (UTF-8 JSON).
    pub json: &'a [u8],
    /// Chunk 1 payload.
    pub binary: &'a [u8],
}

/// A single chunk record.
#[derive(Debug, Clone, Copy)]
struct Chunk<'a> {
    ty: u32,
    payload: &'a [u8],
}

/// Little-endian `u32` at `offset`; callers check the four bytes exist.
fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le(bytemuck::pod_read_unaligned(&data[offset..offset + 4]))
}

/// Parse the container framing.
///
/// Every length field is checked against the bytes actually present before
/// anything is sliced. On failure nothing is returned, so callers never
/// observe a half-parsed container.
pub fn parse_container(data: &[u8]) -> Result<Container<'_>, GltfError> {
    if data.len() < PREAMBLE_LEN {
        return Err(GltfError::truncated("preamble", PREAMBLE_LEN, data.len()));
    }

    let magic = read_u32(data, 0);
    if magic != GLB_MAGIC {
        return Err(GltfError::format(format!(
            "bad container magic 0x{magic:08X}, expected 0x{GLB_MAGIC:08X}"
        )));
    }

    let version = read_u32(data, 4);
    if version != SUPPORTED_VERSION {
        log::warn!("Container version {version} (expected {SUPPORTED_VERSION}), continuing");
    }

    let total = read_u32(data, 8) as usize;
    if total < PREAMBLE_LEN {
        return Err(GltfError::format(format!(
            "declared total length {total} is smaller than the preamble"
        )));
    }
    if total > data.len() {
        return Err(GltfError::truncated("container", total, data.len()));
    }
    if total < data.len() {
        log::debug!(
            "Ignoring {} trailing bytes after declared container end",
            data.len() - total
        );
    }
    let data = &data[..total];

    let mut chunks = Vec::with_capacity(2);
    let mut offset = PREAMBLE_LEN;
    while offset < data.len() {
        let index = chunks.len();
        let remaining = data.len() - offset;
        if remaining < CHUNK_HEADER_LEN {
            return Err(GltfError::truncated(
                format!("chunk {index} header"),
                CHUNK_HEADER_LEN,
                remaining,
            ));
        }

        let length = read_u32(data, offset) as usize;
        let ty = read_u32(data, offset + 4);
        let start = offset + CHUNK_HEADER_LEN;
        let available = data.len() - start;
        if length > available {
            return Err(GltfError::truncated(
                format!("chunk {index}"),
                length,
                available,
            ));
        }

        chunks.push(Chunk {
            ty,
            payload: &data[start..start + length],
        });
        offset = start + length;
    }

    if chunks.len() < 2 {
        return Err(GltfError::format(format!(
            "container has {} chunk(s), expected a metadata chunk and a binary chunk",
            chunks.len()
        )));
    }
    if chunks[0].ty != CHUNK_TYPE_JSON {
        return Err(GltfError::format(format!(
            "chunk 0 has type 0x{:08X}, expected JSON",
            chunks[0].ty
        )));
    }
    if chunks[1].ty != CHUNK_TYPE_BIN {
        return Err(GltfError::format(format!(
            "chunk 1 has type 0x{:08X}, expected BIN",
            chunks[1].ty
        )));
    }
    if chunks.len() > 2 {
        log::debug!("Skipping {} extra chunk(s)", chunks.len() - 2);
    }

    Ok(Container {
        version,
        json: chunks[0].payload,
        binary: chunks[1].payload,
    })
}

/// Write the container framing around a metadata and a binary payload.
///
/// Payloads are padded to four bytes (JSON with spaces, binary with zeros)
/// as the format requires.
pub fn write_container(json: &[u8], binary: &[u8]) -> Vec<u8> {
    fn padded_len(len: usize) -> usize {
        (len + 3) & !3
    }

    let json_len = padded_len(json.len());
    let bin_len = padded_len(binary.len());
    let total = PREAMBLE_LEN + 2 * CHUNK_HEADER_LEN + json_len + bin_len;

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&SUPPORTED_VERSION.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());

    out.extend_from_slice(&(json_len as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_TYPE_JSON.to_le_bytes());
    out.extend_from_slice(json);
    out.resize(out.len() + json_len - json.len(), b' ');

    out.extend_from_slice(&(bin_len as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_TYPE_BIN.to_le_bytes());
    out.extend_from_slice(binary);
    out.resize(out.len() + bin_len - binary.len(), 0);

    out
}
