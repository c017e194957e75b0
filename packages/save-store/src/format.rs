//! On-disk save file format.
//!
//! ```text
//! offset  size  field
//! 0       4     magic             0x43435356 ("CCSV")
//! 4       4     version
//! 8       4     compressed_size   bytes following the header
//! 12      4     uncompressed_size size of the database image
//! 16      n     zlib stream
//! ```
//!
//! All header fields are little-endian.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::SaveError;
use crate::io_utils::classify_io_error;

/// Magic number identifying a save file.
pub const SAVE_MAGIC: u32 = 0x4343_5356;
/// Current save format version.
pub const SAVE_VERSION: u32 = 1;
/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Fixed-size header at the start of every slot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveFileHeader {
    pub magic: u32,
    pub version: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
}

impl SaveFileHeader {
    /// Creates a current-version header for a payload of the given sizes.
    pub fn new(compressed_size: u32, uncompressed_size: u32) -> Self {
        Self {
            magic: SAVE_MAGIC,
            version: SAVE_VERSION,
            compressed_size,
            uncompressed_size,
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.magic.to_le_bytes());
        buf[4..8].copy_from_slice(&self.version.to_le_bytes());
        buf[8..12].copy_from_slice(&self.compressed_size.to_le_bytes());
        buf[12..16].copy_from_slice(&self.uncompressed_size.to_le_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Self {
        let field =
            |at: usize| u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]);
        Self {
            magic: field(0),
            version: field(4),
            compressed_size: field(8),
            uncompressed_size: field(12),
        }
    }

    /// Validates the header's magic. A version mismatch only logs a warning.
    pub fn validate(&self) -> Result<(), SaveError> {
        if self.magic != SAVE_MAGIC {
            return Err(SaveError::BadMagic { found: self.magic });
        }
        if self.version != SAVE_VERSION {
            tracing::warn!(
                "Save file version mismatch (expected {}, got {})",
                SAVE_VERSION,
                self.version
            );
        }
        Ok(())
    }
}

/// Compresses a database image into a zlib stream.
pub fn compress_payload(data: &[u8], level: u32) -> Result<Vec<u8>, SaveError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level));
    encoder
        .write_all(data)
        .map_err(|e| SaveError::Compression(format!("zlib compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| SaveError::Compression(format!("zlib compression failed: {}", e)))
}

/// Decompresses a zlib stream that must expand to exactly `expected_size` bytes.
pub fn decompress_payload(data: &[u8], expected_size: usize) -> Result<Vec<u8>, SaveError> {
    let mut decompressed = Vec::with_capacity(expected_size);
    // One byte of headroom so an oversized stream is detected rather than cut.
    ZlibDecoder::new(data)
        .take(expected_size as u64 + 1)
        .read_to_end(&mut decompressed)
        .map_err(|e| SaveError::Compression(format!("zlib decompression failed: {}", e)))?;

    if decompressed.len() != expected_size {
        return Err(SaveError::Compression(format!(
            "decompressed size {} does not match header size {}",
            decompressed.len(),
            expected_size
        )));
    }
    Ok(decompressed)
}

/// Encodes a database image as header + compressed payload.
pub fn encode_save_file(payload: &[u8], level: u32) -> Result<Vec<u8>, SaveError> {
    let uncompressed_size = u32::try_from(payload.len()).map_err(|_| {
        SaveError::Compression(format!("payload of {} bytes is too large", payload.len()))
    })?;
    let compressed = compress_payload(payload, level)?;
    let compressed_size = u32::try_from(compressed.len()).map_err(|_| {
        SaveError::Compression(format!(
            "compressed payload of {} bytes is too large",
            compressed.len()
        ))
    })?;

    let header = SaveFileHeader::new(compressed_size, uncompressed_size);
    let mut bytes = Vec::with_capacity(HEADER_SIZE + compressed.len());
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(&compressed);
    Ok(bytes)
}

/// Decodes header + compressed payload back into the database image.
pub fn decode_save_file(bytes: &[u8]) -> Result<Vec<u8>, SaveError> {
    let header_bytes: &[u8; HEADER_SIZE] = bytes
        .get(..HEADER_SIZE)
        .and_then(|h| h.try_into().ok())
        .ok_or_else(|| {
            SaveError::Truncated(format!(
                "{} bytes is shorter than the {} byte header",
                bytes.len(),
                HEADER_SIZE
            ))
        })?;
    let header = SaveFileHeader::from_bytes(header_bytes);
    header.validate()?;

    let body = &bytes[HEADER_SIZE..];
    let compressed_size = header.compressed_size as usize;
    if body.len() < compressed_size {
        return Err(SaveError::Truncated(format!(
            "expected {} compressed bytes, found {}",
            compressed_size,
            body.len()
        )));
    }

    decompress_payload(&body[..compressed_size], header.uncompressed_size as usize)
}

/// Writes an encoded save file, replacing any previous content.
///
/// Returns the number of bytes written.
pub fn write_save_file(path: &Path, payload: &[u8], level: u32) -> Result<u64, SaveError> {
    let bytes = encode_save_file(payload, level)?;

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = Path::new(&temp_name);

    let mut file = File::create(temp_path)
        .map_err(|e| classify_io_error(e, "Failed to create temp save file"))?;
    file.write_all(&bytes)
        .map_err(|e| classify_io_error(e, "Failed to write save file"))?;
    file.sync_all()
        .map_err(|e| classify_io_error(e, "Failed to sync save file"))?;

    fs::rename(temp_path, path).map_err(|e| classify_io_error(e, "Failed to rename save file"))?;

    Ok(bytes.len() as u64)
}

/// Reads and decodes a save file.
pub fn read_save_file(path: &Path) -> Result<Vec<u8>, SaveError> {
    let bytes = fs::read(path).map_err(|e| classify_io_error(e, "Failed to read save file"))?;
    decode_save_file(&bytes)
}
