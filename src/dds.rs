//! Minimal uncompressed DDS container encoding
//!
//! Hearts of Iron IV reads a legacy layout: a 128-byte header whose only
//! populated fields are the magic, the header size, height and width, followed
//! by raw 32-bit pixels stored as A, R, G, B bytes, top row first. Every other
//! header field (flags, pitch, mipmaps, pixel format block, caps) is zero.

use image::RgbaImage;
use thiserror::Error;

/// File magic, including the trailing space.
pub const DDS_MAGIC: &[u8; 4] = b"DDS ";

/// Value of the header size field (header without the magic).
pub const DDS_HEADER_SIZE: u32 = 124;

/// Total header length in bytes, magic included.
pub const DDS_HEADER_LEN: usize = 4 + DDS_HEADER_SIZE as usize;

/// File extension used for encoded textures.
pub const DDS_EXTENSION: &str = "dds";

/// Error reading back a DDS header
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DdsHeaderError {
    /// Fewer bytes than a full header
    #[error("DDS data too short: {0} bytes, need 128")]
    Truncated(usize),
    /// First four bytes are not `DDS `
    #[error("bad DDS magic {0:?}")]
    BadMagic([u8; 4]),
    /// Header size field is not 124
    #[error("unexpected DDS header size {0}")]
    BadHeaderSize(u32),
}

/// The header fields this encoder populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DdsHeader {
    pub size: u32,
    pub flags: u32,
    pub height: u32,
    pub width: u32,
}

/// Encode an RGBA image as an uncompressed DDS container.
///
/// Pixels with zero alpha are written as `(0, 0, 0, 0)` whatever their color.
pub fn encode_dds(image: &RgbaImage) -> Vec<u8> {
    let (width, height) = image.dimensions();
    let mut out = Vec::with_capacity(DDS_HEADER_LEN + (width as usize) * (height as usize) * 4);

    out.extend_from_slice(DDS_MAGIC);
    put_u32(&mut out, DDS_HEADER_SIZE);
    put_u32(&mut out, 0); // flags
    put_u32(&mut out, height);
    put_u32(&mut out, width);
    put_u32(&mut out, 0); // pitch / linear size
    put_u32(&mut out, 0); // depth
    put_u32(&mut out, 0); // mipmap count
    put_zeros(&mut out, 11); // reserved1
    put_zeros(&mut out, 8); // pixel format block (32 bytes)
    put_u32(&mut out, 0); // caps
    put_u32(&mut out, 0); // caps2
    put_zeros(&mut out, 3); // caps3, caps4, reserved2

    debug_assert_eq!(out.len(), DDS_HEADER_LEN);

    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            out.extend_from_slice(&[0, 0, 0, 0]);
        } else {
            out.extend_from_slice(&[a, r, g, b]);
        }
    }

    out
}

/// Read the populated header fields back from encoded bytes.
pub fn read_dds_header(data: &[u8]) -> Result<DdsHeader, DdsHeaderError> {
    if data.len() < DDS_HEADER_LEN {
        return Err(DdsHeaderError::Truncated(data.len()));
    }

    let magic = [data[0], data[1], data[2], data[3]];
    if &magic != DDS_MAGIC {
        return Err(DdsHeaderError::BadMagic(magic));
    }

    let size = get_u32(data, 4);
    if size != DDS_HEADER_SIZE {
        return Err(DdsHeaderError::BadHeaderSize(size));
    }

    Ok(DdsHeader { size, flags: get_u32(data, 8), height: get_u32(data, 12), width: get_u32(data, 16) })
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_zeros(out: &mut Vec<u8>, count: usize) {
    for _ in 0..count {
        put_u32(out, 0);
    }
}

fn get_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}
