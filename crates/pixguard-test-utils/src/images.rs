//! Image header fixtures
//!
//! Only headers matter to the classifier, so the pixel data is zero fill.

/// A PNG with the given dimensions, padded with zeros to `len` bytes
///
/// `len` below the 33-byte header is raised to the header size.
pub fn png_bytes(width: u32, height: u32, len: usize) -> Vec<u8> {
    let mut out = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
    out.extend_from_slice(&13u32.to_be_bytes());
    out.extend_from_slice(b"IHDR");
    out.extend_from_slice(&width.to_be_bytes());
    out.extend_from_slice(&height.to_be_bytes());
    // bit depth 8, RGBA, deflate, adaptive filter, no interlace
    out.extend_from_slice(&[8, 6, 0, 0, 0]);
    // CRC is not checked by header decoders
    out.extend_from_slice(&[0, 0, 0, 0]);
    if out.len() < len {
        out.resize(len, 0);
    }
    out
}

/// Bytes no image decoder recognizes
pub fn garbage_bytes(len: usize) -> Vec<u8> {
    b"XXnot-an-image."
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}
