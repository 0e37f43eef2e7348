/// Stores `value` little-endian into `dst`, truncating to `dst.len()` bytes.
///
/// The data port hands out words in card byte order, so the first byte on the
/// bus is the low byte of the word.
pub fn unpack_word_le(value: u32, dst: &mut [u8]) {
    let bytes = value.to_le_bytes();
    let len = dst.len().min(4);
    dst[..len].copy_from_slice(&bytes[..len]);
}

/// Reads a little-endian 32-bit value starting at `offset`.
pub fn read_le_u32(src: &[u8], offset: usize) -> u32 {
    (src[offset] as u32)
        | (src[offset + 1] as u32) << 8
        | (src[offset + 2] as u32) << 16
        | (src[offset + 3] as u32) << 24
}
