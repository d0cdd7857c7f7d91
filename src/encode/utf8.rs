//! UTF-8 codepoint encoding and decoding.

use crate::buffer::Buffer;

/// U+FFFD REPLACEMENT CHARACTER encoded as UTF-8.
pub const REPLACEMENT_CHARACTER: [u8; 3] = [0xef, 0xbf, 0xbd];

/// Append `cp` encoded as 1-4 UTF-8 bytes.
///
/// Zero, surrogates and values above U+10FFFF are not encodable and are
/// written as U+FFFD.
pub fn append_codepoint(out: &mut Buffer, cp: u32) {
    match char::from_u32(cp) {
        Some(c) if cp != 0 => {
            let mut tmp = [0u8; 4];
            out.append(c.encode_utf8(&mut tmp).as_bytes());
        }
        _ => out.append(&REPLACEMENT_CHARACTER),
    }
}

/// Decode the codepoint at the start of `bytes`.
///
/// Returns the codepoint (or `None` for an invalid or truncated sequence)
/// together with the number of bytes consumed, which is at least one for
/// non-empty input.
pub fn decode_codepoint(bytes: &[u8]) -> (Option<u32>, usize) {
    let (ch, size) = bstr::decode_utf8(bytes);
    (ch.map(u32::from), size)
}
