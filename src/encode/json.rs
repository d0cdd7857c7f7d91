//! JSON string-body escaping.

use crate::buffer::Buffer;

const HEX: &[u8; 16] = b"0123456789abcdef";

#[inline(always)]
fn needs_escape(b: u8) -> bool {
    b < 0x20 || b == b'"' || b == b'\\'
}

/// The two-byte short escape for `b`, if JSON defines one.
#[inline]
pub(crate) fn short_escape(b: u8) -> Option<&'static str> {
    match b {
        b'"' => Some("\\\""),
        b'\\' => Some("\\\\"),
        b'\n' => Some("\\n"),
        b'\r' => Some("\\r"),
        b'\t' => Some("\\t"),
        _ => None,
    }
}

/// Append `\uXXXX` for one UTF-16 code unit.
pub fn append_unicode_escape(out: &mut Buffer, unit: u16) {
    out.append_str("\\u");
    out.append(&[
        HEX[usize::from(unit >> 12)],
        HEX[usize::from((unit >> 8) & 0xf)],
        HEX[usize::from((unit >> 4) & 0xf)],
        HEX[usize::from(unit & 0xf)],
    ]);
}

/// Append `data` escaped for use inside a JSON string literal.
///
/// Quote, backslash, newline, carriage return and tab get their short forms;
/// the remaining control bytes become `\u00XX`. Everything else, including
/// UTF-8 sequences, is copied verbatim.
///
/// # Examples
///
/// ```
/// use mdrender::Buffer;
/// use mdrender::encode::escape_json;
///
/// let mut buf = Buffer::new();
/// escape_json(&mut buf, b"say \"hi\"\n");
/// assert_eq!(buf.as_bytes(), br#"say \"hi\"\n"#);
/// ```
pub fn escape_json(out: &mut Buffer, data: &[u8]) {
    out.reserve(data.len());
    let mut beg = 0;
    while beg < data.len() {
        let off = data[beg..]
            .iter()
            .position(|&b| needs_escape(b))
            .map_or(data.len(), |p| beg + p);
        if off > beg {
            out.append(&data[beg..off]);
        }
        let Some(&b) = data.get(off) else {
            break;
        };
        match short_escape(b) {
            Some(sub) => out.append_str(sub),
            None => append_unicode_escape(out, u16::from(b)),
        }
        beg = off + 1;
    }
}
