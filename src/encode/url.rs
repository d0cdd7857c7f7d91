//! URL escaping for link destinations that end up inside an attribute value.

use percent_encoding::percent_encode_byte;

use crate::buffer::Buffer;

/// Bytes other than ASCII alphanumerics that are copied verbatim.
const UNRESERVED: &[u8] = b"-_.+!*(),%#@?=;:/$";

#[inline]
fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || UNRESERVED.contains(&b)
}

/// Append `data` with every byte outside the unreserved set percent-encoded.
///
/// `&` and `'` become `&amp;` and `&#x27;` instead, since the result is
/// written into a quoted attribute.
///
/// # Examples
///
/// ```
/// use mdrender::Buffer;
/// use mdrender::encode::escape_url;
///
/// let mut buf = Buffer::new();
/// escape_url(&mut buf, b"/a b?x=1&y='2'");
/// assert_eq!(buf.as_bytes(), b"/a%20b?x=1&amp;y=&#x27;2&#x27;");
/// ```
pub fn escape_url(out: &mut Buffer, data: &[u8]) {
    out.reserve(data.len());
    let mut beg = 0;
    while beg < data.len() {
        let off = data[beg..]
            .iter()
            .position(|&b| !is_unreserved(b))
            .map_or(data.len(), |p| beg + p);
        if off > beg {
            out.append(&data[beg..off]);
        }
        let Some(&b) = data.get(off) else {
            break;
        };
        match b {
            b'&' => out.append_str("&amp;"),
            b'\'' => out.append_str("&#x27;"),
            _ => out.append_str(percent_encode_byte(b)),
        }
        beg = off + 1;
    }
}
