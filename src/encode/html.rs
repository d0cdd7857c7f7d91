//! HTML escaping.
//!
//! The same four bytes are escaped in text and in attribute values, so one
//! escaper serves both contexts. The escaper is byte-oriented: UTF-8
//! sequences pass through untouched because none of their bytes are ASCII.

use crate::buffer::Buffer;

/// Index into [`REPLACEMENTS`] plus one, or zero for bytes copied verbatim.
static ESCAPE_MAP: [u8; 256] = {
    let mut map = [0u8; 256];
    map[b'&' as usize] = 1;
    map[b'<' as usize] = 2;
    map[b'>' as usize] = 3;
    map[b'"' as usize] = 4;
    map
};

const REPLACEMENTS: [&str; 4] = ["&amp;", "&lt;", "&gt;", "&quot;"];

#[inline(always)]
fn needs_escape(b: u8) -> bool {
    ESCAPE_MAP[b as usize] != 0
}

/// Offset of the first byte at or after `off` that needs escaping, or `data.len()`.
#[inline]
fn next_special(data: &[u8], mut off: usize) -> usize {
    while off + 3 < data.len()
        && !needs_escape(data[off])
        && !needs_escape(data[off + 1])
        && !needs_escape(data[off + 2])
        && !needs_escape(data[off + 3])
    {
        off += 4;
    }
    while off < data.len() && !needs_escape(data[off]) {
        off += 1;
    }
    off
}

/// Append `data` with `&`, `<`, `>` and `"` replaced by their entities.
///
/// # Examples
///
/// ```
/// use mdrender::Buffer;
/// use mdrender::encode::escape_html;
///
/// let mut buf = Buffer::new();
/// escape_html(&mut buf, b"a < b && \"c\"");
/// assert_eq!(buf.as_bytes(), b"a &lt; b &amp;&amp; &quot;c&quot;");
/// ```
pub fn escape_html(out: &mut Buffer, data: &[u8]) {
    out.reserve(data.len());
    let mut beg = 0;
    loop {
        let off = next_special(data, beg);
        if off > beg {
            out.append(&data[beg..off]);
        }
        let Some(&b) = data.get(off) else {
            break;
        };
        out.append_str(REPLACEMENTS[ESCAPE_MAP[b as usize] as usize - 1]);
        beg = off + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn escape(data: &[u8]) -> Vec<u8> {
        let mut buf = Buffer::new();
        escape_html(&mut buf, data);
        buf.into_vec()
    }

    /// Reverse of [`escape_html`] for the four entities it produces.
    fn unescape(data: &[u8]) -> Vec<u8> {
        let text = std::str::from_utf8(data).unwrap();
        text.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
            .into_bytes()
    }

    #[test]
    fn test_escape_all_specials() {
        assert_eq!(escape(b"&<>\""), b"&amp;&lt;&gt;&quot;");
    }

    #[test]
    fn test_escape_leaves_other_punctuation() {
        assert_eq!(escape(b"it's #1 (really)!"), b"it's #1 (really)!");
    }

    #[test]
    fn test_escape_special_at_every_batch_offset() {
        for pad in 0..9 {
            let mut input = vec![b'x'; pad];
            input.push(b'<');
            input.extend_from_slice(b"yyyyy");
            let mut expected = vec![b'x'; pad];
            expected.extend_from_slice(b"&lt;yyyyy");
            assert_eq!(escape(&input), expected, "pad {pad}");
        }
    }

    #[test]
    fn test_escape_passes_utf8_through() {
        assert_eq!(escape("héllo <wörld>".as_bytes()), "héllo &lt;wörld&gt;".as_bytes());
    }

    #[test]
    fn test_escape_empty() {
        assert_eq!(escape(b""), b"");
    }

    proptest! {
        #[test]
        fn prop_identity_without_specials(
            data in prop::collection::vec(any::<u8>().prop_filter("special", |b| !b"&<>\"".contains(b)), 0..200)
        ) {
            prop_assert_eq!(escape(&data), data);
        }

        #[test]
        fn prop_unescape_recovers_input(text in ".{0,200}") {
            prop_assert_eq!(unescape(&escape(text.as_bytes())), text.as_bytes());
        }
    }
}
