//! XML character references.
//!
//! Numeric references (`&#233;`, `&#xE9;`) are decoded for the destination
//! context. Named references (`&amp;`, `&nbsp;`, ...) are never looked up:
//! HTML output keeps them verbatim for the browser to resolve, JSON output
//! keeps their text as an ordinary string.

use crate::buffer::Buffer;

use super::html::escape_html;
use super::json::{append_unicode_escape, escape_json};
use super::utf8::{REPLACEMENT_CHARACTER, append_codepoint};

/// Longest name accepted in a named reference.
const MAX_NAME_LEN: usize = 48;

/// Classification of a character reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    /// A decimal or hexadecimal reference.
    ///
    /// Malformed digit sequences decode to `0` and overflowing values clamp
    /// to `0x110000`; both are outside the encodable range and come out as
    /// U+FFFD.
    Numeric(u32),
    /// A named reference, left undecoded.
    Named,
}

impl EntityRef {
    /// Classify the reference text `entity` (including `&` and `;`).
    pub fn classify(entity: &[u8]) -> Self {
        let body = entity.strip_prefix(b"&").unwrap_or(entity);
        let body = body.strip_suffix(b";").unwrap_or(body);
        let Some(digits) = body.strip_prefix(b"#") else {
            return EntityRef::Named;
        };
        let (digits, radix) = match digits.split_first() {
            Some((b'x' | b'X', rest)) => (rest, 16),
            _ => (digits, 10),
        };
        EntityRef::Numeric(parse_codepoint(digits, radix))
    }
}

fn parse_codepoint(digits: &[u8], radix: u32) -> u32 {
    if digits.is_empty() {
        return 0;
    }
    let mut cp: u32 = 0;
    for &d in digits {
        let Some(v) = char::from(d).to_digit(radix) else {
            return 0;
        };
        cp = cp.saturating_mul(radix).saturating_add(v).min(0x11_0000);
    }
    cp
}

/// Length of the character reference at the start of `text`, if there is one.
///
/// Accepts `&#` + 1-7 decimal digits, `&#x` + 1-6 hex digits, or `&` + a
/// letter and up to 47 more alphanumerics, each terminated by `;`.
pub fn scan_entity(text: &[u8]) -> Option<usize> {
    let rest = text.strip_prefix(b"&")?;
    let (prefix, max, is_valid): (usize, usize, fn(&u8) -> bool) = match rest {
        [b'#', b'x' | b'X', ..] => (3, 6, u8::is_ascii_hexdigit),
        [b'#', ..] => (2, 7, u8::is_ascii_digit),
        [first, ..] if first.is_ascii_alphabetic() => (1, MAX_NAME_LEN, u8::is_ascii_alphanumeric),
        _ => return None,
    };
    let body = &text[prefix..];
    let len = body.iter().take_while(|&b| is_valid(b)).count();
    if len == 0 || len > max || body.get(len) != Some(&b';') {
        return None;
    }
    Some(prefix + len + 1)
}

/// Append the reference `entity` for an HTML destination.
///
/// Numeric references become raw UTF-8, except that a reference to one of
/// the HTML-special bytes is written escaped.
pub fn decode_entity_html(out: &mut Buffer, entity: &[u8]) {
    match EntityRef::classify(entity) {
        EntityRef::Numeric(cp @ (0x22 | 0x26 | 0x3c | 0x3e)) => escape_html(out, &[cp as u8]),
        EntityRef::Numeric(cp) => append_codepoint(out, cp),
        EntityRef::Named => out.append(entity),
    }
}

/// Append the reference `entity` inside a JSON string.
///
/// ASCII references go through the JSON escaper, Latin-1 references become
/// raw UTF-8 and anything above U+00FF is written as `\u` escapes (a
/// surrogate pair above U+FFFF).
pub fn decode_entity_json(out: &mut Buffer, entity: &[u8]) {
    let cp = match EntityRef::classify(entity) {
        EntityRef::Named => return escape_json(out, entity),
        EntityRef::Numeric(cp) => cp,
    };
    match char::from_u32(cp) {
        Some(_) if (1..0x80).contains(&cp) => escape_json(out, &[cp as u8]),
        Some(_) if (0x80..=0xff).contains(&cp) => append_codepoint(out, cp),
        Some(c) if cp != 0 => {
            let mut units = [0u16; 2];
            for &unit in c.encode_utf16(&mut units).iter() {
                append_unicode_escape(out, unit);
            }
        }
        _ => out.append(&REPLACEMENT_CHARACTER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(entity: &str) -> String {
        let mut buf = Buffer::new();
        decode_entity_html(&mut buf, entity.as_bytes());
        String::from_utf8(buf.into_vec()).unwrap()
    }

    fn json(entity: &str) -> String {
        let mut buf = Buffer::new();
        decode_entity_json(&mut buf, entity.as_bytes());
        String::from_utf8(buf.into_vec()).unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(EntityRef::classify(b"&#65;"), EntityRef::Numeric(65));
        assert_eq!(EntityRef::classify(b"&#x41;"), EntityRef::Numeric(65));
        assert_eq!(EntityRef::classify(b"&#X1F600;"), EntityRef::Numeric(0x1f600));
        assert_eq!(EntityRef::classify(b"&amp;"), EntityRef::Named);
    }

    #[test]
    fn test_classify_malformed_digits_decode_to_zero() {
        assert_eq!(EntityRef::classify(b"&#12a;"), EntityRef::Numeric(0));
        assert_eq!(EntityRef::classify(b"&#x;"), EntityRef::Numeric(0));
        assert_eq!(EntityRef::classify(b"&#xZZ;"), EntityRef::Numeric(0));
    }

    #[test]
    fn test_classify_overflow_clamps() {
        assert_eq!(
            EntityRef::classify(b"&#99999999999999;"),
            EntityRef::Numeric(0x11_0000)
        );
    }

    #[test]
    fn test_scan_entity() {
        assert_eq!(scan_entity(b"&amp; rest"), Some(5));
        assert_eq!(scan_entity(b"&#123;"), Some(6));
        assert_eq!(scan_entity(b"&#x1F600;x"), Some(9));
        assert_eq!(scan_entity(b"&#xG;"), None);
        assert_eq!(scan_entity(b"&#12345678;"), None);
        assert_eq!(scan_entity(b"&1abc;"), None);
        assert_eq!(scan_entity(b"&amp"), None);
        assert_eq!(scan_entity(b"& b"), None);
        assert_eq!(scan_entity(b"plain"), None);
    }

    #[test]
    fn test_html_numeric_decodes_to_utf8() {
        assert_eq!(html("&#233;"), "é");
        assert_eq!(html("&#x20AC;"), "€");
    }

    #[test]
    fn test_html_numeric_special_is_escaped() {
        assert_eq!(html("&#60;"), "&lt;");
        assert_eq!(html("&#x26;"), "&amp;");
        assert_eq!(html("&#34;"), "&quot;");
    }

    #[test]
    fn test_html_named_passthrough() {
        assert_eq!(html("&nbsp;"), "&nbsp;");
    }

    #[test]
    fn test_html_invalid_is_replacement() {
        assert_eq!(html("&#0;"), "\u{fffd}");
        assert_eq!(html("&#xD800;"), "\u{fffd}");
        assert_eq!(html("&#9z;"), "\u{fffd}");
    }

    #[test]
    fn test_json_ascii_and_latin1() {
        assert_eq!(json("&#65;"), "A");
        assert_eq!(json("&#10;"), "\\n");
        assert_eq!(json("&#34;"), "\\\"");
        assert_eq!(json("&#1;"), "\\u0001");
        assert_eq!(json("&#xe9;"), "é");
    }

    #[test]
    fn test_json_above_latin1_uses_unicode_escape() {
        assert_eq!(json("&#x20AC;"), "\\u20ac");
        assert_eq!(json("&#x1F600;"), "\\ud83d\\ude00");
    }

    #[test]
    fn test_json_named_kept_as_text() {
        assert_eq!(json("&copy;"), "&copy;");
    }
}
