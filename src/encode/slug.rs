//! Anchor slugs for heading IDs.
//!
//! A slug keeps ASCII letters (lowercased), digits, `.` and `_`; everything
//! else becomes `-`, with runs of `-` collapsed and trimmed from both ends.
//! Two-byte UTF-8 sequences in the Latin-1 range fold to their unaccented
//! ASCII letter (`É` → `e`, `ß` → `s`). Anything wider folds to `-`. This is
//! an approximation: slugs only need to be stable and URL-safe.

use crate::buffer::Buffer;

use super::utf8::decode_codepoint;

#[rustfmt::skip]
static SLUG_MAP: [u8; 256] = *b"\
----------------\
----------------\
--------------.-\
0123456789------\
-abcdefghijklmno\
pqrstuvwxyz----_\
-abcdefghijklmno\
pqrstuvwxyz-----\
----------------\
----------------\
----------------\
----------------\
aaaaaaaceeeeiiii\
dnoooooxouuuuy-s\
aaaaaaaceeeeiiii\
dnooooo-ouuuuy-y";

/// Fold the character at the start of `bytes` into the Latin-1 range.
///
/// Returns the folded byte (zero when it has no Latin-1 equivalent) and the
/// number of input bytes it covered.
#[inline]
fn fold(bytes: &[u8]) -> (u8, usize) {
    let b = bytes[0];
    if b < 0x80 {
        return (b, 1);
    }
    match decode_codepoint(bytes) {
        (Some(cp), size) if cp <= 0xff => (cp as u8, size),
        (_, size) => (0, size.max(1)),
    }
}

/// Append the slug of `text` to `out` and return its length.
///
/// # Examples
///
/// ```
/// use mdrender::Buffer;
/// use mdrender::encode::append_slug;
///
/// let mut buf = Buffer::new();
/// let len = append_slug(&mut buf, "Crème Brûlée, v2.0!".as_bytes());
/// assert_eq!(buf.as_bytes(), b"creme-brulee-v2.0");
/// assert_eq!(len, 17);
/// ```
pub fn append_slug(out: &mut Buffer, text: &[u8]) -> usize {
    out.reserve(text.len());
    let start = out.len();
    let mut prev: Option<u8> = None;
    let mut i = 0;
    while i < text.len() {
        let (folded, width) = fold(&text[i..]);
        i += width;
        let c = SLUG_MAP[usize::from(folded)];
        // No leading '-' and no runs of '-'
        if c == b'-' && prev.is_none_or(|p| p == b'-') {
            continue;
        }
        out.push(c);
        prev = Some(c);
    }
    if prev == Some(b'-') {
        out.retract(1);
    }
    out.len() - start
}

/// Generate the slug of `text` as a new string.
///
/// # Examples
///
/// ```
/// use mdrender::encode::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
/// ```
pub fn slugify(text: &str) -> String {
    let mut buf = Buffer::with_capacity(text.len());
    append_slug(&mut buf, text.as_bytes());
    // The slug alphabet is pure ASCII
    String::from_utf8(buf.into_vec()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_slugify_simple() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn test_slugify_with_punctuation() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
    }

    #[test]
    fn test_slugify_leading_trailing_spaces() {
        assert_eq!(slugify("  Hello World  "), "hello-world");
    }

    #[test]
    fn test_slugify_keeps_dot_and_underscore() {
        assert_eq!(slugify("hello_world.rs"), "hello_world.rs");
    }

    #[test]
    fn test_slugify_mixed_case() {
        assert_eq!(slugify("Chapter ONE"), "chapter-one");
    }

    #[test]
    fn test_slugify_numbers() {
        assert_eq!(slugify("Chapter 1"), "chapter-1");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("   "), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_hyphens() {
        assert_eq!(slugify("hello--world"), "hello-world");
        assert_eq!(slugify("-hello-"), "hello");
    }

    #[test]
    fn test_slugify_latin1_folding() {
        assert_eq!(slugify("Ångström Façade"), "angstrom-facade");
        assert_eq!(slugify("Straße"), "strase");
        assert_eq!(slugify("naïve ÿ"), "naive-y");
    }

    #[test]
    fn test_slugify_wide_characters_become_separators() {
        assert_eq!(slugify("a→b"), "a-b");
        assert_eq!(slugify("日本語"), "");
        assert_eq!(slugify("emoji 😀 here"), "emoji-here");
    }

    #[test]
    fn test_slugify_invalid_utf8_bytes() {
        let mut buf = Buffer::new();
        append_slug(&mut buf, b"ab\xffcd\xc3");
        assert_eq!(buf.as_bytes(), b"ab-cd");
    }

    #[test]
    fn test_append_slug_after_existing_content() {
        let mut buf = Buffer::new();
        buf.append_str("id=");
        let len = append_slug(&mut buf, b"  --  ");
        assert_eq!(len, 0);
        assert_eq!(buf.as_bytes(), b"id=");
    }

    proptest! {
        #[test]
        fn prop_slug_is_idempotent(text in "\\PC{0,64}") {
            let once = slugify(&text);
            prop_assert_eq!(slugify(&once), once.clone());
        }

        #[test]
        fn prop_slug_alphabet(text in "\\PC{0,64}") {
            let slug = slugify(&text);
            prop_assert!(slug.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b"-._".contains(&b)));
            prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }
    }
}
