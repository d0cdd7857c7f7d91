//! Append-only output buffer with amortized doubling growth.
//!
//! A [`Buffer`] is meant to live across many render calls: [`Buffer::reset`]
//! drops the content but keeps the allocation, so a warmed-up buffer renders
//! without touching the allocator.

use std::fmt;

/// Capacity of the first allocation.
pub const MIN_CAPACITY: usize = 512;

/// Largest number of digits [`Buffer::append_uint`] can produce (radix 2, `u64::MAX`).
const MAX_DIGITS: usize = 64;

/// Growable byte buffer.
///
/// The write cursor is always the end of the valid bytes, so
/// `len() <= capacity()` holds at all times and growing never moves or
/// drops bytes that were already written.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct Buffer {
    bytes: Vec<u8>,
}

impl Buffer {
    /// Create an empty buffer. Nothing is allocated until the first write.
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Create a buffer that can hold at least `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut buf = Self::new();
        buf.reserve(capacity);
        buf
    }

    /// Number of valid bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if no bytes have been written since the last reset.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Total number of bytes the buffer can hold without growing.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// Bytes that can still be appended without growing.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity() - self.len()
    }

    /// The valid bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The last valid byte, if any.
    #[inline]
    pub fn last(&self) -> Option<u8> {
        self.bytes.last().copied()
    }

    /// Consume the buffer, returning its valid bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    /// Logically empty the buffer, keeping its capacity.
    #[inline]
    pub fn reset(&mut self) {
        self.bytes.clear();
    }

    /// Drop the last `n` valid bytes (clamped to the current length).
    #[inline]
    pub fn retract(&mut self, n: usize) {
        let len = self.len().saturating_sub(n);
        self.bytes.truncate(len);
    }

    /// Make sure at least `additional` bytes can be appended without growing.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        if self.remaining() < additional {
            self.grow(additional);
        }
    }

    /// Double the capacity (starting from [`MIN_CAPACITY`]) until `additional`
    /// bytes fit after the current content.
    #[cold]
    #[inline(never)]
    fn grow(&mut self, additional: usize) {
        let len = self.len();
        let mut cap = self.capacity();
        loop {
            cap = if cap == 0 {
                MIN_CAPACITY
            } else {
                cap.checked_mul(2).unwrap_or(usize::MAX)
            };
            if cap - len >= additional || cap == usize::MAX {
                break;
            }
        }
        self.bytes.reserve_exact(cap - len);
    }

    /// Append raw bytes.
    #[inline]
    pub fn append(&mut self, data: &[u8]) {
        self.reserve(data.len());
        self.bytes.extend_from_slice(data);
    }

    /// Append a single byte.
    #[inline]
    pub fn push(&mut self, b: u8) {
        self.reserve(1);
        self.bytes.push(b);
    }

    /// Append a string literal without escaping.
    #[inline]
    pub fn append_str(&mut self, text: &str) {
        self.append(text.as_bytes());
    }

    /// Append `n` formatted in `radix` using digits `0-9` and `a-z`.
    ///
    /// Only the minimal digit sequence is written (`0` for zero). A radix
    /// outside `2..=36` writes nothing.
    pub fn append_uint(&mut self, mut n: u64, radix: u32) {
        if !(2..=36).contains(&radix) {
            return;
        }
        let radix = u64::from(radix);
        let mut digits = [0u8; MAX_DIGITS];
        let mut pos = MAX_DIGITS;
        loop {
            pos -= 1;
            // n % radix < 36, so the cast and the digit lookup are in range
            digits[pos] = b"0123456789abcdefghijklmnopqrstuvwxyz"[(n % radix) as usize];
            n /= radix;
            if n == 0 {
                break;
            }
        }
        self.append(&digits[pos..]);
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("content", &bstr::BStr::new(&self.bytes))
            .finish()
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Write for Buffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append_str(s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_buffer_is_unallocated() {
        let buf = Buffer::new();
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.capacity(), 0);
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn test_first_growth_uses_min_capacity() {
        let mut buf = Buffer::new();
        buf.push(b'a');
        assert_eq!(buf.capacity(), MIN_CAPACITY);
        assert_eq!(buf.remaining(), MIN_CAPACITY - 1);
    }

    #[test]
    fn test_growth_doubles() {
        let mut buf = Buffer::new();
        buf.append(&[b'x'; MIN_CAPACITY]);
        assert_eq!(buf.capacity(), MIN_CAPACITY);
        buf.push(b'y');
        assert_eq!(buf.capacity(), MIN_CAPACITY * 2);
    }

    #[test]
    fn test_large_append_keeps_doubling() {
        let mut buf = Buffer::new();
        buf.append(b"head");
        // One doubling (1024) is not enough for 5000 bytes; must reach 8192
        buf.append(&vec![b'z'; 5000]);
        assert_eq!(buf.capacity(), 8192);
        assert_eq!(buf.len(), 5004);
        assert_eq!(&buf.as_bytes()[..4], b"head");
    }

    #[test]
    fn test_reserve_only_grows_when_needed() {
        let mut buf = Buffer::with_capacity(100);
        assert_eq!(buf.capacity(), MIN_CAPACITY);
        buf.reserve(10);
        assert_eq!(buf.capacity(), MIN_CAPACITY);
    }

    #[test]
    fn test_reset_keeps_capacity() {
        let mut buf = Buffer::new();
        buf.append(&[b'q'; 2000]);
        let cap = buf.capacity();
        buf.reset();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), cap);
        buf.append_str("fresh");
        assert_eq!(buf.as_bytes(), b"fresh");
    }

    #[test]
    fn test_retract() {
        let mut buf = Buffer::new();
        buf.append_str("1,2,3,");
        buf.retract(1);
        assert_eq!(buf.as_bytes(), b"1,2,3");
        buf.retract(100);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_append_uint_decimal() {
        let mut buf = Buffer::new();
        buf.append_uint(0, 10);
        buf.push(b' ');
        buf.append_uint(4294967295, 10);
        assert_eq!(buf.as_bytes(), b"0 4294967295");
    }

    #[test]
    fn test_append_uint_other_radixes() {
        let mut buf = Buffer::new();
        buf.append_uint(255, 16);
        buf.push(b' ');
        buf.append_uint(5, 2);
        buf.push(b' ');
        buf.append_uint(35, 36);
        buf.push(b' ');
        buf.append_uint(u64::MAX, 2);
        let out = String::from_utf8(buf.into_vec()).unwrap();
        let parts: Vec<&str> = out.split(' ').collect();
        assert_eq!(parts[0], "ff");
        assert_eq!(parts[1], "101");
        assert_eq!(parts[2], "z");
        assert_eq!(parts[3], "1".repeat(64));
    }

    #[test]
    fn test_append_uint_invalid_radix_is_noop() {
        let mut buf = Buffer::new();
        buf.append_str("keep");
        buf.append_uint(42, 1);
        buf.append_uint(42, 37);
        assert_eq!(buf.as_bytes(), b"keep");
    }

    proptest! {
        #[test]
        fn prop_growth_preserves_appended_bytes(
            chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..700), 0..20),
            reserves in prop::collection::vec(0usize..3000, 0..20),
        ) {
            let mut buf = Buffer::new();
            let mut expected = Vec::new();
            for (i, chunk) in chunks.iter().enumerate() {
                if let Some(&r) = reserves.get(i) {
                    buf.reserve(r);
                    prop_assert!(buf.remaining() >= r);
                }
                buf.append(chunk);
                expected.extend_from_slice(chunk);
            }
            prop_assert_eq!(buf.as_bytes(), expected.as_slice());
            prop_assert!(buf.len() <= buf.capacity());
        }

        #[test]
        fn prop_append_uint_matches_std_formatting(n in any::<u64>()) {
            let mut buf = Buffer::new();
            buf.append_uint(n, 10);
            buf.push(b'/');
            buf.append_uint(n, 16);
            let expected = format!("{n}/{n:x}");
            prop_assert_eq!(buf.as_bytes(), expected.as_bytes());
        }
    }
}
