//! Magic cookies of the portable Roaring serialization format and the scanner
//! which finds them inside larger buffers.
//!
//! See <https://github.com/RoaringBitmap/RoaringFormatSpec#general-layout>.

/// Cookie of a serialized bitmap which contains no run containers.
pub const SERIAL_COOKIE_NO_RUNCONTAINER: u16 = 12346;

/// Cookie of a serialized bitmap which may contain run containers.
pub const SERIAL_COOKIE: u16 = 12347;

/// Identifies which variant of the wire format follows a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cookie {
    NoRunContainer,
    RunContainer,
}

impl Cookie {
    #[inline]
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            SERIAL_COOKIE_NO_RUNCONTAINER => Some(Self::NoRunContainer),
            SERIAL_COOKIE => Some(Self::RunContainer),
            _ => None,
        }
    }

    #[inline]
    pub const fn value(self) -> u16 {
        match self {
            Self::NoRunContainer => SERIAL_COOKIE_NO_RUNCONTAINER,
            Self::RunContainer => SERIAL_COOKIE,
        }
    }

    /// returns true if this variant carries a run-container flag set
    #[inline]
    pub const fn has_run_flags(self) -> bool {
        matches!(self, Self::RunContainer)
    }
}

/// Returns the index of the first byte of the first cookie in `buffer`, reading
/// each byte offset as a little-endian `u16`.
pub fn find_marker_offset(buffer: &[u8]) -> Option<usize> {
    if buffer.len() < 2 {
        return None;
    }

    for i in 0..buffer.len() - 1 {
        let current = (u16::from(buffer[i]) & 0xFF) | (u16::from(buffer[i + 1]) << 8);
        if Cookie::from_u16(current).is_some() {
            return Some(i);
        }
    }

    None
}

/// Returns the suffix of `buffer` starting at the first cookie, or an empty
/// slice when the buffer holds no cookie.
///
/// Stored document values may carry arbitrary bytes ahead of the serialized
/// bitmap. The earliest match wins, even if a later offset is where the bitmap
/// actually starts.
///
/// ```
/// use roaring_filter::find_marker;
///
/// let buf = [0xAA, 0xBB, 0x3A, 0x30, 0x00, 0x00];
/// assert_eq!(find_marker(&buf), &buf[2..]);
/// assert!(find_marker(&[0x00, 0x01]).is_empty());
/// ```
pub fn find_marker(buffer: &[u8]) -> &[u8] {
    match find_marker_offset(buffer) {
        Some(offset) => &buffer[offset..],
        None => &[],
    }
}

#[cfg(test)]
mod tests {
    use proptest::{collection::vec, proptest};

    use super::*;
    use crate::testutil::{encode, noise, values};

    #[test]
    fn test_short_buffers() {
        assert!(find_marker(&[]).is_empty());
        assert!(find_marker(&[0x3A]).is_empty());
        assert!(find_marker(&[0x3B]).is_empty());
        assert!(find_marker(&[0x00, 0x01]).is_empty());
    }

    #[test]
    fn test_cookie_byteorder() {
        assert_eq!(SERIAL_COOKIE_NO_RUNCONTAINER.to_le_bytes(), [0x3A, 0x30]);
        assert_eq!(SERIAL_COOKIE.to_le_bytes(), [0x3B, 0x30]);

        // big-endian reads must not match
        assert!(find_marker(&[0x30, 0x3A]).is_empty());
        assert!(find_marker(&[0x30, 0x3B]).is_empty());
    }

    #[test]
    fn test_marker_at_start() {
        let buf = [0x3B, 0x30, 0x01, 0x02];
        assert_eq!(find_marker(&buf), &buf);
        assert_eq!(find_marker_offset(&buf), Some(0));
    }

    #[test]
    fn test_marker_unaligned() {
        let buf = [0xFF, 0xFF, 0xFF, 0x3A, 0x30, 0x07];
        assert_eq!(find_marker_offset(&buf), Some(3));
        assert_eq!(find_marker(&buf), &[0x3A, 0x30, 0x07]);
    }

    #[test]
    fn test_marker_at_end() {
        let buf = [0x01, 0x02, 0x3B, 0x30];
        assert_eq!(find_marker(&buf), &[0x3B, 0x30]);
    }

    #[test]
    fn test_earliest_marker_wins() {
        let buf = [0x00, 0x3A, 0x30, 0x3B, 0x30, 0x00];
        assert_eq!(find_marker(&buf), &buf[1..]);

        let buf = [0x3B, 0x30, 0x3A, 0x30];
        assert_eq!(find_marker(&buf), &buf);
    }

    #[test]
    fn test_high_bit_low_byte() {
        // the low byte must be masked; 0xBA must not alias 0x3A
        assert!(find_marker(&[0xBA, 0x30]).is_empty());
        assert!(find_marker(&[0x3A, 0xB0]).is_empty());
    }

    #[test]
    fn test_no_marker() {
        let buf: Vec<u8> = (0u8..=0x2F).chain(0x31..=0xFF).collect();
        assert!(find_marker(&buf).is_empty());
    }

    #[test]
    fn test_cookie_roundtrip() {
        for cookie in [Cookie::NoRunContainer, Cookie::RunContainer] {
            assert_eq!(Cookie::from_u16(cookie.value()), Some(cookie));
        }
        assert_eq!(Cookie::from_u16(12345), None);
        assert!(Cookie::RunContainer.has_run_flags());
        assert!(!Cookie::NoRunContainer.has_run_flags());
    }

    proptest! {
        #[test]
        fn test_find_marker_skips_noise(prefix in noise(), set in values()) {
            let encoded = encode(set);
            let mut buf = prefix.clone();
            buf.extend_from_slice(&encoded);
            assert_eq!(find_marker(&buf), encoded.as_slice());
        }

        #[test]
        fn test_find_marker_without_cookie_byte(buf in vec(0u8..0x30, 0..256)) {
            assert!(find_marker(&buf).is_empty());
        }
    }
}
