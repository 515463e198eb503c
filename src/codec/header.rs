use bitvec::{order::Lsb0, slice::BitSlice};
use zerocopy::{FromBytes, Immutable, KnownLayout, LittleEndian, U16, U32, Unaligned};

use crate::{
    Key,
    codec::DecodeErr,
    cookie::Cookie,
};

/// A bitmap may hold at most one container per 16-bit key.
pub const MAX_CONTAINERS: usize = 1 << 16;

/// Run-flagged bitmaps with fewer containers than this omit the offset table.
pub const NO_OFFSET_THRESHOLD: usize = 4;

#[derive(Debug, FromBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct Descriptor {
    key: U16<LittleEndian>,
    /// cardinality is decremented when stored
    cardinality: U16<LittleEndian>,
}

impl Descriptor {
    #[inline]
    pub fn key(&self) -> Key {
        self.key.get()
    }

    #[inline]
    pub fn cardinality(&self) -> usize {
        usize::from(self.cardinality.get()) + 1
    }
}

/// The decoded header of a serialized bitmap, borrowing from the input buffer.
#[derive(Debug)]
pub struct Header<'a> {
    cookie: Cookie,
    run_flags: Option<&'a BitSlice<u8, Lsb0>>,
    descriptors: &'a [Descriptor],
}

impl<'a> Header<'a> {
    /// Decodes the header at the start of `data`, returning it along with the
    /// remaining bytes which hold the containers.
    pub fn from_prefix(data: &'a [u8]) -> Result<(Self, &'a [u8]), DecodeErr> {
        let (word, data) = U32::<LittleEndian>::read_from_prefix(data)?;
        let word = word.get();

        let (cookie, len, data) = match Cookie::from_u16(word as u16) {
            // the high 16 bits hold the container count, decremented
            Some(Cookie::RunContainer) => (Cookie::RunContainer, (word >> 16) as usize + 1, data),
            Some(Cookie::NoRunContainer) if word >> 16 == 0 => {
                let (len, data) = U32::<LittleEndian>::read_from_prefix(data)?;
                (Cookie::NoRunContainer, len.get() as usize, data)
            }
            _ => return Err(DecodeErr::Magic),
        };

        if len > MAX_CONTAINERS {
            return Err(DecodeErr::Validity);
        }

        let (run_flags, data) = if cookie.has_run_flags() {
            let (flags, data) = DecodeErr::split_prefix(data, len.div_ceil(8))?;
            (Some(BitSlice::from_slice(flags)), data)
        } else {
            (None, data)
        };

        let (descriptors, data) = <[Descriptor]>::ref_from_prefix_with_elems(data, len)?;

        // offsets are redundant for sequential decoding but must be present
        let data = if Self::has_offsets(cookie, len) {
            let (_, data) = DecodeErr::split_prefix(data, len * size_of::<u32>())?;
            data
        } else {
            data
        };

        Ok((Self { cookie, run_flags, descriptors }, data))
    }

    #[inline]
    fn has_offsets(cookie: Cookie, len: usize) -> bool {
        !cookie.has_run_flags() || len >= NO_OFFSET_THRESHOLD
    }

    #[inline]
    pub fn cookie(&self) -> Cookie {
        self.cookie
    }

    /// the number of containers described by this header
    #[inline]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[inline]
    pub fn descriptors(&self) -> &'a [Descriptor] {
        self.descriptors
    }

    /// returns true if the container at `idx` is flagged as a run container
    #[inline]
    pub fn is_run(&self, idx: usize) -> bool {
        self.run_flags.is_some_and(|flags| flags[idx])
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::testutil::Fixture;

    #[test]
    fn test_no_run_header() {
        let buf = Fixture::default().array(0, [1, 42]).array(3, [7]).encode();
        let (header, rest) = Header::from_prefix(&buf).unwrap();
        assert_eq!(header.cookie(), Cookie::NoRunContainer);
        assert_eq!(header.len(), 2);
        assert_eq!(header.descriptors()[0].key(), 0);
        assert_eq!(header.descriptors()[0].cardinality(), 2);
        assert_eq!(header.descriptors()[1].key(), 3);
        assert_eq!(header.descriptors()[1].cardinality(), 1);
        assert!(!header.is_run(0));
        // the remaining bytes hold exactly three u16 values
        assert_eq!(rest.len(), 6);
    }

    #[test]
    fn test_run_header_without_offsets() {
        let buf = Fixture::default()
            .array(0, [1])
            .run(1, [(10, 4)])
            .encode();
        let (header, rest) = Header::from_prefix(&buf).unwrap();
        assert_eq!(header.cookie(), Cookie::RunContainer);
        assert_eq!(header.len(), 2);
        assert!(!header.is_run(0));
        assert!(header.is_run(1));
        assert_eq!(header.descriptors()[1].cardinality(), 5);
        // array value + run count + one run
        assert_eq!(rest.len(), 2 + 2 + 4);
    }

    #[test]
    fn test_run_header_with_offsets() {
        let buf = Fixture::default()
            .run(0, [(0, 0)])
            .array(1, [1])
            .array(2, [2])
            .run(3, [(3, 1)])
            .encode();
        let (header, rest) = Header::from_prefix(&buf).unwrap();
        assert_eq!(header.len(), 4);
        assert!(header.is_run(0));
        assert!(!header.is_run(1));
        assert!(!header.is_run(2));
        assert!(header.is_run(3));
        assert_eq!(rest.len(), (2 + 4) + 2 + 2 + (2 + 4));
    }

    #[test]
    fn test_empty_header() {
        let buf = [0x3A, 0x30, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let (header, rest) = Header::from_prefix(&buf).unwrap();
        assert_eq!(header.len(), 0);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_no_run_cookie_with_high_bits() {
        let buf = [0x3A, 0x30, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert_matches!(Header::from_prefix(&buf), Err(DecodeErr::Magic));
    }

    #[test]
    fn test_too_many_containers() {
        let mut buf = vec![0x3A, 0x30, 0x00, 0x00];
        buf.extend_from_slice(&(MAX_CONTAINERS as u32 + 1).to_le_bytes());
        assert_matches!(Header::from_prefix(&buf), Err(DecodeErr::Validity));
    }

    #[test]
    fn test_truncated_descriptors() {
        let mut buf = vec![0x3A, 0x30, 0x00, 0x00];
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        assert_matches!(Header::from_prefix(&buf), Err(DecodeErr::Length));
    }
}
