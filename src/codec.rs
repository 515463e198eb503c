//! Decoder for the portable Roaring serialization format.
//!
//! A serialized bitmap is a header (cookie, container count, optional run
//! flags, one descriptor per container, optional offsets) followed by the
//! containers in key order. Every integer is little-endian. Decoding reads the
//! containers sequentially, so the offset table is skipped.
//!
//! See <https://github.com/RoaringBitmap/RoaringFormatSpec>.

use thiserror::Error;
use zerocopy::{ConvertError, SizeError};

use crate::{
    Bitmap,
    codec::{container_ref::ContainerRef, header::Header},
    container::{Container, ContainerKind},
    traits::BitmapRead,
};

pub mod container_ref;
pub mod header;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErr {
    #[error("not enough bytes")]
    Length,

    #[error("unknown magic cookie")]
    Magic,

    #[error("invalid encoding")]
    Validity,
}

impl DecodeErr {
    #[inline]
    fn ensure_bytes_available(data: &[u8], len: usize) -> Result<(), DecodeErr> {
        if data.len() < len {
            Err(Self::Length)
        } else {
            Ok(())
        }
    }

    #[inline]
    fn split_prefix(data: &[u8], len: usize) -> Result<(&[u8], &[u8]), DecodeErr> {
        Self::ensure_bytes_available(data, len)?;
        Ok(data.split_at(len))
    }
}

impl<S, D> From<SizeError<S, D>> for DecodeErr {
    fn from(_: SizeError<S, D>) -> Self {
        DecodeErr::Length
    }
}

impl<A, S, V> From<ConvertError<A, S, V>> for DecodeErr {
    fn from(err: ConvertError<A, S, V>) -> Self {
        match err {
            ConvertError::Alignment(_) => panic!("All zerocopy transmutations must be unaligned"),
            ConvertError::Size(_) => DecodeErr::Length,
            ConvertError::Validity(_) => DecodeErr::Validity,
        }
    }
}

/// Decodes a serialized bitmap which starts exactly at its cookie. Bytes
/// following the last container are ignored.
pub fn decode(data: &[u8]) -> Result<Bitmap, DecodeErr> {
    let (header, mut data) = Header::from_prefix(data)?;

    let mut containers = Vec::with_capacity(header.len());
    let mut prev_key = None;
    for (idx, descriptor) in header.descriptors().iter().enumerate() {
        let key = descriptor.key();
        // keys must be strictly increasing
        if prev_key.is_some_and(|prev| prev >= key) {
            return Err(DecodeErr::Validity);
        }
        prev_key = Some(key);

        let cardinality = descriptor.cardinality();
        let kind = ContainerKind::classify(header.is_run(idx), cardinality);
        let (container, rest) = ContainerRef::from_prefix(kind, cardinality, data)?;
        data = rest;

        let container = Container::try_from(container)?;
        if !container.is_empty() {
            containers.push((key, container));
        }
    }

    Ok(Bitmap::from_sorted_containers_unchecked(containers))
}
