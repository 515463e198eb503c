use std::ops::RangeInclusive;

use itertools::Itertools;
use zerocopy::{FromBytes, Immutable, KnownLayout, LittleEndian, U16, U64, Unaligned};

use crate::{
    codec::DecodeErr,
    container::{
        Container, ContainerKind, array::ArrayContainer, bitmap::BitmapContainer,
        run::RunContainer,
    },
    traits::BitmapRead,
};

#[derive(Debug, FromBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct EncodedRun {
    start: U16<LittleEndian>,
    /// the number of values in the run after `start`
    length: U16<LittleEndian>,
}

impl EncodedRun {
    /// returns None if the run extends past `u16::MAX`
    #[inline]
    pub fn to_range(&self) -> Option<RangeInclusive<u16>> {
        let start = self.start.get();
        start.checked_add(self.length.get()).map(|end| start..=end)
    }
}

/// A zero-copy view of a single serialized container.
#[derive(Debug)]
pub enum ContainerRef<'a> {
    Array {
        values: &'a [U16<LittleEndian>],
    },
    Bitmap {
        words: &'a [U64<LittleEndian>],
        cardinality: usize,
    },
    Run {
        runs: &'a [EncodedRun],
    },
}

impl<'a> ContainerRef<'a> {
    /// Decodes a container of the given kind from the start of `data`,
    /// returning it along with the bytes that follow it.
    pub fn from_prefix(
        kind: ContainerKind,
        cardinality: usize,
        data: &'a [u8],
    ) -> Result<(Self, &'a [u8]), DecodeErr> {
        match kind {
            ContainerKind::Array => {
                let (values, data) =
                    <[U16<LittleEndian>]>::ref_from_prefix_with_elems(data, cardinality)?;
                Ok((Self::Array { values }, data))
            }
            ContainerKind::Bitmap => {
                let (words, data) =
                    <[U64<LittleEndian>]>::ref_from_prefix_with_elems(data, BitmapContainer::WORDS)?;
                Ok((Self::Bitmap { words, cardinality }, data))
            }
            ContainerKind::Run => {
                let (runs, data) = U16::<LittleEndian>::read_from_prefix(data)?;
                let (runs, data) =
                    <[EncodedRun]>::ref_from_prefix_with_elems(data, usize::from(runs.get()))?;
                Ok((Self::Run { runs }, data))
            }
        }
    }

    pub fn kind(&self) -> ContainerKind {
        match self {
            Self::Array { .. } => ContainerKind::Array,
            Self::Bitmap { .. } => ContainerKind::Bitmap,
            Self::Run { .. } => ContainerKind::Run,
        }
    }
}

impl TryFrom<ContainerRef<'_>> for Container {
    type Error = DecodeErr;

    fn try_from(value: ContainerRef<'_>) -> Result<Self, Self::Error> {
        match value {
            ContainerRef::Array { values } => {
                let values = values.iter().map(|v| v.get());
                // values must be strictly increasing
                if !values.clone().tuple_windows().all(|(a, b)| a < b) {
                    return Err(DecodeErr::Validity);
                }
                Ok(Container::Array(
                    ArrayContainer::from_sorted_unique_unchecked(values),
                ))
            }
            ContainerRef::Bitmap { words, cardinality } => {
                let bitmap = BitmapContainer::from_words(words.iter().map(|w| w.get()));
                if bitmap.cardinality() != cardinality {
                    return Err(DecodeErr::Validity);
                }
                Ok(Container::Bitmap(bitmap))
            }
            ContainerRef::Run { runs } => {
                let mut ranges = Vec::with_capacity(runs.len());
                let mut prev_end: Option<u16> = None;
                for run in runs {
                    let range = run.to_range().ok_or(DecodeErr::Validity)?;
                    // runs must be sorted and disjoint
                    if prev_end.is_some_and(|end| *range.start() <= end) {
                        return Err(DecodeErr::Validity);
                    }
                    prev_end = Some(*range.end());
                    ranges.push(range);
                }
                Ok(Container::Run(RunContainer::from_iter(ranges)))
            }
        }
    }
}
