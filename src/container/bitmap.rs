use std::fmt::Debug;

use bitvec::{bitbox, boxed::BitBox, order::Lsb0};

use crate::traits::{BitmapRead, Intersects, Subset};

/// A dense 65536-bit vector over the low 16 bits of every value in the container.
#[derive(Clone, PartialEq, Eq)]
pub struct BitmapContainer {
    bitmap: BitBox<u64, Lsb0>,
}

impl BitmapContainer {
    pub const BITS: usize = 1 << 16;
    pub const WORDS: usize = Self::BITS / 64;
    pub const ENCODED_SIZE: usize = Self::BITS / 8;

    /// Construct a `BitmapContainer` from exactly [`Self::WORDS`] words, least
    /// significant bit first.
    pub fn from_words(words: impl Iterator<Item = u64>) -> Self {
        let words: Box<[u64]> = words.collect();
        debug_assert_eq!(words.len(), Self::WORDS, "bitmap container word count");
        BitmapContainer { bitmap: BitBox::from_boxed_slice(words) }
    }

    #[inline]
    fn words(&self) -> &[u64] {
        self.bitmap.as_raw_slice()
    }
}

impl Default for BitmapContainer {
    fn default() -> Self {
        Self { bitmap: bitbox![u64, Lsb0; 0; Self::BITS] }
    }
}

impl Debug for BitmapContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BitmapContainer({})", self.cardinality())
    }
}

impl FromIterator<u16> for BitmapContainer {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        let mut container = Self::default();
        for v in iter {
            container.bitmap.set(usize::from(v), true);
        }
        container
    }
}

impl BitmapRead<u16> for BitmapContainer {
    fn cardinality(&self) -> usize {
        self.bitmap.count_ones()
    }

    fn is_empty(&self) -> bool {
        self.bitmap.not_any()
    }

    #[inline]
    fn contains(&self, value: u16) -> bool {
        // the bitmap always holds Self::BITS bits, so every u16 is in range
        self.bitmap[usize::from(value)]
    }

    fn last(&self) -> Option<u16> {
        self.bitmap.last_one().map(|i| i as u16)
    }

    fn iter(&self) -> impl Iterator<Item = u16> {
        self.bitmap.iter_ones().map(|i| i as u16)
    }
}

impl Subset for BitmapContainer {
    fn is_subset(&self, rhs: &Self) -> bool {
        self.words()
            .iter()
            .zip(rhs.words())
            .all(|(l, r)| l & !r == 0)
    }
}

impl Intersects for BitmapContainer {
    fn intersects(&self, rhs: &Self) -> bool {
        self.words()
            .iter()
            .zip(rhs.words())
            .any(|(l, r)| l & r != 0)
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn test_word_bit_order() {
        let mut words = vec![0u64; BitmapContainer::WORDS];
        words[0] = 0b101;
        words[1] = 1 << 63;
        let bitmap = BitmapContainer::from_words(words.into_iter());
        assert_eq!(bitmap.iter().collect_vec(), [0, 2, 127]);
        assert_eq!(bitmap.cardinality(), 3);
        assert_eq!(bitmap.last(), Some(127));
    }

    #[test]
    fn test_contains_extremes() {
        let bitmap = BitmapContainer::from_iter([0, u16::MAX]);
        assert!(bitmap.contains(0));
        assert!(bitmap.contains(u16::MAX));
        assert!(!bitmap.contains(1));
        assert!(BitmapContainer::default().is_empty());
    }

    #[test]
    fn test_subset_and_intersects() {
        let a = BitmapContainer::from_iter(0..5000);
        let b = BitmapContainer::from_iter(0..6000);
        let c = BitmapContainer::from_iter(6000..12000);
        assert!(a.is_subset(&b));
        assert!(!b.is_subset(&a));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(!b.intersects(&c));
    }
}
