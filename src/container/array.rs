use std::fmt::Debug;

use itertools::{EitherOrBoth, Itertools};

use crate::{
    traits::{BitmapRead, Intersects, Subset},
    util::find_next_sorted,
};

/// A sorted list of the low 16 bits of every value in the container.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ArrayContainer {
    values: Vec<u16>,
}

impl ArrayContainer {
    /// Containers with more values than this are serialized as bitmaps.
    pub const MAX_CARDINALITY: usize = 4096;

    /// Construct an `ArrayContainer` from a sorted iter of unique values.
    /// The container misbehaves if the iter is not sorted or contains duplicates.
    pub fn from_sorted_unique_unchecked(values: impl Iterator<Item = u16>) -> Self {
        ArrayContainer { values: values.collect() }
    }
}

impl Debug for ArrayContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ArrayContainer({})", self.cardinality())
    }
}

impl FromIterator<u16> for ArrayContainer {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        let values = iter.into_iter().sorted().dedup();
        Self::from_sorted_unique_unchecked(values)
    }
}

impl BitmapRead<u16> for ArrayContainer {
    #[inline]
    fn cardinality(&self) -> usize {
        self.values.len()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn contains(&self, value: u16) -> bool {
        self.values.binary_search(&value).is_ok()
    }

    fn last(&self) -> Option<u16> {
        self.values.last().copied()
    }

    fn iter(&self) -> impl Iterator<Item = u16> {
        self.values.iter().copied()
    }
}

impl Subset for ArrayContainer {
    fn is_subset(&self, rhs: &Self) -> bool {
        if self.values.len() > rhs.values.len() {
            return false;
        }
        let mut rhs = rhs.iter().peekable();
        self.iter().all(|v| find_next_sorted(&mut rhs, &v).is_some())
    }
}

impl Intersects for ArrayContainer {
    fn intersects(&self, rhs: &Self) -> bool {
        self.iter()
            .merge_join_by(rhs.iter(), Ord::cmp)
            .any(|el| matches!(el, EitherOrBoth::Both(..)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_iter_sorts() {
        let array = ArrayContainer::from_iter([9, 1, 5, 1]);
        assert_eq!(array.iter().collect_vec(), [1, 5, 9]);
        assert_eq!(array.cardinality(), 3);
        assert_eq!(array.last(), Some(9));
        assert!(array.contains(5));
        assert!(!array.contains(6));
    }

    #[test]
    fn test_subset() {
        let small = ArrayContainer::from_iter([1, 5]);
        let large = ArrayContainer::from_iter([0, 1, 2, 5, 7]);
        assert!(small.is_subset(&large));
        assert!(!large.is_subset(&small));
        assert!(small.is_subset(&small));
        assert!(ArrayContainer::default().is_subset(&small));

        let miss = ArrayContainer::from_iter([1, 6]);
        assert!(!miss.is_subset(&large));
    }

    #[test]
    fn test_intersects() {
        let a = ArrayContainer::from_iter([1, 5, 9]);
        let b = ArrayContainer::from_iter([2, 9]);
        let c = ArrayContainer::from_iter([0, 2, 4]);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
        assert!(!a.intersects(&ArrayContainer::default()));
    }
}
