use std::{fmt::Debug, ops::RangeInclusive};

use range_set_blaze::RangeSetBlaze;

use crate::{
    traits::{BitmapRead, Intersects, Subset},
    util::IteratorExt,
};

/// Sorted disjoint inclusive ranges over the low 16 bits of the container's values.
#[derive(Clone, Default)]
pub struct RunContainer {
    runs: RangeSetBlaze<u16>,
    cardinality: usize,
}

impl RunContainer {
    fn new(runs: RangeSetBlaze<u16>) -> Self {
        let cardinality = runs
            .ranges()
            .map(|r| usize::from(*r.end() - *r.start()) + 1)
            .sum();
        Self { runs, cardinality }
    }

    #[inline]
    pub fn count_runs(&self) -> usize {
        self.runs.ranges_len()
    }
}

impl Debug for RunContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RunContainer{{ cardinality: {}, ranges: {} }}",
            self.cardinality,
            self.count_runs()
        )
    }
}

impl FromIterator<u16> for RunContainer {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        Self::new(RangeSetBlaze::from_iter(iter))
    }
}

impl FromIterator<RangeInclusive<u16>> for RunContainer {
    fn from_iter<I: IntoIterator<Item = RangeInclusive<u16>>>(iter: I) -> Self {
        Self::new(RangeSetBlaze::from_iter(iter))
    }
}

impl BitmapRead<u16> for RunContainer {
    #[inline]
    fn cardinality(&self) -> usize {
        self.cardinality
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    fn contains(&self, value: u16) -> bool {
        self.runs.contains(value)
    }

    fn last(&self) -> Option<u16> {
        self.runs.last()
    }

    fn iter(&self) -> impl Iterator<Item = u16> {
        self.runs.iter().with_size_hint(self.cardinality)
    }
}

impl Subset for RunContainer {
    fn is_subset(&self, rhs: &Self) -> bool {
        self.cardinality <= rhs.cardinality && (&self.runs - &rhs.runs).is_empty()
    }
}

impl Intersects for RunContainer {
    fn intersects(&self, rhs: &Self) -> bool {
        !(&self.runs & &rhs.runs).is_empty()
    }
}

impl PartialEq for RunContainer {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.runs == other.runs
    }
}

impl Eq for RunContainer {}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn test_runs_merge() {
        let runs = RunContainer::from_iter([1u16, 2, 3, 7, 8, 100]);
        assert_eq!(runs.runs.ranges().collect_vec(), [1..=3, 7..=8, 100..=100]);
        assert_eq!(runs.count_runs(), 3);
        assert_eq!(runs.cardinality(), 6);
        assert_eq!(runs.last(), Some(100));
    }

    #[test]
    fn test_full_range_cardinality() {
        let runs = RunContainer::from_iter([0..=u16::MAX]);
        assert_eq!(runs.cardinality(), 1 << 16);
        assert!(runs.contains(u16::MAX));
    }

    #[test]
    fn test_subset_and_intersects() {
        let outer = RunContainer::from_iter([0..=100, 200..=300]);
        let inner = RunContainer::from_iter([10..=20, 250..=260]);
        let apart = RunContainer::from_iter([101..=199]);

        assert!(inner.is_subset(&outer));
        assert!(!outer.is_subset(&inner));
        assert!(inner.intersects(&outer));
        assert!(!apart.intersects(&outer));
        assert!(!apart.is_subset(&outer));
    }
}
