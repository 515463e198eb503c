use std::fmt::Debug;

use itertools::EitherOrBoth;

use crate::{
    Key,
    codec::{self, DecodeErr},
    container::Container,
    relational::Relation,
    traits::{BitmapRead, Intersects, Subset},
    util::IteratorExt,
};

/// A set of `u32` values decoded from the portable Roaring format.
///
/// Values are partitioned by their high 16 bits into containers, each holding
/// the low 16 bits as a sorted array, a dense bitmap, or a list of runs. Two
/// bitmaps compare equal when they hold the same values, regardless of how
/// either one was encoded.
///
/// ```
/// use roaring_filter::{Bitmap, BitmapRead};
///
/// // {1, 42} without run containers
/// let buf = [
///     0x3A, 0x30, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00,
///     0x10, 0x00, 0x00, 0x00, 0x01, 0x00, 0x2A, 0x00,
/// ];
/// let bitmap = Bitmap::decode(&buf).unwrap();
/// assert_eq!(bitmap.cardinality(), 2);
/// assert!(bitmap.contains(42));
/// assert!(!bitmap.contains(43));
/// ```
#[derive(Clone, Default)]
pub struct Bitmap {
    containers: Vec<(Key, Container)>,
    cardinality: usize,
}

static_assertions::assert_impl_all!(Bitmap: Send, Sync);

#[inline]
fn split(value: u32) -> (Key, u16) {
    ((value >> 16) as Key, value as u16)
}

#[inline]
fn combine(key: Key, low: u16) -> u32 {
    (u32::from(key) << 16) | u32::from(low)
}

impl Bitmap {
    /// An empty bitmap, suitable for usage in a const context.
    pub const EMPTY: Self = Bitmap { containers: Vec::new(), cardinality: 0 };

    /// Decodes a bitmap from a buffer which starts exactly at a magic cookie.
    ///
    /// Use [`crate::find_marker`] first when the buffer may carry leading bytes.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeErr> {
        codec::decode(data)
    }

    /// Construct a `Bitmap` from non-empty containers sorted by unique key.
    pub(crate) fn from_sorted_containers_unchecked(containers: Vec<(Key, Container)>) -> Self {
        debug_assert!(containers.windows(2).all(|w| w[0].0 < w[1].0));
        let cardinality = containers.iter().map(|(_, c)| c.cardinality()).sum();
        Self { containers, cardinality }
    }

    /// returns true if every value in `other` is also in self
    #[inline]
    pub fn is_superset(&self, other: &Bitmap) -> bool {
        other.is_subset(self)
    }
}

impl Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: Vec<_> = self.iter().take(10).collect();
        f.debug_struct("Bitmap")
            .field("cardinality", &self.cardinality)
            .field("containers", &self.containers)
            .field("prefix", &prefix)
            .finish()
    }
}

impl BitmapRead<u32> for Bitmap {
    #[inline]
    fn cardinality(&self) -> usize {
        self.cardinality
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.cardinality == 0
    }

    fn contains(&self, value: u32) -> bool {
        let (key, low) = split(value);
        self.get(key).is_some_and(|c| c.contains(low))
    }

    fn last(&self) -> Option<u32> {
        self.containers
            .last()
            .and_then(|(key, c)| c.last().map(|low| combine(*key, low)))
    }

    fn iter(&self) -> impl Iterator<Item = u32> {
        self.containers
            .iter()
            .flat_map(|(key, c)| c.iter().map(move |low| combine(*key, low)))
            .with_size_hint(self.cardinality)
    }
}

impl Relation for Bitmap {
    type ValRef<'a>
        = &'a Container
    where
        Self: 'a;

    #[inline]
    fn len(&self) -> usize {
        self.containers.len()
    }

    fn get(&self, key: Key) -> Option<Self::ValRef<'_>> {
        self.containers
            .binary_search_by_key(&key, |(k, _)| *k)
            .ok()
            .map(|idx| &self.containers[idx].1)
    }

    fn sorted_iter(&self) -> impl Iterator<Item = (Key, Self::ValRef<'_>)> {
        self.containers.iter().map(|(k, c)| (*k, c))
    }
}

impl Subset for Bitmap {
    fn is_subset(&self, rhs: &Bitmap) -> bool {
        if self.cardinality > rhs.cardinality || self.containers.len() > rhs.containers.len() {
            return false;
        }
        self.sorted_iter()
            .all(|(key, l)| rhs.get(key).is_some_and(|r| l.is_subset(r)))
    }
}

impl Intersects for Bitmap {
    fn intersects(&self, rhs: &Bitmap) -> bool {
        self.inner_join(rhs).any(|(_, l, r)| l.intersects(r))
    }
}

impl PartialEq for Bitmap {
    fn eq(&self, other: &Bitmap) -> bool {
        self.cardinality == other.cardinality
            && self.containers.len() == other.containers.len()
            && self
                .outer_join(other)
                .all(|(_, joined)| matches!(joined, EitherOrBoth::Both(l, r) if l == r))
    }
}

impl Eq for Bitmap {}
