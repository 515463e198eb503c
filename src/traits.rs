pub trait BitmapRead<V> {
    /// the total number of values accessible via this set.
    fn cardinality(&self) -> usize;

    /// returns true if this set is empty
    fn is_empty(&self) -> bool;

    /// returns true if this set contains the given value
    fn contains(&self, value: V) -> bool;

    /// returns the last value in the set
    fn last(&self) -> Option<V>;

    /// returns an iterator over all values in this set in ascending order
    fn iter(&self) -> impl Iterator<Item = V>;
}

pub trait Subset<Rhs = Self> {
    /// returns true if every value in self is also in rhs
    fn is_subset(&self, rhs: &Rhs) -> bool;
}

pub trait Intersects<Rhs = Self> {
    /// returns true if self and rhs share at least one value
    fn intersects(&self, rhs: &Rhs) -> bool;
}
