use itertools::{EitherOrBoth, Itertools};

use crate::Key;

/// A key-sorted collection of containers.
pub trait Relation {
    type ValRef<'a>
    where
        Self: 'a;

    /// Returns the number of entries in the relation.
    fn len(&self) -> usize;

    /// Returns the entry stored under `key`.
    fn get(&self, key: Key) -> Option<Self::ValRef<'_>>;

    /// Returns an iterator over the entries of the relation sorted by key.
    fn sorted_iter(&self) -> impl Iterator<Item = (Key, Self::ValRef<'_>)>;

    /// Returns the entries whose key is present on both sides, probing `right`
    /// once per entry on the left.
    fn inner_join<'a, R>(
        &'a self,
        right: &'a R,
    ) -> impl Iterator<Item = (Key, Self::ValRef<'a>, R::ValRef<'a>)>
    where
        R: Relation,
    {
        self.sorted_iter()
            .filter_map(|(k, l)| right.get(k).map(|r| (k, l, r)))
    }

    /// Returns every key present on either side in ascending order, paired
    /// with the entries found under it.
    fn outer_join<'a, R>(
        &'a self,
        right: &'a R,
    ) -> impl Iterator<Item = (Key, EitherOrBoth<Self::ValRef<'a>, R::ValRef<'a>>)>
    where
        R: Relation,
    {
        self.sorted_iter()
            .merge_join_by(right.sorted_iter(), |(l, _), (r, _)| l.cmp(r))
            .map(|joined| match joined {
                EitherOrBoth::Both((k, l), (_, r)) => (k, EitherOrBoth::Both(l, r)),
                EitherOrBoth::Left((k, l)) => (k, EitherOrBoth::Left(l)),
                EitherOrBoth::Right((k, r)) => (k, EitherOrBoth::Right(r)),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use itertools::{EitherOrBoth, Itertools};

    use super::Relation;
    use crate::Key;

    struct Sparse(BTreeMap<Key, &'static str>);

    impl Relation for Sparse {
        type ValRef<'a>
            = &'static str
        where
            Self: 'a;

        fn len(&self) -> usize {
            self.0.len()
        }

        fn get(&self, key: Key) -> Option<Self::ValRef<'_>> {
            self.0.get(&key).copied()
        }

        fn sorted_iter(&self) -> impl Iterator<Item = (Key, Self::ValRef<'_>)> {
            self.0.iter().map(|(k, v)| (*k, *v))
        }
    }

    fn sparse<const N: usize>(entries: [(Key, &'static str); N]) -> Sparse {
        Sparse(entries.into())
    }

    #[test]
    fn test_inner_join() {
        let left = sparse([(1, "a"), (7, "b"), (u16::MAX, "c")]);
        let right = sparse([(0, "x"), (7, "y"), (u16::MAX, "z")]);

        assert_eq!(left.len(), 3);
        assert_eq!(
            left.inner_join(&right).collect_vec(),
            [(7, "b", "y"), (u16::MAX, "c", "z")]
        );
        assert_eq!(left.inner_join(&sparse([])).count(), 0);
    }

    #[test]
    fn test_outer_join() {
        let left = sparse([(1, "a"), (7, "b")]);
        let right = sparse([(0, "x"), (7, "y"), (9, "z")]);

        assert_eq!(
            left.outer_join(&right).collect_vec(),
            [
                (0, EitherOrBoth::Right("x")),
                (1, EitherOrBoth::Left("a")),
                (7, EitherOrBoth::Both("b", "y")),
                (9, EitherOrBoth::Right("z")),
            ]
        );
    }
}
