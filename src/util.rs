use std::iter::Peekable;

#[doc(hidden)]
#[macro_export]
macro_rules! MultiIter {
    ($type:ident, $($name:ident),+) => {
        #[must_use]
        pub(crate) enum $type<$($name),+> {
            $($name($name)),+
        }

        impl<T, $($name: Iterator<Item=T>),+> Iterator
        for $type<$($name),+>
        {
            type Item = T;

            fn next(&mut self) -> Option<Self::Item> {
                match self {
                    $(Self::$name(iter) => iter.next(),)+
                }
            }

            fn size_hint(&self) -> (usize, Option<usize>) {
                match self {
                    $(Self::$name(iter) => iter.size_hint(),)+
                }
            }
        }

        impl<T, $($name: Iterator<Item=T> + std::iter::FusedIterator),+> std::iter::FusedIterator
        for $type<$($name),+> { }
    };
}

pub fn find_next_sorted<I, T>(iter: &mut Peekable<I>, needle: &T) -> Option<T>
where
    I: Iterator<Item = T>,
    T: PartialOrd + PartialEq,
{
    // advance the iterator until either:
    // 1. we find the needle
    // 2. we find a value larger than the needle
    //
    while let Some(next) = iter.next_if(|v| v <= needle) {
        if &next == needle {
            return Some(next);
        }
    }
    None
}

pub trait IteratorExt: Iterator + Sized {
    #[inline]
    fn with_size_hint(self, hint: usize) -> SizeHintIter<Self> {
        SizeHintIter::new(hint, self)
    }
}

impl<I: Iterator> IteratorExt for I {}

/// A `SizeHintIter` wraps an iter with a lower bound.
#[must_use]
pub struct SizeHintIter<I> {
    remaining: usize,
    iter: I,
}

impl<T, I: Iterator<Item = T>> SizeHintIter<I> {
    pub fn new(size: usize, iter: I) -> Self {
        Self { remaining: size, iter }
    }
}

impl<T, I: Iterator<Item = T>> Iterator for SizeHintIter<I> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.remaining = self.remaining.saturating_sub(1);
        self.iter.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.iter.size_hint();
        (self.remaining.max(lower), upper)
    }
}

#[cfg(test)]
mod tests {
    use super::{IteratorExt, find_next_sorted};

    #[test]
    fn test_find_next_sorted() {
        let mut iter = [1u16, 3, 5, 9].into_iter().peekable();
        assert_eq!(find_next_sorted(&mut iter, &3), Some(3));
        assert_eq!(find_next_sorted(&mut iter, &4), None);
        // 5 is still available since 4 stopped before it
        assert_eq!(find_next_sorted(&mut iter, &5), Some(5));
        assert_eq!(find_next_sorted(&mut iter, &10), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_size_hint_iter() {
        let mut iter = [1, 2, 3].into_iter().filter(|_| true).with_size_hint(3);
        assert_eq!(iter.size_hint(), (3, Some(3)));
        iter.next();
        assert_eq!(iter.size_hint(), (2, Some(2)));
    }
}
