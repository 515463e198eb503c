use std::fmt::Debug;

use crate::{
    MultiIter,
    traits::{BitmapRead, Intersects, Subset},
};

pub mod array;
pub mod bitmap;
pub mod run;

use array::ArrayContainer;
use bitmap::BitmapContainer;
use run::RunContainer;

/// The storage class of a container, as determined by the serialized header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Array,
    Bitmap,
    Run,
}

impl ContainerKind {
    /// Run containers are flagged explicitly. Otherwise the cardinality decides
    /// between an array and a bitmap.
    #[inline]
    pub fn classify(is_run: bool, cardinality: usize) -> Self {
        if is_run {
            Self::Run
        } else if cardinality > ArrayContainer::MAX_CARDINALITY {
            Self::Bitmap
        } else {
            Self::Array
        }
    }
}

/// The values of a bitmap which share the same high 16 bits.
#[derive(Clone, Eq)]
pub enum Container {
    Array(ArrayContainer),
    Bitmap(BitmapContainer),
    Run(RunContainer),
}

impl Container {
    pub fn kind(&self) -> ContainerKind {
        match self {
            Self::Array(_) => ContainerKind::Array,
            Self::Bitmap(_) => ContainerKind::Bitmap,
            Self::Run(_) => ContainerKind::Run,
        }
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Array(c) => c.fmt(f),
            Self::Bitmap(c) => c.fmt(f),
            Self::Run(c) => c.fmt(f),
        }
    }
}

MultiIter!(Iter, Array, Bitmap, Run);

impl BitmapRead<u16> for Container {
    fn cardinality(&self) -> usize {
        match self {
            Self::Array(c) => c.cardinality(),
            Self::Bitmap(c) => c.cardinality(),
            Self::Run(c) => c.cardinality(),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Array(c) => c.is_empty(),
            Self::Bitmap(c) => c.is_empty(),
            Self::Run(c) => c.is_empty(),
        }
    }

    fn contains(&self, value: u16) -> bool {
        match self {
            Self::Array(c) => c.contains(value),
            Self::Bitmap(c) => c.contains(value),
            Self::Run(c) => c.contains(value),
        }
    }

    fn last(&self) -> Option<u16> {
        match self {
            Self::Array(c) => c.last(),
            Self::Bitmap(c) => c.last(),
            Self::Run(c) => c.last(),
        }
    }

    fn iter(&self) -> impl Iterator<Item = u16> {
        match self {
            Self::Array(c) => Iter::Array(c.iter()),
            Self::Bitmap(c) => Iter::Bitmap(c.iter()),
            Self::Run(c) => Iter::Run(c.iter()),
        }
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Container) -> bool {
        use Container::*;

        match (self, other) {
            // use fast physical ops if both containers share storage
            (Array(a), Array(b)) => a == b,
            (Bitmap(a), Bitmap(b)) => a == b,
            (Run(a), Run(b)) => a == b,

            // otherwise fall back to logical ops
            (a, b) => {
                debug_assert_ne!(a.kind(), b.kind(), "should have different storage classes");
                a.cardinality() == b.cardinality() && itertools::equal(a.iter(), b.iter())
            }
        }
    }
}

impl Subset for Container {
    fn is_subset(&self, rhs: &Container) -> bool {
        use Container::*;

        if self.cardinality() > rhs.cardinality() {
            return false;
        }

        match (self, rhs) {
            (Array(a), Array(b)) => a.is_subset(b),
            (Bitmap(a), Bitmap(b)) => a.is_subset(b),
            (Run(a), Run(b)) => a.is_subset(b),
            (a, b) => a.iter().all(|v| b.contains(v)),
        }
    }
}

impl Intersects for Container {
    fn intersects(&self, rhs: &Container) -> bool {
        use Container::*;

        match (self, rhs) {
            (Array(a), Array(b)) => a.intersects(b),
            (Bitmap(a), Bitmap(b)) => a.intersects(b),
            (Run(a), Run(b)) => a.intersects(b),

            // probe the larger container with the values of the smaller one
            (a, b) if a.cardinality() <= b.cardinality() => a.iter().any(|v| b.contains(v)),
            (a, b) => b.iter().any(|v| a.contains(v)),
        }
    }
}
