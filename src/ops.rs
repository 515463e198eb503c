use std::{fmt::Display, str::FromStr};

use crate::{
    Bitmap, Error,
    codec::DecodeErr,
    cookie::find_marker,
    traits::{Intersects, Subset},
};

/// A set predicate between a document's bitmap and a reference bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// The document bitmap contains every value in the reference bitmap.
    Contains,
    /// Every value in the document bitmap is in the reference bitmap.
    IsContainedBy,
    /// The bitmaps share at least one value.
    Overlap,
    Equal,
    NotEqual,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Self::Contains,
        Self::IsContainedBy,
        Self::Overlap,
        Self::Equal,
        Self::NotEqual,
    ];

    /// The tokens accepted by [`parse_operation`]. The first alias is the
    /// canonical symbolic form.
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Contains => &["@>", "contains"],
            Self::IsContainedBy => &["<@", "is_contained_by"],
            Self::Overlap => &["&&", "overlap"],
            Self::Equal => &["=", "equal"],
            Self::NotEqual => &["<>", "not_equal"],
        }
    }

    /// Applies this predicate with `doc` on the left-hand side.
    pub fn apply(self, doc: &Bitmap, reference: &Bitmap) -> bool {
        match self {
            Self::Contains => reference.is_subset(doc),
            Self::IsContainedBy => doc.is_subset(reference),
            Self::Overlap => doc.intersects(reference),
            Self::Equal => doc == reference,
            Self::NotEqual => doc != reference,
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.aliases()[0])
    }
}

impl FromStr for Operation {
    type Err = Error;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_operation(s)
    }
}

/// Parses an operation from one of its aliases. Matching is exact and
/// case-sensitive.
///
/// ```
/// use roaring_filter::{Operation, parse_operation};
///
/// assert_eq!(parse_operation("@>").unwrap(), Operation::Contains);
/// assert_eq!(parse_operation("not_equal").unwrap(), Operation::NotEqual);
/// assert!(parse_operation("bogus").is_err());
/// ```
pub fn parse_operation(token: &str) -> Result<Operation, Error> {
    Operation::ALL
        .into_iter()
        .find(|op| op.aliases().contains(&token))
        .ok_or_else(|| Error::InvalidOperation(token.to_owned()))
}

/// Evaluates `operation` between the bitmap stored in `doc_bitmap_bytes` and
/// `reference`.
///
/// The document bytes are scanned for a magic cookie first. A buffer without
/// one holds no bitmap and never matches. A buffer with a cookie that fails to
/// decode is an error rather than a non-match.
pub fn evaluate(
    operation: Operation,
    doc_bitmap_bytes: &[u8],
    reference: &Bitmap,
) -> Result<bool, DecodeErr> {
    let located = find_marker(doc_bitmap_bytes);
    if located.is_empty() {
        return Ok(false);
    }
    let doc = Bitmap::decode(located)?;
    Ok(operation.apply(&doc, reference))
}
