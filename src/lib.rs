//! `roaring-filter` evaluates set predicates between serialized [Roaring Bitmaps](https://roaringbitmap.org/)
//! stored alongside documents and a reference bitmap supplied with a query.
//!
//! ## Key Features:
//!
//! - **Magic Cookie Scanning**: Stored values may carry unrelated leading bytes. [`find_marker`] locates the first
//!   little-endian Roaring cookie (`12346` or `12347`) so the bitmap can be decoded from there.
//!
//! - **Portable Format Decoding**: [`Bitmap::decode`] reads the portable Roaring serialization, both with and
//!   without run containers, rejecting truncated or structurally inconsistent input.
//!
//! - **Set Predicates**: [`evaluate`] applies one of five [`Operation`]s (`@>`, `<@`, `&&`, `=`, `<>`) between a
//!   document's bitmap and a reference bitmap decoded once per query.
//!
//! - **Query Filters**: [`FilterParams`] validates query parameters and compiles them into a [`BitmapFilter`] which
//!   may be shared across threads for per-document evaluation.

use thiserror::Error;

mod bitmap;
mod codec;
mod container;
pub mod cookie;
pub mod filter;
pub mod ops;
mod relational;
mod traits;
mod util;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use bitmap::Bitmap;
pub use codec::DecodeErr;
pub use cookie::{SERIAL_COOKIE, SERIAL_COOKIE_NO_RUNCONTAINER, find_marker};
pub use filter::{BitmapFilter, FilterParams};
pub use ops::{Operation, evaluate, parse_operation};
pub use traits::{BitmapRead, Intersects, Subset};

/// The high 16 bits shared by every value in a container.
type Key = u16;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing parameter [{0}]")]
    MissingParameter(&'static str),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid base64 in parameter [terms]")]
    InvalidTerms(#[from] base64::DecodeError),

    #[error("Unable to decode reference bitmap")]
    Decode(#[from] DecodeErr),
}
