//! Query-time compilation of filter parameters into a reusable per-document
//! predicate.

use base64::{
    Engine,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{
    Bitmap, Error,
    codec::DecodeErr,
    cookie::find_marker,
    ops::{Operation, parse_operation},
    traits::BitmapRead,
};

pub const FIELD_PARAM: &str = "field";
pub const TERMS_PARAM: &str = "terms";
pub const OPERATION_PARAM: &str = "operation";

/// Standard alphabet, accepting input with or without trailing padding.
const TERMS_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// The raw parameters of a bitmap filter query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FilterParams {
    /// name of the document field holding the serialized bitmap
    pub field: Option<String>,
    /// base64 encoded reference bitmap
    pub terms: Option<String>,
    /// one of the [`Operation`] aliases
    pub operation: Option<String>,
}

impl FilterParams {
    pub fn new(
        field: impl Into<String>,
        terms: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        Self {
            field: Some(field.into()),
            terms: Some(terms.into()),
            operation: Some(operation.into()),
        }
    }

    /// Reads the parameters from a JSON object. Non-string values are
    /// converted to their JSON text and `null` counts as absent.
    pub fn from_json_map(params: &Map<String, Value>) -> Self {
        let get = |name: &str| match params.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        };
        Self {
            field: get(FIELD_PARAM),
            terms: get(TERMS_PARAM),
            operation: get(OPERATION_PARAM),
        }
    }

    /// Validates the parameters and decodes the reference bitmap.
    pub fn compile(&self) -> Result<BitmapFilter, Error> {
        let field = self
            .field
            .as_deref()
            .ok_or(Error::MissingParameter(FIELD_PARAM))?;
        let terms = self
            .terms
            .as_deref()
            .ok_or(Error::MissingParameter(TERMS_PARAM))?;
        let operation = self
            .operation
            .as_deref()
            .ok_or(Error::MissingParameter(OPERATION_PARAM))?;

        let operation = parse_operation(operation)?;
        let reference = Bitmap::decode(&TERMS_ENGINE.decode(terms)?)?;

        tracing::debug!(
            field,
            %operation,
            cardinality = reference.cardinality(),
            "compiled bitmap filter"
        );

        Ok(BitmapFilter {
            field: field.to_owned(),
            reference,
            operation,
        })
    }
}

impl TryFrom<&FilterParams> for BitmapFilter {
    type Error = Error;

    #[inline]
    fn try_from(params: &FilterParams) -> Result<Self, Self::Error> {
        params.compile()
    }
}

/// A compiled filter holding a decoded reference bitmap.
///
/// A filter is immutable once compiled and may be shared by reference across
/// threads evaluating different documents.
#[derive(Debug, Clone)]
pub struct BitmapFilter {
    field: String,
    reference: Bitmap,
    operation: Operation,
}

static_assertions::assert_impl_all!(BitmapFilter: Send, Sync);

impl BitmapFilter {
    pub fn new(field: impl Into<String>, reference: Bitmap, operation: Operation) -> Self {
        Self { field: field.into(), reference, operation }
    }

    #[inline]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[inline]
    pub fn reference(&self) -> &Bitmap {
        &self.reference
    }

    #[inline]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Evaluates the filter against a document's stored value. A document
    /// with no value never matches.
    pub fn matches(&self, doc: Option<&[u8]>) -> Result<bool, DecodeErr> {
        let Some(doc) = doc else {
            return Ok(false);
        };

        let located = find_marker(doc);
        if located.is_empty() {
            tracing::trace!(field = %self.field, len = doc.len(), "no bitmap in document");
            return Ok(false);
        }

        match Bitmap::decode(located) {
            Ok(bitmap) => Ok(self.operation.apply(&bitmap, &self.reference)),
            Err(err) => {
                tracing::warn!(field = %self.field, %err, "failed to decode document bitmap");
                Err(err)
            }
        }
    }

    /// Evaluates the filter against each document in order, yielding one
    /// result per document.
    pub fn evaluate_all<'a, I, B>(
        &'a self,
        docs: I,
    ) -> impl Iterator<Item = Result<bool, DecodeErr>> + 'a
    where
        I: IntoIterator<Item = Option<B>>,
        I::IntoIter: 'a,
        B: AsRef<[u8]>,
    {
        docs.into_iter()
            .map(move |doc| self.matches(doc.as_ref().map(AsRef::as_ref)))
    }
}
