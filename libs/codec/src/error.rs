//! Codec errors for cell encoding and decoding
//!
//! Every failure is raised synchronously by the codec itself and aborts the
//! pack/unpack call that hit it. Nothing here retries or recovers; the caller
//! decides whether a failed body aborts a whole transaction build. Each
//! variant carries enough context to tell which field tripped it.

use storm_types::AddressError;
use thiserror::Error;

/// Cell codec errors with diagnostic context
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Value does not fit the declared bit width (encode time)
    #[error("Value out of range: does not fit in {width} bits (context: {context})")]
    ValueOutOfRange { width: usize, context: String },

    /// Appending would push a cell past its 1023-bit budget (encode time)
    #[error("Cell overflow: {bits} bits exceeds limit {limit}")]
    CellOverflow { bits: usize, limit: usize },

    /// More than 4 child references attached to one cell (encode time)
    #[error("Too many refs: a cell holds at most {limit} references")]
    TooManyRefs { limit: usize },

    /// Not enough bits or references left in the slice (decode time)
    #[error("Buffer underrun: need {need} {what}, have {have}")]
    BufferUnderrun {
        need: usize,
        have: usize,
        what: &'static str,
    },

    /// A discriminant holds a value with no defined meaning (decode time)
    #[error("Malformed {width}-bit tag {tag:#x} (context: {context})")]
    MalformedTag {
        tag: u64,
        width: usize,
        context: String,
    },

    /// Order type tag outside 0..=3
    #[error("Unknown order type: {0}")]
    UnknownOrderType(u8),

    /// Bag-of-cells container is structurally invalid
    #[error("Invalid bag of cells: {0}")]
    InvalidBoc(String),

    /// Address text could not be parsed
    #[error(transparent)]
    Address(#[from] AddressError),
}

impl CodecError {
    /// Create ValueOutOfRange with the field being encoded
    pub fn value_out_of_range(width: usize, context: impl Into<String>) -> Self {
        Self::ValueOutOfRange {
            width,
            context: context.into(),
        }
    }

    /// Create BufferUnderrun for missing data bits
    pub fn bits_underrun(need: usize, have: usize) -> Self {
        Self::BufferUnderrun {
            need,
            have,
            what: "bits",
        }
    }

    /// Create BufferUnderrun for missing references
    pub fn refs_underrun(need: usize, have: usize) -> Self {
        Self::BufferUnderrun {
            need,
            have,
            what: "refs",
        }
    }

    /// Create MalformedTag with the structure being decoded
    pub fn malformed_tag(tag: u64, width: usize, context: impl Into<String>) -> Self {
        Self::MalformedTag {
            tag,
            width,
            context: context.into(),
        }
    }

    /// Create InvalidBoc with a description of the violated rule
    pub fn invalid_boc(description: impl Into<String>) -> Self {
        Self::InvalidBoc(description.into())
    }

    /// Whether this is a discriminant violation (bad address tag, unknown
    /// order type, unknown oracle kind)
    pub fn is_malformed_tag(&self) -> bool {
        matches!(
            self,
            CodecError::MalformedTag { .. } | CodecError::UnknownOrderType(_)
        )
    }
}

/// Result type for codec operations
pub type CodecResult<T> = std::result::Result<T, CodecError>;
