//! Error types for address parsing and fixed-point conversion
//!
//! Provides error handling for the value types shared by the codec and the
//! SDK: ledger addresses in raw or user-friendly form, and 9-decimal nano
//! amounts parsed from human-readable strings.

use thiserror::Error;

/// Errors that can occur while parsing or validating a ledger address
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Raw form is not `<workchain>:<64 hex chars>`
    #[error("Invalid raw address '{input}': {reason}")]
    InvalidRaw { input: String, reason: String },

    /// User-friendly form failed base64 decoding or has the wrong length
    #[error("Invalid friendly address '{input}': {reason}")]
    InvalidFriendly { input: String, reason: String },

    /// User-friendly form carries a checksum that does not match its body
    #[error("Address checksum mismatch: expected {expected:#06x}, got {actual:#06x}")]
    ChecksumMismatch { expected: u16, actual: u16 },

    /// User-friendly form carries an unknown flags byte
    #[error("Unknown address flags {flags:#04x}: expected 0x11 or 0x51 (optionally | 0x80)")]
    UnknownFlags { flags: u8 },
}

/// Errors that can occur during nano fixed-point conversion
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FixedPointError {
    /// Value exceeds the maximum representable value for the type
    #[error("Overflow: value {input} exceeds maximum representable nano amount")]
    Overflow { input: String },

    /// Negative amounts are not representable
    #[error("Negative amount '{input}' cannot be represented in nanos")]
    Negative { input: String },

    /// Invalid decimal string format
    #[error("Invalid decimal string: '{input}' - expected numeric format")]
    InvalidDecimal { input: String },

    /// Precision loss during conversion
    #[error("Precision loss: '{input}' has more than 9 fractional digits")]
    PrecisionLoss { input: String },
}
