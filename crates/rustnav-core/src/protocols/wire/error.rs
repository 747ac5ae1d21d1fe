use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Result of any decode step.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Coarse classification of a [`DecodeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Buffer ended before a required field.
    Truncated,
    /// Invalid framing or wrong wire type for a known field.
    Malformed,
    /// Varint carries more bits than the target width.
    Overflow,
    /// A discriminant or declared length is outside its valid domain.
    OutOfRange,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Truncated => "truncated",
            ErrorKind::Malformed => "malformed",
            ErrorKind::Overflow => "overflow",
            ErrorKind::OutOfRange => "out_of_range",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the cursor, varint and tagged-field decoders.
///
/// Every variant carries the absolute byte offset (relative to the start of
/// the datagram payload) at which decoding stopped.
///
/// # Examples
/// ```
/// use rustnav_core::{DecodeError, ErrorKind};
///
/// let err = DecodeError::Truncated { offset: 30, needed: 4, available: 2 };
/// assert_eq!(err.kind(), ErrorKind::Truncated);
/// assert_eq!(err.offset(), 30);
/// assert!(err.to_string().contains("payload truncated"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("payload truncated at byte {offset}: need {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("malformed field at byte {offset}: {reason}")]
    Malformed { offset: usize, reason: &'static str },
    #[error("varint overflow at byte {offset}: value exceeds {bits} bits")]
    Overflow { offset: usize, bits: u32 },
    #[error("{field} out of range at byte {offset}: {value} not in {min}..={max}")]
    OutOfRange {
        offset: usize,
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

impl DecodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::Truncated { .. } => ErrorKind::Truncated,
            DecodeError::Malformed { .. } => ErrorKind::Malformed,
            DecodeError::Overflow { .. } => ErrorKind::Overflow,
            DecodeError::OutOfRange { .. } => ErrorKind::OutOfRange,
        }
    }

    pub fn offset(&self) -> usize {
        match self {
            DecodeError::Truncated { offset, .. }
            | DecodeError::Malformed { offset, .. }
            | DecodeError::Overflow { offset, .. }
            | DecodeError::OutOfRange { offset, .. } => *offset,
        }
    }
}
