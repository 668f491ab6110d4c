use std::{error::Error, fmt};

use prost::encoding::WireType;

/// An error that may occur while decoding the binary wire format.
///
/// The state of a message after a failed decode is unspecified; it should be discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    kind: DecodeErrorKind,
    message: Option<&'static str>,
}

/// The invariant of the wire format that a [`DecodeError`] reports as violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeErrorKind {
    /// A varint was longer than ten bytes.
    MalformedVarint,
    /// The input ended in the middle of a tag, length or value.
    TruncatedInput,
    /// An end-group tag was found outside of a group.
    UnexpectedEndGroup,
    /// A tag encoded a field number outside `1..=MAX_FIELD_NUMBER`.
    InvalidTag {
        /// The raw tag value, field number and wire type combined.
        tag: u64,
    },
    /// A known field was encoded with the wrong wire type.
    WireTypeMismatch {
        /// The number of the field.
        field: u32,
        /// The wire type the field is declared with.
        expected: WireType,
        /// The wire type found in the input.
        actual: u8,
    },
    /// A length prefix does not fit in a signed 64-bit integer.
    NegativeLength,
    /// A tag used one of the reserved wire types 6 or 7.
    InvalidWireType(u8),
    /// A group was closed by an end-group tag for a different field number.
    GroupMismatch {
        /// The field number of the open start-group tag.
        expected: u32,
        /// The field number of the end-group tag.
        actual: u32,
    },
    /// Groups were nested more deeply than the configured recursion limit.
    RecursionLimitReached,
}

impl DecodeError {
    pub(crate) fn new(kind: DecodeErrorKind) -> Self {
        DecodeError {
            kind,
            message: None,
        }
    }

    /// Gets the reason this error occurred.
    pub fn kind(&self) -> DecodeErrorKind {
        self.kind
    }

    /// Gets the name of the message type being decoded, if known.
    pub fn message_name(&self) -> Option<&'static str> {
        self.message
    }

    pub(crate) fn in_message(mut self, name: &'static str) -> Self {
        self.message.get_or_insert(name);
        self
    }

    pub(crate) fn truncated() -> Self {
        DecodeError::new(DecodeErrorKind::TruncatedInput)
    }
}

impl From<DecodeErrorKind> for DecodeError {
    fn from(kind: DecodeErrorKind) -> Self {
        DecodeError::new(kind)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(message) = self.message {
            write!(f, "failed to decode {}: ", message)?;
        } else {
            write!(f, "failed to decode message: ")?;
        }
        fmt::Display::fmt(&self.kind, f)
    }
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            DecodeErrorKind::MalformedVarint => write!(f, "integer overflow in varint"),
            DecodeErrorKind::TruncatedInput => write!(f, "unexpected end of input"),
            DecodeErrorKind::UnexpectedEndGroup => write!(f, "wire type end group for non-group"),
            DecodeErrorKind::InvalidTag { tag } => {
                write!(f, "illegal tag {} (wire type {})", tag >> 3, tag & 0x7)
            }
            DecodeErrorKind::WireTypeMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "wrong wire type {} for field {} (expected {:?})",
                actual, field, expected
            ),
            DecodeErrorKind::NegativeLength => write!(f, "negative length found during decoding"),
            DecodeErrorKind::InvalidWireType(wire_type) => {
                write!(f, "illegal wire type {}", wire_type)
            }
            DecodeErrorKind::GroupMismatch { expected, actual } => write!(
                f,
                "end group for field {} does not match start group for field {}",
                actual, expected
            ),
            DecodeErrorKind::RecursionLimitReached => write!(f, "recursion limit reached"),
        }
    }
}

impl Error for DecodeError {}

impl From<DecodeError> for prost::DecodeError {
    fn from(err: DecodeError) -> Self {
        prost::DecodeError::new(err.to_string())
    }
}
