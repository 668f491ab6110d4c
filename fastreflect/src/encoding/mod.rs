//! The binary wire format runtime shared by every message type.
//!
//! Each message type implements [`FastMessage`] directly against its own fields. The helpers in
//! this module cover the parts that do not depend on the message shape: varints, field tags,
//! length prefixes and skipping values that are preserved as unknown fields.

mod error;
mod wire;

pub use self::error::{DecodeError, DecodeErrorKind};
pub use self::wire::{decode_length, decode_varint, decode_wire_type, field_number, skip_field};
pub(crate) use self::wire::END_GROUP;

use std::ops::BitOr;

/// The default maximum depth of nested groups skipped while decoding.
pub const RECURSION_LIMIT: u32 = 100;

/// Optional codec behaviours a message type advertises.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MethodFlags(u8);

impl MethodFlags {
    /// No optional behaviours.
    pub const NONE: MethodFlags = MethodFlags(0);
    /// Marshalling the same message always produces the same bytes.
    pub const SUPPORT_MARSHAL_DETERMINISTIC: MethodFlags = MethodFlags(1);
    /// Unmarshalling honours [`UnmarshalOptions::discard_unknown`].
    pub const SUPPORT_UNMARSHAL_DISCARD_UNKNOWN: MethodFlags = MethodFlags(1 << 1);

    /// Returns the flags set in either `self` or `other`.
    pub const fn union(self, other: MethodFlags) -> MethodFlags {
        MethodFlags(self.0 | other.0)
    }

    /// Returns `true` if every flag in `other` is also set in `self`.
    pub const fn contains(self, other: MethodFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for MethodFlags {
    type Output = MethodFlags;

    fn bitor(self, rhs: MethodFlags) -> MethodFlags {
        self.union(rhs)
    }
}

/// Options controlling how a message is marshalled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarshalOptions {
    /// Requests deterministic output. Every message in this crate marshals deterministically, so
    /// this only documents the caller's intent.
    pub deterministic: bool,
    /// Sizes the output buffer from the size cached by the last call to
    /// [`FastMessage::size`] instead of recomputing it.
    pub use_cached_size: bool,
}

/// Options controlling how a message is unmarshalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnmarshalOptions {
    /// Drops fields the message type does not declare instead of preserving their bytes.
    pub discard_unknown: bool,
    /// The maximum depth of nested groups that may be skipped.
    pub recursion_limit: u32,
}

impl Default for UnmarshalOptions {
    fn default() -> Self {
        UnmarshalOptions {
            discard_unknown: false,
            recursion_limit: RECURSION_LIMIT,
        }
    }
}

/// The fast encode and decode path of a message type.
///
/// Implementations read and write the concrete fields of the message directly, without consulting
/// its descriptor. The required methods take explicit options; the provided methods use the
/// defaults.
///
/// Encoding is infallible: every value reachable through safe code has a valid encoding.
pub trait FastMessage: Default {
    /// The optional behaviours this message type's codec supports.
    const FLAGS: MethodFlags;

    /// Computes the exact number of bytes [`marshal`](FastMessage::marshal) will produce, and
    /// stores it in the message's size cache.
    fn size_with(&self, options: MarshalOptions) -> usize;

    /// Gets the size computed by the most recent call to [`size`](FastMessage::size), or `0` if the
    /// size has never been computed. The cache is not invalidated by mutation.
    fn cached_size(&self) -> usize;

    /// Appends the encoded message to `buf`.
    fn marshal_append_with(&self, buf: &mut Vec<u8>, options: MarshalOptions);

    /// Decodes `buf` and merges its fields into this message. Repeated fields are appended to and
    /// unknown fields are appended to the unknown-field buffer.
    fn merge_from_with(&mut self, buf: &[u8], options: UnmarshalOptions)
        -> Result<(), DecodeError>;

    /// Computes the encoded size of this message.
    fn size(&self) -> usize {
        self.size_with(MarshalOptions::default())
    }

    /// Encodes this message to a new buffer.
    fn marshal(&self) -> Vec<u8> {
        self.marshal_with(MarshalOptions::default())
    }

    /// Encodes this message to a new buffer using the given options.
    fn marshal_with(&self, options: MarshalOptions) -> Vec<u8> {
        let mut buf = Vec::new();
        self.marshal_append_with(&mut buf, options);
        buf
    }

    /// Appends the encoded message to `buf`.
    fn marshal_append(&self, buf: &mut Vec<u8>) {
        self.marshal_append_with(buf, MarshalOptions::default())
    }

    /// Decodes a new message from `buf`.
    fn unmarshal(buf: &[u8]) -> Result<Self, DecodeError> {
        Self::unmarshal_with(buf, UnmarshalOptions::default())
    }

    /// Decodes a new message from `buf` using the given options.
    fn unmarshal_with(buf: &[u8], options: UnmarshalOptions) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        message.merge_from_with(buf, options)?;
        Ok(message)
    }

    /// Decodes `buf` and merges its fields into this message.
    fn merge_from(&mut self, buf: &[u8]) -> Result<(), DecodeError> {
        self.merge_from_with(buf, UnmarshalOptions::default())
    }
}
