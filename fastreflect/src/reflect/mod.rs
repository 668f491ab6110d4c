//! Reflective access to the fields of a message through its descriptors.

mod list;

pub use self::list::{ListElement, ListValue, RepeatedField};

use std::{borrow::Cow, error::Error, fmt};

use crate::{FieldDescriptor, MessageDescriptor, OneofDescriptor};

/// Generic access to the fields of a message, keyed by descriptor.
///
/// Every operation that takes a descriptor checks that it belongs to this message type, and fails
/// with [`UnknownField`](ReflectErrorKind::UnknownField) if it does not, or with
/// [`ExtensionsUnsupported`](ReflectErrorKind::ExtensionsUnsupported) if it describes an extension.
///
/// The trait is object safe, so callers that only know a message by its descriptor can work
/// through `&dyn ReflectMessage`.
pub trait ReflectMessage {
    /// Gets the descriptor of this message type.
    fn descriptor(&self) -> MessageDescriptor;

    /// Calls `visit` once for each populated field, in declaration order. Iteration stops early if
    /// `visit` returns `false`.
    fn range(&self, visit: &mut dyn FnMut(&FieldDescriptor, Value<'_>) -> bool);

    /// Returns `true` if the field is populated. A repeated field is populated if it has at least
    /// one element.
    fn has_field(&self, field: &FieldDescriptor) -> Result<bool, ReflectError>;

    /// Gets a read-only view of the field's value.
    ///
    /// An unpopulated repeated field yields a valid, empty list. An unpopulated singular field
    /// yields its default value.
    fn get_field(&self, field: &FieldDescriptor) -> Result<Value<'_>, ReflectError>;

    /// Sets the value of a field.
    ///
    /// For a repeated field, `value` must be a list of the field's element kind. A list which owns
    /// its elements, such as one returned by [`new_field`](ReflectMessage::new_field), is adopted
    /// without copying them.
    fn set_field(&mut self, field: &FieldDescriptor, value: Value<'_>) -> Result<(), ReflectError>;

    /// Resets a field so that [`has_field`](ReflectMessage::has_field) returns `false`.
    fn clear_field(&mut self, field: &FieldDescriptor) -> Result<(), ReflectError>;

    /// Gets a writable view of a composite field. Changes made through the view are applied to this
    /// message directly.
    fn get_field_mut(&mut self, field: &FieldDescriptor) -> Result<Value<'_>, ReflectError>;

    /// Creates a new, detached default value for the field, suitable for passing to
    /// [`set_field`](ReflectMessage::set_field).
    fn new_field(&self, field: &FieldDescriptor) -> Result<Value<'static>, ReflectError>;

    /// Gets the populated member of a oneof, if any.
    fn which_oneof(&self, oneof: &OneofDescriptor) -> Result<Option<FieldDescriptor>, ReflectError>;

    /// Gets the raw bytes of fields that were not recognized while decoding.
    fn unknown_fields(&self) -> &[u8];

    /// Replaces the raw unknown field bytes. The bytes are not validated until the message is
    /// next encoded and decoded.
    fn set_unknown_fields(&mut self, unknown_fields: Vec<u8>);

    /// Returns `true` if the field with the given name is populated.
    fn has_field_by_name(&self, name: &str) -> Result<bool, ReflectError> {
        let field = field_by_name(&self.descriptor(), name)?;
        self.has_field(&field)
    }

    /// Gets a read-only view of the field with the given name.
    fn get_field_by_name(&self, name: &str) -> Result<Value<'_>, ReflectError> {
        let field = field_by_name(&self.descriptor(), name)?;
        self.get_field(&field)
    }
}

fn field_by_name(desc: &MessageDescriptor, name: &str) -> Result<FieldDescriptor, ReflectError> {
    desc.get_field_by_name(name).ok_or_else(|| {
        ReflectError::new(ReflectErrorKind::UnknownField {
            message: desc.full_name().to_owned(),
            field: name.to_owned(),
        })
    })
}

/// A dynamically-typed field value.
///
/// Values borrow from the message they were read from where possible.
#[derive(Debug, PartialEq)]
pub enum Value<'a> {
    /// A `bool` field.
    Bool(bool),
    /// An `int32`, `sint32` or `sfixed32` field.
    I32(i32),
    /// An `int64`, `sint64` or `sfixed64` field.
    I64(i64),
    /// A `uint32` or `fixed32` field.
    U32(u32),
    /// A `uint64` or `fixed64` field.
    U64(u64),
    /// A `float` field.
    F32(f32),
    /// A `double` field.
    F64(f64),
    /// A `string` field.
    String(Cow<'a, str>),
    /// A `bytes` field.
    Bytes(Cow<'a, [u8]>),
    /// An enum field, as its number.
    EnumNumber(i32),
    /// A repeated field.
    List(ListValue<'a>),
}

impl<'a> Value<'a> {
    /// Gets a short name for the kind of this value, as used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::I32(_) => "int32",
            Value::I64(_) => "int64",
            Value::U32(_) => "uint32",
            Value::U64(_) => "uint64",
            Value::F32(_) => "float",
            Value::F64(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::EnumNumber(_) => "enum",
            Value::List(_) => "list",
        }
    }

    /// Returns the bytes if this is a [`Value::Bytes`].
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(bytes) => Some(&**bytes),
            _ => None,
        }
    }

    /// Returns the string if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(string) => Some(&**string),
            _ => None,
        }
    }

    /// Returns the list if this is a [`Value::List`].
    pub fn as_list(&self) -> Option<&ListValue<'a>> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Returns the list if this is a [`Value::List`].
    pub fn as_list_mut(&mut self) -> Option<&mut ListValue<'a>> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Converts this value into a list, or returns it unchanged if it is not a [`Value::List`].
    pub fn into_list(self) -> Result<ListValue<'a>, Self> {
        match self {
            Value::List(list) => Ok(list),
            value => Err(value),
        }
    }

    /// Copies any borrowed data so that the value no longer borrows from a message.
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::Bool(value) => Value::Bool(value),
            Value::I32(value) => Value::I32(value),
            Value::I64(value) => Value::I64(value),
            Value::U32(value) => Value::U32(value),
            Value::U64(value) => Value::U64(value),
            Value::F32(value) => Value::F32(value),
            Value::F64(value) => Value::F64(value),
            Value::String(value) => Value::String(Cow::Owned(value.into_owned())),
            Value::Bytes(value) => Value::Bytes(Cow::Owned(value.into_owned())),
            Value::EnumNumber(value) => Value::EnumNumber(value),
            Value::List(list) => Value::List(list.into_owned()),
        }
    }
}

impl<'a, T> From<RepeatedField<'a, T>> for Value<'a>
where
    T: ListElement,
{
    fn from(field: RepeatedField<'a, T>) -> Self {
        Value::List(field.into())
    }
}

/// An error returned by a reflective operation on a message or list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectError {
    kind: ReflectErrorKind,
}

/// The reason a [`ReflectError`] occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReflectErrorKind {
    /// The field descriptor does not belong to the message type.
    UnknownField {
        /// The fully-qualified name of the message.
        message: String,
        /// The fully-qualified name of the field, or the name that was looked up.
        field: String,
    },
    /// The field descriptor is an extension, and the message type declares no extension ranges.
    ExtensionsUnsupported {
        /// The fully-qualified name of the message.
        message: String,
        /// The fully-qualified name of the extension field.
        extension: String,
    },
    /// The oneof descriptor does not belong to the message type.
    InvalidOneof {
        /// The fully-qualified name of the message.
        message: String,
        /// The fully-qualified name of the oneof.
        oneof: String,
    },
    /// A list index was outside `0..len`.
    IndexOutOfRange {
        /// The index that was requested.
        index: usize,
        /// The length of the list.
        len: usize,
    },
    /// The operation is not supported for this kind of list element.
    UnsupportedOperation {
        /// The name of the list operation.
        operation: &'static str,
        /// The element kind of the list.
        kind: &'static str,
    },
    /// The list is not bound to any storage.
    InvalidList,
    /// The list is a read-only view.
    ReadOnly,
    /// The value does not have the kind the field requires.
    TypeMismatch {
        /// The kind the field requires.
        expected: &'static str,
        /// The kind of the value that was given.
        actual: &'static str,
    },
}

impl ReflectError {
    /// Creates a new error of the given kind.
    pub fn new(kind: ReflectErrorKind) -> Self {
        ReflectError { kind }
    }

    /// Gets the reason this error occurred.
    pub fn kind(&self) -> &ReflectErrorKind {
        &self.kind
    }

    pub(crate) fn unknown_field(message: &MessageDescriptor, field: &FieldDescriptor) -> Self {
        if field.is_extension() {
            ReflectError::new(ReflectErrorKind::ExtensionsUnsupported {
                message: message.full_name().to_owned(),
                extension: field.full_name().to_owned(),
            })
        } else {
            ReflectError::new(ReflectErrorKind::UnknownField {
                message: message.full_name().to_owned(),
                field: field.full_name().to_owned(),
            })
        }
    }

    pub(crate) fn invalid_oneof(message: &MessageDescriptor, oneof: &OneofDescriptor) -> Self {
        ReflectError::new(ReflectErrorKind::InvalidOneof {
            message: message.full_name().to_owned(),
            oneof: oneof.full_name().to_owned(),
        })
    }

    pub(crate) fn index_out_of_range(index: usize, len: usize) -> Self {
        ReflectError::new(ReflectErrorKind::IndexOutOfRange { index, len })
    }

    pub(crate) fn type_mismatch(expected: &'static str, actual: &'static str) -> Self {
        ReflectError::new(ReflectErrorKind::TypeMismatch { expected, actual })
    }
}

impl fmt::Display for ReflectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ReflectErrorKind::UnknownField { message, field } => {
                write!(f, "message '{}' has no field '{}'", message, field)
            }
            ReflectErrorKind::ExtensionsUnsupported { message, extension } => write!(
                f,
                "message '{}' does not support extensions (got '{}')",
                message, extension
            ),
            ReflectErrorKind::InvalidOneof { message, oneof } => write!(
                f,
                "oneof '{}' is not a member of message '{}'",
                oneof, message
            ),
            ReflectErrorKind::IndexOutOfRange { index, len } => {
                write!(f, "index {} out of range for list of length {}", index, len)
            }
            ReflectErrorKind::UnsupportedOperation { operation, kind } => {
                write!(f, "{} is not supported for lists of {}", operation, kind)
            }
            ReflectErrorKind::InvalidList => write!(f, "list is not bound to a field"),
            ReflectErrorKind::ReadOnly => write!(f, "list is read-only"),
            ReflectErrorKind::TypeMismatch { expected, actual } => write!(
                f,
                "expected a value of kind {} but got {}",
                expected, actual
            ),
        }
    }
}

impl Error for ReflectError {}
