mod build;

use std::{collections::HashMap, fmt};

use prost::encoding::WireType;
use prost_types::{field_descriptor_proto, DescriptorProto};

use crate::descriptor::{
    debug_fmt_iter, parse_name, parse_namespace, to_index, DescriptorError, DescriptorPool,
    FileDescriptor,
};

use super::{EnumIndex, FieldIndex, FileIndex, MessageIndex, OneofIndex};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(super) struct TypeId(field_descriptor_proto::Type, u32);

#[derive(Clone, Default)]
pub(super) struct TypeMap {
    named_types: HashMap<Box<str>, TypeId>,
    messages: Vec<MessageDescriptorInner>,
    fields: Vec<FieldDescriptorInner>,
    enums: Vec<EnumDescriptorInner>,
    extensions: Vec<FieldIndex>,
}

/// A protobuf message definition.
#[derive(Clone, PartialEq, Eq)]
pub struct MessageDescriptor {
    pool: DescriptorPool,
    index: MessageIndex,
}

#[derive(Clone)]
struct MessageDescriptorInner {
    full_name: Box<str>,
    file: FileIndex,
    parent: Option<MessageIndex>,
    fields: Box<[FieldIndex]>,
    field_numbers: HashMap<u32, FieldIndex>,
    field_names: HashMap<Box<str>, FieldIndex>,
    field_json_names: HashMap<Box<str>, FieldIndex>,
    oneof_decls: Box<[OneofDescriptorInner]>,
    extensions: Vec<FieldIndex>,
}

/// A oneof field in a protobuf message.
#[derive(Clone, PartialEq, Eq)]
pub struct OneofDescriptor {
    message: MessageDescriptor,
    index: OneofIndex,
}

#[derive(Clone)]
struct OneofDescriptorInner {
    name: Box<str>,
    full_name: Box<str>,
    fields: Vec<FieldIndex>,
}

/// A field of a protobuf message, or an extension field declared against one.
#[derive(Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pool: DescriptorPool,
    index: FieldIndex,
}

#[derive(Clone)]
struct FieldDescriptorInner {
    name: Box<str>,
    full_name: Box<str>,
    json_name: Box<str>,
    number: u32,
    message: MessageIndex,
    is_extension: bool,
    is_group: bool,
    cardinality: Cardinality,
    is_packed: bool,
    supports_presence: bool,
    oneof_index: Option<OneofIndex>,
    ty: TypeId,
}

/// A protobuf enum type.
///
/// Only the name of an enum is tracked, so that fields of enum type can be resolved.
#[derive(Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    pool: DescriptorPool,
    index: EnumIndex,
}

#[derive(Clone)]
struct EnumDescriptorInner {
    full_name: Box<str>,
}

/// The type of a protobuf message field.
#[derive(Clone, PartialEq, Eq)]
pub enum Kind {
    /// The protobuf `double` type.
    Double,
    /// The protobuf `float` type.
    Float,
    /// The protobuf `int32` type.
    Int32,
    /// The protobuf `int64` type.
    Int64,
    /// The protobuf `uint32` type.
    Uint32,
    /// The protobuf `uint64` type.
    Uint64,
    /// The protobuf `sint32` type.
    Sint32,
    /// The protobuf `sint64` type.
    Sint64,
    /// The protobuf `fixed32` type.
    Fixed32,
    /// The protobuf `fixed64` type.
    Fixed64,
    /// The protobuf `sfixed32` type.
    Sfixed32,
    /// The protobuf `sfixed64` type.
    Sfixed64,
    /// The protobuf `bool` type.
    Bool,
    /// The protobuf `string` type.
    String,
    /// The protobuf `bytes` type.
    Bytes,
    /// A protobuf message type.
    Message(MessageDescriptor),
    /// A protobuf enum type.
    Enum(EnumDescriptor),
}

/// Cardinality determines whether a field is optional, required, or repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Cardinality {
    /// The field appears zero or one times.
    Optional,
    /// The field appears exactly one time. This cardinality is invalid with Proto3.
    Required,
    /// The field appears zero or more times.
    Repeated,
}

impl MessageDescriptor {
    pub(in crate::descriptor) fn iter(
        pool: &DescriptorPool,
    ) -> impl ExactSizeIterator<Item = MessageDescriptor> + '_ {
        (0..pool.inner.type_map.messages.len()).map(move |index| MessageDescriptor {
            pool: pool.clone(),
            index: to_index(index),
        })
    }

    pub(in crate::descriptor) fn try_get_by_name(
        pool: &DescriptorPool,
        name: &str,
    ) -> Option<MessageDescriptor> {
        let ty = pool.inner.type_map.get_by_name(name)?;
        if !ty.is_message() {
            return None;
        }
        Some(MessageDescriptor {
            pool: pool.clone(),
            index: ty.1,
        })
    }

    /// Gets a reference to the [`DescriptorPool`] this message is defined in.
    pub fn parent_pool(&self) -> &DescriptorPool {
        &self.pool
    }

    /// Gets the [`FileDescriptor`] this message is defined in.
    pub fn parent_file(&self) -> FileDescriptor {
        FileDescriptor {
            pool: self.pool.clone(),
            index: self.inner().file,
        }
    }

    /// Gets the parent message type if this message type is nested inside another message, or
    /// `None` otherwise.
    pub fn parent_message(&self) -> Option<MessageDescriptor> {
        self.inner().parent.map(|index| MessageDescriptor {
            pool: self.pool.clone(),
            index,
        })
    }

    /// Gets the short name of the message type, e.g. `MyMessage`.
    pub fn name(&self) -> &str {
        parse_name(self.full_name())
    }

    /// Gets the full name of the message type, e.g. `my.package.MyMessage`.
    pub fn full_name(&self) -> &str {
        &self.inner().full_name
    }

    /// Gets the name of the package this message type is defined in, e.g. `my.package`.
    ///
    /// If no package name is set, an empty string is returned.
    pub fn package_name(&self) -> &str {
        let file = &self.pool.inner.files[self.inner().file as usize];
        file.raw.package()
    }

    /// Gets a reference to the raw [`DescriptorProto`] wrapped by this [`MessageDescriptor`].
    pub fn descriptor_proto(&self) -> &DescriptorProto {
        find_message_descriptor_proto(&self.pool, self.index)
    }

    /// Gets an iterator yielding a [`FieldDescriptor`] for each field defined in this message,
    /// in declaration order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        self.inner()
            .fields
            .iter()
            .map(move |&index| FieldDescriptor {
                pool: self.pool.clone(),
                index,
            })
    }

    /// Gets an iterator yielding a [`OneofDescriptor`] for each oneof field defined in this
    /// message.
    pub fn oneofs(&self) -> impl ExactSizeIterator<Item = OneofDescriptor> + '_ {
        (0..self.inner().oneof_decls.len()).map(move |index| OneofDescriptor {
            message: self.clone(),
            index: to_index(index),
        })
    }

    /// Gets an iterator over all extensions to this message defined in the parent
    /// [`DescriptorPool`].
    pub fn extensions(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        self.inner()
            .extensions
            .iter()
            .map(move |&index| FieldDescriptor {
                pool: self.pool.clone(),
                index,
            })
    }

    /// Gets a [`FieldDescriptor`] with the given number, or `None` if no such field exists.
    pub fn get_field(&self, number: u32) -> Option<FieldDescriptor> {
        self.inner()
            .field_numbers
            .get(&number)
            .map(|&index| FieldDescriptor {
                pool: self.pool.clone(),
                index,
            })
    }

    /// Gets a [`FieldDescriptor`] with the given name, or `None` if no such field exists.
    pub fn get_field_by_name(&self, name: &str) -> Option<FieldDescriptor> {
        self.inner()
            .field_names
            .get(name)
            .map(|&index| FieldDescriptor {
                pool: self.pool.clone(),
                index,
            })
    }

    /// Gets a [`FieldDescriptor`] with the given JSON name, or `None` if no such field exists.
    pub fn get_field_by_json_name(&self, json_name: &str) -> Option<FieldDescriptor> {
        self.inner()
            .field_json_names
            .get(json_name)
            .map(|&index| FieldDescriptor {
                pool: self.pool.clone(),
                index,
            })
    }

    /// Gets an extension to this message by its number, or `None` if no such extension exists.
    pub fn get_extension(&self, number: u32) -> Option<FieldDescriptor> {
        self.extensions().find(|ext| ext.number() == number)
    }

    fn inner(&self) -> &MessageDescriptorInner {
        &self.pool.inner.type_map.messages[self.index as usize]
    }
}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageDescriptor")
            .field("name", &self.name())
            .field("full_name", &self.full_name())
            .field("fields", &debug_fmt_iter(self.fields()))
            .field("oneofs", &debug_fmt_iter(self.oneofs()))
            .finish()
    }
}

impl FieldDescriptor {
    pub(in crate::descriptor) fn iter_extensions(
        pool: &DescriptorPool,
    ) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        pool.inner
            .type_map
            .extensions
            .iter()
            .map(move |&index| FieldDescriptor {
                pool: pool.clone(),
                index,
            })
    }

    /// Gets a reference to the [`DescriptorPool`] this field is defined in.
    pub fn parent_pool(&self) -> &DescriptorPool {
        &self.pool
    }

    /// Gets the message this field belongs to.
    ///
    /// For an extension, this is the message being extended.
    pub fn parent_message(&self) -> MessageDescriptor {
        MessageDescriptor {
            pool: self.pool.clone(),
            index: self.inner().message,
        }
    }

    /// Gets the short name of the field, e.g. `my_field`.
    pub fn name(&self) -> &str {
        &self.inner().name
    }

    /// Gets the full name of the field, e.g. `my.package.MyMessage.my_field`.
    pub fn full_name(&self) -> &str {
        &self.inner().full_name
    }

    /// Gets the unique number for this message field.
    pub fn number(&self) -> u32 {
        self.inner().number
    }

    /// Gets the name used for JSON serialization.
    ///
    /// This is usually the camel-cased form of the field name, unless
    /// another value is set in the proto file.
    pub fn json_name(&self) -> &str {
        &self.inner().json_name
    }

    /// Returns `true` if this is an extension field rather than a field declared by its message.
    pub fn is_extension(&self) -> bool {
        self.inner().is_extension
    }

    /// Whether this field is a list type, that is, its cardinality is `Repeated`.
    pub fn is_list(&self) -> bool {
        self.cardinality() == Cardinality::Repeated
    }

    /// Whether this field is a list encoded using [packed encoding][packed].
    ///
    /// [packed]: https://developers.google.com/protocol-buffers/docs/encoding#packed
    pub fn is_packed(&self) -> bool {
        self.inner().is_packed
    }

    /// The cardinality of this field.
    pub fn cardinality(&self) -> Cardinality {
        self.inner().cardinality
    }

    /// Whether this field supports distinguishing between an unpopulated field and
    /// the default value.
    ///
    /// For proto2 messages this returns `true` for all non-repeated fields.
    /// For proto3 this returns `true` for message fields, and fields contained
    /// in a `oneof`.
    pub fn supports_presence(&self) -> bool {
        self.inner().supports_presence
    }

    /// Gets the [`Kind`] of this field.
    pub fn kind(&self) -> Kind {
        self.inner().ty.to_kind(&self.pool)
    }

    /// Gets the wire type each value of this field is encoded with.
    ///
    /// Packed lists are always length-delimited.
    pub fn wire_type(&self) -> WireType {
        let inner = self.inner();
        if inner.is_packed {
            WireType::LengthDelimited
        } else if inner.is_group {
            WireType::StartGroup
        } else {
            inner.ty.wire_type()
        }
    }

    /// Gets a [`OneofDescriptor`] representing the oneof containing this field,
    /// or `None` if this field is not contained in a oneof.
    pub fn containing_oneof(&self) -> Option<OneofDescriptor> {
        self.inner().oneof_index.map(|index| OneofDescriptor {
            message: self.parent_message(),
            index,
        })
    }

    fn inner(&self) -> &FieldDescriptorInner {
        &self.pool.inner.type_map.fields[self.index as usize]
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name())
            .field("full_name", &self.full_name())
            .field("json_name", &self.json_name())
            .field("number", &self.number())
            .field("kind", &self.kind())
            .field("cardinality", &self.cardinality())
            .field("is_extension", &self.is_extension())
            .field("is_packed", &self.is_packed())
            .field("supports_presence", &self.supports_presence())
            .finish()
    }
}

impl OneofDescriptor {
    /// Gets a reference to the [`MessageDescriptor`] this oneof is defined in.
    pub fn parent_message(&self) -> &MessageDescriptor {
        &self.message
    }

    /// Gets the short name of the oneof, e.g. `my_oneof`.
    pub fn name(&self) -> &str {
        &self.inner().name
    }

    /// Gets the full name of the oneof, e.g. `my.package.MyMessage.my_oneof`.
    pub fn full_name(&self) -> &str {
        &self.inner().full_name
    }

    /// Gets an iterator yielding a [`FieldDescriptor`] for each field of the parent message this
    /// oneof contains.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        self.inner()
            .fields
            .iter()
            .map(move |&index| FieldDescriptor {
                pool: self.message.pool.clone(),
                index,
            })
    }

    fn inner(&self) -> &OneofDescriptorInner {
        &self.message.inner().oneof_decls[self.index as usize]
    }
}

impl fmt::Debug for OneofDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OneofDescriptor")
            .field("name", &self.name())
            .field("full_name", &self.full_name())
            .field("fields", &debug_fmt_iter(self.fields().map(|f| f.number())))
            .finish()
    }
}

impl EnumDescriptor {
    pub(in crate::descriptor) fn try_get_by_name(
        pool: &DescriptorPool,
        name: &str,
    ) -> Option<EnumDescriptor> {
        let ty = pool.inner.type_map.get_by_name(name)?;
        if !ty.is_enum() {
            return None;
        }
        Some(EnumDescriptor {
            pool: pool.clone(),
            index: ty.1,
        })
    }

    /// Gets the short name of the enum type, e.g. `MyEnum`.
    pub fn name(&self) -> &str {
        parse_name(self.full_name())
    }

    /// Gets the full name of the enum, e.g. `my.package.MyEnum`.
    pub fn full_name(&self) -> &str {
        &self.inner().full_name
    }

    fn inner(&self) -> &EnumDescriptorInner {
        &self.pool.inner.type_map.enums[self.index as usize]
    }
}

impl fmt::Debug for EnumDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumDescriptor")
            .field("full_name", &self.full_name())
            .finish()
    }
}

impl Kind {
    /// Gets the wire type used to encode a single, unpacked value of this kind.
    pub fn wire_type(&self) -> WireType {
        match self {
            Kind::Double | Kind::Fixed64 | Kind::Sfixed64 => WireType::SixtyFourBit,
            Kind::Float | Kind::Fixed32 | Kind::Sfixed32 => WireType::ThirtyTwoBit,
            Kind::Enum(_)
            | Kind::Int32
            | Kind::Int64
            | Kind::Uint32
            | Kind::Uint64
            | Kind::Sint32
            | Kind::Sint64
            | Kind::Bool => WireType::Varint,
            Kind::String | Kind::Bytes | Kind::Message(_) => WireType::LengthDelimited,
        }
    }

    /// Gets a reference to the [`MessageDescriptor`] if this is a message type,
    /// or `None` otherwise.
    pub fn as_message(&self) -> Option<&MessageDescriptor> {
        match self {
            Kind::Message(desc) => Some(desc),
            _ => None,
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Double => write!(f, "double"),
            Self::Float => write!(f, "float"),
            Self::Int32 => write!(f, "int32"),
            Self::Int64 => write!(f, "int64"),
            Self::Uint32 => write!(f, "uint32"),
            Self::Uint64 => write!(f, "uint64"),
            Self::Sint32 => write!(f, "sint32"),
            Self::Sint64 => write!(f, "sint64"),
            Self::Fixed32 => write!(f, "fixed32"),
            Self::Fixed64 => write!(f, "fixed64"),
            Self::Sfixed32 => write!(f, "sfixed32"),
            Self::Sfixed64 => write!(f, "sfixed64"),
            Self::Bool => write!(f, "bool"),
            Self::String => write!(f, "string"),
            Self::Bytes => write!(f, "bytes"),
            Self::Message(m) => write!(f, "{}", m.full_name()),
            Self::Enum(e) => write!(f, "{}", e.full_name()),
        }
    }
}

impl TypeMap {
    pub fn shrink_to_fit(&mut self) {
        self.named_types.shrink_to_fit();
        self.messages.shrink_to_fit();
        self.fields.shrink_to_fit();
        self.enums.shrink_to_fit();
        self.extensions.shrink_to_fit();
    }

    pub fn try_get_by_name(&self, full_name: &str) -> Result<TypeId, DescriptorError> {
        self.get_by_name(full_name)
            .ok_or_else(|| DescriptorError::type_not_found(full_name))
    }

    pub fn get_by_name(&self, full_name: &str) -> Option<TypeId> {
        let full_name = full_name.strip_prefix('.').unwrap_or(full_name);
        self.named_types.get(full_name).copied()
    }

    pub fn resolve_type_name(
        &self,
        mut namespace: &str,
        type_name: &str,
    ) -> Result<TypeId, DescriptorError> {
        match type_name.strip_prefix('.') {
            Some(full_name) => self.try_get_by_name(full_name),
            None => loop {
                let full_name = super::make_full_name(namespace, type_name);
                if let Some(ty) = self.get_by_name(&full_name) {
                    break Ok(ty);
                } else if namespace.is_empty() {
                    break Err(DescriptorError::type_not_found(type_name));
                } else {
                    namespace = parse_namespace(namespace);
                }
            },
        }
    }
}

impl TypeId {
    pub fn new_message(index: MessageIndex) -> Self {
        TypeId(field_descriptor_proto::Type::Message, index)
    }

    pub fn new_enum(index: EnumIndex) -> Self {
        TypeId(field_descriptor_proto::Type::Enum, index)
    }

    pub fn new_scalar(scalar: field_descriptor_proto::Type) -> Self {
        debug_assert!(
            scalar != field_descriptor_proto::Type::Message
                && scalar != field_descriptor_proto::Type::Enum
                && scalar != field_descriptor_proto::Type::Group
        );
        TypeId(scalar, 0)
    }

    pub fn is_message(&self) -> bool {
        self.0 == field_descriptor_proto::Type::Message
    }

    pub fn is_enum(&self) -> bool {
        self.0 == field_descriptor_proto::Type::Enum
    }

    fn is_packable(&self) -> bool {
        !matches!(
            self.0,
            field_descriptor_proto::Type::String
                | field_descriptor_proto::Type::Bytes
                | field_descriptor_proto::Type::Group
                | field_descriptor_proto::Type::Message
        )
    }

    fn wire_type(&self) -> WireType {
        match self.0 {
            field_descriptor_proto::Type::Double
            | field_descriptor_proto::Type::Fixed64
            | field_descriptor_proto::Type::Sfixed64 => WireType::SixtyFourBit,
            field_descriptor_proto::Type::Float
            | field_descriptor_proto::Type::Fixed32
            | field_descriptor_proto::Type::Sfixed32 => WireType::ThirtyTwoBit,
            field_descriptor_proto::Type::Int64
            | field_descriptor_proto::Type::Uint64
            | field_descriptor_proto::Type::Int32
            | field_descriptor_proto::Type::Bool
            | field_descriptor_proto::Type::Uint32
            | field_descriptor_proto::Type::Enum
            | field_descriptor_proto::Type::Sint32
            | field_descriptor_proto::Type::Sint64 => WireType::Varint,
            field_descriptor_proto::Type::Group => WireType::StartGroup,
            field_descriptor_proto::Type::String
            | field_descriptor_proto::Type::Bytes
            | field_descriptor_proto::Type::Message => WireType::LengthDelimited,
        }
    }

    fn to_kind(self, pool: &DescriptorPool) -> Kind {
        match self.0 {
            field_descriptor_proto::Type::Double => Kind::Double,
            field_descriptor_proto::Type::Float => Kind::Float,
            field_descriptor_proto::Type::Int64 => Kind::Int64,
            field_descriptor_proto::Type::Uint64 => Kind::Uint64,
            field_descriptor_proto::Type::Int32 => Kind::Int32,
            field_descriptor_proto::Type::Fixed64 => Kind::Fixed64,
            field_descriptor_proto::Type::Fixed32 => Kind::Fixed32,
            field_descriptor_proto::Type::Bool => Kind::Bool,
            field_descriptor_proto::Type::Uint32 => Kind::Uint32,
            field_descriptor_proto::Type::Sfixed32 => Kind::Sfixed32,
            field_descriptor_proto::Type::Sfixed64 => Kind::Sfixed64,
            field_descriptor_proto::Type::Sint32 => Kind::Sint32,
            field_descriptor_proto::Type::Sint64 => Kind::Sint64,
            field_descriptor_proto::Type::String => Kind::String,
            field_descriptor_proto::Type::Bytes => Kind::Bytes,
            field_descriptor_proto::Type::Enum => Kind::Enum(EnumDescriptor {
                pool: pool.clone(),
                index: self.1,
            }),
            field_descriptor_proto::Type::Group | field_descriptor_proto::Type::Message => {
                Kind::Message(MessageDescriptor {
                    pool: pool.clone(),
                    index: self.1,
                })
            }
        }
    }
}

fn find_message_descriptor_proto(pool: &DescriptorPool, index: MessageIndex) -> &DescriptorProto {
    let message = &pool.inner.type_map.messages[index as usize];
    let name = parse_name(&message.full_name);
    match message.parent {
        None => pool.inner.files[message.file as usize]
            .raw
            .message_type
            .iter()
            .find(|ty| ty.name() == name)
            .expect("message not found"),
        Some(parent_index) => find_message_descriptor_proto(pool, parent_index)
            .nested_type
            .iter()
            .find(|ty| ty.name() == name)
            .expect("message not found"),
    }
}
