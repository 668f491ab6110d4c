mod global;
mod ty;

pub use self::global::describe;
pub use self::ty::{
    Cardinality, EnumDescriptor, FieldDescriptor, Kind, MessageDescriptor, OneofDescriptor,
};

use std::{collections::HashMap, convert::TryInto, error::Error, fmt, sync::Arc};

use prost::{bytes::Buf, Message};
use prost_types::{FileDescriptorProto, FileDescriptorSet};

type FileIndex = u32;
type MessageIndex = u32;
type FieldIndex = u32;
type OneofIndex = u32;
type EnumIndex = u32;

/// The largest field number allowed by the protobuf wire format.
pub const MAX_FIELD_NUMBER: u32 = 536_870_911;

/// A `DescriptorPool` is a collection of related descriptors. Typically it will be created from
/// a [`FileDescriptorSet`] output by the protobuf compiler, or from the serialized
/// [`FileDescriptorProto`] embedded alongside a generated message type.
///
/// Cloning a pool is cheap: it only increments a reference count. Pools are immutable once
/// shared; adding a file to a clone does not affect other handles.
#[derive(Clone, Default)]
pub struct DescriptorPool {
    inner: Arc<DescriptorPoolInner>,
}

#[derive(Clone, Default)]
struct DescriptorPoolInner {
    files: Vec<FileDescriptorInner>,
    file_names: HashMap<Box<str>, FileIndex>,
    type_map: ty::TypeMap,
}

#[derive(Clone)]
struct FileDescriptorInner {
    raw: FileDescriptorProto,
}

/// A single source file containing protobuf messages.
#[derive(Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pool: DescriptorPool,
    index: FileIndex,
}

/// An error that may occur while building or querying a [`DescriptorPool`].
#[derive(Debug)]
pub struct DescriptorError {
    kind: DescriptorErrorKind,
}

/// The reason a [`DescriptorError`] occurred.
#[derive(Debug)]
#[non_exhaustive]
pub enum DescriptorErrorKind {
    /// The schema bytes could not be decoded.
    Decode(prost::DecodeError),
    /// No message type with the given name is registered.
    NotFound {
        /// The fully-qualified message name that was looked up.
        name: String,
    },
    /// A field refers to a type name that could not be resolved.
    TypeNotFound {
        /// The unresolved type name, as written in the field.
        name: String,
    },
    /// Two types were registered under the same fully-qualified name.
    TypeAlreadyExists {
        /// The fully-qualified name defined twice.
        name: String,
    },
    /// A different file was already registered under the same name.
    FileAlreadyExists {
        /// The file name, relative to the root of the source tree.
        name: String,
    },
    /// A field number lies outside `1..=MAX_FIELD_NUMBER`.
    InvalidFieldNumber {
        /// The fully-qualified name of the field.
        field: String,
        /// The out-of-range number.
        number: i32,
    },
    /// Two fields of one message share a number.
    DuplicateFieldNumber {
        /// The fully-qualified name of the message.
        message: String,
        /// The number used more than once.
        number: u32,
    },
    /// An extension names an extendee that is not a message.
    InvalidExtendee {
        /// The fully-qualified name of the extension field.
        extension: String,
        /// The extendee type name, as written in the extension.
        extendee: String,
    },
}

impl DescriptorPool {
    /// Creates a new, empty [`DescriptorPool`].
    pub fn new() -> Self {
        DescriptorPool::default()
    }

    /// Gets the process-wide pool containing the schema of every message type defined in this
    /// crate.
    ///
    /// The pool is built on first use. Concurrent first callers block until the single
    /// initialization completes.
    ///
    /// # Panics
    ///
    /// Panics if an embedded schema is corrupt, since no message of that type could ever be
    /// handled correctly.
    pub fn global() -> DescriptorPool {
        global::pool().clone()
    }

    /// Decodes and adds a set of file descriptors to a new pool.
    ///
    /// The buffer must contain an encoded [`FileDescriptorSet`].
    pub fn decode<B>(bytes: B) -> Result<Self, DescriptorError>
    where
        B: Buf,
    {
        let file_descriptor_set =
            FileDescriptorSet::decode(bytes).map_err(DescriptorError::decode)?;
        DescriptorPool::from_file_descriptor_set(file_descriptor_set)
    }

    /// Creates a pool from the files in a [`FileDescriptorSet`].
    pub fn from_file_descriptor_set(
        file_descriptor_set: FileDescriptorSet,
    ) -> Result<Self, DescriptorError> {
        let mut pool = DescriptorPool::new();
        pool.add_file_descriptor_protos(file_descriptor_set.file)?;
        Ok(pool)
    }

    /// Decodes a single encoded [`FileDescriptorProto`] and adds it to this pool.
    pub fn decode_file_descriptor_proto<B>(&mut self, bytes: B) -> Result<(), DescriptorError>
    where
        B: Buf,
    {
        let file = FileDescriptorProto::decode(bytes).map_err(DescriptorError::decode)?;
        self.add_file_descriptor_proto(file)
    }

    /// Adds a collection of file descriptors to this pool.
    ///
    /// Files are added in order, so a file must come after any file whose types it refers to.
    /// If an error occurs, files added before the failing one remain in the pool.
    pub fn add_file_descriptor_protos<I>(&mut self, files: I) -> Result<(), DescriptorError>
    where
        I: IntoIterator<Item = FileDescriptorProto>,
    {
        for file in files {
            self.add_file_descriptor_proto(file)?;
        }
        Ok(())
    }

    /// Adds a single file descriptor to this pool.
    ///
    /// Adding a file identical to one already in the pool does nothing. Adding a different file
    /// with the same name fails. On error the pool is left unchanged.
    pub fn add_file_descriptor_proto(
        &mut self,
        file: FileDescriptorProto,
    ) -> Result<(), DescriptorError> {
        if let Some(&index) = self.inner.file_names.get(file.name()) {
            return if self.inner.files[index as usize].raw == file {
                Ok(())
            } else {
                Err(DescriptorError::file_already_exists(file.name()))
            };
        }

        let mut inner = (*self.inner).clone();
        let index = to_index(inner.files.len());
        inner.type_map.add_file(index, &file)?;
        inner.file_names.insert(file.name().into(), index);
        inner.files.push(FileDescriptorInner { raw: file });
        inner.type_map.shrink_to_fit();
        self.inner = Arc::new(inner);
        Ok(())
    }

    /// Gets an iterator over the files in this pool, in the order they were added.
    pub fn files(&self) -> impl ExactSizeIterator<Item = FileDescriptor> + '_ {
        (0..self.inner.files.len()).map(move |index| FileDescriptor {
            pool: self.clone(),
            index: to_index(index),
        })
    }

    /// Gets a file by its name, or `None` if no such file exists.
    pub fn get_file_by_name(&self, name: &str) -> Option<FileDescriptor> {
        self.inner
            .file_names
            .get(name)
            .map(|&index| FileDescriptor {
                pool: self.clone(),
                index,
            })
    }

    /// Gets an iterator over all message types in this pool.
    pub fn messages(&self) -> impl ExactSizeIterator<Item = MessageDescriptor> + '_ {
        MessageDescriptor::iter(self)
    }

    /// Gets a [`MessageDescriptor`] by its fully qualified name, for example
    /// `my.package.MyMessage`.
    pub fn get_message_by_name(&self, name: &str) -> Option<MessageDescriptor> {
        MessageDescriptor::try_get_by_name(self, name)
    }

    /// Gets a [`MessageDescriptor`] by its fully qualified name, failing with
    /// [`DescriptorErrorKind::NotFound`] if the type was never registered.
    pub fn describe(&self, name: &str) -> Result<MessageDescriptor, DescriptorError> {
        self.get_message_by_name(name)
            .ok_or_else(|| DescriptorError::not_found(name))
    }

    /// Gets an [`EnumDescriptor`] by its fully qualified name, for example `my.package.MyEnum`.
    pub fn get_enum_by_name(&self, name: &str) -> Option<EnumDescriptor> {
        EnumDescriptor::try_get_by_name(self, name)
    }

    /// Gets an iterator over all extension fields defined in this pool.
    pub fn extensions(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        FieldDescriptor::iter_extensions(self)
    }

    /// Gets an extension field by its fully qualified name, for example `my.package.my_extension`.
    pub fn get_extension_by_name(&self, name: &str) -> Option<FieldDescriptor> {
        self.extensions().find(|ext| ext.full_name() == name)
    }
}

impl fmt::Debug for DescriptorPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorPool")
            .field("files", &debug_fmt_iter(self.files()))
            .field("messages", &debug_fmt_iter(self.messages()))
            .finish()
    }
}

impl PartialEq for DescriptorPool {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for DescriptorPool {}

impl FileDescriptor {
    /// Gets a reference to the [`DescriptorPool`] this file is included in.
    pub fn parent_pool(&self) -> &DescriptorPool {
        &self.pool
    }

    /// Gets the unique name of this file relative to the root of the source tree,
    /// e.g. `path/to/my_package.proto`.
    pub fn name(&self) -> &str {
        self.file_descriptor_proto().name()
    }

    /// Gets the name of the package specifier for a file, e.g. `my.package`.
    ///
    /// If no package name is set, an empty string is returned.
    pub fn package_name(&self) -> &str {
        self.file_descriptor_proto().package()
    }

    /// Returns `true` if this file uses the proto3 syntax.
    pub fn is_proto3(&self) -> bool {
        self.file_descriptor_proto().syntax() == "proto3"
    }

    /// Gets a reference to the raw [`FileDescriptorProto`] wrapped by this [`FileDescriptor`].
    pub fn file_descriptor_proto(&self) -> &FileDescriptorProto {
        &self.pool.inner.files[self.index as usize].raw
    }

    /// Gets an iterator over the top-level and nested messages defined in this file.
    pub fn messages(&self) -> impl Iterator<Item = MessageDescriptor> + '_ {
        self.pool
            .messages()
            .filter(move |message| message.parent_file() == *self)
    }
}

impl fmt::Debug for FileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileDescriptor")
            .field("name", &self.name())
            .field("package_name", &self.package_name())
            .finish()
    }
}

impl DescriptorError {
    /// Gets the reason this error occurred.
    pub fn kind(&self) -> &DescriptorErrorKind {
        &self.kind
    }

    fn new(kind: DescriptorErrorKind) -> Self {
        DescriptorError { kind }
    }

    fn decode(err: prost::DecodeError) -> Self {
        DescriptorError::new(DescriptorErrorKind::Decode(err))
    }

    fn not_found(name: &str) -> Self {
        DescriptorError::new(DescriptorErrorKind::NotFound {
            name: name.to_owned(),
        })
    }

    fn type_not_found(name: &str) -> Self {
        DescriptorError::new(DescriptorErrorKind::TypeNotFound {
            name: name.to_owned(),
        })
    }

    fn type_already_exists(name: &str) -> Self {
        DescriptorError::new(DescriptorErrorKind::TypeAlreadyExists {
            name: name.to_owned(),
        })
    }

    fn file_already_exists(name: &str) -> Self {
        DescriptorError::new(DescriptorErrorKind::FileAlreadyExists {
            name: name.to_owned(),
        })
    }

    fn invalid_field_number(field: &str, number: i32) -> Self {
        DescriptorError::new(DescriptorErrorKind::InvalidFieldNumber {
            field: field.to_owned(),
            number,
        })
    }

    fn duplicate_field_number(message: &str, number: u32) -> Self {
        DescriptorError::new(DescriptorErrorKind::DuplicateFieldNumber {
            message: message.to_owned(),
            number,
        })
    }

    fn invalid_extendee(extension: &str, extendee: &str) -> Self {
        DescriptorError::new(DescriptorErrorKind::InvalidExtendee {
            extension: extension.to_owned(),
            extendee: extendee.to_owned(),
        })
    }
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DescriptorErrorKind::Decode(err) => write!(f, "failed to decode descriptor: {}", err),
            DescriptorErrorKind::NotFound { name } => {
                write!(f, "message type '{}' is not registered", name)
            }
            DescriptorErrorKind::TypeNotFound { name } => write!(f, "type '{}' not found", name),
            DescriptorErrorKind::TypeAlreadyExists { name } => {
                write!(f, "type '{}' is defined twice", name)
            }
            DescriptorErrorKind::FileAlreadyExists { name } => write!(
                f,
                "a different file named '{}' has already been added",
                name
            ),
            DescriptorErrorKind::InvalidFieldNumber { field, number } => {
                write!(f, "field '{}' has invalid number {}", field, number)
            }
            DescriptorErrorKind::DuplicateFieldNumber { message, number } => write!(
                f,
                "message '{}' defines field number {} more than once",
                message, number
            ),
            DescriptorErrorKind::InvalidExtendee {
                extension,
                extendee,
            } => write!(
                f,
                "extension '{}' extends '{}', which is not a message type",
                extension, extendee
            ),
        }
    }
}

impl Error for DescriptorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            DescriptorErrorKind::Decode(err) => Some(err),
            _ => None,
        }
    }
}

fn to_index(i: usize) -> u32 {
    i.try_into().expect("index too large")
}

fn make_full_name(namespace: &str, name: &str) -> Box<str> {
    let namespace = namespace.trim_start_matches('.');
    if namespace.is_empty() {
        name.into()
    } else {
        format!("{}.{}", namespace, name).into_boxed_str()
    }
}

fn parse_namespace(full_name: &str) -> &str {
    match full_name.rsplit_once('.') {
        Some((namespace, _)) => namespace,
        None => "",
    }
}

fn parse_name(full_name: &str) -> &str {
    match full_name.rsplit_once('.') {
        Some((_, name)) => name,
        None => full_name,
    }
}

fn to_json_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut uppercase_next = false;
    for ch in name.chars() {
        if ch == '_' {
            uppercase_next = true;
        } else if uppercase_next {
            result.push(ch.to_ascii_uppercase());
            uppercase_next = false;
        } else {
            result.push(ch);
        }
    }
    result
}

fn debug_fmt_iter<I>(i: I) -> impl fmt::Debug
where
    I: Iterator,
    I::Item: fmt::Debug,
{
    struct Wrapper<T>(Vec<T>);

    impl<T> fmt::Debug for Wrapper<T>
    where
        T: fmt::Debug,
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_list().entries(&self.0).finish()
        }
    }

    Wrapper(i.collect())
}
