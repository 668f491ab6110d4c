use std::{borrow::Cow, fmt, slice};

use crate::reflect::{ReflectError, ReflectErrorKind, Value};

/// An element type that can be stored in a [`RepeatedField`].
///
/// This is implemented for every scalar kind: `bool`, the integer and floating point types,
/// `String` and `Vec<u8>`.
pub trait ListElement: Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// The protobuf name of this element kind.
    const KIND: &'static str;

    /// Borrows this element as a [`Value`].
    fn to_value(&self) -> Value<'_>;

    /// Converts this element into an owned [`Value`].
    fn into_value(self) -> Value<'static>;

    /// Converts a [`Value`] into an element, failing if it has a different kind.
    fn from_value(value: Value<'_>) -> Result<Self, ReflectError>;

    #[doc(hidden)]
    fn wrap_list(field: RepeatedField<'_, Self>) -> ListValue<'_>;

    #[doc(hidden)]
    fn unwrap_list(list: ListValue<'_>) -> Result<RepeatedField<'_, Self>, ListValue<'_>>;

    #[doc(hidden)]
    fn unwrap_list_ref<'b, 'a>(list: &'b ListValue<'a>) -> Option<&'b RepeatedField<'a, Self>>;

    #[doc(hidden)]
    fn unwrap_list_mut<'b, 'a>(
        list: &'b mut ListValue<'a>,
    ) -> Option<&'b mut RepeatedField<'a, Self>>;
}

macro_rules! impl_list_element {
    (
        $ty:ty,
        $variant:ident,
        $kind:literal,
        to: |$this:ident| $to_value:expr,
        into: |$owned:ident| $into_value:expr,
        from: |$value:ident| $from_value:expr $(,)?
    ) => {
        impl ListElement for $ty {
            const KIND: &'static str = $kind;

            fn to_value(&self) -> Value<'_> {
                let $this = self;
                $to_value
            }

            fn into_value(self) -> Value<'static> {
                let $owned = self;
                $into_value
            }

            fn from_value(value: Value<'_>) -> Result<Self, ReflectError> {
                match value {
                    Value::$variant($value) => Ok($from_value),
                    value => Err(ReflectError::type_mismatch($kind, value.kind_name())),
                }
            }

            fn wrap_list(field: RepeatedField<'_, Self>) -> ListValue<'_> {
                ListValue::$variant(field)
            }

            fn unwrap_list(list: ListValue<'_>) -> Result<RepeatedField<'_, Self>, ListValue<'_>> {
                match list {
                    ListValue::$variant(field) => Ok(field),
                    list => Err(list),
                }
            }

            fn unwrap_list_ref<'b, 'a>(
                list: &'b ListValue<'a>,
            ) -> Option<&'b RepeatedField<'a, Self>> {
                match list {
                    ListValue::$variant(field) => Some(field),
                    _ => None,
                }
            }

            fn unwrap_list_mut<'b, 'a>(
                list: &'b mut ListValue<'a>,
            ) -> Option<&'b mut RepeatedField<'a, Self>> {
                match list {
                    ListValue::$variant(field) => Some(field),
                    _ => None,
                }
            }
        }
    };
}

macro_rules! impl_scalar_list_element {
    ($($ty:ty => $variant:ident, $kind:literal;)*) => {
        $(
            impl_list_element!(
                $ty,
                $variant,
                $kind,
                to: |this| Value::$variant(*this),
                into: |this| Value::$variant(this),
                from: |value| value,
            );
        )*
    };
}

impl_scalar_list_element! {
    bool => Bool, "bool";
    i32 => I32, "int32";
    i64 => I64, "int64";
    u32 => U32, "uint32";
    u64 => U64, "uint64";
    f32 => F32, "float";
    f64 => F64, "double";
}

impl_list_element!(
    String,
    String,
    "string",
    to: |this| Value::String(Cow::Borrowed(this.as_str())),
    into: |this| Value::String(Cow::Owned(this)),
    from: |value| value.into_owned(),
);

impl_list_element!(
    Vec<u8>,
    Bytes,
    "bytes",
    to: |this| Value::Bytes(Cow::Borrowed(this.as_slice())),
    into: |this| Value::Bytes(Cow::Owned(this)),
    from: |value| value.into_owned(),
);

/// A view of the elements of a repeated field.
///
/// A view is either bound to some storage, or unbound. The storage may be a read-only borrow of a
/// message's field, a writable borrow of a message's field, or a vector owned by the view itself.
/// An unbound view has length zero and rejects every other operation with
/// [`InvalidList`](ReflectErrorKind::InvalidList).
pub struct RepeatedField<'a, T> {
    slot: Slot<'a, T>,
}

enum Slot<'a, T> {
    Unbound,
    Shared(&'a [T]),
    Borrowed(&'a mut Vec<T>),
    Owned(Vec<T>),
}

impl<'a, T> RepeatedField<'a, T>
where
    T: ListElement,
{
    /// Creates a view which is not bound to any storage.
    pub fn unbound() -> Self {
        RepeatedField {
            slot: Slot::Unbound,
        }
    }

    /// Creates a read-only view of `values`. Mutating the view fails with
    /// [`ReadOnly`](ReflectErrorKind::ReadOnly).
    pub fn from_slice(values: &'a [T]) -> Self {
        RepeatedField {
            slot: Slot::Shared(values),
        }
    }

    /// Creates a view which writes through to `values`.
    pub fn from_mut(values: &'a mut Vec<T>) -> Self {
        RepeatedField {
            slot: Slot::Borrowed(values),
        }
    }

    /// Creates a view which owns `values`.
    pub fn from_vec(values: Vec<T>) -> Self {
        RepeatedField {
            slot: Slot::Owned(values),
        }
    }

    /// Returns `true` if this view is bound to some storage.
    pub fn is_valid(&self) -> bool {
        !matches!(self.slot, Slot::Unbound)
    }

    /// Returns `true` if this view cannot be mutated.
    pub fn is_read_only(&self) -> bool {
        matches!(self.slot, Slot::Unbound | Slot::Shared(_))
    }

    /// Gets the number of elements, or `0` for an unbound view.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns `true` if the view has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the elements as a slice. An unbound view yields an empty slice.
    pub fn as_slice(&self) -> &[T] {
        match &self.slot {
            Slot::Unbound => &[],
            Slot::Shared(values) => *values,
            Slot::Borrowed(values) => values.as_slice(),
            Slot::Owned(values) => values.as_slice(),
        }
    }

    /// Iterates over the elements.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Gets the element at `index`.
    pub fn get(&self, index: usize) -> Result<&T, ReflectError> {
        let values = self.bound()?;
        values
            .get(index)
            .ok_or_else(|| ReflectError::index_out_of_range(index, values.len()))
    }

    /// Replaces the element at `index`.
    pub fn set(&mut self, index: usize, value: T) -> Result<(), ReflectError> {
        let values = self.values_mut()?;
        let len = values.len();
        match values.get_mut(index) {
            Some(element) => {
                *element = value;
                Ok(())
            }
            None => Err(ReflectError::index_out_of_range(index, len)),
        }
    }

    /// Appends an element to the end of the list.
    pub fn append(&mut self, value: T) -> Result<(), ReflectError> {
        self.values_mut()?.push(value);
        Ok(())
    }

    /// Appends a new element and returns a mutable reference to it.
    ///
    /// This is only meaningful for lists of messages. Lists of scalars always fail with
    /// [`UnsupportedOperation`](ReflectErrorKind::UnsupportedOperation); use
    /// [`append`](RepeatedField::append) instead.
    pub fn append_mutable(&mut self) -> Result<&mut T, ReflectError> {
        self.bound()?;
        Err(ReflectError::new(ReflectErrorKind::UnsupportedOperation {
            operation: "append_mutable",
            kind: T::KIND,
        }))
    }

    /// Removes every element at or after index `len`. Fails if `len` is greater than the current
    /// length.
    pub fn truncate(&mut self, len: usize) -> Result<(), ReflectError> {
        let values = self.values_mut()?;
        if len > values.len() {
            return Err(ReflectError::index_out_of_range(len, values.len()));
        }
        values.truncate(len);
        Ok(())
    }

    /// Creates the default value of the element kind. The result is not added to the list.
    pub fn new_element(&self) -> T {
        T::default()
    }

    /// Takes the elements out of the view. An owning view gives up its vector without copying; a
    /// borrowing view copies the elements it refers to.
    pub fn into_vec(self) -> Result<Vec<T>, ReflectError> {
        match self.slot {
            Slot::Unbound => Err(ReflectError::new(ReflectErrorKind::InvalidList)),
            Slot::Shared(values) => Ok(values.to_vec()),
            Slot::Borrowed(values) => Ok(values.clone()),
            Slot::Owned(values) => Ok(values),
        }
    }

    /// Copies any borrowed elements so that the view no longer borrows from a message.
    pub fn into_owned(self) -> RepeatedField<'static, T> {
        let slot = match self.slot {
            Slot::Unbound => Slot::Unbound,
            Slot::Shared(values) => Slot::Owned(values.to_vec()),
            Slot::Borrowed(values) => Slot::Owned(values.clone()),
            Slot::Owned(values) => Slot::Owned(values),
        };
        RepeatedField { slot }
    }

    fn bound(&self) -> Result<&[T], ReflectError> {
        if self.is_valid() {
            Ok(self.as_slice())
        } else {
            Err(ReflectError::new(ReflectErrorKind::InvalidList))
        }
    }

    fn values_mut(&mut self) -> Result<&mut Vec<T>, ReflectError> {
        match &mut self.slot {
            Slot::Unbound => Err(ReflectError::new(ReflectErrorKind::InvalidList)),
            Slot::Shared(_) => Err(ReflectError::new(ReflectErrorKind::ReadOnly)),
            Slot::Borrowed(values) => Ok(&mut **values),
            Slot::Owned(values) => Ok(values),
        }
    }
}

impl<'a, T> Default for RepeatedField<'a, T>
where
    T: ListElement,
{
    fn default() -> Self {
        RepeatedField::unbound()
    }
}

impl<'a, T> PartialEq for RepeatedField<'a, T>
where
    T: ListElement,
{
    fn eq(&self, other: &Self) -> bool {
        self.is_valid() == other.is_valid() && self.as_slice() == other.as_slice()
    }
}

impl<'a, T> fmt::Debug for RepeatedField<'a, T>
where
    T: ListElement,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            f.debug_list().entries(self.as_slice()).finish()
        } else {
            f.write_str("<unbound>")
        }
    }
}

impl<'a, 'b, T> IntoIterator for &'b RepeatedField<'a, T>
where
    T: ListElement,
{
    type Item = &'b T;
    type IntoIter = slice::Iter<'b, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A [`RepeatedField`] of any element kind.
#[derive(Debug, PartialEq)]
pub enum ListValue<'a> {
    /// A list of `bool`.
    Bool(RepeatedField<'a, bool>),
    /// A list of `int32`, `sint32` or `sfixed32`.
    I32(RepeatedField<'a, i32>),
    /// A list of `int64`, `sint64` or `sfixed64`.
    I64(RepeatedField<'a, i64>),
    /// A list of `uint32` or `fixed32`.
    U32(RepeatedField<'a, u32>),
    /// A list of `uint64` or `fixed64`.
    U64(RepeatedField<'a, u64>),
    /// A list of `float`.
    F32(RepeatedField<'a, f32>),
    /// A list of `double`.
    F64(RepeatedField<'a, f64>),
    /// A list of `string`.
    String(RepeatedField<'a, String>),
    /// A list of `bytes`.
    Bytes(RepeatedField<'a, Vec<u8>>),
}

macro_rules! with_field {
    ($list:expr, $field:ident => $body:expr) => {
        match $list {
            ListValue::Bool($field) => $body,
            ListValue::I32($field) => $body,
            ListValue::I64($field) => $body,
            ListValue::U32($field) => $body,
            ListValue::U64($field) => $body,
            ListValue::F32($field) => $body,
            ListValue::F64($field) => $body,
            ListValue::String($field) => $body,
            ListValue::Bytes($field) => $body,
        }
    };
}

fn element_kind<T: ListElement>(_: &RepeatedField<'_, T>) -> &'static str {
    T::KIND
}

impl<'a> ListValue<'a> {
    /// Gets the protobuf name of the element kind.
    pub fn element_kind(&self) -> &'static str {
        with_field!(self, field => element_kind(field))
    }

    /// Returns `true` if the list is bound to some storage.
    pub fn is_valid(&self) -> bool {
        with_field!(self, field => field.is_valid())
    }

    /// Gets the number of elements, or `0` for an unbound list.
    pub fn len(&self) -> usize {
        with_field!(self, field => field.len())
    }

    /// Returns `true` if the list has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the element at `index`.
    pub fn get(&self, index: usize) -> Result<Value<'_>, ReflectError> {
        with_field!(self, field => field.get(index).map(ListElement::to_value))
    }

    /// Replaces the element at `index`. Fails if `value` has a different kind to the list.
    pub fn set(&mut self, index: usize, value: Value<'_>) -> Result<(), ReflectError> {
        with_field!(self, field => field.set(index, ListElement::from_value(value)?))
    }

    /// Appends an element. Fails if `value` has a different kind to the list.
    pub fn append(&mut self, value: Value<'_>) -> Result<(), ReflectError> {
        with_field!(self, field => field.append(ListElement::from_value(value)?))
    }

    /// Appends a new composite element. Always fails for lists of scalars.
    pub fn append_mutable(&mut self) -> Result<Value<'_>, ReflectError> {
        with_field!(self, field => field.append_mutable().map(|element| element.to_value()))
    }

    /// Removes every element at or after index `len`.
    pub fn truncate(&mut self, len: usize) -> Result<(), ReflectError> {
        with_field!(self, field => field.truncate(len))
    }

    /// Creates the default value of the element kind.
    pub fn new_element(&self) -> Value<'static> {
        with_field!(self, field => field.new_element().into_value())
    }

    /// Gets the typed view, if the elements are of type `T`.
    pub fn downcast_ref<T: ListElement>(&self) -> Option<&RepeatedField<'a, T>> {
        T::unwrap_list_ref(self)
    }

    /// Gets the typed view, if the elements are of type `T`.
    pub fn downcast_mut<T: ListElement>(&mut self) -> Option<&mut RepeatedField<'a, T>> {
        T::unwrap_list_mut(self)
    }

    /// Converts into the typed view, or returns the list unchanged if its elements are not of
    /// type `T`.
    pub fn downcast<T: ListElement>(self) -> Result<RepeatedField<'a, T>, Self> {
        T::unwrap_list(self)
    }

    /// Copies any borrowed elements so that the list no longer borrows from a message.
    pub fn into_owned(self) -> ListValue<'static> {
        with_field!(self, field => ListElement::wrap_list(field.into_owned()))
    }
}

impl<'a, T> From<RepeatedField<'a, T>> for ListValue<'a>
where
    T: ListElement,
{
    fn from(field: RepeatedField<'a, T>) -> Self {
        T::wrap_list(field)
    }
}
