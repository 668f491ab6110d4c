//! Reflective field access and a fast binary codec for statically defined protobuf messages.
//!
//! Each message type in this crate is a plain Rust struct, paired with:
//!
//! * its [`MessageDescriptor`], decoded once from a schema embedded in the crate and registered in
//!   the process-wide [`DescriptorPool::global()`],
//! * an implementation of [`ReflectMessage`], giving generic, descriptor-keyed access to its
//!   fields,
//! * an implementation of [`FastMessage`], which encodes and decodes the protobuf binary format
//!   directly against the struct's fields,
//! * an implementation of [`prost::Message`], so it can be used anywhere prost messages are
//!   accepted.
//!
//! Fields that a message type does not declare are kept as raw bytes when decoding, and written
//! back out unchanged when encoding.
//!
//! # Example - encoding and decoding
//!
//! ```
//! use fastreflect::{genutil::GenesisState, FastMessage};
//!
//! let state = GenesisState::new(vec![b"a".to_vec(), b"bb".to_vec()]);
//! let bytes = state.marshal();
//! assert_eq!(bytes, b"\x0a\x01a\x0a\x02bb");
//! assert_eq!(bytes.len(), state.size());
//!
//! let decoded = GenesisState::unmarshal(&bytes).unwrap();
//! assert_eq!(decoded, state);
//! ```
//!
//! # Example - reflection
//!
//! ```
//! use fastreflect::{genutil::GenesisState, ReflectMessage, Value};
//!
//! let desc = fastreflect::describe("cosmos.genutil.v1beta1.GenesisState").unwrap();
//! let gen_txs = desc.get_field_by_name("gen_txs").unwrap();
//!
//! let mut state = GenesisState::default();
//! assert!(!state.has_field(&gen_txs).unwrap());
//!
//! let mut value = state.get_field_mut(&gen_txs).unwrap();
//! let list = value.as_list_mut().unwrap();
//! list.append(Value::Bytes(b"tx".to_vec().into())).unwrap();
//!
//! assert!(state.has_field(&gen_txs).unwrap());
//! assert_eq!(state.gen_txs, vec![b"tx".to_vec()]);
//! ```
//!
//! # Implementing message types
//!
//! Each message type implements [`ReflectMessage`] by matching a descriptor's full name against
//! the closed set of fields it declares. Descriptors for other messages, or for extensions, are
//! rejected with a [`ReflectError`]. The codec in [`encoding`] provides the pieces shared by every
//! message type: varints, tags, length prefixes and skipping of unknown fields.
#![warn(missing_debug_implementations)]
#![deny(missing_docs, unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod descriptor;
pub mod encoding;
pub mod genutil;
mod reflect;

pub use {prost, prost::bytes, prost_types};

pub use self::descriptor::{
    describe, Cardinality, DescriptorError, DescriptorErrorKind, DescriptorPool, EnumDescriptor,
    FieldDescriptor, FileDescriptor, Kind, MessageDescriptor, OneofDescriptor, MAX_FIELD_NUMBER,
};
pub use self::encoding::{
    DecodeError, DecodeErrorKind, FastMessage, MarshalOptions, MethodFlags, UnmarshalOptions,
};
pub use self::reflect::{
    ListElement, ListValue, ReflectError, ReflectErrorKind, ReflectMessage, RepeatedField, Value,
};
