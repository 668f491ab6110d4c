//! Fixtures shared by the integration tests and benchmarks.

#[cfg(test)]
mod arbitrary;
#[cfg(test)]
mod decode;
#[cfg(test)]
mod json;
#[cfg(test)]
mod reflect;

use fastreflect::{genutil::GenesisState, DescriptorPool, FastMessage};
use once_cell::sync::Lazy;
use prost_types::{
    field_descriptor_proto::{Label, Type},
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, OneofDescriptorProto,
};

static EXTENDED_POOL: Lazy<DescriptorPool> = Lazy::new(|| {
    let mut pool = DescriptorPool::global();
    pool.add_file_descriptor_proto(extension_file())
        .expect("failed to add extension file");
    pool
});

/// Creates a message with `count` transactions of `len` bytes each.
pub fn genesis_state(count: usize, len: usize) -> GenesisState {
    let txs = (0..count)
        .map(|i| (0..len).map(|j| (i + j) as u8).collect())
        .collect();
    GenesisState::new(txs)
}

/// Encodes the message returned by [`genesis_state`].
pub fn encoded_genesis_state(count: usize, len: usize) -> Vec<u8> {
    genesis_state(count, len).marshal()
}

/// The global pool, plus a file that extends `GenesisState` with `test.genutil.memo` and declares
/// the message `test.genutil.Wrapper` with a oneof `kind`.
pub fn extended_pool() -> DescriptorPool {
    EXTENDED_POOL.clone()
}

fn field(name: &str, number: i32, label: Label, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_owned()),
        number: Some(number),
        label: Some(label as i32),
        r#type: Some(ty as i32),
        ..Default::default()
    }
}

fn extension_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("test/genutil/extensions.proto".to_owned()),
        package: Some("test.genutil".to_owned()),
        dependency: vec!["cosmos/genutil/v1beta1/genesis.proto".to_owned()],
        message_type: vec![DescriptorProto {
            name: Some("Wrapper".to_owned()),
            field: vec![
                FieldDescriptorProto {
                    oneof_index: Some(0),
                    type_name: Some(".cosmos.genutil.v1beta1.GenesisState".to_owned()),
                    ..field("state", 1, Label::Optional, Type::Message)
                },
                FieldDescriptorProto {
                    oneof_index: Some(0),
                    ..field("raw", 2, Label::Optional, Type::Bytes)
                },
            ],
            oneof_decl: vec![OneofDescriptorProto {
                name: Some("kind".to_owned()),
                ..Default::default()
            }],
            ..Default::default()
        }],
        extension: vec![FieldDescriptorProto {
            extendee: Some(".cosmos.genutil.v1beta1.GenesisState".to_owned()),
            ..field("memo", 1000, Label::Optional, Type::String)
        }],
        ..Default::default()
    }
}

#[cfg(test)]
fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
