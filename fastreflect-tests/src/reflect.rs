use fastreflect::{
    genutil::GenesisState, FieldDescriptor, ReflectErrorKind, ReflectMessage, RepeatedField, Value,
};
use proptest::prelude::*;

use crate::{arbitrary, extended_pool, init_logger};

fn gen_txs() -> FieldDescriptor {
    GenesisState::gen_txs_descriptor()
}

fn visited(message: &dyn ReflectMessage) -> Vec<String> {
    let mut names = Vec::new();
    message.range(&mut |field, _| {
        names.push(field.full_name().to_owned());
        true
    });
    names
}

proptest! {
    #[test]
    fn presence_follows_length(message in arbitrary::genesis_state()) {
        let field = gen_txs();
        let populated = !message.gen_txs.is_empty();
        prop_assert_eq!(message.has_field(&field).unwrap(), populated);
        prop_assert_eq!(visited(&message).len(), populated as usize);

        let value = message.get_field(&field).unwrap();
        let list = value.as_list().unwrap();
        prop_assert_eq!(list.len(), message.gen_txs.len());
        for (i, tx) in message.gen_txs.iter().enumerate() {
            let item = list.get(i).unwrap();
            prop_assert_eq!(item.as_bytes(), Some(tx.as_slice()));
        }
    }

    #[test]
    fn writes_through_mutable_view(
        message in arbitrary::genesis_state(),
        extra in arbitrary::txs(),
    ) {
        let field = gen_txs();
        let mut message = message;
        let mut expected = message.gen_txs.clone();
        expected.extend(extra.iter().cloned());

        let mut value = message.get_field_mut(&field).unwrap();
        let list = value.as_list_mut().unwrap();
        for tx in &extra {
            list.append(Value::Bytes(tx.clone().into())).unwrap();
        }
        drop(value);

        prop_assert_eq!(&message.gen_txs, &expected);
        prop_assert_eq!(message.has_field(&field).unwrap(), !expected.is_empty());
    }

    #[test]
    fn set_field_replaces_contents(
        message in arbitrary::genesis_state(),
        txs in arbitrary::txs(),
    ) {
        let field = gen_txs();
        let mut message = message;
        let unknown = message.unknown_fields().to_vec();

        let value = Value::from(RepeatedField::from_slice(&txs));
        message.set_field(&field, value).unwrap();
        prop_assert_eq!(&message.gen_txs, &txs);
        prop_assert_eq!(message.unknown_fields(), unknown.as_slice());

        message.clear_field(&field).unwrap();
        prop_assert!(message.gen_txs.is_empty());
        prop_assert!(!message.has_field(&field).unwrap());
    }
}

#[test]
fn adopt_new_field_by_move() {
    init_logger();
    let field = gen_txs();
    let mut message = GenesisState::default();

    let mut value = message.new_field(&field).unwrap();
    let list = value.as_list_mut().unwrap();
    list.append(Value::Bytes(b"one".to_vec().into())).unwrap();
    list.append(Value::Bytes(b"two".to_vec().into())).unwrap();
    let data = list.downcast_ref::<Vec<u8>>().unwrap().as_slice().as_ptr();

    message.set_field(&field, value).unwrap();
    assert_eq!(message.gen_txs, vec![b"one".to_vec(), b"two".to_vec()]);
    assert_eq!(message.gen_txs.as_ptr(), data);
}

#[test]
fn copy_between_messages() {
    let field = gen_txs();
    let source = GenesisState::new(vec![b"a".to_vec()]);
    let mut target = GenesisState::default();

    target
        .set_field(&field, source.get_field(&field).unwrap())
        .unwrap();
    assert_eq!(target.gen_txs, source.gen_txs);
    assert_ne!(target.gen_txs.as_ptr(), source.gen_txs.as_ptr());
}

#[test]
fn dynamic_dispatch() {
    let mut boxed: Box<dyn ReflectMessage> = Box::new(GenesisState::new(vec![b"x".to_vec()]));
    assert_eq!(
        boxed.descriptor().full_name(),
        "cosmos.genutil.v1beta1.GenesisState"
    );
    assert!(boxed.has_field_by_name("gen_txs").unwrap());
    assert_eq!(
        visited(&*boxed),
        vec!["cosmos.genutil.v1beta1.GenesisState.gen_txs"]
    );

    boxed.set_unknown_fields(b"\x10\x01".to_vec());
    assert_eq!(boxed.unknown_fields(), b"\x10\x01");

    let field = boxed.descriptor().get_field(1).unwrap();
    boxed.clear_field(&field).unwrap();
    assert!(visited(&*boxed).is_empty());
}

#[test]
fn descriptors_from_another_pool() {
    let pool = extended_pool();
    let desc = pool
        .get_message_by_name("cosmos.genutil.v1beta1.GenesisState")
        .unwrap();
    let field = desc.get_field_by_name("gen_txs").unwrap();

    let message = GenesisState::new(vec![b"tx".to_vec()]);
    assert!(message.has_field(&field).unwrap());
    let value = message.get_field(&field).unwrap();
    assert_eq!(value.as_list().unwrap().len(), 1);
}

#[test]
fn extension_is_rejected() {
    let pool = extended_pool();
    let memo = pool.get_extension_by_name("test.genutil.memo").unwrap();
    assert!(memo.is_extension());

    let mut message = GenesisState::default();
    let expected = ReflectErrorKind::ExtensionsUnsupported {
        message: "cosmos.genutil.v1beta1.GenesisState".to_owned(),
        extension: "test.genutil.memo".to_owned(),
    };
    assert_eq!(message.has_field(&memo).unwrap_err().kind(), &expected);
    assert_eq!(message.get_field(&memo).unwrap_err().kind(), &expected);
    assert_eq!(message.clear_field(&memo).unwrap_err().kind(), &expected);
    assert_eq!(message.new_field(&memo).unwrap_err().kind(), &expected);
    assert_eq!(
        message
            .set_field(&memo, Value::String("memo".into()))
            .unwrap_err()
            .kind(),
        &expected
    );
}

#[test]
fn foreign_fields_are_rejected() {
    let pool = extended_pool();
    let wrapper = pool.get_message_by_name("test.genutil.Wrapper").unwrap();
    let mut message = GenesisState::default();

    for field in wrapper.fields() {
        let expected = ReflectErrorKind::UnknownField {
            message: "cosmos.genutil.v1beta1.GenesisState".to_owned(),
            field: field.full_name().to_owned(),
        };
        assert_eq!(message.has_field(&field).unwrap_err().kind(), &expected);
        assert_eq!(message.get_field_mut(&field).unwrap_err().kind(), &expected);
    }
    assert!(message.gen_txs.is_empty());
}

#[test]
fn oneofs_are_rejected() {
    let pool = extended_pool();
    let wrapper = pool.get_message_by_name("test.genutil.Wrapper").unwrap();
    let kind = wrapper.oneofs().next().unwrap();
    assert_eq!(kind.full_name(), "test.genutil.Wrapper.kind");

    let message = GenesisState::default();
    assert_eq!(
        message.which_oneof(&kind).unwrap_err().kind(),
        &ReflectErrorKind::InvalidOneof {
            message: "cosmos.genutil.v1beta1.GenesisState".to_owned(),
            oneof: "test.genutil.Wrapper.kind".to_owned(),
        }
    );
}
