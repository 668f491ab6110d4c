use std::borrow::Cow;

use prost::Message;
use prost_types::{
    field_descriptor_proto::{Label, Type},
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, OneofDescriptorProto,
};

use super::*;
use crate::{
    DecodeErrorKind, FastMessage, MarshalOptions, MethodFlags, ReflectErrorKind, ReflectMessage,
    UnmarshalOptions, Value,
};

fn txs(values: &[&str]) -> Vec<Vec<u8>> {
    values.iter().map(|tx| tx.as_bytes().to_vec()).collect()
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

/// The global pool, plus a file that extends `GenesisState` and declares an unrelated message.
fn extended_pool() -> DescriptorPool {
    let mut pool = DescriptorPool::global();
    pool.add_file_descriptor_proto(FileDescriptorProto {
        name: Some("test/genutil_ext.proto".to_owned()),
        package: Some("test.genutil".to_owned()),
        dependency: vec![FILE_NAME.to_owned()],
        message_type: vec![DescriptorProto {
            name: Some("Other".to_owned()),
            field: vec![
                field("gen_txs", 1, Label::Repeated, Type::Bytes),
                FieldDescriptorProto {
                    oneof_index: Some(0),
                    ..field("flag", 2, Label::Optional, Type::Bool)
                },
            ],
            oneof_decl: vec![OneofDescriptorProto {
                name: Some("choice".to_owned()),
                ..Default::default()
            }],
            ..Default::default()
        }],
        extension: vec![FieldDescriptorProto {
            extendee: Some(".cosmos.genutil.v1beta1.GenesisState".to_owned()),
            ..field("memo", 1000, Label::Optional, Type::String)
        }],
        ..Default::default()
    })
    .unwrap();
    pool
}

#[test]
fn encode_concrete_bytes() {
    let message = GenesisState::new(txs(&["a", "bb"]));
    let bytes = message.marshal();
    assert_eq!(bytes, vec![0x0a, 0x01, 0x61, 0x0a, 0x02, 0x62, 0x62]);
    assert_eq!(message.size(), bytes.len());
    assert_eq!(message.cached_size(), bytes.len());
}

#[test]
fn decode_concrete_bytes() {
    let message = GenesisState::unmarshal(&[0x0a, 0x01, 0x61, 0x0a, 0x02, 0x62, 0x62]).unwrap();
    assert_eq!(message.gen_txs, txs(&["a", "bb"]));
    assert!(message.unknown_fields().is_empty());
}

#[test]
fn empty_message() {
    let message = GenesisState::default();
    assert_eq!(message.size(), 0);
    assert!(message.marshal().is_empty());
    assert_eq!(GenesisState::unmarshal(&[]).unwrap(), message);
}

#[test]
fn empty_elements_are_encoded() {
    let message = GenesisState::new(vec![Vec::new(), Vec::new()]);
    assert_eq!(message.marshal(), vec![0x0a, 0x00, 0x0a, 0x00]);
    assert_eq!(
        GenesisState::unmarshal(&message.marshal()).unwrap(),
        message
    );
}

#[test]
fn long_element_length_prefix() {
    let message = GenesisState::new(vec![vec![7; 300]]);
    let bytes = message.marshal();
    assert_eq!(&bytes[..3], &[0x0a, 0xac, 0x02]);
    assert_eq!(bytes.len(), 303);
    assert_eq!(message.size(), 303);
}

#[test]
fn unknown_fields_are_preserved_verbatim() {
    // field 1 "a", field 2 varint 150, field 1 "bb", field 3 fixed32
    let input = [
        0x0a, 0x01, 0x61, 0x10, 0x96, 0x01, 0x0a, 0x02, 0x62, 0x62, 0x1d, 1, 2, 3, 4,
    ];
    let message = GenesisState::unmarshal(&input).unwrap();
    assert_eq!(message.gen_txs, txs(&["a", "bb"]));
    assert_eq!(
        message.unknown_fields(),
        &[0x10, 0x96, 0x01, 0x1d, 1, 2, 3, 4]
    );

    let output = message.marshal();
    assert_eq!(output.len(), message.size());
    assert_eq!(
        output,
        vec![0x0a, 0x01, 0x61, 0x0a, 0x02, 0x62, 0x62, 0x10, 0x96, 0x01, 0x1d, 1, 2, 3, 4]
    );
    assert_eq!(GenesisState::unmarshal(&output).unwrap(), message);
}

#[test]
fn unknown_group_is_preserved() {
    // field 2 group containing field 1 varint 5
    let input = [0x13, 0x08, 0x05, 0x14, 0x0a, 0x00];
    let message = GenesisState::unmarshal(&input).unwrap();
    assert_eq!(message.gen_txs, vec![Vec::<u8>::new()]);
    assert_eq!(message.unknown_fields(), &[0x13, 0x08, 0x05, 0x14]);
}

#[test]
fn discard_unknown() {
    let input = [0x10, 0x01, 0x0a, 0x01, 0x61];
    let options = UnmarshalOptions {
        discard_unknown: true,
        ..Default::default()
    };
    let message = GenesisState::unmarshal_with(&input, options).unwrap();
    assert_eq!(message.gen_txs, txs(&["a"]));
    assert!(message.unknown_fields().is_empty());
    assert_eq!(
        GenesisState::FLAGS,
        MethodFlags::SUPPORT_MARSHAL_DETERMINISTIC | MethodFlags::SUPPORT_UNMARSHAL_DISCARD_UNKNOWN
    );
}

#[test]
fn merge_appends() {
    let mut message = GenesisState::new(txs(&["a"]));
    message.merge_from(&[0x0a, 0x01, 0x62, 0x10, 0x00]).unwrap();
    message.merge_from(&[0x18, 0x01]).unwrap();
    assert_eq!(message.gen_txs, txs(&["a", "b"]));
    assert_eq!(message.unknown_fields(), &[0x10, 0x00, 0x18, 0x01]);
}

#[test]
fn truncated_input() {
    let cases: &[&[u8]] = &[
        // length prefix cut off mid-varint
        &[0x0a, 0x80],
        // length exceeds remaining bytes
        &[0x0a, 0x05, 0x61],
        // tag cut off mid-varint
        &[0x0a, 0x01, 0x61, 0x80],
        // unknown fixed64 with 3 bytes
        &[0x11, 1, 2, 3],
    ];
    for &input in cases {
        let err = GenesisState::unmarshal(input).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::TruncatedInput, "{:?}", input);
        assert_eq!(err.message_name(), Some(GenesisState::FULL_NAME));
    }
}

#[test]
fn malformed_input() {
    let err = GenesisState::unmarshal(&[0xff; 11]).unwrap_err();
    assert_eq!(err.kind(), DecodeErrorKind::MalformedVarint);

    let err = GenesisState::unmarshal(&[0x0c]).unwrap_err();
    assert_eq!(err.kind(), DecodeErrorKind::UnexpectedEndGroup);

    let err = GenesisState::unmarshal(&[0x02, 0x00]).unwrap_err();
    assert_eq!(err.kind(), DecodeErrorKind::InvalidTag { tag: 0x02 });

    let err = GenesisState::unmarshal(&[0x08, 0x01]).unwrap_err();
    assert_eq!(
        err.kind(),
        DecodeErrorKind::WireTypeMismatch {
            field: 1,
            expected: prost::encoding::WireType::LengthDelimited,
            actual: 0,
        }
    );
    assert!(err
        .to_string()
        .starts_with("failed to decode cosmos.genutil.v1beta1.GenesisState: "));

    let err = GenesisState::unmarshal(&[0x16]).unwrap_err();
    assert_eq!(err.kind(), DecodeErrorKind::InvalidWireType(6));
}

#[test]
fn cached_size_marshal() {
    let mut message = GenesisState::new(txs(&["abc"]));
    assert_eq!(message.cached_size(), 0);
    let size = message.size();
    assert_eq!(message.cached_size(), size);

    message.gen_txs.push(b"d".to_vec());
    let options = MarshalOptions {
        use_cached_size: true,
        ..Default::default()
    };
    // a stale cache only affects the allocation, never the output
    assert_eq!(message.marshal_with(options), message.marshal());
    assert_eq!(message.cached_size(), message.size());
}

#[test]
fn marshal_append_keeps_prefix() {
    let message = GenesisState::new(txs(&["a"]));
    let mut buf = vec![0xaa];
    message.marshal_append(&mut buf);
    assert_eq!(buf, vec![0xaa, 0x0a, 0x01, 0x61]);
}

#[test]
fn prost_message_matches_fast_path() {
    let mut message = GenesisState::new(txs(&["a", "bb", ""]));
    message.set_unknown_fields(vec![0x10, 0x01]);

    assert_eq!(message.encoded_len(), message.size());
    assert_eq!(message.encode_to_vec(), message.marshal());

    let decoded = <GenesisState as Message>::decode(message.marshal().as_slice()).unwrap();
    assert_eq!(decoded, message);
}

#[test]
fn prost_message_preserves_unknown_fields() {
    let input = [0x13, 0x08, 0x05, 0x14, 0x0a, 0x01, 0x61, 0x25, 1, 2, 3, 4];
    let decoded = <GenesisState as Message>::decode(&input[..]).unwrap();
    assert_eq!(decoded, GenesisState::unmarshal(&input).unwrap());
    assert_eq!(decoded.encode_to_vec(), vec![
        0x0a, 0x01, 0x61, 0x13, 0x08, 0x05, 0x14, 0x25, 1, 2, 3, 4
    ]);

    let truncated = <GenesisState as Message>::decode(&[0x0a, 0x05, 0x61][..]);
    assert!(truncated.is_err());
    let stray_end_group = <GenesisState as Message>::decode(&[0x13, 0x1c][..]);
    assert!(stray_end_group.is_err());

    let mut cleared = decoded;
    Message::clear(&mut cleared);
    assert_eq!(cleared, GenesisState::default());
}

#[test]
fn descriptor() {
    let message = GenesisState::default();
    let desc = message.descriptor();
    assert_eq!(desc.full_name(), GenesisState::FULL_NAME);
    assert_eq!(desc, GenesisState::message_descriptor());
    assert_eq!(
        GenesisState::gen_txs_descriptor(),
        desc.get_field_by_name("gen_txs").unwrap()
    );
}

#[test]
fn presence_follows_length() {
    let gen_txs = GenesisState::gen_txs_descriptor();
    let mut message = GenesisState::default();
    assert!(!message.has_field(&gen_txs).unwrap());

    message.gen_txs.push(Vec::new());
    assert!(message.has_field(&gen_txs).unwrap());
    assert!(message.has_field_by_name("gen_txs").unwrap());

    message.clear_field(&gen_txs).unwrap();
    assert!(!message.has_field(&gen_txs).unwrap());
    assert!(message.gen_txs.is_empty());
}

#[test]
fn get_unpopulated_field_is_valid_empty_list() {
    let gen_txs = GenesisState::gen_txs_descriptor();
    let message = GenesisState::default();
    let value = message.get_field(&gen_txs).unwrap();
    let list = value.as_list().unwrap();
    assert!(list.is_valid());
    assert_eq!(list.len(), 0);
    assert_eq!(list.element_kind(), "bytes");
}

#[test]
fn get_field_is_read_only() {
    let gen_txs = GenesisState::gen_txs_descriptor();
    let message = GenesisState::new(txs(&["a"]));
    let mut value = message.get_field(&gen_txs).unwrap();
    let list = value.as_list_mut().unwrap();
    assert_eq!(list.get(0).unwrap(), Value::Bytes(Cow::Borrowed(&b"a"[..])));
    assert_eq!(
        list.append(Value::Bytes(Cow::Borrowed(&b"b"[..])))
            .unwrap_err()
            .kind(),
        &ReflectErrorKind::ReadOnly
    );
}

#[test]
fn mutable_view_writes_through() {
    let gen_txs = GenesisState::gen_txs_descriptor();
    let mut message = GenesisState::default();
    {
        let mut value = message.get_field_mut(&gen_txs).unwrap();
        let list = value.as_list_mut().unwrap();
        list.append(Value::Bytes(b"a".to_vec().into())).unwrap();
        list.append(Value::Bytes(b"bb".to_vec().into())).unwrap();
        assert!(list.append_mutable().is_err());
    }
    assert_eq!(message.gen_txs, txs(&["a", "bb"]));

    let value = message.get_field(&gen_txs).unwrap();
    assert_eq!(value.as_list().unwrap().len(), 2);
}

#[test]
fn set_field_adopts_owned_list_without_copying() {
    let gen_txs = GenesisState::gen_txs_descriptor();
    let mut message = GenesisState::new(txs(&["old"]));

    let mut value = message.new_field(&gen_txs).unwrap();
    {
        let list = value.as_list_mut().unwrap();
        assert!(list.is_valid());
        assert_eq!(list.len(), 0);
        list.append(Value::Bytes(b"a".to_vec().into())).unwrap();
    }
    assert_eq!(message.gen_txs, txs(&["old"]));

    let list = value.into_list().unwrap();
    let field = list.downcast::<Vec<u8>>().unwrap();
    let ptr = field.as_slice().as_ptr();
    message.set_field(&gen_txs, field.into()).unwrap();
    assert_eq!(message.gen_txs, txs(&["a"]));
    assert_eq!(message.gen_txs.as_ptr(), ptr);
}

#[test]
fn set_field_from_another_message_copies() {
    let gen_txs = GenesisState::gen_txs_descriptor();
    let mut source = GenesisState::new(txs(&["a"]));
    let mut target = GenesisState::default();

    target
        .set_field(&gen_txs, source.get_field(&gen_txs).unwrap())
        .unwrap();
    source.gen_txs.push(b"b".to_vec());

    assert_eq!(target.gen_txs, txs(&["a"]));
    assert_eq!(source.gen_txs, txs(&["a", "b"]));
}

#[test]
fn set_field_type_mismatch() {
    let gen_txs = GenesisState::gen_txs_descriptor();
    let mut message = GenesisState::default();

    let err = message.set_field(&gen_txs, Value::I32(1)).unwrap_err();
    assert_eq!(
        err.kind(),
        &ReflectErrorKind::TypeMismatch {
            expected: "list",
            actual: "int32"
        }
    );

    let strings = crate::RepeatedField::from_vec(vec!["a".to_owned()]);
    let err = message.set_field(&gen_txs, strings.into()).unwrap_err();
    assert_eq!(
        err.kind(),
        &ReflectErrorKind::TypeMismatch {
            expected: "bytes",
            actual: "string"
        }
    );

    let unbound = crate::RepeatedField::<Vec<u8>>::unbound();
    let err = message.set_field(&gen_txs, unbound.into()).unwrap_err();
    assert_eq!(err.kind(), &ReflectErrorKind::InvalidList);
}

#[test]
fn range_visits_populated_fields() {
    let mut message = GenesisState::default();
    let mut visited = Vec::new();
    message.range(&mut |field, _| {
        visited.push(field.name().to_owned());
        true
    });
    assert!(visited.is_empty());

    message.gen_txs = txs(&["a", "bb"]);
    message.range(&mut |field, value| {
        visited.push(field.name().to_owned());
        assert_eq!(value.as_list().unwrap().len(), 2);
        false
    });
    assert_eq!(visited, vec!["gen_txs"]);
}

#[test]
fn dyn_reflect_message() {
    let mut message = GenesisState::new(txs(&["a"]));
    let reflect: &mut dyn ReflectMessage = &mut message;
    reflect.set_unknown_fields(vec![0x10, 0x01]);
    assert_eq!(reflect.unknown_fields(), &[0x10, 0x01]);
    assert!(reflect.get_field_by_name("gen_txs").is_ok());

    let err = reflect.get_field_by_name("missing").unwrap_err();
    assert_eq!(
        err.kind(),
        &ReflectErrorKind::UnknownField {
            message: GenesisState::FULL_NAME.to_owned(),
            field: "missing".to_owned(),
        }
    );
    assert_eq!(message.marshal(), vec![0x0a, 0x01, 0x61, 0x10, 0x01]);
}

#[test]
fn extension_descriptor_is_rejected() {
    let pool = extended_pool();
    let memo = pool.get_extension_by_name("test.genutil.memo").unwrap();
    assert_eq!(memo.parent_message().full_name(), GenesisState::FULL_NAME);

    let mut message = GenesisState::default();
    let expected = ReflectErrorKind::ExtensionsUnsupported {
        message: GenesisState::FULL_NAME.to_owned(),
        extension: "test.genutil.memo".to_owned(),
    };
    assert_eq!(message.has_field(&memo).unwrap_err().kind(), &expected);
    assert_eq!(message.get_field(&memo).unwrap_err().kind(), &expected);
    assert_eq!(message.clear_field(&memo).unwrap_err().kind(), &expected);
    assert_eq!(message.new_field(&memo).unwrap_err().kind(), &expected);
}

#[test]
fn foreign_field_descriptor_is_rejected() {
    let pool = extended_pool();
    let other = pool.get_message_by_name("test.genutil.Other").unwrap();
    let foreign = other.get_field_by_name("gen_txs").unwrap();

    let mut message = GenesisState::new(txs(&["a"]));
    let err = message.get_field_mut(&foreign).unwrap_err();
    assert_eq!(
        err.kind(),
        &ReflectErrorKind::UnknownField {
            message: GenesisState::FULL_NAME.to_owned(),
            field: "test.genutil.Other.gen_txs".to_owned(),
        }
    );
    assert!(message.set_field(&foreign, Value::I32(0)).is_err());
    assert_eq!(message.gen_txs, txs(&["a"]));
}

#[test]
fn same_field_from_another_pool_is_accepted() {
    let pool = extended_pool();
    let gen_txs = pool
        .get_message_by_name(GenesisState::FULL_NAME)
        .unwrap()
        .get_field(1)
        .unwrap();
    let message = GenesisState::new(txs(&["a"]));
    assert!(message.has_field(&gen_txs).unwrap());
}

#[test]
fn which_oneof_rejects_foreign_oneof() {
    let pool = extended_pool();
    let other = pool.get_message_by_name("test.genutil.Other").unwrap();
    let choice = other.oneofs().next().unwrap();

    let err = GenesisState::default().which_oneof(&choice).unwrap_err();
    assert_eq!(
        err.kind(),
        &ReflectErrorKind::InvalidOneof {
            message: GenesisState::FULL_NAME.to_owned(),
            oneof: "test.genutil.Other.choice".to_owned(),
        }
    );
}

#[test]
fn clone_and_equality_ignore_size_cache() {
    let message = GenesisState::new(txs(&["a"]));
    let copy = message.clone();
    message.size();
    assert_eq!(message, copy);
    assert_eq!(copy.cached_size(), 0);
    assert_eq!(
        format!("{:?}", message),
        "GenesisState { gen_txs: [[97]], unknown_fields: [] }"
    );
}

#[cfg(feature = "serde")]
#[test]
fn json_mapping() {
    let message = GenesisState::new(txs(&["a", "bb"]));
    let json = serde_json::to_string(&message).unwrap();
    assert_eq!(json, r#"{"genTxs":["YQ==","YmI="]}"#);
    assert_eq!(
        serde_json::from_str::<GenesisState>(&json).unwrap(),
        message
    );

    assert_eq!(
        serde_json::to_string(&GenesisState::default()).unwrap(),
        "{}"
    );
    assert_eq!(
        serde_json::from_str::<GenesisState>(r#"{"gen_txs":["YmI"]}"#).unwrap(),
        GenesisState::new(txs(&["bb"]))
    );
    assert_eq!(
        serde_json::from_str::<GenesisState>(r#"{"genTxs":null}"#).unwrap(),
        GenesisState::default()
    );
    let unknown_key = serde_json::from_str::<GenesisState>(r#"{"other":[]}"#);
    assert!(unknown_key.is_err());
    let bad_base64 = serde_json::from_str::<GenesisState>(r#"{"genTxs":["!"]}"#);
    assert!(bad_base64.is_err());
}
