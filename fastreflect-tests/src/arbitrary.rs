use fastreflect::{genutil::GenesisState, ReflectMessage, MAX_FIELD_NUMBER};
use proptest::{collection::vec, prelude::*};
use prost::encoding::{self, encode_key, encode_varint, WireType};

/// A value for a field number that `GenesisState` does not declare.
#[derive(Debug, Clone)]
pub enum UnknownValue {
    Varint(u64),
    Fixed32(u32),
    Fixed64(u64),
    Bytes(Vec<u8>),
    Group(Vec<(u32, UnknownValue)>),
}

impl UnknownValue {
    pub fn encode(&self, number: u32, buf: &mut Vec<u8>) {
        match self {
            UnknownValue::Varint(value) => {
                encode_key(number, WireType::Varint, buf);
                encode_varint(*value, buf);
            }
            UnknownValue::Fixed32(value) => {
                encode_key(number, WireType::ThirtyTwoBit, buf);
                buf.extend_from_slice(&value.to_le_bytes());
            }
            UnknownValue::Fixed64(value) => {
                encode_key(number, WireType::SixtyFourBit, buf);
                buf.extend_from_slice(&value.to_le_bytes());
            }
            UnknownValue::Bytes(value) => encoding::bytes::encode(number, value, buf),
            UnknownValue::Group(fields) => {
                encode_key(number, WireType::StartGroup, buf);
                for (inner, value) in fields {
                    value.encode(*inner, buf);
                }
                encode_key(number, WireType::EndGroup, buf);
            }
        }
    }
}

pub fn tx() -> impl Strategy<Value = Vec<u8>> {
    vec(any::<u8>(), 0..64)
}

pub fn txs() -> impl Strategy<Value = Vec<Vec<u8>>> {
    vec(tx(), 0..16)
}

pub fn unknown_number() -> impl Strategy<Value = u32> {
    2..=MAX_FIELD_NUMBER
}

pub fn unknown_value() -> impl Strategy<Value = UnknownValue> {
    let leaf = prop_oneof![
        any::<u64>().prop_map(UnknownValue::Varint),
        any::<u32>().prop_map(UnknownValue::Fixed32),
        any::<u64>().prop_map(UnknownValue::Fixed64),
        vec(any::<u8>(), 0..32).prop_map(UnknownValue::Bytes),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        vec((1..=MAX_FIELD_NUMBER, inner), 0..4).prop_map(UnknownValue::Group)
    })
}

/// A single encoded field whose number is not declared by `GenesisState`.
pub fn unknown_field() -> impl Strategy<Value = Vec<u8>> {
    (unknown_number(), unknown_value()).prop_map(|(number, value)| {
        let mut buf = Vec::new();
        value.encode(number, &mut buf);
        buf
    })
}

/// A message with arbitrary transactions and well-formed unknown fields.
pub fn genesis_state() -> impl Strategy<Value = GenesisState> {
    (txs(), vec(unknown_field(), 0..4)).prop_map(|(txs, unknown)| {
        let mut message = GenesisState::new(txs);
        message.set_unknown_fields(unknown.concat());
        message
    })
}

/// A wire segment that is either a `gen_txs` element or an unknown field.
#[derive(Debug, Clone)]
pub enum Segment {
    Tx(Vec<u8>),
    Unknown(Vec<u8>),
}

pub fn segments() -> impl Strategy<Value = Vec<Segment>> {
    vec(
        prop_oneof![
            tx().prop_map(Segment::Tx),
            unknown_field().prop_map(Segment::Unknown),
        ],
        0..16,
    )
}

pub fn encode_segments(segments: &[Segment]) -> Vec<u8> {
    let mut buf = Vec::new();
    for segment in segments {
        match segment {
            Segment::Tx(tx) => encoding::bytes::encode(GenesisState::GEN_TXS_NUMBER, tx, &mut buf),
            Segment::Unknown(bytes) => buf.extend_from_slice(bytes),
        }
    }
    buf
}
