use fastreflect::{
    genutil::GenesisState, DecodeErrorKind, FastMessage, ReflectMessage, UnmarshalOptions,
};
use proptest::{collection::vec, prelude::*};
use prost::Message;

use crate::{
    arbitrary::{self, encode_segments, Segment},
    init_logger,
};

proptest! {
    #[test]
    fn roundtrip(message in arbitrary::genesis_state()) {
        init_logger();
        let bytes = message.marshal();
        prop_assert_eq!(bytes.len(), message.size());
        let decoded = GenesisState::unmarshal(&bytes).unwrap();
        prop_assert_eq!(&decoded.gen_txs, &message.gen_txs);
        prop_assert_eq!(decoded.unknown_fields(), message.unknown_fields());
    }

    #[test]
    fn interleaved_unknown_fields(segments in arbitrary::segments()) {
        init_logger();
        let bytes = encode_segments(&segments);
        let decoded = GenesisState::unmarshal(&bytes).unwrap();

        let mut txs = Vec::new();
        let mut unknown = Vec::new();
        for segment in &segments {
            match segment {
                Segment::Tx(tx) => txs.push(tx.clone()),
                Segment::Unknown(bytes) => unknown.extend_from_slice(bytes),
            }
        }
        prop_assert_eq!(&decoded.gen_txs, &txs);
        prop_assert_eq!(decoded.unknown_fields(), unknown.as_slice());

        let discarded = GenesisState::unmarshal_with(&bytes, UnmarshalOptions {
            discard_unknown: true,
            ..Default::default()
        }).unwrap();
        prop_assert_eq!(&discarded.gen_txs, &txs);
        prop_assert!(discarded.unknown_fields().is_empty());
    }

    #[test]
    fn prost_interop(message in arbitrary::genesis_state()) {
        let bytes = message.marshal();
        prop_assert_eq!(message.encoded_len(), bytes.len());
        prop_assert_eq!(message.encode_to_vec(), bytes.clone());
        let decoded = <GenesisState as Message>::decode(bytes.as_slice()).unwrap();
        prop_assert_eq!(decoded, message);
    }

    #[test]
    fn arbitrary_input_does_not_panic(bytes in vec(any::<u8>(), 0..128)) {
        if let Ok(message) = GenesisState::unmarshal(&bytes) {
            let reencoded = message.marshal();
            prop_assert_eq!(GenesisState::unmarshal(&reencoded).unwrap(), message);
        }
    }

    #[test]
    fn truncated_input_fails(
        message in arbitrary::genesis_state(),
        cut in any::<prop::sample::Index>(),
    ) {
        let bytes = message.marshal();
        prop_assume!(!message.gen_txs.is_empty());
        let first_len = message.gen_txs[0].len();
        // cut strictly inside the first element: after its tag, before its last byte
        let encoded_first = 1 + prost::encoding::encoded_len_varint(first_len as u64) + first_len;
        let end = 1 + cut.index(encoded_first - 1);
        prop_assume!(end < encoded_first);
        let err = GenesisState::unmarshal(&bytes[..end]).unwrap_err();
        prop_assert_eq!(err.kind(), DecodeErrorKind::TruncatedInput);
    }
}

#[test]
fn decode_large_message() {
    init_logger();
    let message = crate::genesis_state(512, 2048);
    let bytes = crate::encoded_genesis_state(512, 2048);
    assert_eq!(bytes.len(), message.size());
    assert_eq!(GenesisState::unmarshal(&bytes).unwrap(), message);
}
