use fastreflect::genutil::GenesisState;
use proptest::prelude::*;
use serde_json::json;

use crate::arbitrary;

proptest! {
    #[test]
    fn roundtrip(txs in arbitrary::txs()) {
        let message = GenesisState::new(txs);
        let json = serde_json::to_string(&message).unwrap();
        let decoded: GenesisState = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(decoded, message);
    }

    #[test]
    fn unknown_fields_are_not_serialized(message in arbitrary::genesis_state()) {
        let value = serde_json::to_value(&message).unwrap();
        let decoded: GenesisState = serde_json::from_value(value).unwrap();
        prop_assert_eq!(&decoded.gen_txs, &message.gen_txs);
        prop_assert_eq!(decoded, GenesisState::new(message.gen_txs.clone()));
    }
}

#[test]
fn canonical_form() {
    let message = GenesisState::new(vec![b"hello".to_vec(), Vec::new()]);
    assert_eq!(
        serde_json::to_value(&message).unwrap(),
        json!({ "genTxs": ["aGVsbG8=", ""] })
    );
    assert_eq!(
        serde_json::to_value(&GenesisState::default()).unwrap(),
        json!({})
    );
}

#[test]
fn accepts_field_name() {
    let decoded: GenesisState = serde_json::from_value(json!({ "gen_txs": ["aGk="] })).unwrap();
    assert_eq!(decoded.gen_txs, vec![b"hi".to_vec()]);
}

#[test]
fn rejects_unknown_keys() {
    let result: Result<GenesisState, _> = serde_json::from_value(json!({ "memo": "x" }));
    assert!(result.is_err());
}
