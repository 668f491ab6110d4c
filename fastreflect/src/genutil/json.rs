use std::fmt;

use serde1::{
    de::{self, MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::genutil::GenesisState;

const GEN_TXS_JSON_NAME: &str = "genTxs";
const FIELDS: &[&str] = &[GEN_TXS_JSON_NAME, "gen_txs"];

#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl Serialize for GenesisState {
    /// Serializes the message using the canonical protobuf JSON mapping. Unknown fields are not
    /// included.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = if self.gen_txs.is_empty() { 0 } else { 1 };
        let mut map = serializer.serialize_map(Some(len))?;
        if !self.gen_txs.is_empty() {
            map.serialize_entry(GEN_TXS_JSON_NAME, &SerializeBytesList(&self.gen_txs))?;
        }
        map.end()
    }
}

#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl<'de> Deserialize<'de> for GenesisState {
    /// Deserializes the message from the protobuf JSON mapping. Both the JSON name `genTxs` and
    /// the field name `gen_txs` are accepted.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(GenesisStateVisitor)
    }
}

struct SerializeBytesList<'a>(&'a [Vec<u8>]);

impl<'a> Serialize for SerializeBytesList<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.0.iter().map(base64::encode))
    }
}

struct DeserializeBytesList(Vec<Vec<u8>>);

impl<'de> Deserialize<'de> for DeserializeBytesList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = Vec::<String>::deserialize(deserializer)?;
        encoded
            .iter()
            .map(|value| decode_base64(value))
            .collect::<Result<_, _>>()
            .map(DeserializeBytesList)
            .map_err(de::Error::custom)
    }
}

fn decode_base64(value: &str) -> Result<Vec<u8>, base64::DecodeError> {
    base64::decode_config(value, base64::STANDARD)
        .or_else(|_| base64::decode_config(value, base64::URL_SAFE))
}

struct GenesisStateVisitor;

impl<'de> Visitor<'de> for GenesisStateVisitor {
    type Value = GenesisState;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a map for message {}", GenesisState::FULL_NAME)
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut gen_txs: Option<Vec<Vec<u8>>> = None;
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "genTxs" | "gen_txs" => {
                    if gen_txs.is_some() {
                        return Err(de::Error::duplicate_field(GEN_TXS_JSON_NAME));
                    }
                    let value: Option<DeserializeBytesList> = map.next_value()?;
                    gen_txs = Some(value.map(|list| list.0).unwrap_or_default());
                }
                _ => return Err(de::Error::unknown_field(&key, FIELDS)),
            }
        }
        Ok(GenesisState::new(gen_txs.unwrap_or_default()))
    }
}
