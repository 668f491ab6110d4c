use log::trace;
use prost::{
    bytes::{Buf, BufMut},
    encoding::{self, encode_key, encode_varint, DecodeContext, WireType},
};

use crate::{
    encoding::{
        decode_length, decode_varint, decode_wire_type, field_number, skip_field, DecodeError,
        DecodeErrorKind, FastMessage, MarshalOptions, MethodFlags, UnmarshalOptions, END_GROUP,
        RECURSION_LIMIT,
    },
    genutil::GenesisState,
};

const GEN_TXS: u32 = GenesisState::GEN_TXS_NUMBER;

impl GenesisState {
    fn compute_size(&self) -> usize {
        encoding::bytes::encoded_len_repeated(GEN_TXS, &self.gen_txs) + self.unknown_fields.len()
    }

    fn merge_fields(&mut self, input: &[u8], options: UnmarshalOptions) -> Result<(), DecodeError> {
        let mut cursor = input;
        while !cursor.is_empty() {
            let start = input.len() - cursor.len();
            let tag = decode_varint(&mut cursor, None)?;
            let raw_wire_type = (tag & 0x7) as u8;
            if raw_wire_type == END_GROUP {
                return Err(DecodeErrorKind::UnexpectedEndGroup.into());
            }
            let number = field_number(tag)?;

            match number {
                GEN_TXS => {
                    if raw_wire_type != WireType::LengthDelimited as u8 {
                        return Err(DecodeErrorKind::WireTypeMismatch {
                            field: number,
                            expected: WireType::LengthDelimited,
                            actual: raw_wire_type,
                        }
                        .into());
                    }
                    let len = decode_length(&mut cursor, None)?;
                    let (value, rest) = cursor.split_at(len);
                    self.gen_txs.push(value.to_vec());
                    cursor = rest;
                }
                _ => {
                    let wire_type = decode_wire_type(raw_wire_type)?;
                    skip_field(
                        wire_type,
                        number,
                        &mut cursor,
                        None,
                        options.recursion_limit,
                    )?;
                    if !options.discard_unknown {
                        let end = input.len() - cursor.len();
                        trace!(
                            "preserving {} bytes of unknown field {} in {}",
                            end - start,
                            number,
                            GenesisState::FULL_NAME
                        );
                        self.unknown_fields.extend_from_slice(&input[start..end]);
                    }
                }
            }
        }
        Ok(())
    }
}

impl FastMessage for GenesisState {
    const FLAGS: MethodFlags = MethodFlags::SUPPORT_MARSHAL_DETERMINISTIC
        .union(MethodFlags::SUPPORT_UNMARSHAL_DISCARD_UNKNOWN);

    fn size_with(&self, _: MarshalOptions) -> usize {
        let size = self.compute_size();
        self.store_cached_size(size);
        size
    }

    fn cached_size(&self) -> usize {
        self.load_cached_size()
    }

    fn marshal_append_with(&self, buf: &mut Vec<u8>, options: MarshalOptions) {
        let size = if options.use_cached_size {
            self.cached_size()
        } else {
            self.size_with(options)
        };
        buf.reserve(size);

        for tx in &self.gen_txs {
            encode_key(GEN_TXS, WireType::LengthDelimited, buf);
            encode_varint(tx.len() as u64, buf);
            buf.extend_from_slice(tx);
        }
        buf.extend_from_slice(&self.unknown_fields);
    }

    fn merge_from_with(
        &mut self,
        buf: &[u8],
        options: UnmarshalOptions,
    ) -> Result<(), DecodeError> {
        self.merge_fields(buf, options)
            .map_err(|err| err.in_message(GenesisState::FULL_NAME))
    }
}

impl prost::Message for GenesisState {
    fn encode_raw<B>(&self, buf: &mut B)
    where
        B: BufMut,
    {
        encoding::bytes::encode_repeated(GEN_TXS, &self.gen_txs, buf);
        buf.put_slice(&self.unknown_fields);
    }

    fn merge_field<B>(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut B,
        ctx: DecodeContext,
    ) -> Result<(), prost::DecodeError>
    where
        B: Buf,
    {
        if tag == GEN_TXS {
            let txs = &mut self.gen_txs;
            encoding::bytes::merge_repeated(wire_type, txs, buf, ctx).map_err(|mut err| {
                err.push("GenesisState", "gen_txs");
                err
            })
        } else {
            let mut unknown = Vec::new();
            encode_key(tag, wire_type, &mut unknown);
            skip_field(wire_type, tag, buf, Some(&mut unknown), RECURSION_LIMIT)
                .map_err(|err| err.in_message(GenesisState::FULL_NAME))?;
            trace!(
                "preserving {} bytes of unknown field {} in {}",
                unknown.len(),
                tag,
                GenesisState::FULL_NAME
            );
            self.unknown_fields.extend_from_slice(&unknown);
            Ok(())
        }
    }

    fn encoded_len(&self) -> usize {
        self.compute_size()
    }

    fn clear(&mut self) {
        self.gen_txs.clear();
        self.unknown_fields.clear();
    }
}
