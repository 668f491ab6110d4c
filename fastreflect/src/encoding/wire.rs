use prost::{bytes::Buf, encoding::WireType};

use crate::{
    descriptor::MAX_FIELD_NUMBER,
    encoding::{DecodeError, DecodeErrorKind},
};

/// The wire type value of an end-group tag.
pub(crate) const END_GROUP: u8 = 4;

/// Decodes a varint from the front of `buf`, advancing past it.
///
/// At most ten bytes are read. If `sink` is given, the bytes consumed are appended to it verbatim.
pub fn decode_varint<B>(buf: &mut B, sink: Option<&mut Vec<u8>>) -> Result<u64, DecodeError>
where
    B: Buf,
{
    let mut value = 0u64;
    let mut shift = 0u32;
    let mut sink = sink;
    loop {
        if shift >= 64 {
            return Err(DecodeErrorKind::MalformedVarint.into());
        }
        if !buf.has_remaining() {
            return Err(DecodeError::truncated());
        }
        let byte = buf.get_u8();
        if let Some(sink) = sink.as_deref_mut() {
            sink.push(byte);
        }
        value |= u64::from(byte & 0x7f) << shift;
        if byte < 0x80 {
            return Ok(value);
        }
        shift += 7;
    }
}

/// Decodes the varint length prefix of a length-delimited value and checks that the value fits
/// in the rest of `buf`.
pub fn decode_length<B>(buf: &mut B, sink: Option<&mut Vec<u8>>) -> Result<usize, DecodeError>
where
    B: Buf,
{
    let len = decode_varint(buf, sink)?;
    if len > i64::MAX as u64 {
        return Err(DecodeErrorKind::NegativeLength.into());
    }
    if len > buf.remaining() as u64 {
        return Err(DecodeError::truncated());
    }
    Ok(len as usize)
}

/// Extracts the field number from a decoded tag.
pub fn field_number(tag: u64) -> Result<u32, DecodeError> {
    let number = tag >> 3;
    if number == 0 || number > u64::from(MAX_FIELD_NUMBER) {
        return Err(DecodeErrorKind::InvalidTag { tag }.into());
    }
    Ok(number as u32)
}

/// Converts the low three bits of a tag into a [`WireType`].
pub fn decode_wire_type(raw: u8) -> Result<WireType, DecodeError> {
    match raw {
        0 => Ok(WireType::Varint),
        1 => Ok(WireType::SixtyFourBit),
        2 => Ok(WireType::LengthDelimited),
        3 => Ok(WireType::StartGroup),
        4 => Ok(WireType::EndGroup),
        5 => Ok(WireType::ThirtyTwoBit),
        _ => Err(DecodeErrorKind::InvalidWireType(raw).into()),
    }
}

/// Consumes exactly one well-formed value of `wire_type` for field `number`, without
/// interpreting it.
///
/// The tag itself must already have been consumed. Groups are skipped recursively up to `depth`
/// levels, including their end-group tag. If `sink` is given, every byte consumed is appended to
/// it verbatim.
pub fn skip_field<B>(
    wire_type: WireType,
    number: u32,
    buf: &mut B,
    sink: Option<&mut Vec<u8>>,
    depth: u32,
) -> Result<(), DecodeError>
where
    B: Buf,
{
    let mut sink = sink;
    match wire_type {
        WireType::Varint => {
            decode_varint(buf, sink)?;
        }
        WireType::SixtyFourBit => copy_bytes(buf, 8, sink)?,
        WireType::ThirtyTwoBit => copy_bytes(buf, 4, sink)?,
        WireType::LengthDelimited => {
            let len = decode_length(buf, sink.as_deref_mut())?;
            copy_bytes(buf, len, sink)?;
        }
        WireType::StartGroup => {
            if depth == 0 {
                return Err(DecodeErrorKind::RecursionLimitReached.into());
            }
            loop {
                let tag = decode_varint(buf, sink.as_deref_mut())?;
                let inner_number = field_number(tag)?;
                let inner_wire_type = decode_wire_type(tag as u8 & 0x7)?;
                if inner_wire_type == WireType::EndGroup {
                    if inner_number != number {
                        return Err(DecodeErrorKind::GroupMismatch {
                            expected: number,
                            actual: inner_number,
                        }
                        .into());
                    }
                    return Ok(());
                }
                skip_field(
                    inner_wire_type,
                    inner_number,
                    buf,
                    sink.as_deref_mut(),
                    depth - 1,
                )?;
            }
        }
        WireType::EndGroup => return Err(DecodeErrorKind::UnexpectedEndGroup.into()),
    }
    Ok(())
}

fn copy_bytes<B>(buf: &mut B, len: usize, sink: Option<&mut Vec<u8>>) -> Result<(), DecodeError>
where
    B: Buf,
{
    if buf.remaining() < len {
        return Err(DecodeError::truncated());
    }
    match sink {
        Some(sink) => {
            let mut remaining = len;
            while remaining > 0 {
                let chunk = buf.chunk();
                let take = chunk.len().min(remaining);
                sink.extend_from_slice(&chunk[..take]);
                buf.advance(take);
                remaining -= take;
            }
        }
        None => buf.advance(len),
    }
    Ok(())
}
