//! Tag/wire-type field streams.
//!
//! A submessage is a varint byte length followed by exactly that many bytes of
//! `(tag, value)` pairs, where `tag = field_number << 3 | wire_type`. Field
//! presence is optional: callers match the field numbers they know and drop
//! the rest, which have already been consumed according to their wire type.
//! Wire types other than varint, fixed32 and length-delimited cannot be
//! skipped safely and are rejected as malformed.

use super::cursor::ByteCursor;
use super::error::{DecodeError, DecodeResult};
use super::varint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Varint,
    LengthDelimited,
    Fixed32,
}

impl WireType {
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(WireType::Varint),
            2 => Some(WireType::LengthDelimited),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub field: u32,
    pub wire: WireType,
}

pub fn read_tag(cursor: &mut ByteCursor<'_>) -> DecodeResult<Tag> {
    let offset = cursor.position();
    let raw = varint::decode_u32(cursor)?;
    let field = raw >> 3;
    if field == 0 {
        return Err(DecodeError::Malformed {
            offset,
            reason: "field number 0 is reserved",
        });
    }
    let wire = WireType::from_bits((raw & 0x7) as u8).ok_or(DecodeError::Malformed {
        offset,
        reason: "unsupported wire type",
    })?;
    Ok(Tag { field, wire })
}

/// Reads a varint length and bounds a child cursor to exactly that many bytes.
///
/// The parent advances past the whole submessage, so the end bound is fixed
/// before any field inside it is read.
pub fn open_submessage<'a>(cursor: &mut ByteCursor<'a>) -> DecodeResult<ByteCursor<'a>> {
    let len = varint::decode_u32(cursor)?;
    cursor.sub(len as usize)
}

#[derive(Debug, Clone)]
pub enum FieldValue<'a> {
    Varint(u64),
    Fixed32(f32),
    LengthDelimited(ByteCursor<'a>),
}

#[derive(Debug, Clone)]
pub struct Field<'a> {
    pub tag: Tag,
    /// Offset of the tag that introduced this field.
    pub offset: usize,
    pub value: FieldValue<'a>,
}

impl<'a> Field<'a> {
    pub fn varint(&self) -> DecodeResult<u64> {
        match self.value {
            FieldValue::Varint(value) => Ok(value),
            _ => Err(self.wrong_wire_type("expected varint wire type")),
        }
    }

    pub fn fixed32(&self) -> DecodeResult<f32> {
        match self.value {
            FieldValue::Fixed32(value) => Ok(value),
            _ => Err(self.wrong_wire_type("expected fixed32 wire type")),
        }
    }

    pub fn submessage(&self) -> DecodeResult<ByteCursor<'a>> {
        match &self.value {
            FieldValue::LengthDelimited(body) => Ok(body.clone()),
            _ => Err(self.wrong_wire_type("expected length-delimited wire type")),
        }
    }

    fn wrong_wire_type(&self, reason: &'static str) -> DecodeError {
        DecodeError::Malformed {
            offset: self.offset,
            reason,
        }
    }
}

pub fn read_field<'a>(cursor: &mut ByteCursor<'a>) -> DecodeResult<Field<'a>> {
    let offset = cursor.position();
    let tag = read_tag(cursor)?;
    let value = match tag.wire {
        WireType::Varint => FieldValue::Varint(varint::decode_u64(cursor)?),
        WireType::Fixed32 => FieldValue::Fixed32(cursor.read_f32_le()?),
        WireType::LengthDelimited => FieldValue::LengthDelimited(open_submessage(cursor)?),
    };
    Ok(Field { tag, offset, value })
}

/// Iterator over the fields of a bounded submessage body.
///
/// Yields at most one error, after which iteration stops.
#[derive(Debug, Clone)]
pub struct Fields<'a> {
    body: ByteCursor<'a>,
    failed: bool,
}

impl<'a> Fields<'a> {
    pub fn new(body: ByteCursor<'a>) -> Self {
        Self {
            body,
            failed: false,
        }
    }
}

impl<'a> Iterator for Fields<'a> {
    type Item = DecodeResult<Field<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.body.is_empty() {
            return None;
        }
        let field = read_field(&mut self.body);
        self.failed = field.is_err();
        Some(field)
    }
}
