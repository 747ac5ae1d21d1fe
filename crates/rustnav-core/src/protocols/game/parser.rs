use std::borrow::Cow;

use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

use super::layout;
use crate::protocols::wire::tagged::{self, Fields};
use crate::protocols::wire::vector::{read_raw_vector3, vector3_from_body};
use crate::protocols::wire::{ByteCursor, DecodeError, DecodeResult, Vector3};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityPositionRecord {
    pub entity_id: u32,
    pub position: Vector3,
    pub rotation: Vector3,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpcMessageRecord {
    pub entity_id: u32,
    pub name_id: u32,
    pub source_connection: u64,
}

/// Player input carried by a tick. Absent fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InputState {
    pub buttons: u64,
    pub aim: Vector3,
}

/// Console command as sent by the client.
///
/// `bytes` holds exactly the declared bytes, unvalidated. `text()` is a lossy
/// rendering for display only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleCommandRecord {
    pub length: u32,
    pub bytes: Vec<u8>,
}

impl ConsoleCommandRecord {
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

impl Serialize for ConsoleCommandRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ConsoleCommandRecord", 3)?;
        state.serialize_field("length", &self.length)?;
        state.serialize_field("bytes", &self.bytes)?;
        state.serialize_field("text", &self.text())?;
        state.end()
    }
}

pub fn parse_entity_position(payload: &[u8]) -> DecodeResult<EntityPositionRecord> {
    let mut cursor = ByteCursor::at(payload, layout::ENTITY_ID_OFFSET)?;
    cursor.require(layout::ENTITY_POSITION_BODY_LEN)?;

    let entity_id = cursor.read_u32_le()?;
    debug_assert_eq!(cursor.position(), layout::POSITION_OFFSET);
    let position = read_raw_vector3(&mut cursor)?;
    debug_assert_eq!(cursor.position(), layout::ROTATION_OFFSET);
    let rotation = read_raw_vector3(&mut cursor)?;

    Ok(EntityPositionRecord {
        entity_id,
        position,
        rotation,
    })
}

pub fn parse_rpc_message(payload: &[u8]) -> DecodeResult<RpcMessageRecord> {
    let mut cursor = ByteCursor::at(payload, layout::RPC_ENTITY_ID_OFFSET)?;
    cursor.require(layout::RPC_MESSAGE_BODY_LEN)?;

    let entity_id = cursor.read_u32_le()?;
    debug_assert_eq!(cursor.position(), layout::RPC_NAME_ID_OFFSET);
    let name_id = cursor.read_u32_le()?;
    debug_assert_eq!(cursor.position(), layout::RPC_SOURCE_CONNECTION_OFFSET);
    let source_connection = cursor.read_u64_le()?;

    Ok(RpcMessageRecord {
        entity_id,
        name_id,
        source_connection,
    })
}

/// Decodes the input state of a tick packet.
///
/// A tick without the input marker (or too short to carry one) has no input
/// this tick and yields the default state.
pub fn parse_tick_input(payload: &[u8]) -> DecodeResult<InputState> {
    let mut cursor = ByteCursor::new(payload);
    let has_input = cursor
        .skip(layout::INPUT_MARKER_OFFSET)
        .and_then(|()| cursor.read_u8())
        .is_ok_and(|marker| marker == layout::INPUT_MARKER);
    if !has_input {
        return Ok(InputState::default());
    }

    let body = tagged::open_submessage(&mut cursor)?;
    let mut input = InputState::default();
    for field in Fields::new(body) {
        let field = field?;
        match field.tag.field {
            layout::INPUT_BUTTONS_FIELD => input.buttons = field.varint()?,
            layout::INPUT_AIM_FIELD => input.aim = vector3_from_body(field.submessage()?)?,
            _ => {}
        }
    }
    Ok(input)
}

/// Decodes a console command, validating the declared length before copying.
pub fn parse_console_command(payload: &[u8]) -> DecodeResult<ConsoleCommandRecord> {
    let mut cursor = ByteCursor::at(payload, layout::CONSOLE_LENGTH_OFFSET)?;
    let length_offset = cursor.position();
    let declared = cursor.read_i32_le()?;
    if !(0..=layout::CONSOLE_MAX_LEN).contains(&declared) {
        return Err(DecodeError::OutOfRange {
            offset: length_offset,
            field: "console command length",
            value: i64::from(declared),
            min: 0,
            max: i64::from(layout::CONSOLE_MAX_LEN),
        });
    }

    debug_assert_eq!(cursor.position(), layout::CONSOLE_TEXT_OFFSET);
    let length = declared as u32;
    let bytes = cursor.read_bytes(length as usize)?.to_vec();

    Ok(ConsoleCommandRecord { length, bytes })
}
