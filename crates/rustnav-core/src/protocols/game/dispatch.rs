use serde::Serialize;

use super::packet_type::{PacketType, resolve_packet_type};
use super::parser::{
    ConsoleCommandRecord, EntityPositionRecord, InputState, RpcMessageRecord,
    parse_console_command, parse_entity_position, parse_rpc_message, parse_tick_input,
};
use crate::protocols::wire::DecodeResult;

/// Typed body of a decoded datagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    EntityPosition(EntityPositionRecord),
    RpcMessage(RpcMessageRecord),
    Tick(InputState),
    ConsoleCommand(ConsoleCommandRecord),
}

impl Record {
    pub fn packet_type(&self) -> PacketType {
        match self {
            Record::EntityPosition(_) => PacketType::EntityPosition,
            Record::RpcMessage(_) => PacketType::RpcMessage,
            Record::Tick(_) => PacketType::Tick,
            Record::ConsoleCommand(_) => PacketType::ConsoleCommand,
        }
    }
}

/// Outcome of a successful dispatch.
///
/// `Unhandled` means there was nothing to decode for this type, which is
/// distinct from a decode failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decoded {
    Record(Record),
    Unhandled(PacketType),
}

impl Decoded {
    pub fn packet_type(&self) -> PacketType {
        match self {
            Decoded::Record(record) => record.packet_type(),
            Decoded::Unhandled(packet_type) => *packet_type,
        }
    }
}

/// Decodes one UDP application payload.
///
/// # Examples
/// ```
/// use rustnav_core::{Decoded, PacketType, decode_datagram};
///
/// let payload = [0u8; 8];
/// let decoded = decode_datagram(&payload)?;
/// assert_eq!(decoded, Decoded::Unhandled(PacketType::Invalid));
/// # Ok::<(), rustnav_core::DecodeError>(())
/// ```
pub fn decode_datagram(payload: &[u8]) -> DecodeResult<Decoded> {
    let record = match resolve_packet_type(payload) {
        PacketType::EntityPosition => Record::EntityPosition(parse_entity_position(payload)?),
        PacketType::RpcMessage => Record::RpcMessage(parse_rpc_message(payload)?),
        PacketType::Tick => Record::Tick(parse_tick_input(payload)?),
        PacketType::ConsoleCommand => Record::ConsoleCommand(parse_console_command(payload)?),
        other => return Ok(Decoded::Unhandled(other)),
    };
    Ok(Decoded::Record(record))
}
