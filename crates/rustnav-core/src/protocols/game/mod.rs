//! Game packet decoding.
//!
//! The packet type comes from a biased discriminant byte at a fixed header
//! offset (`packet_type`). Entity positions and RPC messages use fixed
//! little-endian layouts; tick input is a tagged submessage; console commands
//! carry a length-checked text payload (`parser`). `dispatch` routes a payload
//! to the matching decoder and separates "nothing to decode" from "decode
//! failed".
//!
//! Offsets live in `layout`. Every read goes through the wire cursor, so a
//! short or hostile payload produces an error with the failing offset instead
//! of an out-of-bounds access.

pub mod dispatch;
pub mod layout;
pub mod packet_type;
pub mod parser;

pub use dispatch::{Decoded, Record, decode_datagram};
pub use packet_type::{PacketType, resolve_packet_type};
pub use parser::{ConsoleCommandRecord, EntityPositionRecord, InputState, RpcMessageRecord};
