// Offsets are relative to the UDP application payload.

pub const DISCRIMINANT_OFFSET: usize = 27;
/// Wire discriminant = logical packet-type ordinal + bias.
pub const DISCRIMINANT_BIAS: u8 = 140;
pub const MIN_ORDINAL: u8 = 1;
pub const MAX_ORDINAL: u8 = 15;

pub const BODY_OFFSET: usize = 28;

pub const ENTITY_ID_OFFSET: usize = BODY_OFFSET;
pub const POSITION_OFFSET: usize = 32;
pub const ROTATION_OFFSET: usize = 44;
pub const ENTITY_POSITION_BODY_LEN: usize = 28;

pub const RPC_ENTITY_ID_OFFSET: usize = BODY_OFFSET;
pub const RPC_NAME_ID_OFFSET: usize = 32;
pub const RPC_SOURCE_CONNECTION_OFFSET: usize = 36;
pub const RPC_MESSAGE_BODY_LEN: usize = 16;

pub const INPUT_MARKER_OFFSET: usize = BODY_OFFSET;
/// Tag byte of the input submessage (field 1, length-delimited).
pub const INPUT_MARKER: u8 = 0x0A;
pub const INPUT_BUTTONS_FIELD: u32 = 1;
pub const INPUT_AIM_FIELD: u32 = 2;

pub const CONSOLE_LENGTH_OFFSET: usize = BODY_OFFSET;
pub const CONSOLE_TEXT_OFFSET: usize = 32;
pub const CONSOLE_MAX_LEN: i32 = 1000;
