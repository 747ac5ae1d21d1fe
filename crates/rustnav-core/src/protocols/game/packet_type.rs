use std::fmt;

use serde::Serialize;

use super::layout;

/// Logical packet type carried in the discriminant byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum PacketType {
    Welcome,
    Auth,
    Approved,
    Ready,
    Entities,
    EntityDestroy,
    GroupChange,
    GroupDestroy,
    RpcMessage,
    EntityPosition,
    ConsoleMessage,
    ConsoleCommand,
    Effect,
    DisconnectReason,
    Tick,
    Invalid,
}

impl PacketType {
    /// All valid types in ordinal order (excludes `Invalid`).
    pub const ALL: [PacketType; 15] = [
        PacketType::Welcome,
        PacketType::Auth,
        PacketType::Approved,
        PacketType::Ready,
        PacketType::Entities,
        PacketType::EntityDestroy,
        PacketType::GroupChange,
        PacketType::GroupDestroy,
        PacketType::RpcMessage,
        PacketType::EntityPosition,
        PacketType::ConsoleMessage,
        PacketType::ConsoleCommand,
        PacketType::Effect,
        PacketType::DisconnectReason,
        PacketType::Tick,
    ];

    /// Maps a raw discriminant byte to its packet type.
    ///
    /// Total over `u8`: anything outside the biased ordinal range is `Invalid`.
    ///
    /// # Examples
    /// ```
    /// use rustnav_core::PacketType;
    ///
    /// assert_eq!(PacketType::from_discriminant(150), PacketType::EntityPosition);
    /// assert_eq!(PacketType::from_discriminant(140), PacketType::Invalid);
    /// ```
    pub fn from_discriminant(byte: u8) -> PacketType {
        match byte.checked_sub(layout::DISCRIMINANT_BIAS) {
            Some(ordinal) => PacketType::from_ordinal(ordinal),
            None => PacketType::Invalid,
        }
    }

    pub fn from_ordinal(ordinal: u8) -> PacketType {
        if !(layout::MIN_ORDINAL..=layout::MAX_ORDINAL).contains(&ordinal) {
            return PacketType::Invalid;
        }
        PacketType::ALL[usize::from(ordinal - layout::MIN_ORDINAL)]
    }

    /// Logical ordinal (1..=15), `None` for `Invalid`.
    pub fn ordinal(self) -> Option<u8> {
        PacketType::ALL
            .iter()
            .position(|candidate| *candidate == self)
            .map(|index| index as u8 + layout::MIN_ORDINAL)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PacketType::Welcome => "Welcome",
            PacketType::Auth => "Auth",
            PacketType::Approved => "Approved",
            PacketType::Ready => "Ready",
            PacketType::Entities => "Entities",
            PacketType::EntityDestroy => "EntityDestroy",
            PacketType::GroupChange => "GroupChange",
            PacketType::GroupDestroy => "GroupDestroy",
            PacketType::RpcMessage => "RPCMessage",
            PacketType::EntityPosition => "EntityPosition",
            PacketType::ConsoleMessage => "ConsoleMessage",
            PacketType::ConsoleCommand => "ConsoleCommand",
            PacketType::Effect => "Effect",
            PacketType::DisconnectReason => "DisconnectReason",
            PacketType::Tick => "Tick",
            PacketType::Invalid => "Invalid",
        }
    }
}

impl From<PacketType> for &'static str {
    fn from(value: PacketType) -> Self {
        value.as_str()
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a datagram payload by its discriminant byte.
///
/// A payload too short to hold the discriminant is `Invalid`.
pub fn resolve_packet_type(payload: &[u8]) -> PacketType {
    payload
        .get(layout::DISCRIMINANT_OFFSET)
        .copied()
        .map_or(PacketType::Invalid, PacketType::from_discriminant)
}
