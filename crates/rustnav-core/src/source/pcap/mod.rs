//! PCAP/PCAPNG capture sessions.
//!
//! Replays a recorded capture file as a [`crate::CaptureSession`]. The file
//! format is detected from its magic bytes; link types come from the legacy
//! header or from each PCAPNG interface description.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::{CaptureStats, PcapFileSession};
