//! rustnav core library: game datagram decoding and capture inspection.
//!
//! The heart of the crate is the protocol decoding engine in `protocols`:
//! a bounds-checked cursor, LEB128 varints and tagged submessages (`wire`),
//! and the game packet layer (`game`) that classifies a UDP payload by its
//! biased discriminant byte and decodes entity positions, RPC messages, tick
//! input and console commands into typed records.
//!
//! Around it sit the collaborators that feed and consume it: capture sessions
//! replaying PCAP/PCAPNG files (`source`) and the inspection pipeline that
//! extracts UDP datagrams, dispatches each one, logs failures through
//! `tracing` and aggregates everything into a deterministic [`Report`].
//!
//! Invariants:
//! - Decoding is a pure function of one payload slice; no state is carried
//!   between datagrams.
//! - No read ever goes past the end of the payload or a declared length.
//! - A failed datagram is recorded and inspection continues with the next.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use rustnav_core::{InspectOptions, inspect_pcap_file};
//!
//! let report = inspect_pcap_file(Path::new("capture.pcapng"), &InspectOptions::default())?;
//! println!("decoded {} packets", report.packets.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::Serialize;

mod analysis;
mod protocols;
mod source;

pub use analysis::{DEFAULT_SERVER_PORT, InspectError, InspectOptions, inspect_pcap_file, inspect_source};
pub use protocols::game::{
    ConsoleCommandRecord, Decoded, EntityPositionRecord, InputState, PacketType, Record,
    RpcMessageRecord, decode_datagram, resolve_packet_type,
};
pub use protocols::wire::{DecodeError, DecodeResult, ErrorKind, Vector3};
pub use source::{CaptureError, CaptureSession, CaptureStats, CapturedFrame, PcapFileSession};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no capture time is available.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Inspection report with deterministic ordering.
///
/// # Examples
/// ```
/// use rustnav_core::make_stub_report;
///
/// let report = make_stub_report("capture.pcapng", 123);
/// assert_eq!(report.report_version, rustnav_core::REPORT_VERSION);
/// assert!(report.packets.is_empty());
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    /// RFC3339 timestamp of the last captured frame, or the epoch default.
    pub generated_at: String,
    pub input: InputInfo,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_summary: Option<CaptureSummary>,
    /// Per packet type counts, in ordinal order with `Invalid` last.
    pub packet_types: Vec<PacketTypeSummary>,
    /// Decode failures grouped by error kind.
    pub decode_errors: Vec<DecodeErrorSummary>,
    /// Per datagram entries in capture order.
    pub packets: Vec<PacketEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputInfo {
    /// Input path as provided to the inspector.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Frame and datagram counters for the whole capture.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CaptureSummary {
    pub frames_total: u64,
    /// Frames that carried a UDP datagram.
    pub udp_datagrams: u64,
    /// UDP datagrams that passed the port filter and were dispatched.
    pub game_datagrams: u64,
    pub decoded: u64,
    pub unhandled: u64,
    pub failed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PacketTypeSummary {
    pub packet_type: PacketType,
    /// Logical ordinal (absent for `Invalid`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<u8>,
    pub count: u64,
    pub decoded: u64,
    pub failed: u64,
}

/// Decode failures of one kind.
///
/// # Examples
/// ```
/// use rustnav_core::{DecodeErrorSummary, ErrorKind};
///
/// let summary = DecodeErrorSummary {
///     kind: ErrorKind::Truncated,
///     count: 2,
///     examples: vec!["10.0.0.1:50000 -> 10.0.0.2:28015 @ 1970-01-01T00:00:00Z (byte 28)".to_string()],
/// };
/// assert_eq!(summary.count, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeErrorSummary {
    pub kind: ErrorKind,
    pub count: u64,
    /// At most three example contexts, formatted as `src -> dst @ ts (byte N)`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

/// One dispatched datagram.
#[derive(Debug, Clone, Serialize)]
pub struct PacketEntry {
    /// Position among dispatched datagrams (0-based).
    pub index: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    pub src: String,
    pub dst: String,
    pub packet_type: PacketType,
    pub payload_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<Record>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PacketError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PacketError {
    pub kind: ErrorKind,
    pub offset: usize,
    pub message: String,
}

impl From<&DecodeError> for PacketError {
    fn from(err: &DecodeError) -> Self {
        PacketError {
            kind: err.kind(),
            offset: err.offset(),
            message: err.to_string(),
        }
    }
}

/// Build a stub report with base fields filled and empty aggregates.
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "rustnav".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        capture_summary: None,
        packet_types: vec![],
        decode_errors: vec![],
        packets: vec![],
    }
}
