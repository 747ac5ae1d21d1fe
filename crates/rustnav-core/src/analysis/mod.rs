use std::path::Path;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::protocols::game::{Decoded, Record, decode_datagram, resolve_packet_type};
use crate::source::{CaptureError, CaptureSession, CapturedFrame, PcapFileSession};
use crate::{
    CaptureSummary, DEFAULT_GENERATED_AT, InputInfo, PacketEntry, PacketError, Report,
    make_stub_report,
};

mod tally;
mod udp;

use tally::DecodeTally;
use udp::{UdpDatagram, extract_udp};

/// UDP port the game server listens on by default.
pub const DEFAULT_SERVER_PORT: u16 = 28015;

/// Knobs for a single inspection run.
#[derive(Debug, Clone, Default)]
pub struct InspectOptions {
    /// Only dispatch datagrams whose source or destination port matches.
    pub server_port: Option<u16>,
    /// Emit packet entries for datagrams with nothing to decode.
    pub include_unhandled: bool,
    /// Cap on emitted packet entries; counters keep running past it.
    pub max_records: Option<usize>,
}

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),
}

/// Inspect a PCAP/PCAPNG file and build a report.
pub fn inspect_pcap_file(path: &Path, options: &InspectOptions) -> Result<Report, InspectError> {
    let input = InputInfo {
        path: path.display().to_string(),
        bytes: path.metadata()?.len(),
    };
    let mut session = PcapFileSession::open(path)?;
    let report = inspect_source(input, &mut session, options);
    let stats = session.close();
    tracing::info!(
        path = %stats.path.display(),
        frames = stats.frames_read,
        "capture inspected"
    );
    report
}

/// Drain a capture session, dispatching every game datagram.
///
/// Decode failures are counted and reported per datagram; only capture
/// errors abort the run.
pub fn inspect_source<S: CaptureSession>(
    input: InputInfo,
    session: &mut S,
    options: &InspectOptions,
) -> Result<Report, InspectError> {
    let mut summary = CaptureSummary::default();
    let mut first_ts = None;
    let mut last_ts = None;
    let mut tally = DecodeTally::new();
    let mut packets = Vec::new();

    while let Some(CapturedFrame { ts, linktype, data }) = session.next_frame()? {
        summary.frames_total += 1;
        update_ts_bounds(&mut first_ts, &mut last_ts, ts);

        let datagram = match extract_udp(linktype, &data) {
            Ok(Some(datagram)) => datagram,
            Ok(None) => continue,
            Err(err) => {
                tracing::trace!(frame = summary.frames_total, error = %err, "frame skipped");
                continue;
            }
        };
        summary.udp_datagrams += 1;
        if let Some(port) = options.server_port {
            if !datagram.involves_port(port) {
                continue;
            }
        }

        let index = summary.game_datagrams;
        summary.game_datagrams += 1;
        let entry = dispatch(index, ts, &datagram, &mut tally);
        if should_emit(&entry, options, packets.len()) {
            packets.push(entry);
        }
    }

    summary.decoded = tally.decoded;
    summary.unhandled = tally.unhandled;
    summary.failed = tally.failed;
    summary.time_start = ts_to_rfc3339(first_ts);
    summary.time_end = ts_to_rfc3339(last_ts);

    let mut report = make_stub_report(&input.path, input.bytes);
    report.generated_at = summary
        .time_end
        .clone()
        .or_else(|| summary.time_start.clone())
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());
    report.capture_summary = Some(summary);
    report.packet_types = tally.type_summaries();
    report.decode_errors = tally.error_summaries();
    report.packets = packets;
    Ok(report)
}

fn dispatch(
    index: u64,
    ts: Option<f64>,
    datagram: &UdpDatagram<'_>,
    tally: &mut DecodeTally,
) -> PacketEntry {
    let mut entry = PacketEntry {
        index,
        ts: ts_to_rfc3339(ts),
        src: datagram.src.to_string(),
        dst: datagram.dst.to_string(),
        packet_type: resolve_packet_type(datagram.payload),
        payload_len: datagram.payload.len(),
        record: None,
        error: None,
    };

    match decode_datagram(datagram.payload) {
        Ok(decoded) => {
            tally.add_success(&decoded);
            if let Decoded::Record(record) = decoded {
                log_record(index, &record);
                entry.record = Some(record);
            }
        }
        Err(err) => {
            tracing::warn!(
                index,
                src = %datagram.src,
                dst = %datagram.dst,
                packet_type = %entry.packet_type,
                kind = %err.kind(),
                offset = err.offset(),
                "datagram failed to decode: {err}"
            );
            tally.add_failure(entry.packet_type, &err, || {
                format!(
                    "{} -> {} @ {} (byte {})",
                    entry.src,
                    entry.dst,
                    entry.ts.as_deref().unwrap_or("-"),
                    err.offset()
                )
            });
            entry.error = Some(PacketError::from(&err));
        }
    }
    entry
}

fn log_record(index: u64, record: &Record) {
    match record {
        // Command text is client data: it only ever travels as a field value.
        Record::ConsoleCommand(command) => {
            tracing::info!(index, length = command.length, text = ?command.text(), "console command");
        }
        other => {
            tracing::debug!(index, packet_type = %other.packet_type(), "datagram decoded");
        }
    }
}

fn should_emit(entry: &PacketEntry, options: &InspectOptions, emitted: usize) -> bool {
    if options.max_records.is_some_and(|max| emitted >= max) {
        return false;
    }
    options.include_unhandled || entry.record.is_some() || entry.error.is_some()
}

fn update_ts_bounds(first: &mut Option<f64>, last: &mut Option<f64>, ts: Option<f64>) {
    let Some(ts) = ts else {
        return;
    };
    if first.is_none_or(|existing| ts < existing) {
        *first = Some(ts);
    }
    if last.is_none_or(|existing| ts > existing) {
        *last = Some(ts);
    }
}

fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use etherparse::PacketBuilder;
    use pcap_parser::Linktype;

    use super::{InspectOptions, inspect_source, ts_to_rfc3339, update_ts_bounds};
    use crate::protocols::game::layout;
    use crate::protocols::game::{PacketType, Record};
    use crate::protocols::wire::ErrorKind;
    use crate::source::{CaptureError, CaptureSession, CapturedFrame};
    use crate::{InputInfo, Report};

    struct MemorySession {
        frames: VecDeque<CapturedFrame>,
    }

    impl CaptureSession for MemorySession {
        fn next_frame(&mut self) -> Result<Option<CapturedFrame>, CaptureError> {
            Ok(self.frames.pop_front())
        }
    }

    fn udp_frame(ts: f64, src_port: u16, dst_port: u16, payload: &[u8]) -> CapturedFrame {
        let builder = PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [6, 5, 4, 3, 2, 1])
            .ipv4([10, 0, 0, 1], [10, 0, 0, 2], 64)
            .udp(src_port, dst_port);
        let mut data = Vec::with_capacity(builder.size(payload.len()));
        builder.write(&mut data, payload).unwrap();
        CapturedFrame {
            ts: Some(ts),
            linktype: Linktype::ETHERNET,
            data,
        }
    }

    fn game_payload(packet_type: PacketType, body: &[u8]) -> Vec<u8> {
        let mut payload = vec![0u8; layout::BODY_OFFSET];
        payload[layout::DISCRIMINANT_OFFSET] =
            layout::DISCRIMINANT_BIAS + packet_type.ordinal().unwrap();
        payload.extend_from_slice(body);
        payload
    }

    fn console_body(declared: i32, text: &[u8]) -> Vec<u8> {
        let mut body = declared.to_le_bytes().to_vec();
        body.extend_from_slice(text);
        body
    }

    fn run(frames: Vec<CapturedFrame>, options: &InspectOptions) -> Report {
        let mut session = MemorySession {
            frames: frames.into(),
        };
        let input = InputInfo {
            path: "memory".to_string(),
            bytes: 0,
        };
        inspect_source(input, &mut session, options).unwrap()
    }

    #[test]
    fn failures_do_not_stop_the_run() {
        let frames = vec![
            udp_frame(
                1.0,
                50000,
                28015,
                &game_payload(PacketType::ConsoleCommand, &console_body(2000, b"x")),
            ),
            udp_frame(
                2.0,
                50000,
                28015,
                &game_payload(PacketType::ConsoleCommand, &console_body(6, b"status")),
            ),
        ];
        let report = run(frames, &InspectOptions::default());

        let summary = report.capture_summary.as_ref().unwrap();
        assert_eq!(summary.frames_total, 2);
        assert_eq!(summary.game_datagrams, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.decoded, 1);

        assert_eq!(report.packets.len(), 2);
        let failed = report.packets[0].error.as_ref().unwrap();
        assert_eq!(failed.kind, ErrorKind::OutOfRange);
        assert_eq!(failed.offset, layout::CONSOLE_LENGTH_OFFSET);
        match report.packets[1].record.as_ref().unwrap() {
            Record::ConsoleCommand(command) => assert_eq!(command.bytes, b"status"),
            other => panic!("unexpected record: {other:?}"),
        }

        assert_eq!(report.decode_errors.len(), 1);
        assert_eq!(
            report.decode_errors[0].examples[0],
            "10.0.0.1:50000 -> 10.0.0.2:28015 @ 1970-01-01T00:00:01Z (byte 28)"
        );
        assert_eq!(report.generated_at, "1970-01-01T00:00:02Z");
    }

    #[test]
    fn port_filter_skips_other_traffic() {
        let payload = game_payload(PacketType::Welcome, &[]);
        let frames = vec![
            udp_frame(1.0, 50000, 28015, &payload),
            udp_frame(2.0, 5353, 5353, &payload),
        ];
        let options = InspectOptions {
            server_port: Some(28015),
            include_unhandled: true,
            ..InspectOptions::default()
        };
        let report = run(frames, &options);
        let summary = report.capture_summary.as_ref().unwrap();
        assert_eq!(summary.udp_datagrams, 2);
        assert_eq!(summary.game_datagrams, 1);
        assert_eq!(summary.unhandled, 1);
        assert_eq!(report.packets.len(), 1);
        assert_eq!(report.packets[0].packet_type, PacketType::Welcome);
    }

    #[test]
    fn unhandled_entries_are_hidden_by_default() {
        let frames = vec![udp_frame(1.0, 1, 2, &[0u8; 4])];
        let report = run(frames, &InspectOptions::default());
        assert!(report.packets.is_empty());
        assert_eq!(report.packet_types.len(), 1);
        assert_eq!(report.packet_types[0].packet_type, PacketType::Invalid);
        assert_eq!(report.packet_types[0].count, 1);
    }

    #[test]
    fn max_records_caps_entries_but_not_counts() {
        let payload = game_payload(PacketType::Tick, &[]);
        let frames = (0..5u32)
            .map(|i| udp_frame(f64::from(i), 50000, 28015, &payload))
            .collect();
        let options = InspectOptions {
            max_records: Some(2),
            ..InspectOptions::default()
        };
        let report = run(frames, &options);
        assert_eq!(report.packets.len(), 2);
        assert_eq!(report.packets[1].index, 1);
        assert_eq!(report.capture_summary.as_ref().unwrap().decoded, 5);
    }

    #[test]
    fn empty_session_uses_default_timestamp() {
        let report = run(Vec::new(), &InspectOptions::default());
        assert_eq!(report.generated_at, crate::DEFAULT_GENERATED_AT);
        let summary = report.capture_summary.as_ref().unwrap();
        assert_eq!(summary.frames_total, 0);
        assert!(summary.time_start.is_none());
    }

    #[test]
    fn non_udp_frames_are_counted_but_not_dispatched() {
        let frames = vec![CapturedFrame {
            ts: None,
            linktype: Linktype::ETHERNET,
            data: vec![0u8; 3],
        }];
        let report = run(frames, &InspectOptions::default());
        let summary = report.capture_summary.as_ref().unwrap();
        assert_eq!(summary.frames_total, 1);
        assert_eq!(summary.udp_datagrams, 0);
    }

    #[test]
    fn ts_bounds_track_min_and_max() {
        let mut first = None;
        let mut last = None;
        for ts in [Some(5.0), None, Some(2.0), Some(9.0)] {
            update_ts_bounds(&mut first, &mut last, ts);
        }
        assert_eq!(first, Some(2.0));
        assert_eq!(last, Some(9.0));
    }

    #[test]
    fn ts_formats_as_rfc3339() {
        assert_eq!(ts_to_rfc3339(Some(0.0)).as_deref(), Some("1970-01-01T00:00:00Z"));
        assert_eq!(ts_to_rfc3339(None), None);
    }
}
