use std::fs::File;
use std::path::{Path, PathBuf};

use pcap_parser::{
    Block, LegacyPcapReader, Linktype, PcapBlockOwned, PcapError, PcapNGReader,
    traits::PcapReaderIterator,
};

use crate::source::{CaptureError, CaptureSession, CapturedFrame};

use super::error::PcapSourceError;
use super::layout;
use super::reader::{
    is_pcapng_magic, legacy_ts_to_seconds, linktype_for_interface, pcapng_ts_to_seconds,
    read_magic_and_rewind,
};

/// Totals reported when a session is closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureStats {
    pub path: PathBuf,
    pub frames_read: u64,
}

/// Capture session replaying a PCAP or PCAPNG file.
pub struct PcapFileSession {
    path: PathBuf,
    inner: PcapReader,
    frames_read: u64,
}

enum PcapReader {
    Legacy {
        reader: LegacyPcapReader<File>,
        linktype: Option<Linktype>,
    },
    Ng {
        reader: PcapNGReader<File>,
        linktypes: Vec<Linktype>,
    },
}

impl PcapFileSession {
    pub fn open(path: &Path) -> Result<Self, CaptureError> {
        let file = File::open(path)?;
        let inner = create_reader(file)?;
        tracing::debug!(path = %path.display(), "capture session opened");
        Ok(Self {
            path: path.to_path_buf(),
            inner,
            frames_read: 0,
        })
    }

    /// Ends the session and releases the file.
    pub fn close(self) -> CaptureStats {
        tracing::debug!(
            path = %self.path.display(),
            frames = self.frames_read,
            "capture session closed"
        );
        CaptureStats {
            path: self.path,
            frames_read: self.frames_read,
        }
    }
}

impl CaptureSession for PcapFileSession {
    fn next_frame(&mut self) -> Result<Option<CapturedFrame>, CaptureError> {
        let frame = next_frame(&mut self.inner)?;
        if frame.is_some() {
            self.frames_read += 1;
        }
        Ok(frame)
    }
}

fn create_reader(mut file: File) -> Result<PcapReader, PcapSourceError> {
    let magic = read_magic_and_rewind(&mut file)?;

    if is_pcapng_magic(&magic) {
        let reader = PcapNGReader::new(layout::PCAP_READER_BUFFER_SIZE, file)
            .map_err(|e| PcapSourceError::pcap("pcapng reader init", e))?;
        Ok(PcapReader::Ng {
            reader,
            linktypes: Vec::new(),
        })
    } else {
        let reader = LegacyPcapReader::new(layout::PCAP_READER_BUFFER_SIZE, file)
            .map_err(|e| PcapSourceError::pcap("pcap reader init", e))?;
        Ok(PcapReader::Legacy {
            reader,
            linktype: None,
        })
    }
}

fn next_frame(reader: &mut PcapReader) -> Result<Option<CapturedFrame>, PcapSourceError> {
    match reader {
        PcapReader::Legacy { reader, linktype } => {
            pump(reader, "pcap reader", |block| match block {
                PcapBlockOwned::LegacyHeader(header) => {
                    *linktype = Some(header.network);
                    None
                }
                PcapBlockOwned::Legacy(packet) => Some(CapturedFrame {
                    ts: Some(legacy_ts_to_seconds(packet.ts_sec, packet.ts_usec)),
                    linktype: linktype.unwrap_or(Linktype::ETHERNET),
                    data: packet.data.to_vec(),
                }),
                _ => None,
            })
        }
        PcapReader::Ng { reader, linktypes } => {
            pump(reader, "pcapng reader", |block| match block {
                PcapBlockOwned::NG(Block::InterfaceDescription(intf)) => {
                    linktypes.push(intf.linktype);
                    None
                }
                PcapBlockOwned::NG(Block::EnhancedPacket(packet)) => Some(CapturedFrame {
                    ts: Some(pcapng_ts_to_seconds(packet.ts_high, packet.ts_low)),
                    linktype: linktype_for_interface(linktypes, packet.if_id),
                    data: packet.data.to_vec(),
                }),
                _ => None,
            })
        }
    }
}

/// Drives a pcap-parser reader until `on_block` yields a frame or input ends.
fn pump<R, F>(
    reader: &mut R,
    context: &'static str,
    mut on_block: F,
) -> Result<Option<CapturedFrame>, PcapSourceError>
where
    R: PcapReaderIterator,
    F: FnMut(PcapBlockOwned<'_>) -> Option<CapturedFrame>,
{
    loop {
        match reader.next() {
            Ok((offset, block)) => {
                let frame = on_block(block);
                reader.consume(offset);
                if frame.is_some() {
                    return Ok(frame);
                }
            }
            Err(PcapError::Eof) => return Ok(None),
            Err(PcapError::Incomplete(_)) => {
                reader
                    .refill()
                    .map_err(|e| PcapSourceError::pcap(context, e))?;
            }
            Err(e) => return Err(PcapSourceError::pcap(context, e)),
        }
    }
}
