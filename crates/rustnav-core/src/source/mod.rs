//! Capture collaborators feeding raw frames to the inspection pipeline.
//!
//! A capture session is opened explicitly, yields link-layer frames in
//! capture order and is closed explicitly. All file I/O lives here.

mod pcap;

pub use pcap::{CaptureStats, PcapFileSession};

use pcap_parser::Linktype;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct CapturedFrame {
    /// Capture timestamp in seconds since the Unix epoch.
    pub ts: Option<f64>,
    pub linktype: Linktype,
    pub data: Vec<u8>,
}

pub trait CaptureSession {
    fn next_frame(&mut self) -> Result<Option<CapturedFrame>, CaptureError>;
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture parse error: {0}")]
    Pcap(String),
}

impl From<pcap::error::PcapSourceError> for CaptureError {
    fn from(value: pcap::error::PcapSourceError) -> Self {
        match value {
            pcap::error::PcapSourceError::Io(err) => CaptureError::Io(err),
            pcap::error::PcapSourceError::Pcap { context, message } => {
                CaptureError::Pcap(format!("{context}: {message}"))
            }
        }
    }
}
