use super::error::UdpError;
use super::layout;

pub struct UdpReader<'a> {
    segment: &'a [u8],
}

impl<'a> UdpReader<'a> {
    pub fn new(segment: &'a [u8]) -> Self {
        Self { segment }
    }

    /// Application payload following the fixed UDP header.
    pub fn payload_without_header(&self) -> Result<&'a [u8], UdpError> {
        self.segment
            .get(layout::UDP_HEADER_LEN..)
            .ok_or(UdpError::TooShort {
                needed: layout::UDP_HEADER_LEN,
                actual: self.segment.len(),
            })
    }
}
