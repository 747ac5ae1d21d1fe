pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::{UdpDatagram, extract_udp};
