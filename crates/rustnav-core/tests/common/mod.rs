#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use etherparse::PacketBuilder;

pub const DISCRIMINANT_OFFSET: usize = 27;
pub const DISCRIMINANT_BIAS: u8 = 140;
pub const BODY_OFFSET: usize = 28;

pub const ORDINAL_WELCOME: u8 = 1;
pub const ORDINAL_RPC_MESSAGE: u8 = 9;
pub const ORDINAL_ENTITY_POSITION: u8 = 10;
pub const ORDINAL_CONSOLE_COMMAND: u8 = 12;
pub const ORDINAL_TICK: u8 = 15;

/// Game payload with the given ordinal and body after the header.
pub fn game_payload(ordinal: u8, body: &[u8]) -> Vec<u8> {
    let mut payload = vec![0u8; BODY_OFFSET];
    payload[DISCRIMINANT_OFFSET] = DISCRIMINANT_BIAS + ordinal;
    payload.extend_from_slice(body);
    payload
}

pub fn entity_position_body(entity_id: u32, position: [f32; 3], rotation: [f32; 3]) -> Vec<u8> {
    let mut body = entity_id.to_le_bytes().to_vec();
    for value in position.into_iter().chain(rotation) {
        body.extend_from_slice(&value.to_le_bytes());
    }
    body
}

pub fn console_body(declared: i32, text: &[u8]) -> Vec<u8> {
    let mut body = declared.to_le_bytes().to_vec();
    body.extend_from_slice(text);
    body
}

pub fn encode_varint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Tick body carrying only the buttons field.
pub fn tick_buttons_body(buttons: u64) -> Vec<u8> {
    let mut fields = vec![0x08];
    encode_varint(buttons, &mut fields);
    let mut body = vec![0x0A];
    encode_varint(fields.len() as u64, &mut body);
    body.extend_from_slice(&fields);
    body
}

pub fn udp_frame(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let builder = PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [10, 11, 12, 13, 14, 15])
        .ipv4([10, 0, 0, 1], [10, 0, 0, 2], 64)
        .udp(src_port, dst_port);
    let mut frame = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut frame, payload).unwrap();
    frame
}

/// Ethernet pcapng with one frame per entry, timestamps in microseconds.
pub fn pcapng_bytes(frames: &[(u64, Vec<u8>)]) -> Vec<u8> {
    let mut output = Vec::new();
    output.extend_from_slice(&pcapng_block(0x0A0D0D0A, &section_header_body()));
    output.extend_from_slice(&pcapng_block(1, &interface_desc_body()));
    for (ts_us, data) in frames {
        output.extend_from_slice(&pcapng_block(6, &enhanced_packet_body(*ts_us, data)));
    }
    output
}

/// Little-endian classic pcap with an Ethernet link type.
pub fn legacy_pcap_bytes(frames: &[(u32, u32, Vec<u8>)]) -> Vec<u8> {
    let mut output = Vec::new();
    output.extend_from_slice(&0xA1B2C3D4u32.to_le_bytes());
    output.extend_from_slice(&2u16.to_le_bytes());
    output.extend_from_slice(&4u16.to_le_bytes());
    output.extend_from_slice(&0i32.to_le_bytes());
    output.extend_from_slice(&0u32.to_le_bytes());
    output.extend_from_slice(&65535u32.to_le_bytes());
    output.extend_from_slice(&1u32.to_le_bytes());
    for (ts_sec, ts_usec, data) in frames {
        let len = data.len() as u32;
        output.extend_from_slice(&ts_sec.to_le_bytes());
        output.extend_from_slice(&ts_usec.to_le_bytes());
        output.extend_from_slice(&len.to_le_bytes());
        output.extend_from_slice(&len.to_le_bytes());
        output.extend_from_slice(data);
    }
    output
}

pub fn temp_capture(name: &str, bytes: &[u8]) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("rustnav_{unique}_{name}"));
    fs::write(&path, bytes).unwrap();
    path
}

fn pcapng_block(block_type: u32, body: &[u8]) -> Vec<u8> {
    let total_len = (8 + body.len() + 4) as u32;
    let mut block = Vec::with_capacity(total_len as usize);
    block.extend_from_slice(&block_type.to_be_bytes());
    block.extend_from_slice(&total_len.to_be_bytes());
    block.extend_from_slice(body);
    block.extend_from_slice(&total_len.to_be_bytes());
    block
}

fn section_header_body() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&0x1A2B3C4Du32.to_be_bytes());
    body.extend_from_slice(&1u16.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&(-1i64).to_be_bytes());
    body
}

fn interface_desc_body() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&1u16.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&65535u32.to_be_bytes());
    body
}

fn enhanced_packet_body(ts_us: u64, data: &[u8]) -> Vec<u8> {
    let cap_len = data.len() as u32;
    let mut body = Vec::new();
    body.extend_from_slice(&0u32.to_be_bytes());
    body.extend_from_slice(&((ts_us >> 32) as u32).to_be_bytes());
    body.extend_from_slice(&(ts_us as u32).to_be_bytes());
    body.extend_from_slice(&cap_len.to_be_bytes());
    body.extend_from_slice(&cap_len.to_be_bytes());
    body.extend_from_slice(data);
    body.resize(body.len() + (4 - data.len() % 4) % 4, 0);
    body
}
