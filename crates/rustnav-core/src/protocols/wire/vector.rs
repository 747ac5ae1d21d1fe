use serde::Serialize;

use super::cursor::ByteCursor;
use super::error::DecodeResult;
use super::tagged::Fields;

pub const FIELD_X: u32 = 1;
pub const FIELD_Y: u32 = 2;
pub const FIELD_Z: u32 = 3;

/// Byte size of a vector stored as three raw little-endian floats.
pub const RAW_VECTOR3_LEN: usize = 12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Reads three consecutive floats (fixed layout, no tags).
pub fn read_raw_vector3(cursor: &mut ByteCursor<'_>) -> DecodeResult<Vector3> {
    cursor.require(RAW_VECTOR3_LEN)?;
    Ok(Vector3 {
        x: cursor.read_f32_le()?,
        y: cursor.read_f32_le()?,
        z: cursor.read_f32_le()?,
    })
}

/// Decodes the fields of an already bounded Vector3 body.
///
/// Components that are absent stay at zero; fields other than x/y/z are
/// skipped.
pub fn vector3_from_body(body: ByteCursor<'_>) -> DecodeResult<Vector3> {
    let mut vector = Vector3::ZERO;
    for field in Fields::new(body) {
        let field = field?;
        match field.tag.field {
            FIELD_X => vector.x = field.fixed32()?,
            FIELD_Y => vector.y = field.fixed32()?,
            FIELD_Z => vector.z = field.fixed32()?,
            _ => {}
        }
    }
    Ok(vector)
}
