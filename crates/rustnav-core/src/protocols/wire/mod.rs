//! Shared wire primitives for game packet bodies.
//!
//! All reads go through [`cursor::ByteCursor`], which never indexes past its
//! bound. On top of it sit the LEB128 varint decoder (`varint`), the tagged
//! field stream (`tagged`) and the Vector3 helpers (`vector`) used by both
//! fixed-layout and tagged packet bodies.
//!
//! Errors carry a [`error::ErrorKind`] and the absolute byte offset where
//! decoding stopped; there are no sentinel values.

pub mod cursor;
pub mod error;
pub mod tagged;
pub mod varint;
pub mod vector;

pub use cursor::ByteCursor;
pub use error::{DecodeError, DecodeResult, ErrorKind};
pub use vector::Vector3;
