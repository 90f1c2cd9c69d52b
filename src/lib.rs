//! A `no_std` library for parsing and encoding ASN.1 DER (X.690)
//! structures.
//!
//! DER fixes exactly one byte representation per value, which makes it the
//! input format for everything that gets signed: X.509 certificates,
//! PKCS, CMS. This crate provides the codec core:
//!
//! - [`Decoder`]: a zero-copy, allocation-free cursor over one contiguous
//!   input buffer, hardened against hostile lengths and non-canonical
//!   encodings.
//! - [`Encoder`]: a single-pass writer that injects tag/length headers
//!   once a scope's content length is known.
//! - [`Decode`]/[`Encode`]: the per-type hooks, implemented here for the
//!   universal types and generated for client schemas by
//!   [`der_sequence!`], [`der_oid_enum!`] and [`der_enumerated!`].
//!
//! Concrete schemas (certificates, extensions) live in client crates;
//! [`Opaque`] defers any sub-structure a client wants to parse later.
//!
//! # Example
//!
//! ```
//! use der_codec::{der_sequence, from_der, to_der};
//!
//! #[derive(Debug, PartialEq)]
//! struct Point {
//!     x: u32,
//!     y: u32,
//! }
//!
//! der_sequence! {
//!     Point {
//!         x: u32,
//!         y: u32,
//!     }
//! }
//!
//! let bytes = to_der(&Point { x: 5, y: 6 });
//! assert_eq!(bytes, [0x30, 0x06, 0x02, 0x01, 0x05, 0x02, 0x01, 0x06]);
//! assert_eq!(from_der::<Point>(&bytes).unwrap(), Point { x: 5, y: 6 });
//! ```

#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod bit_string;
pub mod datetime;
#[cfg(feature = "parse")]
pub mod decoder;
pub mod element;
#[cfg(feature = "encode")]
pub mod encoder;
pub mod error;
pub mod oid;
pub mod schema;
pub mod tag;

#[cfg(test)]
mod lib_tests;

pub use crate::bit_string::BitString;
pub use crate::datetime::{DateTime, DateTimeFormat, GeneralizedTime, UtcTime};
#[cfg(feature = "parse")]
pub use crate::decoder::{Decode, Decoder, SequenceIter};
pub use crate::element::{Element, Opaque};
#[cfg(feature = "parse")]
pub use crate::element::decode_element;
#[cfg(feature = "encode")]
pub use crate::encoder::{Encode, Encoder};
pub use crate::error::Error;
pub use crate::oid::{Oid, OidParseError};
pub use crate::schema::{FieldTag, TagMode};
pub use crate::tag::{Tag, TagClass, UniversalTag};

/// Decode one top-level DER value spanning the whole input.
///
/// Trailing bytes after the value are rejected.
#[cfg(feature = "parse")]
pub fn from_der<'a, T: Decode<'a>>(bytes: &'a [u8]) -> Result<T, Error> {
    let mut decoder = Decoder::new(bytes);
    let value = T::decode(&mut decoder)?;
    decoder.eof()?;
    Ok(value)
}

/// Encode one value to its DER byte representation.
#[cfg(feature = "encode")]
pub fn to_der<T: Encode + ?Sized>(value: &T) -> alloc::vec::Vec<u8> {
    let mut encoder = Encoder::new();
    value.encode(&mut encoder);
    encoder.into_bytes()
}
