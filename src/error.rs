//! Error types shared by the decoder and encoder.

use core::fmt;

/// DER codec error.
///
/// Every malformed or non-canonical input byte sequence maps to one of
/// these kinds; none of them panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The cursor is at or past the end of the input while more bytes are required.
    EndOfStream,
    /// Length octets are not in shortest form, use the indefinite form,
    /// claim more octets than the index width, or overrun the input.
    InvalidLength,
    /// Malformed identifier octets (too many continuation octets, or a
    /// multi-octet tag number that fits the single-octet form).
    InvalidTag,
    /// The element's tag does not match the schema's expectation.
    UnexpectedElement,
    /// A value deviates from its single DER representation (redundant
    /// INTEGER sign byte, content left over at a SEQUENCE end, an encoded
    /// DEFAULT value).
    NonCanonical,
    /// INTEGER content exceeds the target integer width.
    Overflow,
    /// BOOLEAN content is not a single 0x00 or 0xFF byte.
    InvalidBool,
    /// BIT STRING pad count is 8 or more, or padded bits are non-zero.
    InvalidBitString,
    /// UTCTime/GeneralizedTime content has the wrong length, a missing
    /// 'Z' suffix, or an out-of-range component.
    InvalidDateTime,
    /// Restricted string content contains a byte outside its character set.
    InvalidString,
    /// OBJECT IDENTIFIER not present in the enum's OID table.
    UnknownOid,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfStream => write!(f, "Unexpected end of input"),
            Self::InvalidLength => write!(f, "Invalid DER length"),
            Self::InvalidTag => write!(f, "Invalid identifier octets"),
            Self::UnexpectedElement => write!(f, "Unexpected element tag"),
            Self::NonCanonical => write!(f, "Input is not canonical DER"),
            Self::Overflow => write!(f, "Integer exceeds target width"),
            Self::InvalidBool => write!(f, "Invalid BOOLEAN content"),
            Self::InvalidBitString => write!(f, "Invalid BIT STRING content"),
            Self::InvalidDateTime => write!(f, "Invalid date-time content"),
            Self::InvalidString => write!(f, "Invalid restricted string content"),
            Self::UnknownOid => write!(f, "Object identifier not in table"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
