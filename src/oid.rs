//! OBJECT IDENTIFIER values: packed X.690 form and dotted-decimal text.
//!
//! The packed form folds the first two arcs into one value (`40 * a + b`)
//! and encodes each value as big-endian base-128 chunks with the high bit
//! set on every octet but the last.
//!
//! Reference: ITU-T X.690, Section 8.19

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Debug, Display, Write};
use core::str::FromStr;

use crate::error::Error;

#[cfg(feature = "serde")]
use serde::{Serialize, Serializer};

/// Maximum octets per arc. Nine 7-bit groups hold 63 bits, so every arc
/// fits a `u64` without overflow checks in the hot path.
const MAX_ARC_OCTETS: usize = 9;

/// An object identifier in packed form.
///
/// Decoded values borrow their content from the input buffer; values built
/// from text own their bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Oid<'a> {
    bytes: Cow<'a, [u8]>,
}

impl<'a> Oid<'a> {
    /// Validate packed content: non-empty, every arc minimally encoded
    /// (no 0x80 leading octet), complete (final octet has the high bit
    /// clear), and small enough for a `u64`.
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self, Error> {
        if bytes.is_empty() {
            return Err(Error::NonCanonical);
        }

        let mut arc_octets = 0;
        for &octet in bytes {
            if arc_octets == 0 && octet == 0x80 {
                // Leading zero group, not the minimal encoding.
                return Err(Error::NonCanonical);
            }
            arc_octets += 1;
            if arc_octets > MAX_ARC_OCTETS {
                return Err(Error::Overflow);
            }
            if octet & 0x80 == 0 {
                arc_octets = 0;
            }
        }
        if arc_octets != 0 {
            // Truncated in the middle of an arc.
            return Err(Error::NonCanonical);
        }

        Ok(Self { bytes: Cow::Borrowed(bytes) })
    }

    /// Parse a dotted-decimal identifier such as `"1.2.840.113549.1.1.11"`.
    pub fn from_dot(s: &str) -> Result<Oid<'static>, OidParseError> {
        fn arc(part: Option<&str>) -> Result<u64, OidParseError> {
            part.ok_or(OidParseError::TooShort)?.parse().map_err(|_| OidParseError::InvalidArc)
        }

        let mut parts = s.split('.');
        let first = arc(parts.next())?;
        let second = arc(parts.next())?;

        if first > 2 || (first < 2 && second >= 40) {
            return Err(OidParseError::ArcOutOfRange);
        }
        let head = first
            .checked_mul(40)
            .and_then(|v| v.checked_add(second))
            .ok_or(OidParseError::ArcOutOfRange)?;

        let mut bytes = Vec::new();
        push_arc(head, &mut bytes);
        for part in parts {
            push_arc(arc(Some(part))?, &mut bytes);
        }

        Ok(Oid { bytes: Cow::Owned(bytes) })
    }

    /// The packed content octets.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Iterate the numeric arcs.
    pub fn arcs(&self) -> Arcs<'_> {
        Arcs { bytes: &self.bytes, pos: 0, second: None }
    }

    /// Dotted-decimal text form.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        for (i, arc) in self.arcs().enumerate() {
            if i > 0 {
                out.push('.');
            }
            let _ = write!(out, "{arc}");
        }
        out
    }

    /// Detach from the borrowed buffer.
    pub fn into_owned(self) -> Oid<'static> {
        Oid { bytes: Cow::Owned(self.bytes.into_owned()) }
    }
}

/// Append one arc value as base-128 chunks.
fn push_arc(value: u64, buffer: &mut Vec<u8>) {
    let mut groups = 1;
    let mut v = value >> 7;
    while v > 0 {
        groups += 1;
        v >>= 7;
    }
    for g in (0..groups).rev() {
        let octet = ((value >> (7 * g)) & 0x7f) as u8;
        buffer.push(if g == 0 { octet } else { octet | 0x80 });
    }
}

/// Encode an identifier given as numeric arcs into its packed form at
/// compile time.
///
/// `N` must equal the packed length; a mismatch fails const evaluation.
///
/// # Example
/// ```
/// use der_codec::oid::encode_oid;
///
/// const RSA_ENCRYPTION: [u8; 9] = encode_oid(&[1, 2, 840, 113549, 1, 1, 1]);
/// assert_eq!(RSA_ENCRYPTION, [0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01]);
/// ```
pub const fn encode_oid<const N: usize>(arcs: &[u64]) -> [u8; N] {
    assert!(arcs.len() >= 2, "an object identifier has at least two arcs");
    assert!(arcs[0] <= 2, "first arc is 0, 1 or 2");
    assert!(arcs[0] == 2 || arcs[1] < 40, "second arc exceeds 39");

    let mut out = [0u8; N];
    let mut pos = 0;
    let mut i = 1;
    while i < arcs.len() {
        let value = if i == 1 { arcs[0] * 40 + arcs[1] } else { arcs[i] };

        let mut groups = 1;
        let mut v = value >> 7;
        while v > 0 {
            groups += 1;
            v >>= 7;
        }
        while groups > 0 {
            groups -= 1;
            let octet = ((value >> (7 * groups)) & 0x7f) as u8;
            out[pos] = if groups == 0 { octet } else { octet | 0x80 };
            pos += 1;
        }

        i += 1;
    }
    assert!(pos == N, "packed length does not match N");
    out
}

/// Iterator over the numeric arcs of an [`Oid`].
#[derive(Debug, Clone)]
pub struct Arcs<'a> {
    bytes: &'a [u8],
    pos: usize,
    second: Option<u64>,
}

impl Iterator for Arcs<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if let Some(second) = self.second.take() {
            return Some(second);
        }
        if self.pos >= self.bytes.len() {
            return None;
        }

        let first = self.pos == 0;
        let mut value: u64 = 0;
        while self.pos < self.bytes.len() {
            let octet = self.bytes[self.pos];
            self.pos += 1;
            value = (value << 7) | (octet & 0x7f) as u64;
            if octet & 0x80 == 0 {
                break;
            }
        }

        if first {
            let (a, b) = match value {
                0..=39 => (0, value),
                40..=79 => (1, value - 40),
                _ => (2, value - 80),
            };
            self.second = Some(b);
            Some(a)
        } else {
            Some(value)
        }
    }
}

impl Display for Oid<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arc) in self.arcs().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{arc}")?;
        }
        Ok(())
    }
}

impl Debug for Oid<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid(\"{self}\")")
    }
}

impl FromStr for Oid<'static> {
    type Err = OidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Oid::from_dot(s)
    }
}

#[cfg(feature = "serde")]
impl Serialize for Oid<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_dot())
    }
}

/// Failure to parse a dotted-decimal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidParseError {
    /// Fewer than two arcs.
    TooShort,
    /// An arc is empty or not a decimal number.
    InvalidArc,
    /// First arc above 2, second arc above 39 under a root of 0 or 1,
    /// or a folded head value that overflows.
    ArcOutOfRange,
}

impl Display for OidParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort => write!(f, "Object identifier needs at least two arcs"),
            Self::InvalidArc => write!(f, "Invalid object identifier arc"),
            Self::ArcOutOfRange => write!(f, "Object identifier arc out of range"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for OidParseError {}
