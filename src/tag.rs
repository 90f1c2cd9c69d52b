//! ASN.1 identifier octets: tag class, primitive/constructed bit, tag number.
//!
//! Reference: ITU-T X.690, Section 8.1.2

use core::fmt;

use derive_try_from_primitive::TryFromPrimitive;

#[cfg(feature = "encode")]
use alloc::vec::Vec;

#[cfg(feature = "parse")]
use nom::{
    IResult,
    error::{Error, ErrorKind},
    number::streaming::u8 as nom_u8,
};

/// Tag class, carried in the top two bits of the leading identifier
/// octet. The discriminants are the X.690 class numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TagClass {
    /// Types assigned by X.690 itself (class number 0).
    Universal,
    /// Application-wide types (class number 1).
    Application,
    /// Tags whose meaning depends on the enclosing structure (class number 2).
    ContextSpecific,
    /// Site-defined types (class number 3).
    Private,
}

impl TagClass {
    /// The class number shifted into its identifier-octet position.
    pub const fn to_bits(self) -> u8 {
        (self as u8) << 6
    }

    /// Recover the class from a leading identifier octet.
    pub const fn from_bits(byte: u8) -> Self {
        match byte >> 6 {
            0 => TagClass::Universal,
            1 => TagClass::Application,
            2 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        }
    }
}

/// Universal tag numbers assigned by X.690.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
#[non_exhaustive]
#[rustfmt::skip]
pub enum UniversalTag {
  Boolean          =  1,
  Integer          =  2,
  BitString        =  3,
  OctetString      =  4,
  Null             =  5,
  ObjectIdentifier =  6,
  ObjectDescriptor =  7,
  External         =  8,
  Real             =  9,
  Enumerated       = 10,
  EmbeddedPdv      = 11,
  Utf8String       = 12,
  RelativeOid      = 13,
  Sequence         = 16,
  Set              = 17,
  NumericString    = 18,
  PrintableString  = 19,
  TeletexString    = 20,
  VideotexString   = 21,
  Ia5String        = 22,
  UtcTime          = 23,
  GeneralizedTime  = 24,
  GraphicString    = 25,
  VisibleString    = 26,
  GeneralString    = 27,
  UniversalString  = 28,
  CharacterString  = 29,
  BmpString        = 30,
}

/// A complete ASN.1 tag: class, primitive/constructed bit, and tag number.
///
/// Tag numbers 0..=30 use the single-octet identifier form; larger numbers
/// use the high-tag-number form (low 5 bits all ones, then base-128
/// big-endian continuation octets). Numbers above 16383 (two continuation
/// octets) are not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub class: TagClass,
    pub constructed: bool,
    pub number: u32,
}

impl Tag {
    pub const BOOLEAN: Tag = Tag::universal(1);
    pub const INTEGER: Tag = Tag::universal(2);
    pub const BIT_STRING: Tag = Tag::universal(3);
    pub const OCTET_STRING: Tag = Tag::universal(4);
    pub const NULL: Tag = Tag::universal(5);
    pub const OBJECT_IDENTIFIER: Tag = Tag::universal(6);
    pub const UTF8_STRING: Tag = Tag::universal(12);
    pub const SEQUENCE: Tag = Tag::universal(16).constructed();
    pub const SET: Tag = Tag::universal(17).constructed();
    pub const PRINTABLE_STRING: Tag = Tag::universal(19);
    pub const IA5_STRING: Tag = Tag::universal(22);
    pub const UTC_TIME: Tag = Tag::universal(23);
    pub const GENERALIZED_TIME: Tag = Tag::universal(24);

    /// A primitive universal tag.
    pub const fn universal(number: u32) -> Self {
        Self { class: TagClass::Universal, constructed: false, number }
    }

    /// A primitive application tag.
    pub const fn application(number: u32) -> Self {
        Self { class: TagClass::Application, constructed: false, number }
    }

    /// A primitive context-specific tag.
    pub const fn context(number: u32) -> Self {
        Self { class: TagClass::ContextSpecific, constructed: false, number }
    }

    /// A primitive private tag.
    pub const fn private(number: u32) -> Self {
        Self { class: TagClass::Private, constructed: false, number }
    }

    /// The same tag with the constructed bit set.
    pub const fn constructed(self) -> Self {
        Self { class: self.class, constructed: true, number: self.number }
    }

    /// Parse the identifier octets at the head of `input`.
    ///
    /// The high-tag-number form is limited to two continuation octets;
    /// leading-zero continuation octets and multi-octet encodings of
    /// numbers that fit the single-octet form are rejected.
    #[cfg(feature = "parse")]
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, first) = nom_u8(input)?;
        let class = TagClass::from_bits(first);
        let constructed = first & 0b0010_0000 != 0;
        let low = first & 0b0001_1111;

        if low != 31 {
            return Ok((input, Self { class, constructed, number: low as u32 }));
        }

        // High-tag-number form: 7 bits per octet, high bit set on all but
        // the last.
        let mut number: u32 = 0;
        let mut rest = input;
        for i in 0..2 {
            let (r, octet) = nom_u8(rest)?;
            rest = r;
            if i == 0 && octet & 0x7f == 0 {
                // Leading zero octet, not the minimal encoding.
                return Err(nom::Err::Error(Error::new(rest, ErrorKind::Tag)));
            }
            number = (number << 7) | (octet & 0x7f) as u32;
            if octet & 0x80 == 0 {
                if number <= 30 {
                    // Should have used the single-octet form.
                    return Err(nom::Err::Error(Error::new(rest, ErrorKind::Tag)));
                }
                return Ok((rest, Self { class, constructed, number }));
            }
        }

        Err(nom::Err::Error(Error::new(rest, ErrorKind::Tag)))
    }

    /// Append the identifier octets for this tag.
    #[cfg(feature = "encode")]
    pub fn encode_into(&self, buffer: &mut Vec<u8>) {
        debug_assert!(self.number <= 0x3fff, "tag number too large");

        let leading = self.class.to_bits() | if self.constructed { 0b0010_0000 } else { 0 };

        if self.number <= 30 {
            buffer.push(leading | self.number as u8);
            return;
        }

        buffer.push(leading | 0b0001_1111);
        if self.number >= 1 << 7 {
            buffer.push(0x80 | (self.number >> 7) as u8);
        }
        buffer.push((self.number & 0x7f) as u8);
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class {
            TagClass::Universal => match UniversalTag::try_from(self.number) {
                Ok(known) => write!(f, "{known:?}"),
                Err(_) => write!(f, "UNIVERSAL {}", self.number),
            },
            TagClass::Application => write!(f, "APPLICATION {}", self.number),
            TagClass::ContextSpecific => write!(f, "[{}]", self.number),
            TagClass::Private => write!(f, "PRIVATE {}", self.number),
        }
    }
}
