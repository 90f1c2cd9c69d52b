//! Type-directed DER decoding over a borrowed byte buffer.
//!
//! A [`Decoder`] owns nothing but a cursor: every slice it hands out
//! borrows from the input, decoding allocates nothing, and recursion depth
//! is bounded by the schema rather than the input.
//!
//! # Structure
//!
//! - [`Decoder::element`] is the single tag/length consumption point; the
//!   pending field-tag override (implicit or explicit) is applied there.
//! - Primitive elements are consumed whole; constructed elements advance
//!   the cursor to their content so the caller can descend.
//! - [`Decode`] is the per-type hook: the implementations here cover the
//!   universal types, `der_sequence!` generates them for SEQUENCEs.

use core::marker::PhantomData;

use crate::bit_string::BitString;
use crate::datetime::DateTime;
use crate::element::{Element, Opaque, decode_element};
use crate::error::Error;
use crate::oid::Oid;
use crate::schema::{FieldTag, TagMode};
use crate::tag::Tag;

/// Streaming decoder over one contiguous DER input.
#[derive(Debug)]
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
    field_tag: Option<FieldTag>,
}

/// A type that can be decoded from one DER element.
///
/// An implementation takes full responsibility for advancing the cursor
/// over exactly one element.
pub trait Decode<'a>: Sized {
    fn decode(decoder: &mut Decoder<'a>) -> Result<Self, Error>;
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0, field_tag: None }
    }

    /// Current cursor offset into the input.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the cursor to an absolute offset.
    pub fn seek(&mut self, index: usize) {
        self.pos = index;
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Require that the whole input has been consumed.
    pub fn eof(&self) -> Result<(), Error> {
        if self.is_at_end() { Ok(()) } else { Err(Error::NonCanonical) }
    }

    /// Parse the element header at the cursor without consuming it.
    pub fn peek_element(&self) -> Result<Element, Error> {
        decode_element(self.buf, self.pos)
    }

    /// Content octets of an element previously returned by this decoder.
    pub fn view(&self, element: &Element) -> &'a [u8] {
        &self.buf[element.start..element.end]
    }

    /// Read the next element, requiring `expected` (after applying any
    /// pending field-tag override).
    ///
    /// Primitive elements are consumed whole; for constructed elements the
    /// cursor stops at the content start so the caller can descend.
    pub fn element(&mut self, expected: Tag) -> Result<Element, Error> {
        match self.field_tag.take() {
            None => self.element_exact(expected),
            Some(field) => match field.mode {
                TagMode::Implicit => self.element_exact(Tag {
                    class: field.class,
                    constructed: expected.constructed,
                    number: field.number,
                }),
                TagMode::Explicit => {
                    let wrapper = self.element_exact(Tag {
                        class: field.class,
                        constructed: true,
                        number: field.number,
                    })?;
                    let inner = self.element_exact(expected)?;
                    if inner.end != wrapper.end {
                        // The wrapper holds exactly one element.
                        return Err(Error::NonCanonical);
                    }
                    Ok(inner)
                }
            },
        }
    }

    fn element_exact(&mut self, expected: Tag) -> Result<Element, Error> {
        let element = decode_element(self.buf, self.pos)?;
        if element.tag != expected {
            return Err(Error::UnexpectedElement);
        }
        self.advance(&element);
        Ok(element)
    }

    fn advance(&mut self, element: &Element) {
        self.pos = if element.tag.constructed { element.start } else { element.end };
    }

    /// Content of the next element, which must be primitive with the given
    /// tag.
    fn primitive(&mut self, tag: Tag) -> Result<&'a [u8], Error> {
        let element = self.element(tag)?;
        Ok(self.view(&element))
    }

    /// Read the next element whatever its tag, consuming it whole.
    fn raw_element(&mut self) -> Result<Element, Error> {
        let element = match self.field_tag.take() {
            None => decode_element(self.buf, self.pos)?,
            Some(field) => match field.mode {
                TagMode::Implicit => {
                    let element = decode_element(self.buf, self.pos)?;
                    if element.tag.class != field.class || element.tag.number != field.number {
                        return Err(Error::UnexpectedElement);
                    }
                    element
                }
                TagMode::Explicit => {
                    let wrapper = self.element_exact(Tag {
                        class: field.class,
                        constructed: true,
                        number: field.number,
                    })?;
                    let inner = decode_element(self.buf, self.pos)?;
                    if inner.end != wrapper.end {
                        return Err(Error::NonCanonical);
                    }
                    inner
                }
            },
        };
        self.pos = element.end;
        Ok(element)
    }

    /// Decode a value of `T` at the cursor.
    pub fn any<T: Decode<'a>>(&mut self) -> Result<T, Error> {
        T::decode(self)
    }

    /// Read a SEQUENCE header and descend into its content. Pair with
    /// [`Decoder::end_sequence`].
    pub fn sequence(&mut self) -> Result<Element, Error> {
        self.element(Tag::SEQUENCE)
    }

    /// After the last field, the cursor must sit exactly on the content
    /// end of the SEQUENCE.
    pub fn end_sequence(&mut self, element: &Element) -> Result<(), Error> {
        if self.pos != element.end {
            return Err(Error::NonCanonical);
        }
        Ok(())
    }

    /// Decode a field with a pending tag override. The override applies to
    /// the next element consumed inside `f` and is cleared afterwards even
    /// if `f` never consumed it (an absent optional field).
    pub fn field<T>(
        &mut self,
        tag: FieldTag,
        f: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error> {
        if self.field_tag.is_none() {
            self.field_tag = Some(tag);
        }
        let result = f(self);
        self.field_tag = None;
        result
    }

    /// Attempt `f`; an element of the wrong tag (or no element at all)
    /// yields `None` with the cursor rolled back. Malformed elements keep
    /// propagating.
    pub fn optional<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<Option<T>, Error> {
        let mark = self.pos;
        match f(self) {
            Ok(value) => Ok(Some(value)),
            Err(Error::UnexpectedElement | Error::EndOfStream) => {
                self.pos = mark;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Decode a field with a DEFAULT value: schematic absence yields the
    /// default, and an explicitly encoded default value is rejected as
    /// required by DER.
    pub fn field_with_default<T: PartialEq>(
        &mut self,
        default: T,
        f: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error> {
        match self.optional(f)? {
            Some(value) => {
                if value == default {
                    return Err(Error::NonCanonical);
                }
                Ok(value)
            }
            None => Ok(default),
        }
    }

    /// Lazily decode the children of a SEQUENCE OF.
    pub fn sequence_of<T: Decode<'a>>(&mut self) -> Result<SequenceIter<'a, T>, Error> {
        let element = self.element(Tag::SEQUENCE)?;
        self.pos = element.end;
        // Clamp the child decoder to the parent's extent.
        let decoder =
            Decoder { buf: &self.buf[..element.end], pos: element.start, field_tag: None };
        Ok(SequenceIter { decoder, marker: PhantomData })
    }

    /// BOOLEAN: one content octet, 0x00 or 0xFF.
    pub fn bool_value(&mut self) -> Result<bool, Error> {
        match self.primitive(Tag::BOOLEAN)? {
            [0x00] => Ok(false),
            [0xff] => Ok(true),
            _ => Err(Error::InvalidBool),
        }
    }

    /// NULL: empty content.
    pub fn null(&mut self) -> Result<(), Error> {
        let content = self.primitive(Tag::NULL)?;
        if !content.is_empty() {
            return Err(Error::NonCanonical);
        }
        Ok(())
    }

    /// OCTET STRING content, borrowed from the input.
    pub fn octet_string(&mut self) -> Result<&'a [u8], Error> {
        self.primitive(Tag::OCTET_STRING)
    }

    /// BIT STRING: pad count octet, then data with clean padding.
    pub fn bit_string(&mut self) -> Result<BitString<'a>, Error> {
        let content = self.primitive(Tag::BIT_STRING)?;
        let [unused, data @ ..] = content else {
            return Err(Error::InvalidBitString);
        };
        BitString::new(data, *unused)
    }

    /// OBJECT IDENTIFIER, validated packed content.
    pub fn oid(&mut self) -> Result<Oid<'a>, Error> {
        let content = self.primitive(Tag::OBJECT_IDENTIFIER)?;
        Oid::from_bytes(content)
    }

    /// Canonical two's-complement content of an INTEGER.
    fn int_content(&mut self) -> Result<&'a [u8], Error> {
        let content = self.primitive(Tag::INTEGER)?;
        check_int_canonical(content)?;
        Ok(content)
    }

    /// The content of the next element, which must carry `tag` exactly.
    /// Field-tag overrides do not apply.
    pub fn opaque(&mut self, tag: Tag) -> Result<&'a [u8], Error> {
        let element = decode_element(self.buf, self.pos)?;
        if element.tag != tag {
            return Err(Error::UnexpectedElement);
        }
        self.pos = element.end;
        Ok(self.view(&element))
    }

    /// UTCTime content as a [`DateTime`], RFC 5280 year pivot applied.
    pub fn utc_time(&mut self) -> Result<DateTime, Error> {
        let content = self.primitive(Tag::UTC_TIME)?;
        DateTime::parse_utc_content(content)
    }

    /// GeneralizedTime content as a [`DateTime`].
    pub fn generalized_time(&mut self) -> Result<DateTime, Error> {
        let content = self.primitive(Tag::GENERALIZED_TIME)?;
        DateTime::parse_generalized_content(content)
    }

    /// PrintableString, charset-checked.
    pub fn printable_string(&mut self) -> Result<&'a str, Error> {
        let content = self.primitive(Tag::PRINTABLE_STRING)?;
        if !content.iter().all(|b| is_printable_char(*b)) {
            return Err(Error::InvalidString);
        }
        core::str::from_utf8(content).map_err(|_| Error::InvalidString)
    }

    /// IA5String (ASCII).
    pub fn ia5_string(&mut self) -> Result<&'a str, Error> {
        let content = self.primitive(Tag::IA5_STRING)?;
        if !content.is_ascii() {
            return Err(Error::InvalidString);
        }
        core::str::from_utf8(content).map_err(|_| Error::InvalidString)
    }

    /// UTF8String.
    pub fn utf8_string(&mut self) -> Result<&'a str, Error> {
        let content = self.primitive(Tag::UTF8_STRING)?;
        core::str::from_utf8(content).map_err(|_| Error::InvalidString)
    }
}

/// DER INTEGER content carries no redundant sign octet.
pub(crate) fn check_int_canonical(content: &[u8]) -> Result<(), Error> {
    match content {
        [] => Err(Error::NonCanonical),
        [0x00, second, ..] if second & 0x80 == 0 => Err(Error::NonCanonical),
        [0xff, second, ..] if second & 0x80 != 0 => Err(Error::NonCanonical),
        _ => Ok(()),
    }
}

/// X.690 PrintableString character set.
fn is_printable_char(b: u8) -> bool {
    matches!(b,
        b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9'
        | b' ' | b'\'' | b'(' | b')' | b'+' | b',' | b'-' | b'.' | b'/' | b':' | b'=' | b'?')
}

/// Allocation-free iterator over the children of a SEQUENCE OF.
#[derive(Debug)]
pub struct SequenceIter<'a, T> {
    decoder: Decoder<'a>,
    marker: PhantomData<T>,
}

impl<'a, T: Decode<'a>> Iterator for SequenceIter<'a, T> {
    type Item = Result<T, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.decoder.is_at_end() {
            return None;
        }
        match T::decode(&mut self.decoder) {
            Ok(value) => Some(Ok(value)),
            Err(e) => {
                // Fuse after the first failure.
                self.decoder.pos = self.decoder.buf.len();
                Some(Err(e))
            }
        }
    }
}

impl<'a> Decode<'a> for bool {
    fn decode(decoder: &mut Decoder<'a>) -> Result<Self, Error> {
        decoder.bool_value()
    }
}

impl<'a> Decode<'a> for () {
    fn decode(decoder: &mut Decoder<'a>) -> Result<Self, Error> {
        decoder.null()
    }
}

impl<'a> Decode<'a> for &'a [u8] {
    fn decode(decoder: &mut Decoder<'a>) -> Result<Self, Error> {
        decoder.octet_string()
    }
}

impl<'a> Decode<'a> for BitString<'a> {
    fn decode(decoder: &mut Decoder<'a>) -> Result<Self, Error> {
        decoder.bit_string()
    }
}

impl<'a> Decode<'a> for Oid<'a> {
    fn decode(decoder: &mut Decoder<'a>) -> Result<Self, Error> {
        decoder.oid()
    }
}

impl<'a> Decode<'a> for Opaque<'a> {
    fn decode(decoder: &mut Decoder<'a>) -> Result<Self, Error> {
        let element = decoder.raw_element()?;
        Ok(Opaque { tag: element.tag, content: decoder.view(&element) })
    }
}

impl<'a, T: Decode<'a>> Decode<'a> for Option<T> {
    fn decode(decoder: &mut Decoder<'a>) -> Result<Self, Error> {
        decoder.optional(T::decode)
    }
}

macro_rules! impl_decode_unsigned {
    ($($ty:ty),+) => {$(
        impl<'a> Decode<'a> for $ty {
            fn decode(decoder: &mut Decoder<'a>) -> Result<Self, Error> {
                let content = decoder.int_content()?;
                let magnitude = match content {
                    // A sign pad octet precedes a value with the top bit set.
                    [0x00, rest @ ..] => rest,
                    [first, ..] if first & 0x80 != 0 => return Err(Error::Overflow),
                    _ => content,
                };
                if magnitude.len() > size_of::<$ty>() {
                    return Err(Error::Overflow);
                }
                let mut bytes = [0u8; size_of::<$ty>()];
                bytes[size_of::<$ty>() - magnitude.len()..].copy_from_slice(magnitude);
                Ok(<$ty>::from_be_bytes(bytes))
            }
        }
    )+};
}

impl_decode_unsigned!(u8, u16, u32, u64, u128);

macro_rules! impl_decode_signed {
    ($($ty:ty),+) => {$(
        impl<'a> Decode<'a> for $ty {
            fn decode(decoder: &mut Decoder<'a>) -> Result<Self, Error> {
                let content = decoder.int_content()?;
                if content.len() > size_of::<$ty>() {
                    return Err(Error::Overflow);
                }
                let fill = if content[0] & 0x80 != 0 { 0xff } else { 0x00 };
                let mut bytes = [fill; size_of::<$ty>()];
                bytes[size_of::<$ty>() - content.len()..].copy_from_slice(content);
                Ok(<$ty>::from_be_bytes(bytes))
            }
        }
    )+};
}

impl_decode_signed!(i8, i16, i32, i64, i128);
