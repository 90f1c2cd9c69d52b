//! Type-directed DER encoding into one growing buffer.
//!
//! Lengths are not known before content is produced, so the encoder works
//! in a single pass with header injection: [`Encoder::begin_scope`]
//! records the current offset on a stack, the scope's content is written
//! in natural order, and [`Encoder::close_scope`] splices the tag and the
//! shortest-form length of the produced span in at the recorded offset.
//! There is no counting pre-pass and no nested temporary buffer.
//!
//! Values that typecheck always encode; the only panics are API misuse
//! (closing a scope that was never opened).

use alloc::vec::Vec;

use crate::bit_string::BitString;
use crate::datetime::{DateTime, DateTimeFormat};
use crate::element::{Opaque, encode_length};
use crate::oid::Oid;
use crate::schema::{FieldTag, TagMode};
use crate::tag::Tag;

/// DER encoder owning a growable output buffer.
#[derive(Debug, Default)]
pub struct Encoder {
    out: Vec<u8>,
    scopes: Vec<Scope>,
    field_tag: Option<FieldTag>,
}

#[derive(Debug, Clone, Copy)]
struct Scope {
    start: usize,
    field_tag: Option<FieldTag>,
}

/// A type that can be encoded as one DER element.
///
/// An implementation emits exactly the bytes of that element.
pub trait Encode {
    fn encode(&self, encoder: &mut Encoder);
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the produced bytes. All scopes must be closed.
    pub fn into_bytes(self) -> Vec<u8> {
        debug_assert!(self.scopes.is_empty(), "unclosed encoder scope");
        self.out
    }

    /// Emit identifier octets, applying any pending field-tag override.
    pub fn tag(&mut self, tag: Tag) {
        let tag = self.apply_override(tag);
        tag.encode_into(&mut self.out);
    }

    /// Emit shortest-form length octets.
    pub fn length(&mut self, length: usize) {
        encode_length(length, &mut self.out);
    }

    /// Emit raw content octets.
    pub fn bytes(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    fn apply_override(&mut self, tag: Tag) -> Tag {
        match self.field_tag.take() {
            Some(field) => {
                Tag { class: field.class, constructed: tag.constructed, number: field.number }
            }
            None => tag,
        }
    }

    /// Open a constructed scope at the current offset. Any pending
    /// field-tag override is captured for the matching
    /// [`Encoder::close_scope`].
    pub fn begin_scope(&mut self) {
        self.scopes.push(Scope { start: self.out.len(), field_tag: self.field_tag.take() });
    }

    /// Close the innermost scope: inject `tag` and the length of the span
    /// produced since [`Encoder::begin_scope`] at the scope start.
    ///
    /// # Panics
    ///
    /// Panics if no scope is open.
    pub fn close_scope(&mut self, tag: Tag) {
        let scope = self.scopes.pop().expect("close_scope without begin_scope");
        let tag = match scope.field_tag {
            Some(field) => {
                Tag { class: field.class, constructed: tag.constructed, number: field.number }
            }
            None => tag,
        };

        let span = self.out.len() - scope.start;
        let mut header = Vec::with_capacity(12);
        tag.encode_into(&mut header);
        encode_length(span, &mut header);
        self.out.splice(scope.start..scope.start, header);
    }

    /// Encode a value of `T` at the current offset.
    pub fn any<T: Encode + ?Sized>(&mut self, value: &T) {
        value.encode(self);
    }

    /// Emit a SEQUENCE whose content is produced by `f`.
    pub fn sequence<F: FnOnce(&mut Self)>(&mut self, f: F) {
        self.begin_scope();
        f(self);
        self.close_scope(Tag::SEQUENCE);
    }

    /// Encode a field under a tag override. An implicit override rewrites
    /// the tag of the next element `f` emits; an explicit override wraps
    /// everything `f` emits in an outer constructed element. If `f` emits
    /// nothing (an absent optional field), nothing is emitted at all.
    pub fn field<F: FnOnce(&mut Self)>(&mut self, tag: FieldTag, f: F) {
        match tag.mode {
            TagMode::Implicit => {
                if self.field_tag.is_none() {
                    self.field_tag = Some(tag);
                }
                f(self);
                self.field_tag = None;
            }
            TagMode::Explicit => {
                self.begin_scope();
                let mark = self.out.len();
                f(self);
                if self.out.len() == mark {
                    self.scopes.pop();
                    return;
                }
                self.close_scope(Tag {
                    class: tag.class,
                    constructed: true,
                    number: tag.number,
                });
            }
        }
    }

    /// BOOLEAN: 0xFF for true, 0x00 for false.
    pub fn bool_value(&mut self, value: bool) {
        self.tag(Tag::BOOLEAN);
        self.length(1);
        self.out.push(if value { 0xff } else { 0x00 });
    }

    /// NULL with empty content.
    pub fn null(&mut self) {
        self.tag(Tag::NULL);
        self.length(0);
    }

    /// OCTET STRING.
    pub fn octet_string(&mut self, octets: &[u8]) {
        self.tag(Tag::OCTET_STRING);
        self.length(octets.len());
        self.bytes(octets);
    }

    /// BIT STRING: pad count octet, then data.
    pub fn bit_string(&mut self, bits: &BitString<'_>) {
        self.tag(Tag::BIT_STRING);
        self.length(bits.bytes().len() + 1);
        self.out.push(bits.unused_bits());
        self.bytes(bits.bytes());
    }

    /// OBJECT IDENTIFIER from validated packed content.
    pub fn oid(&mut self, oid: &Oid<'_>) {
        self.oid_bytes(oid.as_bytes());
    }

    /// OBJECT IDENTIFIER from pre-encoded content octets, as kept in
    /// static OID tables.
    pub fn oid_bytes(&mut self, content: &[u8]) {
        self.tag(Tag::OBJECT_IDENTIFIER);
        self.length(content.len());
        self.bytes(content);
    }

    /// A deferred element: its wire tag, length, and content.
    pub fn opaque(&mut self, opaque: &Opaque<'_>) {
        self.tag(opaque.tag);
        self.length(opaque.content.len());
        self.bytes(opaque.content);
    }

    /// A date-time in the chosen content format.
    pub fn date_time(&mut self, value: &DateTime, format: DateTimeFormat) {
        match format {
            DateTimeFormat::Utc => self.utc_time(value),
            DateTimeFormat::Generalized => self.generalized_time(value),
        }
    }

    /// UTCTime (13 content octets). The year must be within 1950..=2049.
    pub fn utc_time(&mut self, value: &DateTime) {
        self.tag(Tag::UTC_TIME);
        self.length(13);
        value.write_utc_content(&mut self.out);
    }

    /// GeneralizedTime (15 content octets).
    pub fn generalized_time(&mut self, value: &DateTime) {
        self.tag(Tag::GENERALIZED_TIME);
        self.length(15);
        value.write_generalized_content(&mut self.out);
    }

    /// PrintableString. The caller guarantees the character set.
    pub fn printable_string(&mut self, value: &str) {
        debug_assert!(
            value.bytes().all(|b| matches!(b,
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9'
                | b' ' | b'\'' | b'(' | b')' | b'+' | b',' | b'-' | b'.' | b'/' | b':' | b'='
                | b'?')),
            "character outside the PrintableString set"
        );
        self.tag(Tag::PRINTABLE_STRING);
        self.length(value.len());
        self.bytes(value.as_bytes());
    }

    /// IA5String. The caller guarantees ASCII content.
    pub fn ia5_string(&mut self, value: &str) {
        debug_assert!(value.is_ascii(), "character outside the IA5String set");
        self.tag(Tag::IA5_STRING);
        self.length(value.len());
        self.bytes(value.as_bytes());
    }

    /// UTF8String.
    pub fn utf8_string(&mut self, value: &str) {
        self.tag(Tag::UTF8_STRING);
        self.length(value.len());
        self.bytes(value.as_bytes());
    }
}

impl Encode for bool {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.bool_value(*self);
    }
}

impl Encode for () {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.null();
    }
}

impl Encode for [u8] {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.octet_string(self);
    }
}

impl Encode for BitString<'_> {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.bit_string(self);
    }
}

impl Encode for Oid<'_> {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.oid(self);
    }
}

impl Encode for Opaque<'_> {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.opaque(self);
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self, encoder: &mut Encoder) {
        if let Some(value) = self {
            value.encode(encoder);
        }
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self, encoder: &mut Encoder) {
        (**self).encode(encoder);
    }
}

macro_rules! impl_encode_unsigned {
    ($($ty:ty),+) => {$(
        impl Encode for $ty {
            fn encode(&self, encoder: &mut Encoder) {
                let bytes = self.to_be_bytes();
                let skip = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
                // A set top bit would read as negative without a pad octet.
                let pad = (bytes[skip] & 0x80 != 0) as usize;
                encoder.tag(Tag::INTEGER);
                encoder.length(bytes.len() - skip + pad);
                if pad == 1 {
                    encoder.out.push(0x00);
                }
                encoder.bytes(&bytes[skip..]);
            }
        }
    )+};
}

impl_encode_unsigned!(u8, u16, u32, u64, u128);

macro_rules! impl_encode_signed {
    ($($ty:ty),+) => {$(
        impl Encode for $ty {
            fn encode(&self, encoder: &mut Encoder) {
                let bytes = self.to_be_bytes();
                // Strip redundant sign octets down to the minimal
                // two's-complement form.
                let mut skip = 0;
                while skip + 1 < bytes.len()
                    && ((bytes[skip] == 0x00 && bytes[skip + 1] & 0x80 == 0)
                        || (bytes[skip] == 0xff && bytes[skip + 1] & 0x80 != 0))
                {
                    skip += 1;
                }
                encoder.tag(Tag::INTEGER);
                encoder.length(bytes.len() - skip);
                encoder.bytes(&bytes[skip..]);
            }
        }
    )+};
}

impl_encode_signed!(i8, i16, i32, i64, i128);
