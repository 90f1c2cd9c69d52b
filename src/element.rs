//! Tag + length headers and the byte extent of one DER element.
//!
//! Reference: ITU-T X.690, Sections 8.1.3 (length octets) and 10.1
//! (DER shortest-form rule)

#[cfg(feature = "parse")]
use crate::error::Error;
use crate::tag::Tag;

#[cfg(feature = "encode")]
use alloc::vec::Vec;

#[cfg(feature = "parse")]
use nom::{
    IResult,
    error::{Error as NomError, ErrorKind},
    number::streaming::u8 as nom_u8,
};

/// One parsed element header: its tag and the `[start, end)` range of its
/// content octets within the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    pub tag: Tag,
    pub start: usize,
    pub end: usize,
}

impl Element {
    /// Content length in octets.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// An element deferred for later interpretation: the tag it carried on the
/// wire and a borrowed view of its content octets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opaque<'a> {
    pub tag: Tag,
    pub content: &'a [u8],
}

/// Parse DER length octets.
///
/// Accepts the short form (one octet, high bit clear) and the long form
/// (`0x80 | n` followed by `n` big-endian octets). Rejects the indefinite
/// form, more length octets than `usize` holds, leading zero length
/// octets, and long-form values below 128 (DER shortest-form rule).
#[cfg(feature = "parse")]
pub(crate) fn parse_length(input: &[u8]) -> IResult<&[u8], usize> {
    let (input, first) = nom_u8(input)?;

    if first & 0x80 == 0 {
        return Ok((input, first as usize));
    }

    let count = (first & 0x7f) as usize;
    if count == 0 {
        // Indefinite form, not allowed in DER.
        return Err(nom::Err::Error(NomError::new(input, ErrorKind::LengthValue)));
    }
    if count > size_of::<usize>() {
        return Err(nom::Err::Error(NomError::new(input, ErrorKind::LengthValue)));
    }

    let mut length = 0usize;
    let mut rest = input;
    for i in 0..count {
        let (r, octet) = nom_u8(rest)?;
        rest = r;
        if i == 0 && octet == 0 {
            // Leading zero octet, not the shortest form.
            return Err(nom::Err::Error(NomError::new(rest, ErrorKind::LengthValue)));
        }
        length = (length << 8) | octet as usize;
    }

    if length < 0x80 {
        // Would fit the short form.
        return Err(nom::Err::Error(NomError::new(rest, ErrorKind::LengthValue)));
    }

    Ok((rest, length))
}

/// Append DER length octets in shortest form.
#[cfg(feature = "encode")]
pub(crate) fn encode_length(length: usize, buffer: &mut Vec<u8>) {
    if length < 0x80 {
        buffer.push(length as u8);
        return;
    }

    let bytes = length.to_be_bytes();
    let skip = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
    buffer.push(0x80 | (bytes.len() - skip) as u8);
    buffer.extend_from_slice(&bytes[skip..]);
}

#[cfg(feature = "parse")]
fn fail_as(err: nom::Err<NomError<&[u8]>>, kind: Error) -> Error {
    match err {
        nom::Err::Incomplete(_) => Error::EndOfStream,
        _ => kind,
    }
}

/// Parse the element header beginning at `buf[index]`.
///
/// The returned content range is guaranteed to lie within `buf`; the
/// end-offset computation is overflow-checked.
#[cfg(feature = "parse")]
pub fn decode_element(buf: &[u8], index: usize) -> Result<Element, Error> {
    let input = buf.get(index..).ok_or(Error::EndOfStream)?;
    let before = input.len();

    let (input, tag) = Tag::parse(input).map_err(|e| fail_as(e, Error::InvalidTag))?;
    let (input, length) = parse_length(input).map_err(|e| fail_as(e, Error::InvalidLength))?;

    let start = index + (before - input.len());
    let end = start.checked_add(length).ok_or(Error::InvalidLength)?;
    if end > buf.len() {
        return Err(Error::InvalidLength);
    }

    Ok(Element { tag, start, end })
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(feature = "encode")]
    use alloc::vec::Vec;

    #[cfg(feature = "parse")]
    #[test]
    fn test_parse_length_short() {
        assert_eq!(parse_length(&[0x00]).unwrap(), (&[][..], 0));
        assert_eq!(parse_length(&[0x05]).unwrap(), (&[][..], 5));
        assert_eq!(parse_length(&[0x7f]).unwrap(), (&[][..], 127));
    }

    #[cfg(feature = "parse")]
    #[test]
    fn test_parse_length_long() {
        assert_eq!(parse_length(&[0x81, 0x80]).unwrap(), (&[][..], 128));
        assert_eq!(parse_length(&[0x81, 0xff]).unwrap(), (&[][..], 255));
        assert_eq!(parse_length(&[0x82, 0x01, 0x00]).unwrap(), (&[][..], 256));
        assert_eq!(parse_length(&[0x82, 0x12, 0x34]).unwrap(), (&[][..], 0x1234));
    }

    #[cfg(feature = "parse")]
    #[test]
    fn test_parse_length_rejects_indefinite() {
        assert!(parse_length(&[0x80]).is_err());
    }

    #[cfg(feature = "parse")]
    #[test]
    fn test_parse_length_rejects_non_shortest() {
        // 0x05 in long form
        assert!(parse_length(&[0x81, 0x05]).is_err());
        // Leading zero length octet
        assert!(parse_length(&[0x82, 0x00, 0x80]).is_err());
    }

    #[cfg(feature = "parse")]
    #[test]
    fn test_parse_length_rejects_too_many_octets() {
        // 9 length octets exceed a 64-bit usize
        assert!(parse_length(&[0x89, 1, 2, 3, 4, 5, 6, 7, 8, 9]).is_err());
        // Reserved value 0x7f
        assert!(parse_length(&[0xff, 1]).is_err());
    }

    #[cfg(feature = "encode")]
    #[test]
    fn test_encode_length() {
        let mut buffer = Vec::new();
        encode_length(0, &mut buffer);
        assert_eq!(buffer, [0x00]);

        buffer.clear();
        encode_length(127, &mut buffer);
        assert_eq!(buffer, [0x7f]);

        buffer.clear();
        encode_length(128, &mut buffer);
        assert_eq!(buffer, [0x81, 0x80]);

        buffer.clear();
        encode_length(0x1234, &mut buffer);
        assert_eq!(buffer, [0x82, 0x12, 0x34]);

        buffer.clear();
        encode_length(0x0100_0000, &mut buffer);
        assert_eq!(buffer, [0x84, 0x01, 0x00, 0x00, 0x00]);
    }

    #[cfg(all(feature = "parse", feature = "encode"))]
    #[test]
    fn test_length_roundtrip() {
        for length in [0usize, 1, 2, 12, 52, 127, 128, 255, 256, 65535, 123456] {
            let mut buffer = Vec::new();
            encode_length(length, &mut buffer);
            let (rest, parsed) = parse_length(&buffer).unwrap();
            assert_eq!(rest, &[]);
            assert_eq!(parsed, length);
        }
    }

    #[cfg(feature = "parse")]
    #[test]
    fn test_decode_element() {
        let buf = [0x02, 0x01, 0x05, 0xaa];
        let element = decode_element(&buf, 0).unwrap();
        assert_eq!(element.tag, Tag::INTEGER);
        assert_eq!(element.start, 2);
        assert_eq!(element.end, 3);
        assert_eq!(element.len(), 1);
    }

    #[cfg(feature = "parse")]
    #[test]
    fn test_decode_element_at_offset() {
        let buf = [0xaa, 0xbb, 0x04, 0x02, 0x01, 0x02];
        let element = decode_element(&buf, 2).unwrap();
        assert_eq!(element.tag, Tag::OCTET_STRING);
        assert_eq!(element.start, 4);
        assert_eq!(element.end, 6);
    }

    #[cfg(feature = "parse")]
    #[test]
    fn test_decode_element_overrun() {
        // Claims 4 content octets, only 1 present
        let buf = [0x04, 0x04, 0xaa];
        assert_eq!(decode_element(&buf, 0), Err(Error::InvalidLength));
    }

    #[cfg(feature = "parse")]
    #[test]
    fn test_decode_element_huge_length() {
        // Claims 4 GiB of content
        let buf = [0x30, 0x84, 0xff, 0xff, 0xff, 0xff];
        assert_eq!(decode_element(&buf, 0), Err(Error::InvalidLength));
    }

    #[cfg(feature = "parse")]
    #[test]
    fn test_decode_element_truncated_header() {
        assert_eq!(decode_element(&[], 0), Err(Error::EndOfStream));
        assert_eq!(decode_element(&[0x30], 0), Err(Error::EndOfStream));
        assert_eq!(decode_element(&[0x30, 0x82, 0x01], 0), Err(Error::EndOfStream));
        assert_eq!(decode_element(&[0x30], 5), Err(Error::EndOfStream));
    }

    #[cfg(feature = "parse")]
    #[test]
    fn test_decode_element_indefinite() {
        assert_eq!(decode_element(&[0x30, 0x80, 0x00, 0x00], 0), Err(Error::InvalidLength));
    }
}
