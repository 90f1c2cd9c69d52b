//! UTCTime and GeneralizedTime values.
//!
//! Both encodings carry a wall-clock instant in UTC:
//! - UTCTime (tag 23): 13 ASCII bytes `YYMMDDhhmmssZ`, two-digit year
//!   with the RFC 5280 pivot (`YY >= 50` is 19YY, otherwise 20YY).
//! - GeneralizedTime (tag 24): 15 ASCII bytes `YYYYMMDDhhmmssZ`.
//!
//! Fractional seconds and local-offset suffixes are rejected in both
//! forms; only the `Z` designator is canonical DER.
//!
//! Reference: ITU-T X.690, Sections 11.7 and 11.8; RFC 5280, Section 4.1.2.5

use core::fmt;

#[cfg(feature = "serde")]
use alloc::string::ToString;
#[cfg(feature = "encode")]
use alloc::vec::Vec;
#[cfg(feature = "serde")]
use serde::{Serialize, Serializer};

use crate::error::Error;

#[cfg(feature = "parse")]
use crate::decoder::{Decode, Decoder};
#[cfg(feature = "encode")]
use crate::encoder::{Encode, Encoder};

/// Content encoding chosen when writing a [`DateTime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeFormat {
    /// UTCTime, tag 23. Only years 1950..=2049 are representable.
    Utc,
    /// GeneralizedTime, tag 24.
    Generalized,
}

/// A validated calendar date and time of day, interpreted as UTC.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateTime {
    pub(crate) year: u16,
    pub(crate) month: u8,
    pub(crate) day: u8,
    pub(crate) hour: u8,
    pub(crate) minute: u8,
    pub(crate) second: u8,
}

impl DateTime {
    /// Construct a date-time, validating component ranges. Years above
    /// 9999 are rejected (four digits is all either wire format can
    /// carry); second 60 is accepted for leap seconds.
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, Error> {
        let valid = year <= 9999
            && (1..=12).contains(&month)
            && (1..=31).contains(&day)
            && hour <= 23
            && minute <= 59
            && second <= 60;
        if !valid {
            return Err(Error::InvalidDateTime);
        }
        Ok(Self { year, month, day, hour, minute, second })
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    /// Whether this instant is representable as UTCTime.
    pub fn fits_utc_time(&self) -> bool {
        (1950..=2049).contains(&self.year)
    }

    /// Parse 13-byte UTCTime content (`YYMMDDhhmmssZ`).
    #[cfg(feature = "parse")]
    pub(crate) fn parse_utc_content(content: &[u8]) -> Result<Self, Error> {
        let [digits @ .., b'Z'] = content else {
            return Err(Error::InvalidDateTime);
        };
        if digits.len() != 12 {
            return Err(Error::InvalidDateTime);
        }

        let yy = pair(&digits[0..2])?;
        // RFC 5280: two-digit years 50..=99 are 19xx, 00..=49 are 20xx.
        let year = if yy >= 50 { 1900 + yy as u16 } else { 2000 + yy as u16 };

        Self::new(
            year,
            pair(&digits[2..4])?,
            pair(&digits[4..6])?,
            pair(&digits[6..8])?,
            pair(&digits[8..10])?,
            pair(&digits[10..12])?,
        )
    }

    /// Parse 15-byte GeneralizedTime content (`YYYYMMDDhhmmssZ`).
    #[cfg(feature = "parse")]
    pub(crate) fn parse_generalized_content(content: &[u8]) -> Result<Self, Error> {
        let [digits @ .., b'Z'] = content else {
            return Err(Error::InvalidDateTime);
        };
        if digits.len() != 14 {
            return Err(Error::InvalidDateTime);
        }

        let year = pair(&digits[0..2])? as u16 * 100 + pair(&digits[2..4])? as u16;

        Self::new(
            year,
            pair(&digits[4..6])?,
            pair(&digits[6..8])?,
            pair(&digits[8..10])?,
            pair(&digits[10..12])?,
            pair(&digits[12..14])?,
        )
    }

    /// Append the 13 UTCTime content bytes.
    #[cfg(feature = "encode")]
    pub(crate) fn write_utc_content(&self, buffer: &mut Vec<u8>) {
        debug_assert!(self.fits_utc_time(), "year not representable as UTCTime");
        push_pair(buffer, (self.year % 100) as u8);
        push_pair(buffer, self.month);
        push_pair(buffer, self.day);
        push_pair(buffer, self.hour);
        push_pair(buffer, self.minute);
        push_pair(buffer, self.second);
        buffer.push(b'Z');
    }

    /// Append the 15 GeneralizedTime content bytes.
    #[cfg(feature = "encode")]
    pub(crate) fn write_generalized_content(&self, buffer: &mut Vec<u8>) {
        push_pair(buffer, (self.year / 100) as u8);
        push_pair(buffer, (self.year % 100) as u8);
        push_pair(buffer, self.month);
        push_pair(buffer, self.day);
        push_pair(buffer, self.hour);
        push_pair(buffer, self.minute);
        push_pair(buffer, self.second);
        buffer.push(b'Z');
    }

    /// Create a DateTime from a chrono NaiveDateTime.
    ///
    /// Sub-second precision is truncated. The instant is taken as UTC.
    #[cfg(feature = "chrono-conversions")]
    pub fn from_chrono(value: &chrono::NaiveDateTime) -> Self {
        use chrono::{Datelike, Timelike};
        Self {
            year: value.year() as u16,
            month: value.month() as u8,
            day: value.day() as u8,
            hour: value.hour() as u8,
            minute: value.minute() as u8,
            second: value.second() as u8,
        }
    }

    /// Convert to a chrono NaiveDateTime. Returns `None` for instants
    /// chrono rejects (such as a leap second or an impossible calendar
    /// day).
    #[cfg(feature = "chrono-conversions")]
    pub fn to_chrono(&self) -> Option<chrono::NaiveDateTime> {
        let date =
            chrono::NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32)?;
        date.and_hms_opt(self.hour as u32, self.minute as u32, self.second as u32)
    }

    /// Create a DateTime from a jiff civil::DateTime.
    ///
    /// Sub-second precision is truncated. The instant is taken as UTC.
    #[cfg(feature = "jiff-conversions")]
    pub fn from_jiff(value: &jiff::civil::DateTime) -> Self {
        Self {
            year: value.year() as u16,
            month: value.month() as u8,
            day: value.day() as u8,
            hour: value.hour() as u8,
            minute: value.minute() as u8,
            second: value.second() as u8,
        }
    }

    /// Convert to a jiff civil::DateTime. Returns `None` for instants
    /// jiff rejects.
    #[cfg(feature = "jiff-conversions")]
    pub fn to_jiff(&self) -> Option<jiff::civil::DateTime> {
        jiff::civil::DateTime::new(
            self.year as i16,
            self.month as i8,
            self.day as i8,
            self.hour as i8,
            self.minute as i8,
            self.second as i8,
            0,
        )
        .ok()
    }
}

/// Two ASCII digits to a number.
#[cfg(feature = "parse")]
fn pair(digits: &[u8]) -> Result<u8, Error> {
    match digits {
        [a @ b'0'..=b'9', b @ b'0'..=b'9'] => Ok((a - b'0') * 10 + (b - b'0')),
        _ => Err(Error::InvalidDateTime),
    }
}

#[cfg(feature = "encode")]
fn push_pair(buffer: &mut Vec<u8>, value: u8) {
    debug_assert!(value < 100);
    buffer.push(b'0' + value / 10);
    buffer.push(b'0' + value % 10);
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            self.year, self.month, self.day, self.hour, self.minute, self.second,
        )
    }
}

impl fmt::Debug for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DateTime(\"{self}\")")
    }
}

#[cfg(feature = "serde")]
impl Serialize for DateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// A [`DateTime`] pinned to the UTCTime wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UtcTime(pub DateTime);

/// A [`DateTime`] pinned to the GeneralizedTime wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GeneralizedTime(pub DateTime);

#[cfg(feature = "parse")]
impl<'a> Decode<'a> for UtcTime {
    fn decode(decoder: &mut Decoder<'a>) -> Result<Self, Error> {
        decoder.utc_time().map(Self)
    }
}

#[cfg(feature = "encode")]
impl Encode for UtcTime {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.utc_time(&self.0);
    }
}

#[cfg(feature = "parse")]
impl<'a> Decode<'a> for GeneralizedTime {
    fn decode(decoder: &mut Decoder<'a>) -> Result<Self, Error> {
        decoder.generalized_time().map(Self)
    }
}

#[cfg(feature = "encode")]
impl Encode for GeneralizedTime {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.generalized_time(&self.0);
    }
}
