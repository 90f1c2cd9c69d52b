//! Schema glue: per-field tag overrides and the macros that map plain
//! Rust types onto DER structure.
//!
//! The macros generate the same call chains a hand-written
//! [`Decode`](crate::Decode)/[`Encode`](crate::Encode) pair would make:
//! walk the SEQUENCE, apply the field's tag override, substitute DEFAULT
//! values on schematic absence, omit them on encode.

use crate::tag::TagClass;

/// How a field-tag override is applied on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMode {
    /// Replace the element's own tag.
    Implicit,
    /// Wrap the element in an outer constructed tag.
    Explicit,
}

/// A per-field tag override: `[number]` in the given class, applied
/// implicitly or explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldTag {
    pub class: TagClass,
    pub number: u32,
    pub mode: TagMode,
}

impl FieldTag {
    /// `[number] IMPLICIT` in the context-specific class.
    pub const fn implicit(number: u32) -> Self {
        Self { class: TagClass::ContextSpecific, number, mode: TagMode::Implicit }
    }

    /// `[number] EXPLICIT` in the context-specific class.
    pub const fn explicit(number: u32) -> Self {
        Self { class: TagClass::ContextSpecific, number, mode: TagMode::Explicit }
    }

    /// The same override in another tag class.
    pub const fn with_class(self, class: TagClass) -> Self {
        Self { class, number: self.number, mode: self.mode }
    }
}

/// Implement [`Decode`](crate::Decode) and [`Encode`](crate::Encode) for a
/// struct as an ASN.1 SEQUENCE.
///
/// Each field may carry an option group in front of its name:
/// `[implicit N]`, `[explicit N]`, `[default EXPR]`, or a tag override
/// combined with a default (`[explicit N, default EXPR]`).
///
/// Fields with a default are omitted from the encoding when they equal it
/// and substituted when absent from the input, per DER. `Option` fields
/// decode to `None` when their element is absent and emit nothing when
/// `None`.
///
/// # Example
/// ```
/// use der_codec::{der_sequence, from_der, to_der};
///
/// #[derive(Debug, PartialEq)]
/// struct Measurement {
///     channel: u8,
///     value: i32,
/// }
///
/// der_sequence! {
///     Measurement {
///         channel: u8,
///         value: i32,
///     }
/// }
///
/// let bytes = to_der(&Measurement { channel: 1, value: -4 });
/// assert_eq!(bytes, [0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0xfc]);
/// assert_eq!(from_der::<Measurement>(&bytes).unwrap(), Measurement { channel: 1, value: -4 });
/// ```
#[cfg(all(feature = "parse", feature = "encode"))]
#[macro_export]
macro_rules! der_sequence {
    ($name:ident<$lt:lifetime> {
        $( $([$($opt:tt)+])? $field:ident : $fty:ty ),+ $(,)?
    }) => {
        impl<$lt> $crate::Decode<$lt> for $name<$lt> {
            fn decode(
                decoder: &mut $crate::Decoder<$lt>,
            ) -> ::core::result::Result<Self, $crate::Error> {
                let header = decoder.sequence()?;
                $( let $field = $crate::der_sequence!(@read decoder, $fty, $([$($opt)+])?); )+
                decoder.end_sequence(&header)?;
                ::core::result::Result::Ok(Self { $($field),+ })
            }
        }

        impl<$lt> $crate::Encode for $name<$lt> {
            fn encode(&self, encoder: &mut $crate::Encoder) {
                encoder.sequence(|e| {
                    $( $crate::der_sequence!(@write e, &self.$field, $([$($opt)+])?); )+
                });
            }
        }
    };

    ($name:ident {
        $( $([$($opt:tt)+])? $field:ident : $fty:ty ),+ $(,)?
    }) => {
        impl<'der> $crate::Decode<'der> for $name {
            fn decode(
                decoder: &mut $crate::Decoder<'der>,
            ) -> ::core::result::Result<Self, $crate::Error> {
                let header = decoder.sequence()?;
                $( let $field = $crate::der_sequence!(@read decoder, $fty, $([$($opt)+])?); )+
                decoder.end_sequence(&header)?;
                ::core::result::Result::Ok(Self { $($field),+ })
            }
        }

        impl $crate::Encode for $name {
            fn encode(&self, encoder: &mut $crate::Encoder) {
                encoder.sequence(|e| {
                    $( $crate::der_sequence!(@write e, &self.$field, $([$($opt)+])?); )+
                });
            }
        }
    };

    (@read $d:ident, $fty:ty,) => {
        $d.any::<$fty>()?
    };
    (@read $d:ident, $fty:ty, [implicit $n:literal]) => {
        $d.field($crate::FieldTag::implicit($n), |d| d.any::<$fty>())?
    };
    (@read $d:ident, $fty:ty, [explicit $n:literal]) => {
        $d.field($crate::FieldTag::explicit($n), |d| d.any::<$fty>())?
    };
    (@read $d:ident, $fty:ty, [default $default:expr]) => {
        $d.field_with_default($default, |d| d.any::<$fty>())?
    };
    (@read $d:ident, $fty:ty, [implicit $n:literal, default $default:expr]) => {
        $d.field_with_default($default, |d| {
            d.field($crate::FieldTag::implicit($n), |d| d.any::<$fty>())
        })?
    };
    (@read $d:ident, $fty:ty, [explicit $n:literal, default $default:expr]) => {
        $d.field_with_default($default, |d| {
            d.field($crate::FieldTag::explicit($n), |d| d.any::<$fty>())
        })?
    };

    (@write $e:ident, $value:expr,) => {
        $e.any($value)
    };
    (@write $e:ident, $value:expr, [implicit $n:literal]) => {
        $e.field($crate::FieldTag::implicit($n), |e| e.any($value))
    };
    (@write $e:ident, $value:expr, [explicit $n:literal]) => {
        $e.field($crate::FieldTag::explicit($n), |e| e.any($value))
    };
    (@write $e:ident, $value:expr, [default $default:expr]) => {
        if *$value != $default {
            $e.any($value);
        }
    };
    (@write $e:ident, $value:expr, [implicit $n:literal, default $default:expr]) => {
        if *$value != $default {
            $e.field($crate::FieldTag::implicit($n), |e| e.any($value));
        }
    };
    (@write $e:ident, $value:expr, [explicit $n:literal, default $default:expr]) => {
        if *$value != $default {
            $e.field($crate::FieldTag::explicit($n), |e| e.any($value));
        }
    };
}

/// Implement [`Decode`](crate::Decode) and [`Encode`](crate::Encode) for a
/// fieldless enum identified by OBJECT IDENTIFIERs.
///
/// The table must be total: every variant maps to exactly one packed OID.
/// Decoding an identifier missing from the table fails with
/// [`Error::UnknownOid`](crate::Error::UnknownOid).
///
/// # Example
/// ```
/// use der_codec::{der_oid_enum, from_der, to_der};
/// use der_codec::oid::encode_oid;
///
/// const SHA256_RSA: [u8; 9] = encode_oid(&[1, 2, 840, 113549, 1, 1, 11]);
/// const ECDSA_SHA256: [u8; 8] = encode_oid(&[1, 2, 840, 10045, 4, 3, 2]);
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum SignatureAlgorithm {
///     Sha256WithRsa,
///     EcdsaWithSha256,
/// }
///
/// der_oid_enum! {
///     SignatureAlgorithm {
///         Sha256WithRsa => &SHA256_RSA,
///         EcdsaWithSha256 => &ECDSA_SHA256,
///     }
/// }
///
/// let bytes = to_der(&SignatureAlgorithm::EcdsaWithSha256);
/// assert_eq!(from_der::<SignatureAlgorithm>(&bytes).unwrap(), SignatureAlgorithm::EcdsaWithSha256);
/// ```
#[cfg(all(feature = "parse", feature = "encode"))]
#[macro_export]
macro_rules! der_oid_enum {
    ($name:ident { $($variant:ident => $oid:expr),+ $(,)? }) => {
        impl $name {
            /// Packed OID content identifying this variant.
            pub fn oid_bytes(&self) -> &'static [u8] {
                match self {
                    $( Self::$variant => $oid, )+
                }
            }

            /// Reverse lookup from packed OID content.
            pub fn from_oid_bytes(bytes: &[u8]) -> ::core::option::Option<Self> {
                $(
                    {
                        let oid: &'static [u8] = $oid;
                        if bytes == oid {
                            return ::core::option::Option::Some(Self::$variant);
                        }
                    }
                )+
                ::core::option::Option::None
            }
        }

        impl<'der> $crate::Decode<'der> for $name {
            fn decode(
                decoder: &mut $crate::Decoder<'der>,
            ) -> ::core::result::Result<Self, $crate::Error> {
                let oid = decoder.oid()?;
                Self::from_oid_bytes(oid.as_bytes()).ok_or($crate::Error::UnknownOid)
            }
        }

        impl $crate::Encode for $name {
            fn encode(&self, encoder: &mut $crate::Encoder) {
                encoder.oid_bytes(self.oid_bytes());
            }
        }
    };
}

/// Implement [`Decode`](crate::Decode) and [`Encode`](crate::Encode) for a
/// fieldless `#[repr]` enum carried as an INTEGER of its representation
/// type.
///
/// Requires `TryFrom<repr>` (for instance via `TryFromPrimitive`) and
/// `Copy`. A wire value outside the enum's domain fails with
/// [`Error::UnexpectedElement`](crate::Error::UnexpectedElement).
///
/// # Example
/// ```
/// use der_codec::{der_enumerated, from_der, to_der};
/// use derive_try_from_primitive::TryFromPrimitive;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
/// #[repr(u8)]
/// enum Version {
///     V1 = 0,
///     V2 = 1,
///     V3 = 2,
/// }
///
/// der_enumerated!(Version: u8);
///
/// assert_eq!(to_der(&Version::V3), [0x02, 0x01, 0x02]);
/// assert_eq!(from_der::<Version>(&[0x02, 0x01, 0x02]).unwrap(), Version::V3);
/// ```
#[cfg(all(feature = "parse", feature = "encode"))]
#[macro_export]
macro_rules! der_enumerated {
    ($name:ident : $repr:ty) => {
        impl<'der> $crate::Decode<'der> for $name {
            fn decode(
                decoder: &mut $crate::Decoder<'der>,
            ) -> ::core::result::Result<Self, $crate::Error> {
                let raw = decoder.any::<$repr>()?;
                <$name as ::core::convert::TryFrom<$repr>>::try_from(raw)
                    .map_err(|_| $crate::Error::UnexpectedElement)
            }
        }

        impl $crate::Encode for $name {
            fn encode(&self, encoder: &mut $crate::Encoder) {
                encoder.any(&(*self as $repr));
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_tag_constructors() {
        let tag = FieldTag::implicit(2);
        assert_eq!(tag.class, TagClass::ContextSpecific);
        assert_eq!(tag.number, 2);
        assert_eq!(tag.mode, TagMode::Implicit);

        let tag = FieldTag::explicit(0).with_class(TagClass::Application);
        assert_eq!(tag.class, TagClass::Application);
        assert_eq!(tag.mode, TagMode::Explicit);
    }
}
