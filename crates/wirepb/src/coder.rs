//! Scalar wire coders: the `Coder` trait and its concrete implementations.
//!
//! Each coder is a zero-sized marker type (`Int32`, `Fixed64`, ...) rather
//! than a value — the value lives in the field that uses the coder. This
//! mirrors the teacher's split between a stateless encoder/decoder strategy
//! and the data it operates on.

use crate::fixed::{self, FixedWidth};
use crate::mode::Mode;
use crate::region::{ReadRegion, WriteRegion};
use crate::varint;
use crate::wire::WireType;

/// A single scalar (or length-delimited scalar-like) wire value.
///
/// `encode`/`decode` are the one pair of operations every coder must
/// implement; bounds-checking is entirely delegated to `Mode` so neither
/// method branches on it directly. `encoded_len` supports computing a
/// length prefix (for embedded messages and packed-repeated scans) without
/// writing anything, and `decode_skip` supports forward-skipping a value of
/// known coder type without materializing it.
pub trait Coder {
    /// The Rust type values of this wire field are stored as.
    type Value;

    /// The wire type this coder always produces.
    const WIRE_TYPE: WireType;

    fn encode<M: Mode>(region: WriteRegion, value: &Self::Value) -> M::Result<WriteRegion>;

    fn decode<'a, M: Mode>(region: ReadRegion<'a>) -> M::Result<(Self::Value, ReadRegion<'a>)>;

    /// Bytes `value` would occupy on the wire, without writing them.
    fn encoded_len(value: &Self::Value) -> usize;

    /// Skip one value of this coder's kind without materializing it.
    fn decode_skip<'a, M: Mode>(region: ReadRegion<'a>) -> M::Result<ReadRegion<'a>> {
        M::and_then(Self::decode::<M>(region), |(_, rest)| M::ok(rest))
    }
}

/// Declares a varint-backed integer coder (`Int32`, `Int64`, `Uint32`,
/// `Uint64`) whose wire representation is the plain two's-complement varint
/// of `$value`, with no ZigZag transform.
macro_rules! varint_coder {
    ($name:ident, $value:ty, $encode:ident, $decode:ident) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Coder for $name {
            type Value = $value;
            const WIRE_TYPE: WireType = WireType::Varint;

            fn encode<M: Mode>(region: WriteRegion, value: &$value) -> M::Result<WriteRegion> {
                varint::$encode::<M>(region, *value as _)
            }

            fn decode<'a, M: Mode>(region: ReadRegion<'a>) -> M::Result<($value, ReadRegion<'a>)> {
                M::and_then(varint::$decode::<M>(region), |(n, rest)| M::ok((n as $value, rest)))
            }

            fn encoded_len(value: &$value) -> usize {
                varint::encoded_len_u64(*value as u64)
            }
        }
    };
}

varint_coder!(Int32, i32, encode_i64, decode_i64);
varint_coder!(Int64, i64, encode_i64, decode_i64);
varint_coder!(Uint32, u32, encode_u64, decode_u64);
varint_coder!(Uint64, u64, encode_u64, decode_u64);

/// Declares a ZigZag varint-backed signed integer coder (`Sint32`,
/// `Sint64`): `value` is ZigZag-transformed before varint-encoding, and
/// ZigZag-reversed after varint-decoding.
macro_rules! zigzag_coder {
    ($name:ident, $value:ty, $unsigned:ty, $encode:ident, $decode:ident) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Coder for $name {
            type Value = $value;
            const WIRE_TYPE: WireType = WireType::Varint;

            fn encode<M: Mode>(region: WriteRegion, value: &$value) -> M::Result<WriteRegion> {
                use crate::varint::ZigZag;
                varint::$encode::<M>(region, value.zig() as _)
            }

            fn decode<'a, M: Mode>(region: ReadRegion<'a>) -> M::Result<($value, ReadRegion<'a>)> {
                use crate::varint::ZigZag;
                M::and_then(varint::$decode::<M>(region), |(n, rest)| {
                    M::ok((<$value>::zag(n as $unsigned), rest))
                })
            }

            fn encoded_len(value: &$value) -> usize {
                use crate::varint::ZigZag;
                varint::encoded_len_u64(value.zig() as u64)
            }
        }
    };
}

zigzag_coder!(Sint32, i32, u32, encode_u64, decode_u64);
zigzag_coder!(Sint64, i64, u64, encode_u64, decode_u64);

/// Declares a fixed-width coder (`Fixed32`, `Fixed64`, `Sfixed32`,
/// `Sfixed64`, `Float`, `Double`) whose wire representation is `value`'s raw
/// little-endian bytes.
macro_rules! fixed_coder {
    ($name:ident, $value:ty, $wire_type:expr) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Coder for $name {
            type Value = $value;
            const WIRE_TYPE: WireType = $wire_type;

            fn encode<M: Mode>(region: WriteRegion, value: &$value) -> M::Result<WriteRegion> {
                fixed::encode_fixed::<M, $value>(region, *value)
            }

            fn decode<'a, M: Mode>(region: ReadRegion<'a>) -> M::Result<($value, ReadRegion<'a>)> {
                fixed::decode_fixed::<M, $value>(region)
            }

            fn encoded_len(_value: &$value) -> usize {
                <$value as FixedWidth>::SIZE
            }
        }
    };
}

fixed_coder!(Fixed32, u32, WireType::Fixed32);
fixed_coder!(Sfixed32, i32, WireType::Fixed32);
fixed_coder!(Float, f32, WireType::Fixed32);
fixed_coder!(Fixed64, u64, WireType::Fixed64);
fixed_coder!(Sfixed64, i64, WireType::Fixed64);
fixed_coder!(Double, f64, WireType::Fixed64);

/// Boolean coder: varint `0` or `1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bool;

impl Coder for Bool {
    type Value = bool;
    const WIRE_TYPE: WireType = WireType::Varint;

    fn encode<M: Mode>(region: WriteRegion, value: &bool) -> M::Result<WriteRegion> {
        varint::encode_u64::<M>(region, *value as u64)
    }

    fn decode<'a, M: Mode>(region: ReadRegion<'a>) -> M::Result<(bool, ReadRegion<'a>)> {
        M::and_then(varint::decode_u64::<M>(region), |(n, rest)| M::ok((n != 0, rest)))
    }

    fn encoded_len(_value: &bool) -> usize {
        1
    }
}

/// A C-like enum coder: the wire representation is the discriminant's
/// varint, same as a plain `int32`. `decode` falls back to `ZERO` for a
/// discriminant this build doesn't recognize (the proto3 convention for
/// forward compatibility); `decode_checked` is available when the caller
/// wants to detect that case instead.
pub trait WireEnum: Copy + Sized {
    /// The zero-valued variant every proto3 enum is required to declare.
    const ZERO: Self;

    fn from_i32(value: i32) -> Option<Self>;
    fn to_i32(self) -> i32;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnumCoder<T>(core::marker::PhantomData<T>);

impl<T: WireEnum> Coder for EnumCoder<T> {
    type Value = T;
    const WIRE_TYPE: WireType = WireType::Varint;

    fn encode<M: Mode>(region: WriteRegion, value: &T) -> M::Result<WriteRegion> {
        varint::encode_i64::<M>(region, value.to_i32() as i64)
    }

    fn decode<'a, M: Mode>(region: ReadRegion<'a>) -> M::Result<(T, ReadRegion<'a>)> {
        M::and_then(varint::decode_i64::<M>(region), |(n, rest)| {
            M::ok((T::from_i32(n as i32).unwrap_or(T::ZERO), rest))
        })
    }

    fn encoded_len(value: &T) -> usize {
        varint::encoded_len_u64((value.to_i32() as i64) as u64)
    }
}

impl<T: WireEnum> EnumCoder<T> {
    /// Decode an enum value, surfacing an unrecognized discriminant as
    /// `crate::Error::InvalidEnumValue` instead of falling back to a
    /// default variant.
    pub fn decode_checked<'a, M: Mode>(
        region: ReadRegion<'a>,
    ) -> M::Result<(std::result::Result<T, crate::Error>, ReadRegion<'a>)> {
        M::and_then(varint::decode_i64::<M>(region), |(n, rest)| {
            let value = T::from_i32(n as i32).ok_or(crate::Error::InvalidEnumValue(n));
            M::ok((value, rest))
        })
    }
}

/// Raw byte string coder: a length-delimited run of bytes with no further
/// interpretation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bytes;

impl Coder for Bytes {
    type Value = Vec<u8>;
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn encode<M: Mode>(region: WriteRegion, value: &Vec<u8>) -> M::Result<WriteRegion> {
        M::and_then(varint::encode_u64::<M>(region, value.len() as u64), |region| {
            region.put_slice::<M>(value)
        })
    }

    fn decode<'a, M: Mode>(region: ReadRegion<'a>) -> M::Result<(Vec<u8>, ReadRegion<'a>)> {
        M::and_then(varint::decode_u64::<M>(region), |(len, rest)| {
            M::and_then(rest.split_len::<M>(len), |(bytes, rest)| {
                M::ok((bytes.to_vec(), rest))
            })
        })
    }

    fn encoded_len(value: &Vec<u8>) -> usize {
        varint::encoded_len_u64(value.len() as u64) + value.len()
    }
}

/// UTF-8 string coder: a length-delimited run of bytes.
///
/// `decode` replaces invalid byte sequences with the Unicode replacement
/// character rather than failing, so a malformed string field never blocks
/// decoding the rest of the message; [`Str::decode_checked`] is available
/// when the caller wants `Error::InvalidUtf8` reported instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct Str;

impl Coder for Str {
    type Value = String;
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn encode<M: Mode>(region: WriteRegion, value: &String) -> M::Result<WriteRegion> {
        M::and_then(varint::encode_u64::<M>(region, value.len() as u64), |region| {
            region.put_slice::<M>(value.as_bytes())
        })
    }

    fn decode<'a, M: Mode>(region: ReadRegion<'a>) -> M::Result<(String, ReadRegion<'a>)> {
        M::and_then(varint::decode_u64::<M>(region), |(len, rest)| {
            M::and_then(rest.split_len::<M>(len), |(bytes, rest)| {
                M::ok((String::from_utf8_lossy(bytes).into_owned(), rest))
            })
        })
    }

    fn encoded_len(value: &String) -> usize {
        varint::encoded_len_u64(value.len() as u64) + value.len()
    }
}

impl Str {
    /// Decode a string, surfacing invalid UTF-8 as `crate::Error::InvalidUtf8`
    /// instead of substituting the replacement character.
    pub fn decode_checked<'a, M: Mode>(
        region: ReadRegion<'a>,
    ) -> M::Result<(std::result::Result<String, crate::Error>, ReadRegion<'a>)> {
        M::and_then(varint::decode_u64::<M>(region), |(len, rest)| {
            M::and_then(rest.split_len::<M>(len), |(bytes, rest)| {
                let value = std::str::from_utf8(bytes)
                    .map(str::to_owned)
                    .map_err(|_| crate::Error::InvalidUtf8);
                M::ok((value, rest))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Safe;

    #[test]
    fn sint32_minus_one_zigzags_to_one() {
        use crate::varint::ZigZag;
        assert_eq!((-1i32).zig(), 1);
    }

    #[test]
    fn sint32_coder_roundtrips_minus_one() {
        let mut buf = [0u8; 4];
        let rest = Sint32::encode::<Safe>(WriteRegion::new(&mut buf), &-1).unwrap();
        assert_eq!(rest.len(), 3);
        assert_eq!(buf[0], 0x01);
        let (v, _) = Sint32::decode::<Safe>(ReadRegion::new(&buf[..1])).unwrap();
        assert_eq!(v, -1);
    }

    #[test]
    fn bool_coder_is_one_byte() {
        assert_eq!(Bool::encoded_len(&true), 1);
        let mut buf = [0u8; 1];
        Bool::encode::<Safe>(WriteRegion::new(&mut buf), &true).unwrap();
        assert_eq!(buf, [1]);
    }

    #[test]
    fn float_coder_roundtrips() {
        let mut buf = [0u8; 4];
        Float::encode::<Safe>(WriteRegion::new(&mut buf), &1.5f32).unwrap();
        let (v, _) = Float::decode::<Safe>(ReadRegion::new(&buf)).unwrap();
        assert_eq!(v, 1.5f32);
    }
}
