//! Wire types and field keys.

use crate::mode::Mode;
use crate::region::{ReadRegion, WriteRegion};
use crate::varint;

/// The four wire types this codec understands. Wire type 3 (deprecated
/// group start) and 4 (deprecated group end) are never produced and are
/// rejected on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

impl WireType {
    /// Recover a `WireType` from its 3-bit wire encoding.
    pub fn from_u8(b: u8) -> Option<Self> {
        match b {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }
}

/// Compute the field key `(tag << 3) | wire_type` for a compile-time tag and
/// wire type. Used by macro-generated code so the key is a `const`
/// expression rather than per-call arithmetic.
pub const fn field_key(tag: u32, wire_type: WireType) -> u64 {
    ((tag as u64) << 3) | (wire_type as u64)
}

/// Split a decoded key back into its tag and wire type.
pub fn split_key(key: u64) -> (u32, u8) {
    ((key >> 3) as u32, (key & 0b111) as u8)
}

/// Encode a field key as a varint.
pub fn encode_key<M: Mode>(region: WriteRegion, tag: u32, wire_type: WireType) -> M::Result<WriteRegion> {
    varint::encode_u64::<M>(region, field_key(tag, wire_type))
}

/// Decode a field key, returning the tag and the recovered wire type.
///
/// An unrecognized wire type is reported the same way a truncated read is:
/// a `None` result under [`crate::Safe`], and the caller's problem to avoid
/// under [`crate::Unsafe`]. It is not distinguished as a separate [`crate::Error`]
/// variant because nothing downstream of a key decode can do anything with
/// that distinction that it can't already do by treating the read as failed.
pub fn decode_key<'a, M: Mode>(region: ReadRegion<'a>) -> M::Result<(u32, WireType, ReadRegion<'a>)> {
    M::and_then(varint::decode_u64::<M>(region), |(key, rest)| {
        let (tag, wt) = split_key(key);
        match WireType::from_u8(wt) {
            Some(wire_type) => M::ok((tag, wire_type, rest)),
            None => M::err(),
        }
    })
}
