//! Wire-type-keyed skip dispatch for fields a message doesn't declare.
//!
//! A message's generated `decode` reads a field key, looks its tag up in a
//! `match`, and for anything not found calls [`skip_value`] with the wire
//! type the key carried — the value's Rust type was never known, only its
//! shape on the wire, so skipping is dispatched on [`WireType`] rather than
//! on any [`crate::coder::Coder`].

use crate::mode::Mode;
use crate::region::ReadRegion;
use crate::varint;
use crate::wire::WireType;

/// Skip one value of `wire_type` from the front of `region`.
pub fn skip_value<'a, M: Mode>(region: ReadRegion<'a>, wire_type: WireType) -> M::Result<ReadRegion<'a>> {
    match wire_type {
        WireType::Varint => M::and_then(varint::decode_u64::<M>(region), |(_, rest)| M::ok(rest)),
        WireType::Fixed32 => M::and_then(region.split_n::<M>(4), |(_, rest)| M::ok(rest)),
        WireType::Fixed64 => M::and_then(region.split_n::<M>(8), |(_, rest)| M::ok(rest)),
        WireType::LengthDelimited => M::and_then(varint::decode_u64::<M>(region), |(len, rest)| {
            M::and_then(rest.split_len::<M>(len), |(_, rest)| M::ok(rest))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Safe;

    #[test]
    fn skip_length_delimited_consumes_prefix_and_body() {
        let data = [0x03u8, b'a', b'b', b'c', 0xFF];
        let rest = skip_value::<Safe>(ReadRegion::new(&data), WireType::LengthDelimited).unwrap();
        assert_eq!(rest.as_slice(), &[0xFF]);
    }

    #[test]
    fn skip_fixed32_consumes_four_bytes() {
        let data = [1u8, 2, 3, 4, 5];
        let rest = skip_value::<Safe>(ReadRegion::new(&data), WireType::Fixed32).unwrap();
        assert_eq!(rest.as_slice(), &[5]);
    }

    #[test]
    fn skip_varint_consumes_until_terminal_byte() {
        let data = [0x96u8, 0x01, 0xAA];
        let rest = skip_value::<Safe>(ReadRegion::new(&data), WireType::Varint).unwrap();
        assert_eq!(rest.as_slice(), &[0xAA]);
    }
}
