//! Generic length-delimited homogeneous sequence coder.
//!
//! This is the "packed" representation: one length prefix covers every
//! element, written back to back with no per-element field key. It is
//! distinct from unpacked-repeated cardinality (see [`crate::field`]), which
//! re-emits the field key before each element instead of sharing one length
//! prefix. Only coders whose wire type is not already length-delimited are
//! eligible to be packed, matching the upstream protobuf specification
//! (`string`/`bytes`/embedded-message fields are never packed); that rule is
//! enforced at `#[derive(Message)]` expansion time (see
//! `wirepb-derive::parse_field`), since `Array<C>` itself is generic over
//! any `C: Coder` and has no way to refuse a particular `C` at this layer.

use crate::coder::Coder;
use crate::mode::Mode;
use crate::region::{ReadRegion, WriteRegion};
use crate::varint;

/// Packs a homogeneous run of `C::Value` into one length-delimited field.
pub struct Array<C>(core::marker::PhantomData<C>);

impl<C: Coder> Array<C> {
    /// Total bytes the packed body (not including the length prefix itself)
    /// would occupy.
    pub fn body_len(values: &[C::Value]) -> usize {
        values.iter().map(C::encoded_len).sum()
    }

    /// Bytes the whole field (length prefix plus body) would occupy.
    pub fn encoded_len(values: &[C::Value]) -> usize {
        let body = Self::body_len(values);
        varint::encoded_len_u64(body as u64) + body
    }

    /// Encode the length prefix followed by every element in order.
    pub fn encode<M: Mode>(region: WriteRegion, values: &[C::Value]) -> M::Result<WriteRegion> {
        let body_len = Self::body_len(values);
        M::and_then(varint::encode_u64::<M>(region, body_len as u64), |region| {
            Self::encode_elements::<M>(region, values)
        })
    }

    fn encode_elements<M: Mode>(region: WriteRegion, values: &[C::Value]) -> M::Result<WriteRegion> {
        match values.split_first() {
            None => M::ok(region),
            Some((first, rest)) => M::and_then(C::encode::<M>(region, first), |region| {
                Self::encode_elements::<M>(region, rest)
            }),
        }
    }

    /// Decode the length prefix, then decode elements from the bounded body
    /// until it is exhausted.
    pub fn decode<'a, M: Mode>(region: ReadRegion<'a>) -> M::Result<(Vec<C::Value>, ReadRegion<'a>)> {
        M::and_then(varint::decode_u64::<M>(region), |(len, rest)| {
            M::and_then(rest.split_len::<M>(len), |(body, after)| {
                M::and_then(Self::decode_body::<M>(ReadRegion::new(body)), |values| {
                    M::ok((values, after))
                })
            })
        })
    }

    fn decode_body<M: Mode>(body: ReadRegion<'_>) -> M::Result<Vec<C::Value>> {
        Self::decode_body_acc::<M>(body, Vec::new())
    }

    fn decode_body_acc<M: Mode>(body: ReadRegion<'_>, acc: Vec<C::Value>) -> M::Result<Vec<C::Value>> {
        if body.is_empty() {
            return M::ok(acc);
        }
        M::and_then(C::decode::<M>(body), move |(value, rest)| {
            let mut acc = acc;
            acc.push(value);
            Self::decode_body_acc::<M>(rest, acc)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coder::Uint32;
    use crate::mode::Safe;

    #[test]
    fn packed_array_roundtrips() {
        let values = vec![1u32, 2, 300];
        let mut buf = [0u8; 16];
        let rest = Array::<Uint32>::encode::<Safe>(WriteRegion::new(&mut buf), &values).unwrap();
        let written = buf.len() - rest.len();
        let (decoded, tail) = Array::<Uint32>::decode::<Safe>(ReadRegion::new(&buf[..written])).unwrap();
        assert_eq!(decoded, values);
        assert_eq!(tail.len(), 0);
    }
}
