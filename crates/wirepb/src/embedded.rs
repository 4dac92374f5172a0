//! Nested message coder.
//!
//! An embedded message field is a length-delimited blob exactly like a
//! `bytes` field, except its body is itself a wire-format message rather
//! than opaque bytes. `encode`/`decode` simply delegate the body to the
//! inner [`Message`] impl.

use crate::coder::Coder;
use crate::message::Message;
use crate::mode::Mode;
use crate::region::{ReadRegion, WriteRegion};
use crate::varint;
use crate::wire::WireType;

/// Coder wrapping a nested [`Message`] type `T` as a field value.
pub struct Embedded<T>(core::marker::PhantomData<T>);

impl<T: Message> Coder for Embedded<T> {
    type Value = T;
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn encode<M: Mode>(region: WriteRegion, value: &T) -> M::Result<WriteRegion> {
        let len = value.encoded_len();
        M::and_then(varint::encode_u64::<M>(region, len as u64), |region| value.encode::<M>(region))
    }

    fn decode<'a, M: Mode>(region: ReadRegion<'a>) -> M::Result<(T, ReadRegion<'a>)> {
        M::and_then(varint::decode_u64::<M>(region), |(len, rest)| {
            M::and_then(rest.split_len::<M>(len), |(body, after)| {
                M::and_then(T::decode::<M>(ReadRegion::new(body)), move |(value, _)| M::ok((value, after)))
            })
        })
    }

    fn encoded_len(value: &T) -> usize {
        let len = value.encoded_len();
        varint::encoded_len_u64(len as u64) + len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Cardinality, FieldMeta};
    use crate::mode::Safe;

    #[derive(Debug, Default, PartialEq)]
    struct Inner {
        id: Option<i32>,
    }

    impl Message for Inner {
        const FIELDS: &'static [FieldMeta] =
            &[FieldMeta { name: "id", tag: 1, wire_type: WireType::Varint, cardinality: Cardinality::Singular }];

        fn encode<M: Mode>(&self, region: WriteRegion) -> M::Result<WriteRegion> {
            crate::field::encode_singular::<M, crate::coder::Int32>(region, 1, &self.id)
        }

        fn decode<'a, M: Mode>(region: ReadRegion<'a>) -> M::Result<(Self, ReadRegion<'a>)> {
            crate::field::decode_loop::<M, Inner, _>(region, Inner::default(), |tag, wire_type, rest, mut acc| {
                match tag {
                    1 => M::and_then(crate::coder::Int32::decode::<M>(rest), move |(v, rest)| {
                        acc.id = Some(v);
                        M::ok((acc, rest))
                    }),
                    _ => M::and_then(crate::skip::skip_value::<M>(rest, wire_type), move |rest| M::ok((acc, rest))),
                }
            })
        }

        fn encoded_len(&self) -> usize {
            crate::field::singular_len::<crate::coder::Int32>(1, &self.id)
        }

        fn merge(&mut self, other: Self) {
            crate::field::merge_singular(&mut self.id, &other.id);
        }

        fn for_each<F: FnMut(FieldMeta, Option<crate::reflect::FieldValue>)>(&self, mut f: F) {
            f(Self::FIELDS[0], self.id.map(crate::reflect::FieldValue::I32));
        }
    }

    #[test]
    fn embedded_message_roundtrips() {
        let inner = Inner { id: Some(42) };
        let mut buf = [0u8; 8];
        let rest = Embedded::<Inner>::encode::<Safe>(WriteRegion::new(&mut buf), &inner).unwrap();
        let written = buf.len() - rest.len();
        let (decoded, tail) = Embedded::<Inner>::decode::<Safe>(ReadRegion::new(&buf[..written])).unwrap();
        assert_eq!(decoded, inner);
        assert_eq!(tail.len(), 0);
    }
}
