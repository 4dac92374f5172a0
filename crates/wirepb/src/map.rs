//! Map fields.
//!
//! protobuf has no dedicated map wire type: a `map<K, V>` field is sugar
//! for a repeated field of a synthetic two-field message `{ K key = 1; V
//! value = 2; }`. [`MapEntry`] encodes/decodes that synthetic message, and
//! the free functions in this module repeat it once per map entry, the way
//! [`crate::field::encode_repeated`] repeats a plain scalar. The one
//! difference from a plain repeated field: decoding coalesces entries by
//! key, with a later entry overwriting an earlier one that shares a key,
//! rather than appending unconditionally.

use std::collections::HashMap;
use std::hash::Hash;

use crate::coder::Coder;
use crate::mode::Mode;
use crate::region::{ReadRegion, WriteRegion};
use crate::varint;
use crate::wire::{self, WireType};

/// The synthetic `{ key = 1; value = 2; }` message a map entry encodes as.
pub struct MapEntry<KC, VC>(core::marker::PhantomData<(KC, VC)>);

impl<KC, VC> MapEntry<KC, VC>
where
    KC: Coder,
    VC: Coder,
    KC::Value: Default,
    VC::Value: Default,
{
    fn encode_entry<M: Mode>(region: WriteRegion, key: &KC::Value, value: &VC::Value) -> M::Result<WriteRegion> {
        M::and_then(wire::encode_key::<M>(region, 1, KC::WIRE_TYPE), |region| {
            M::and_then(KC::encode::<M>(region, key), |region| {
                M::and_then(wire::encode_key::<M>(region, 2, VC::WIRE_TYPE), |region| {
                    VC::encode::<M>(region, value)
                })
            })
        })
    }

    fn entry_len(key: &KC::Value, value: &VC::Value) -> usize {
        varint::encoded_len_u64(wire::field_key(1, KC::WIRE_TYPE))
            + KC::encoded_len(key)
            + varint::encoded_len_u64(wire::field_key(2, VC::WIRE_TYPE))
            + VC::encoded_len(value)
    }

    fn decode_entry<'a, M: Mode>(region: ReadRegion<'a>) -> M::Result<((KC::Value, VC::Value), ReadRegion<'a>)> {
        let acc: (Option<KC::Value>, Option<VC::Value>) = (None, None);
        M::and_then(
            crate::field::decode_loop::<M, _, _>(region, acc, |tag, wire_type, rest, (key, value)| match tag {
                1 => M::and_then(KC::decode::<M>(rest), move |(k, rest)| M::ok(((Some(k), value), rest))),
                2 => M::and_then(VC::decode::<M>(rest), move |(v, rest)| M::ok(((key, Some(v)), rest))),
                _ => M::and_then(crate::skip::skip_value::<M>(rest, wire_type), move |rest| {
                    M::ok(((key, value), rest))
                }),
            }),
            |((key, value), rest)| M::ok(((key.unwrap_or_default(), value.unwrap_or_default()), rest)),
        )
    }
}

/// Bytes a map field with tag `tag` would occupy.
pub fn encoded_len<KC, VC>(tag: u32, map: &HashMap<KC::Value, VC::Value>) -> usize
where
    KC: Coder,
    VC: Coder,
    KC::Value: Default + Eq + Hash,
    VC::Value: Default,
{
    let key_len = varint::encoded_len_u64(wire::field_key(tag, WireType::LengthDelimited));
    map.iter()
        .map(|(k, v)| {
            let body = MapEntry::<KC, VC>::entry_len(k, v);
            key_len + varint::encoded_len_u64(body as u64) + body
        })
        .sum()
}

/// Encode every entry of `map` as a repeated field with tag `tag`.
pub fn encode_field<M, KC, VC>(
    region: WriteRegion,
    tag: u32,
    map: &HashMap<KC::Value, VC::Value>,
) -> M::Result<WriteRegion>
where
    M: Mode,
    KC: Coder,
    VC: Coder,
    KC::Value: Default,
    VC::Value: Default,
{
    let entries: Vec<(&KC::Value, &VC::Value)> = map.iter().collect();
    encode_entries::<M, KC, VC>(region, tag, &entries)
}

fn encode_entries<M, KC, VC>(
    region: WriteRegion,
    tag: u32,
    entries: &[(&KC::Value, &VC::Value)],
) -> M::Result<WriteRegion>
where
    M: Mode,
    KC: Coder,
    VC: Coder,
    KC::Value: Default,
    VC::Value: Default,
{
    match entries.split_first() {
        None => M::ok(region),
        Some((&(key, value), rest)) => {
            let body_len = MapEntry::<KC, VC>::entry_len(key, value);
            M::and_then(wire::encode_key::<M>(region, tag, WireType::LengthDelimited), |region| {
                M::and_then(varint::encode_u64::<M>(region, body_len as u64), |region| {
                    M::and_then(MapEntry::<KC, VC>::encode_entry::<M>(region, key, value), |region| {
                        encode_entries::<M, KC, VC>(region, tag, rest)
                    })
                })
            })
        }
    }
}

/// Decode and fold one map entry with tag `tag` into `map`, overwriting any
/// existing value for the same key.
pub fn decode_field<'a, M, KC, VC>(
    region: ReadRegion<'a>,
    mut map: HashMap<KC::Value, VC::Value>,
) -> M::Result<(HashMap<KC::Value, VC::Value>, ReadRegion<'a>)>
where
    M: Mode,
    KC: Coder,
    VC: Coder,
    KC::Value: Default + Eq + Hash,
    VC::Value: Default,
{
    M::and_then(varint::decode_u64::<M>(region), |(len, rest)| {
        M::and_then(rest.split_len::<M>(len), move |(body, after)| {
            M::and_then(MapEntry::<KC, VC>::decode_entry::<M>(ReadRegion::new(body)), move |((k, v), _)| {
                map.insert(k, v);
                M::ok((map, after))
            })
        })
    })
}
