//! Field-level encode/decode/merge helpers shared by every message.
//!
//! A message does not hand-roll per-field wire logic; the derive macro
//! emits calls into this module for each field, keyed on the field's
//! declared [`Cardinality`]. The functions here own proto3's "absent value
//! is never written" rule: a `None` singular field and an empty repeated
//! field both encode to zero bytes.

use crate::coder::Coder;
use crate::mode::Mode;
use crate::region::{ReadRegion, WriteRegion};
use crate::wire::{self, WireType};

/// How many values a field may hold and how they're laid out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// At most one value; absent values are never written.
    Singular,
    /// Zero or more values, each preceded by its own field key.
    Repeated,
    /// Zero or more values of a non-length-delimited coder, sharing a
    /// single length prefix instead of one key per element.
    Packed,
    /// Zero or more key/value pairs, each encoded as a two-field embedded
    /// message (see [`crate::map`]).
    Map,
}

/// Compile-time field lookup keyed by wire tag.
///
/// This is distinct from [`crate::reflect::Reflect`]'s runtime-keyed lookup:
/// `#[derive(Message)]` emits one `impl FieldByTag<TAG>` per declared field,
/// so calling `FieldByTag::<TAG>::field(&message)` for a tag the message
/// never declared is a missing-trait-impl compile error at the call site,
/// not a `None` discovered after the fact at runtime.
pub trait FieldByTag<const TAG: u32> {
    /// The field's declared Rust type (`Option<V>`, `Vec<V>`, or
    /// `HashMap<K, V>`, matching its cardinality).
    type Value;

    fn field(&self) -> &Self::Value;
}

/// Compile-time field lookup keyed by name.
///
/// Stable Rust has no const generic parameter for `&'static str`, so each
/// field is keyed by a distinct zero-sized marker type instead of a name
/// value; `#[derive(Message)]` generates one marker type per field (in a
/// module named after the struct) alongside one `impl FieldByName<Marker>`.
/// Referencing an unknown marker, or one from a different message, is
/// rejected the same way as [`FieldByTag`]: at the call site, by the
/// compiler, because no such impl exists.
pub trait FieldByName<Marker> {
    type Value;

    fn field(&self) -> &Self::Value;
}

/// Static, per-field metadata exposed to the reflection layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMeta {
    pub name: &'static str,
    pub tag: u32,
    pub wire_type: WireType,
    pub cardinality: Cardinality,
}

/// Encode a singular field: write nothing if `value` is absent, otherwise
/// the field key followed by the value.
pub fn encode_singular<M: Mode, C: Coder>(
    region: WriteRegion,
    tag: u32,
    value: &Option<C::Value>,
) -> M::Result<WriteRegion> {
    match value {
        None => M::ok(region),
        Some(v) => M::and_then(wire::encode_key::<M>(region, tag, C::WIRE_TYPE), |region| {
            C::encode::<M>(region, v)
        }),
    }
}

/// Encode an unpacked-repeated field: re-emit the field key before every
/// element.
pub fn encode_repeated<M: Mode, C: Coder>(
    region: WriteRegion,
    tag: u32,
    values: &[C::Value],
) -> M::Result<WriteRegion> {
    match values.split_first() {
        None => M::ok(region),
        Some((first, rest)) => M::and_then(wire::encode_key::<M>(region, tag, C::WIRE_TYPE), |region| {
            M::and_then(C::encode::<M>(region, first), |region| {
                encode_repeated::<M, C>(region, tag, rest)
            })
        }),
    }
}

/// Encode a packed-repeated field: one field key, one length prefix, every
/// element back to back.
pub fn encode_packed<M: Mode, C: Coder>(
    region: WriteRegion,
    tag: u32,
    values: &[C::Value],
) -> M::Result<WriteRegion> {
    if values.is_empty() {
        return M::ok(region);
    }
    M::and_then(wire::encode_key::<M>(region, tag, WireType::LengthDelimited), |region| {
        crate::array::Array::<C>::encode::<M>(region, values)
    })
}

/// Bytes a singular field would occupy, `0` if absent.
pub fn singular_len<C: Coder>(tag: u32, value: &Option<C::Value>) -> usize {
    match value {
        None => 0,
        Some(v) => crate::varint::encoded_len_u64(wire::field_key(tag, C::WIRE_TYPE)) + C::encoded_len(v),
    }
}

/// Bytes an unpacked-repeated field would occupy.
pub fn repeated_len<C: Coder>(tag: u32, values: &[C::Value]) -> usize {
    let key_len = crate::varint::encoded_len_u64(wire::field_key(tag, C::WIRE_TYPE));
    values.iter().map(|v| key_len + C::encoded_len(v)).sum()
}

/// Bytes a packed-repeated field would occupy, `0` if `values` is empty.
pub fn packed_len<C: Coder>(tag: u32, values: &[C::Value]) -> usize {
    if values.is_empty() {
        return 0;
    }
    let key_len = crate::varint::encoded_len_u64(wire::field_key(tag, WireType::LengthDelimited));
    key_len + crate::array::Array::<C>::encoded_len(values)
}

/// Drives a message's field-decode loop: reads one field key at a time and
/// routes it to `on_field`, recursing until the region is exhausted.
///
/// A decoded field number of `0` is treated as end-of-stream rather than a
/// field to dispatch, and the key's bytes are left unconsumed in the
/// returned tail. This is not a standard protobuf rule; it is a convention
/// this codec's wire format carries over and preserves for compatibility.
pub fn decode_loop<'a, M, Acc, F>(region: ReadRegion<'a>, acc: Acc, on_field: F) -> M::Result<(Acc, ReadRegion<'a>)>
where
    M: Mode,
    F: Fn(u32, WireType, ReadRegion<'a>, Acc) -> M::Result<(Acc, ReadRegion<'a>)> + Copy,
{
    if region.is_empty() {
        return M::ok((acc, region));
    }
    M::and_then(wire::decode_key::<M>(region), move |(tag, wire_type, rest)| match tag {
        0 => M::ok((acc, region)),
        _ => M::and_then(on_field(tag, wire_type, rest, acc), move |(acc, rest)| {
            decode_loop::<M, Acc, F>(rest, acc, on_field)
        }),
    })
}

/// `true` if any two entries of `fields` declare the same tag. Used by
/// `#[derive(Message)]` to emit a `const _: () = assert!(...)` at the
/// derived impl's definition site, turning a duplicate tag into a compile
/// error rather than a silent field collision at runtime.
pub const fn has_duplicate_tags(fields: &[FieldMeta]) -> bool {
    let mut i = 0;
    while i < fields.len() {
        let mut j = i + 1;
        while j < fields.len() {
            if fields[i].tag == fields[j].tag {
                return true;
            }
            j += 1;
        }
        i += 1;
    }
    false
}

/// Merge a singular field: overwrite `dst` only when `src` holds a value,
/// matching protobuf's "an unset source field never clobbers" merge rule.
pub fn merge_singular<V: Clone>(dst: &mut Option<V>, src: &Option<V>) {
    if let Some(v) = src {
        *dst = Some(v.clone());
    }
}

/// Merge a repeated field: append every element of `src` after `dst`'s.
pub fn merge_repeated<V: Clone>(dst: &mut Vec<V>, src: &[V]) {
    dst.extend(src.iter().cloned());
}

/// Merge a map field: entries from `src` overwrite `dst` entries sharing
/// the same key; everything else is left as-is.
pub fn merge_map<K, V>(dst: &mut std::collections::HashMap<K, V>, src: &std::collections::HashMap<K, V>)
where
    K: std::hash::Hash + Eq + Clone,
    V: Clone,
{
    for (k, v) in src {
        dst.insert(k.clone(), v.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coder::Uint32;
    use crate::mode::Safe;

    #[test]
    fn singular_absent_encodes_to_nothing() {
        let mut buf = [0u8; 8];
        let value: Option<u32> = None;
        let rest = encode_singular::<Safe, Uint32>(WriteRegion::new(&mut buf), 1, &value).unwrap();
        assert_eq!(rest.len(), 8);
    }

    #[test]
    fn singular_present_encodes_key_then_value() {
        let mut buf = [0u8; 8];
        let value = Some(150u32);
        let rest = encode_singular::<Safe, Uint32>(WriteRegion::new(&mut buf), 1, &value).unwrap();
        let written = buf.len() - rest.len();
        // key = (1 << 3) | 0 = 0x08, then varint(150) = [0x96, 0x01]
        assert_eq!(&buf[..written], &[0x08, 0x96, 0x01]);
    }

    #[test]
    fn merge_singular_ignores_absent_source() {
        let mut dst = Some(1u32);
        merge_singular(&mut dst, &None);
        assert_eq!(dst, Some(1));
        merge_singular(&mut dst, &Some(2));
        assert_eq!(dst, Some(2));
    }

    #[test]
    fn has_duplicate_tags_detects_collision() {
        let distinct = [
            FieldMeta { name: "a", tag: 1, wire_type: WireType::Varint, cardinality: Cardinality::Singular },
            FieldMeta { name: "b", tag: 2, wire_type: WireType::Varint, cardinality: Cardinality::Singular },
        ];
        assert!(!has_duplicate_tags(&distinct));

        let colliding = [
            FieldMeta { name: "a", tag: 1, wire_type: WireType::Varint, cardinality: Cardinality::Singular },
            FieldMeta { name: "b", tag: 1, wire_type: WireType::Varint, cardinality: Cardinality::Singular },
        ];
        assert!(has_duplicate_tags(&colliding));
    }

    #[test]
    fn repeated_len_matches_encoded_bytes() {
        let values = vec![1u32, 300];
        let mut buf = [0u8; 16];
        let rest = encode_repeated::<Safe, Uint32>(WriteRegion::new(&mut buf), 2, &values).unwrap();
        let written = buf.len() - rest.len();
        assert_eq!(repeated_len::<Uint32>(2, &values), written);
    }

    /// Marker types `#[derive(Message)]` would generate for `Point`'s two
    /// fields, standing in for derive-generated code the way `message.rs`'s
    /// `Point` test impl stands in for a full `Message` impl.
    mod point_fields {
        pub struct X;
        pub struct Y;
    }

    struct Point {
        x: Option<i32>,
        y: Option<i32>,
    }

    impl FieldByTag<1> for Point {
        type Value = Option<i32>;
        fn field(&self) -> &Self::Value {
            &self.x
        }
    }
    impl FieldByTag<2> for Point {
        type Value = Option<i32>;
        fn field(&self) -> &Self::Value {
            &self.y
        }
    }
    impl FieldByName<point_fields::X> for Point {
        type Value = Option<i32>;
        fn field(&self) -> &Self::Value {
            &self.x
        }
    }
    impl FieldByName<point_fields::Y> for Point {
        type Value = Option<i32>;
        fn field(&self) -> &Self::Value {
            &self.y
        }
    }

    #[test]
    fn field_by_tag_and_name_select_the_declared_field() {
        let p = Point { x: Some(1), y: Some(2) };
        assert_eq!(*FieldByTag::<1>::field(&p), Some(1));
        assert_eq!(*FieldByTag::<2>::field(&p), Some(2));
        assert_eq!(*FieldByName::<point_fields::X>::field(&p), Some(1));
        assert_eq!(*FieldByName::<point_fields::Y>::field(&p), Some(2));
        // A call site naming an undeclared tag or an unrelated marker type,
        // e.g. `FieldByTag::<3>::field(&p)`, is a missing-impl compile error,
        // not a value this test could observe at runtime.
    }
}
