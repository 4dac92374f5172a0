//! Cross-module scenarios exercising `#[derive(Message)]`-generated code
//! against known-good wire bytes, rather than one codec in isolation.

use std::collections::HashMap;

use wirepb::coder::{Coder, Sint32};
use wirepb::varint::ZigZag;
use wirepb::{decode_from_slice, encode_to_vec, Message, ReadRegion, Safe, Unsafe, WriteRegion};

#[derive(Debug, Default, Clone, PartialEq, wirepb::Message)]
struct VarintSmall {
    #[wire(tag = 1, kind = "uint32")]
    value: Option<u32>,
}

#[test]
fn varint_small_matches_known_bytes() {
    let m = VarintSmall { value: Some(150) };
    let bytes = encode_to_vec(&m);
    assert_eq!(bytes, vec![0x08, 0x96, 0x01]);
    let back: VarintSmall = decode_from_slice(&bytes).unwrap();
    assert_eq!(back, m);
}

#[test]
fn field_number_zero_is_treated_as_end_of_stream() {
    // A trailing field-number-0 key, followed by bytes that would be
    // garbage if parsed as a field, must stop the decode loop before
    // consuming it rather than erroring or reading past it.
    let bytes = [0x08u8, 0x96, 0x01, 0x00, 0xff, 0xff];
    let (decoded, tail) = VarintSmall::decode::<Safe>(ReadRegion::new(&bytes)).unwrap();
    assert_eq!(decoded, VarintSmall { value: Some(150) });
    assert_eq!(tail.as_slice(), &bytes[3..]);
}

#[test]
fn unsafe_mode_roundtrips_with_a_sufficiently_sized_buffer() {
    let m = VarintSmall { value: Some(150) };
    let mut buf = [0u8; 3];
    let _rest = m.encode::<Unsafe>(WriteRegion::new(&mut buf));
    let (decoded, _tail) = VarintSmall::decode::<Unsafe>(ReadRegion::new(&buf));
    assert_eq!(decoded, m);
}

#[test]
fn zigzag_minus_one_and_ten_thousand() {
    assert_eq!((-1i32).zig(), 1u32);
    assert_eq!(10000i32.zig(), 20000u32);

    // A fixed 4-byte buffer leaves one byte of slack that's never written;
    // the minimal (and only valid) varint encoding of 20000 is the 3 bytes
    // below.
    let mut buf = [0u8; 4];
    let rest = Sint32::encode::<Safe>(WriteRegion::new(&mut buf), &10000).unwrap();
    let written = buf.len() - rest.len();
    assert_eq!(&buf[..written], &[0xa0, 0x9c, 0x01]);

    let (v, _) = Sint32::decode::<Safe>(ReadRegion::new(&buf[..written])).unwrap();
    assert_eq!(v, 10000);
}

#[derive(Debug, Default, Clone, PartialEq, wirepb::Message)]
struct Mixed {
    #[wire(tag = 1, kind = "fixed32")]
    a: Option<u32>,
    #[wire(tag = 2, kind = "string")]
    b: Option<String>,
    #[wire(tag = 4, kind = "float")]
    c: Option<f32>,
    #[wire(tag = 100, kind = "sint32")]
    d: Option<i32>,
}

fn mixed_example() -> Mixed {
    Mixed { a: Some(12), b: Some("345".to_owned()), c: Some(6.78), d: Some(90) }
}

const MIXED_BYTES: [u8; 19] = [
    0x0d, 0x0c, 0x00, 0x00, 0x00, //
    0x12, 0x03, b'3', b'4', b'5', //
    0x25, 0xc3, 0xf5, 0xd8, 0x40, //
    0xa0, 0x06, 0xb4, 0x01,
];

#[test]
fn mixed_message_matches_known_bytes() {
    let m = mixed_example();
    let bytes = encode_to_vec(&m);
    assert_eq!(bytes, MIXED_BYTES);
    let back: Mixed = decode_from_slice(&bytes).unwrap();
    assert_eq!(back, m);
}

#[test]
fn merge_with_default_is_identity() {
    let mut m = mixed_example();
    let before = m.clone();
    m.merge(Mixed::default());
    assert_eq!(m, before);
}

#[test]
fn safe_mode_decode_fails_on_any_truncation() {
    let bytes = encode_to_vec(&mixed_example());
    for cut in 1..=bytes.len() {
        let truncated = &bytes[..bytes.len() - cut];
        assert!(decode_from_slice::<Mixed>(truncated).is_err(), "truncating by {cut} byte(s) unexpectedly decoded");
    }
}

#[derive(Debug, Default, Clone, PartialEq, wirepb::Message)]
struct Narrow {
    #[wire(tag = 1, kind = "fixed32")]
    a: Option<u32>,
    #[wire(tag = 2, kind = "string")]
    b: Option<String>,
    #[wire(tag = 4, kind = "float")]
    c: Option<f32>,
}

#[test]
fn decode_skips_unknown_field_tags() {
    // tag 21, wire type fixed32: (21 << 3) | 5 = 0xad, value 0 (4 bytes).
    let mut bytes = vec![0xad, 0x00, 0x00, 0x00, 0x00];
    bytes.extend_from_slice(&MIXED_BYTES[..15]); // the fixed32/string/float fields, no zigzag tail
    let decoded: Narrow = decode_from_slice(&bytes).unwrap();
    assert_eq!(decoded, Narrow { a: Some(12), b: Some("345".to_owned()), c: Some(6.78) });
}

#[derive(Debug, Default, Clone, PartialEq, wirepb::Message)]
struct RepeatedUnpacked {
    #[wire(tag = 10, kind = "fixed32")]
    ints: Vec<u32>,
    #[wire(tag = 5, kind = "float")]
    floats: Vec<f32>,
}

#[test]
fn repeated_unpacked_matches_known_bytes() {
    let m = RepeatedUnpacked { ints: vec![1, 2, 3], floats: vec![1.2, 3.4e5] };
    let bytes = encode_to_vec(&m);
    assert_eq!(
        bytes,
        vec![
            0x55, 0x01, 0x00, 0x00, 0x00, //
            0x55, 0x02, 0x00, 0x00, 0x00, //
            0x55, 0x03, 0x00, 0x00, 0x00, //
            0x2d, 0x9a, 0x99, 0x99, 0x3f, //
            0x2d, 0x00, 0x04, 0xa6, 0x48,
        ]
    );
    let back: RepeatedUnpacked = decode_from_slice(&bytes).unwrap();
    assert_eq!(back, m);
}

#[derive(Debug, Default, Clone, PartialEq, wirepb::Message)]
struct PackedInts {
    #[wire(tag = 1, kind = "uint32", packed)]
    values: Vec<u32>,
}

#[test]
fn packed_repeated_shares_one_length_prefix() {
    let m = PackedInts { values: vec![1, 2, 300] };
    let bytes = encode_to_vec(&m);
    // key (1 << 3) | 2 = 0x0a, one length prefix, then the three varints
    // back to back with no repeated field key.
    assert_eq!(bytes[0], 0x0a);
    let back: PackedInts = decode_from_slice(&bytes).unwrap();
    assert_eq!(back, m);
}

#[derive(Debug, Default, Clone, PartialEq, wirepb::Message)]
struct Student {
    #[wire(tag = 1, kind = "uint32")]
    id: Option<u32>,
    #[wire(tag = 3, kind = "string")]
    name: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, wirepb::Message)]
struct Class {
    #[wire(tag = 8, kind = "string")]
    name: Option<String>,
    #[wire(tag = 3, kind = "message")]
    students: Vec<Student>,
}

#[test]
fn nested_class_roundtrips_to_forty_five_bytes() {
    let tom = Student { id: Some(456), name: Some("tom".to_owned()) };
    let jerry = Student { id: Some(123456), name: Some("jerry".to_owned()) };
    let twice = Student { id: Some(123), name: Some("twice".to_owned()) };
    let my_class = Class { name: Some("class 101".to_owned()), students: vec![tom, jerry, twice] };

    let bytes = encode_to_vec(&my_class);
    assert_eq!(bytes.len(), 45);

    let your_class: Class = decode_from_slice(&bytes).unwrap();
    assert_eq!(your_class, my_class);
    assert_eq!(your_class.students[1].name.as_deref(), Some("jerry"));
    assert_eq!(your_class.students[2].name.as_deref(), Some("twice"));
}

#[derive(Debug, Default, Clone, PartialEq, wirepb::Message)]
struct Tally {
    #[wire(tag = 1, kind = "map", key_kind = "uint32", value_kind = "string")]
    counts: HashMap<u32, String>,
}

#[test]
fn map_field_coalesces_duplicate_keys_on_decode() {
    let mut first_map = HashMap::new();
    first_map.insert(1u32, "first".to_owned());
    let first_bytes = encode_to_vec(&Tally { counts: first_map });

    let mut second_map = HashMap::new();
    second_map.insert(1u32, "second".to_owned());
    let second_bytes = encode_to_vec(&Tally { counts: second_map });

    let mut combined = first_bytes;
    combined.extend_from_slice(&second_bytes);

    let decoded: Tally = decode_from_slice(&combined).unwrap();
    assert_eq!(decoded.counts.len(), 1);
    assert_eq!(decoded.counts.get(&1), Some(&"second".to_owned()));
}

#[test]
fn map_field_with_distinct_keys_roundtrips_whole() {
    let mut map = HashMap::new();
    map.insert(1u32, "one".to_owned());
    map.insert(2u32, "two".to_owned());
    let m = Tally { counts: map.clone() };

    let bytes = encode_to_vec(&m);
    let back: Tally = decode_from_slice(&bytes).unwrap();
    assert_eq!(back.counts, map);
}
