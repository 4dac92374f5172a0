//! The `Message` contract every `#[derive(Message)]` struct implements.
//!
//! wirepb has no runtime schema object: a message's shape is entirely
//! compile-time (the struct's fields and their `#[wire(...)]` attributes),
//! and `#[derive(Message)]` expands directly into an `impl Message for
//! TheStruct` that calls into [`crate::field`] once per field. This module
//! only defines the contract and the convenience entry points built on top
//! of it; it has no knowledge of any particular message.

use crate::error::{Error, Result};
use crate::field::FieldMeta;
use crate::mode::{Mode, Safe};
use crate::reflect::FieldValue;
use crate::region::{ReadRegion, WriteRegion};

/// A compile-time-declared protobuf message.
pub trait Message: Sized {
    /// Static metadata for every field this message declares, in
    /// declaration order.
    const FIELDS: &'static [FieldMeta];

    /// Encode every present field into `region`, returning the unwritten
    /// tail.
    fn encode<M: Mode>(&self, region: WriteRegion) -> M::Result<WriteRegion>;

    /// Decode fields from `region` until it is exhausted. Field keys this
    /// message doesn't declare a tag for are skipped via
    /// [`crate::skip::skip_value`] rather than rejected, so a message can
    /// still read data written by a schema with extra fields.
    fn decode<'a, M: Mode>(region: ReadRegion<'a>) -> M::Result<(Self, ReadRegion<'a>)>;

    /// Total bytes `self` would occupy on the wire.
    fn encoded_len(&self) -> usize;

    /// Merge `other`'s fields into `self`, field by field, using each
    /// field's cardinality-appropriate rule: a singular field in `other`
    /// overwrites `self`'s only when present, repeated fields concatenate,
    /// and map fields overwrite per overlapping key.
    fn merge(&mut self, other: Self);

    /// Visit every field in `FIELDS` order, passing each its static metadata
    /// alongside an owned snapshot of its current value. A field whose kind
    /// has no lossless [`FieldValue`] variant (`enum`, nested `message`,
    /// `map`) is still visited, with `None` in place of a value, so every
    /// entry of `FIELDS` is visited exactly once.
    fn for_each<F: FnMut(FieldMeta, Option<FieldValue>)>(&self, f: F);

    /// Left-fold over every field, threading an accumulator through
    /// [`Message::for_each`] in declaration order.
    fn fold<Acc, F>(&self, init: Acc, mut f: F) -> Acc
    where
        F: FnMut(Acc, FieldMeta, Option<FieldValue>) -> Acc,
    {
        let mut acc = Some(init);
        self.for_each(|meta, value| {
            let current = acc.take().expect("for_each visits fields one at a time");
            acc = Some(f(current, meta, value));
        });
        acc.expect("for_each visited at least zero fields, acc is always restored")
    }
}

/// Encode `message` into a fresh `Vec<u8>` sized to fit exactly.
///
/// This is the ergonomic entry point for callers that don't need to
/// pre-size their own buffer or choose a `Mode`; it always runs
/// bounds-checked (`Safe`) since the buffer it allocates is guaranteed
/// large enough and the check is a cheap, non-generic formality here.
pub fn encode_to_vec<T: Message>(message: &T) -> Vec<u8> {
    let mut buf = vec![0u8; message.encoded_len()];
    let rest = message
        .encode::<Safe>(WriteRegion::new(&mut buf))
        .expect("encoded_len() undersized the buffer it reported");
    let written = buf.len() - rest.len();
    buf.truncate(written);
    buf
}

/// Encode `message` into a caller-supplied buffer, writing bounds-checked
/// (`Safe`) since the whole point of this entry point is the caller wants a
/// real error instead of undefined behavior when `buf` turns out too small.
pub fn encode_to_slice<T: Message>(message: &T, buf: &mut [u8]) -> Result<usize> {
    let capacity = buf.len();
    match message.encode::<Safe>(WriteRegion::new(buf)) {
        Some(rest) => Ok(capacity - rest.len()),
        None => Err(Error::BufferFull),
    }
}

/// Decode a `T` from the entirety of `bytes`.
///
/// Trailing bytes after a fully-decoded message are tolerated only in the
/// sense that nested embedded messages bound their own region; at the top
/// level, any remaining bytes are simply not consumed by this call (the
/// generated `decode` reads exactly one message's worth of fields from the
/// region it was given, which here is the whole input).
pub fn decode_from_slice<T: Message>(bytes: &[u8]) -> Result<T> {
    match T::decode::<Safe>(ReadRegion::new(bytes)) {
        Some((value, _rest)) => Ok(value),
        None => Err(Error::Truncated),
    }
}
