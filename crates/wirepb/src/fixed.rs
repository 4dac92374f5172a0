//! Fixed-width little-endian raw value codec underlying `fixed32`,
//! `fixed64`, `sfixed32`, `sfixed64`, `float`, and `double`.

use crate::mode::Mode;
use crate::region::{ReadRegion, WriteRegion};

/// A primitive whose wire representation is its raw little-endian bytes at
/// a fixed, compile-time-known width.
pub trait FixedWidth: Copy {
    /// Width in bytes on the wire.
    const SIZE: usize;
    /// The byte array type holding exactly `SIZE` bytes.
    type Bytes: Copy + AsRef<[u8]> + AsMut<[u8]> + Default;

    fn to_bytes(self) -> Self::Bytes;
    fn from_bytes(bytes: Self::Bytes) -> Self;
}

/// Declares `FixedWidth` for a primitive that already has inherent
/// `to_le_bytes`/`from_le_bytes` methods, avoiding the repetition of writing
/// the same two-line impl per scalar width.
macro_rules! impl_fixed_width {
    ($($t:ty => $n:literal),* $(,)?) => {
        $(
            impl FixedWidth for $t {
                const SIZE: usize = $n;
                type Bytes = [u8; $n];

                fn to_bytes(self) -> [u8; $n] {
                    self.to_le_bytes()
                }

                fn from_bytes(bytes: [u8; $n]) -> Self {
                    <$t>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_fixed_width!(
    u32 => 4, i32 => 4, f32 => 4,
    u64 => 8, i64 => 8, f64 => 8,
);

/// Encode `value` as `T::SIZE` raw little-endian bytes.
pub fn encode_fixed<M: Mode, T: FixedWidth>(region: WriteRegion, value: T) -> M::Result<WriteRegion> {
    region.put_slice::<M>(value.to_bytes().as_ref())
}

/// Decode a `T` from `T::SIZE` raw little-endian bytes.
pub fn decode_fixed<M: Mode, T: FixedWidth>(region: ReadRegion<'_>) -> M::Result<(T, ReadRegion<'_>)> {
    M::and_then(region.split_n::<M>(T::SIZE), |(bytes, rest)| {
        let mut buf = T::Bytes::default();
        buf.as_mut().copy_from_slice(bytes);
        M::ok((T::from_bytes(buf), rest))
    })
}
