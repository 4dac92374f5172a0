//! A Protocol Buffers wire-format codec kernel over compile-time field lists.
//!
//! There is no `.proto` frontend and no runtime schema object here: a
//! message is a plain Rust struct whose shape — field tags, wire types,
//! cardinality — is fixed at compile time, either by hand-implementing
//! [`Message`] or by `#[derive(Message)]` (enabled by the `derive` feature,
//! on by default). Encoding writes into a caller-supplied [`WriteRegion`]
//! and never allocates on its own; decoding reads from a borrowed
//! [`ReadRegion`] and never copies except where the wire format itself
//! demands an owned value (`String`, `Vec<u8>`, a nested message).
//!
//! Every region-bounded operation is generic over a [`Mode`]: [`Safe`]
//! bounds-checks every read and write and reports failure as `None`;
//! [`Unsafe`] skips the check in exchange for the caller guaranteeing the
//! region is big enough, exactly once, at the type level.

pub mod array;
pub mod coder;
pub mod embedded;
pub mod error;
pub mod field;
pub mod fixed;
pub mod map;
pub mod message;
pub mod mode;
pub mod reflect;
pub mod region;
pub mod skip;
pub mod varint;
pub mod wire;

pub use error::{Error, Result};
pub use message::{decode_from_slice, encode_to_vec, Message};
pub use mode::{Mode, Safe, Unsafe};
pub use region::{ReadRegion, WriteRegion};

#[cfg(feature = "derive")]
pub use wirepb_derive::Message;
