//! Non-owning byte views used by every coder.
//!
//! A [`ReadRegion`] borrows the bytes being decoded; a [`WriteRegion`] borrows
//! the caller-supplied output buffer. Neither owns or grows its storage —
//! encoding never allocates, and decoding never copies. Every split consumes
//! `self` by value and returns the advanced region alongside whatever was
//! read or the mutable slice that was carved off, so a chain of field writes
//! reads as a sequence of reassignments rather than a cursor object threaded
//! through by `&mut`.

use crate::mode::Mode;

/// A read-only view over the bytes still to be decoded.
#[derive(Debug, Clone, Copy)]
pub struct ReadRegion<'a> {
    bytes: &'a [u8],
}

impl<'a> ReadRegion<'a> {
    /// Wrap a byte slice for decoding.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Bytes remaining in the view.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the view is exhausted.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes consumed since `origin` was captured, computed from the
    /// difference in remaining length rather than pointer arithmetic.
    pub fn consumed_since(&self, origin: ReadRegion<'a>) -> usize {
        origin.bytes.len() - self.bytes.len()
    }

    /// Borrow the remaining bytes without consuming them.
    pub fn as_slice(&self) -> &'a [u8] {
        self.bytes
    }

    /// Peek the next byte without advancing.
    pub fn peek<M: Mode>(&self) -> M::Result<u8> {
        if M::CHECKED {
            match self.bytes.first() {
                Some(&b) => M::ok(b),
                None => M::err(),
            }
        } else {
            // SAFETY: Unsafe mode requires the caller to guarantee a byte remains.
            M::ok(unsafe { *self.bytes.get_unchecked(0) })
        }
    }

    /// Split off a single byte, advancing the view past it.
    pub fn split_first<M: Mode>(self) -> M::Result<(u8, Self)> {
        if M::CHECKED {
            match self.bytes.split_first() {
                Some((&b, rest)) => M::ok((b, Self { bytes: rest })),
                None => M::err(),
            }
        } else {
            // SAFETY: Unsafe mode requires the caller to guarantee a byte remains.
            unsafe {
                let b = *self.bytes.get_unchecked(0);
                let rest = self.bytes.get_unchecked(1..);
                M::ok((b, Self { bytes: rest }))
            }
        }
    }

    /// Split off the bytes of a length-delimited value whose declared length
    /// `len` arrived as a decoded `u64`. A `len` that doesn't fit `usize` (only
    /// reachable on a target narrower than 64 bits) is treated the same as a
    /// length that doesn't fit the remaining input: a bounds failure, not a
    /// silent truncating cast down to some smaller, wrong `n`.
    pub fn split_len<M: Mode>(self, len: u64) -> M::Result<(&'a [u8], Self)> {
        match usize::try_from(len) {
            Ok(n) => self.split_n::<M>(n),
            Err(_) => M::err(),
        }
    }

    /// Split off the next `n` bytes, advancing the view past them.
    pub fn split_n<M: Mode>(self, n: usize) -> M::Result<(&'a [u8], Self)> {
        if M::CHECKED {
            if self.bytes.len() < n {
                return M::err();
            }
            let (head, tail) = self.bytes.split_at(n);
            M::ok((head, Self { bytes: tail }))
        } else {
            // SAFETY: Unsafe mode requires the caller to guarantee `n` bytes remain.
            unsafe {
                let head = self.bytes.get_unchecked(..n);
                let tail = self.bytes.get_unchecked(n..);
                M::ok((head, Self { bytes: tail }))
            }
        }
    }

    /// Split off a fixed-size array of bytes.
    pub fn split_array<M: Mode, const N: usize>(self) -> M::Result<([u8; N], Self)> {
        M::and_then(self.split_n::<M>(N), |(head, rest)| {
            let mut array = [0u8; N];
            array.copy_from_slice(head);
            M::ok((array, rest))
        })
    }
}

/// A mutable view over the bytes still to be written.
#[derive(Debug)]
pub struct WriteRegion<'a> {
    bytes: &'a mut [u8],
}

impl<'a> WriteRegion<'a> {
    /// Wrap a mutable byte slice for encoding.
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self { bytes }
    }

    /// Bytes remaining in the view.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the view has no room left.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write a single byte, returning the view advanced past it.
    pub fn put<M: Mode>(mut self, value: u8) -> M::Result<Self> {
        if M::CHECKED {
            if self.bytes.is_empty() {
                return M::err();
            }
            self.bytes[0] = value;
        } else {
            // SAFETY: Unsafe mode requires the caller to guarantee a byte of room.
            unsafe {
                *self.bytes.get_unchecked_mut(0) = value;
            }
        }
        // SAFETY: `len` bytes are valid for `'a` since they came from `self.bytes`;
        // reborrowing past index 1 via a raw pointer sidesteps splitting `self.bytes`
        // into two simultaneous mutable borrows.
        let len = self.bytes.len();
        let ptr = self.bytes.as_mut_ptr();
        let tail = unsafe { std::slice::from_raw_parts_mut(ptr.add(1), len - 1) };
        M::ok(Self { bytes: tail })
    }

    /// Write `data` in full, returning the view advanced past it.
    pub fn put_slice<M: Mode>(mut self, data: &[u8]) -> M::Result<Self> {
        let n = data.len();
        if M::CHECKED {
            if self.bytes.len() < n {
                return M::err();
            }
            self.bytes[..n].copy_from_slice(data);
        } else {
            // SAFETY: Unsafe mode requires the caller to guarantee `n` bytes of room.
            unsafe {
                self.bytes.get_unchecked_mut(..n).copy_from_slice(data);
            }
        }
        let len = self.bytes.len();
        let ptr = self.bytes.as_mut_ptr();
        // SAFETY: `n <= len` was just checked (or guaranteed by the caller under
        // Unsafe mode), so `ptr.add(n) .. ptr.add(len)` stays within the allocation.
        let tail = unsafe { std::slice::from_raw_parts_mut(ptr.add(n), len - n) };
        M::ok(Self { bytes: tail })
    }

    /// Borrow the unwritten tail as a plain slice, for length bookkeeping.
    pub fn remaining_len(&self) -> usize {
        self.bytes.len()
    }
}
