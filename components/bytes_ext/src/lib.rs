// Copyright 2022-2023 CeresDB Project Authors. Licensed under Apache-2.0.

//! Provides fallible read/write helpers over positioned byte buffers.
//!
//! Re-exports the bytes crate so the codecs never name it directly.

// Should not use bytes crate outside of this mod so we can replace the actual
// implementations if needed.
pub use bytes::{Buf, BufMut, Bytes, BytesMut};
use snafu::{ensure, Backtrace, Snafu};

/// Max number of bytes a fixed width integer can take.
pub const MAX_INT_BYTES: usize = 8;

/// Error of SafeBuf/SafeBufMut.
///
/// We do not use `std::io::Error` because it is too large.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display(
        "Failed to fill whole buffer, needed:{}, remaining:{}.\nBacktrace:\n{}",
        needed,
        remaining,
        backtrace
    ))]
    UnexpectedEof {
        needed: usize,
        remaining: usize,
        backtrace: Backtrace,
    },

    #[snafu(display(
        "Failed to write whole buffer, needed:{}, remaining:{}.\nBacktrace:\n{}",
        needed,
        remaining,
        backtrace
    ))]
    WouldOverflow {
        needed: usize,
        remaining: usize,
        backtrace: Backtrace,
    },

    #[snafu(display(
        "Integer width must be in [1, {}], nbytes:{}.\nBacktrace:\n{}",
        MAX_INT_BYTES,
        nbytes,
        backtrace
    ))]
    InvalidIntWidth { nbytes: usize, backtrace: Backtrace },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Read bytes from a buffer.
///
/// Unlike [`bytes::Buf`], failed read operations will throw error rather than
/// panic. The cursor is left where it was when an error is returned.
pub trait SafeBuf {
    /// Copy bytes from self into dst.
    ///
    /// The cursor is advanced by the number of bytes copied.
    ///
    /// Returns error if self does not have enough remaining bytes to fill dst.
    fn try_copy_to_slice(&mut self, dst: &mut [u8]) -> Result<()>;

    /// Advance the internal cursor of the Buf
    ///
    /// Returns error if the `cnt > self.remaining()`.
    fn try_advance(&mut self, cnt: usize) -> Result<()>;

    /// Gets an unsigned 8 bit integer from self and advance current position
    fn try_get_u8(&mut self) -> Result<u8> {
        let mut buf = [0; 1];
        self.try_copy_to_slice(&mut buf)?;
        Ok(buf[0])
    }

    /// Gets a signed integer of `nbytes` bytes from self in big-endian byte
    /// order, sign-extended from the top bit of the first byte, and advance
    /// current position by `nbytes`.
    fn try_get_int(&mut self, nbytes: usize) -> Result<i64> {
        ensure!(
            (1..=MAX_INT_BYTES).contains(&nbytes),
            InvalidIntWidth { nbytes }
        );

        let mut buf = [0; MAX_INT_BYTES];
        self.try_copy_to_slice(&mut buf[MAX_INT_BYTES - nbytes..])?;
        Ok(sign_extend(u64::from_be_bytes(buf), nbytes))
    }
}

/// Write bytes to a buffer.
///
/// Unlike [`bytes::BufMut`], failed write operations will throw error rather
/// than panic. Nothing is written when an error is returned.
pub trait SafeBufMut {
    /// Write bytes into self from src, advance the buffer position
    ///
    /// Returns error if the capacity is not enough
    fn try_put(&mut self, src: &[u8]) -> Result<()>;

    /// Write an unsigned 8 bit integer to self, advance the buffer position
    fn try_put_u8(&mut self, n: u8) -> Result<()> {
        let src = [n];
        self.try_put(&src)
    }

    /// Writes the low-order `nbytes` bytes of `n` to self in big-endian byte
    /// order, advance the buffer position by `nbytes`.
    ///
    /// High-order bytes that do not fit are dropped without error.
    fn try_put_int(&mut self, n: i64, nbytes: usize) -> Result<()> {
        ensure!(
            (1..=MAX_INT_BYTES).contains(&nbytes),
            InvalidIntWidth { nbytes }
        );

        self.try_put(&n.to_be_bytes()[MAX_INT_BYTES - nbytes..])
    }
}

impl<T> SafeBufMut for T
where
    T: BufMut,
{
    fn try_put(&mut self, src: &[u8]) -> Result<()> {
        let remaining = self.remaining_mut();
        ensure!(
            remaining >= src.len(),
            WouldOverflow {
                needed: src.len(),
                remaining,
            }
        );
        self.put_slice(src);

        Ok(())
    }
}

impl<T> SafeBuf for T
where
    T: Buf,
{
    fn try_copy_to_slice(&mut self, dst: &mut [u8]) -> Result<()> {
        let remaining = self.remaining();
        ensure!(
            remaining >= dst.len(),
            UnexpectedEof {
                needed: dst.len(),
                remaining,
            }
        );
        self.copy_to_slice(dst);

        Ok(())
    }

    fn try_advance(&mut self, cnt: usize) -> Result<()> {
        let remaining = self.remaining();
        ensure!(
            remaining >= cnt,
            UnexpectedEof {
                needed: cnt,
                remaining,
            }
        );
        self.advance(cnt);

        Ok(())
    }
}

/// Sign-extend the low `nbytes` bytes of `v` to a full i64.
#[inline]
fn sign_extend(v: u64, nbytes: usize) -> i64 {
    let shift = (MAX_INT_BYTES - nbytes) * 8;
    ((v << shift) as i64) >> shift
}
