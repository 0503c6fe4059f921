// Copyright 2022-2023 CeresDB Project Authors. Licensed under Apache-2.0.

//! Fixed width integer codec.
//!
//! Layout of a value encoded with width `w`:
//! ```plaintext
//! +---------------------------------------------------+
//! | low-order w bytes of the i64, big-endian (w bytes) |
//! +---------------------------------------------------+
//! ```
//! The pattern `0x80 0x00 .. 0x00` is reserved for NULL, so the usable domain
//! is `[-(2^(8w-1)) + 1, 2^(8w-1) - 1]`.
//!
//! Literals outside the usable domain are not rejected: only their low-order
//! `w` bytes are kept. A truncated value whose pattern equals the NULL
//! sentinel decodes as NULL.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes_ext::{SafeBuf, SafeBufMut};
use log::warn;
use snafu::{ensure, ResultExt};

use crate::{
    consts::{MAX_WIDTH, MIN_WIDTH, NULL_PATTERN, WARN_EVERY_HITS},
    serializer::IntegerSerializer,
    value::Value,
    DecodeValue, EncodeValue, InsufficientSpace, InvalidWidth, Result,
};

static TRUNCATE_HITS: AtomicU64 = AtomicU64::new(0);
static NULL_COLLISION_HITS: AtomicU64 = AtomicU64::new(0);

/// Whether `bytes` is the null sentinel of width `bytes.len()`.
///
/// Any width in `[1, 8]` is recognized.
pub fn is_null_pattern(bytes: &[u8]) -> bool {
    (MIN_WIDTH..=MAX_WIDTH).contains(&bytes.len()) && bytes == &NULL_PATTERN[..bytes.len()]
}

/// Codec mapping a nullable i64 to exactly `width` bytes.
///
/// The codec is just its width, so copy it freely across columns and
/// threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedWidthIntCodec {
    width: usize,
}

impl FixedWidthIntCodec {
    /// Create a codec of `width` bytes, `width` must be in `[1, 8]`.
    pub fn try_new(width: usize) -> Result<Self> {
        ensure!(
            (MIN_WIDTH..=MAX_WIDTH).contains(&width),
            InvalidWidth { width }
        );

        Ok(Self { width })
    }

    /// Number of bytes every encoded value takes, NULL included.
    #[inline]
    pub fn length_of_encoding(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn null_pattern(&self) -> &'static [u8] {
        &NULL_PATTERN[..self.width]
    }

    /// Largest value that survives a round trip.
    #[inline]
    pub fn max_value(&self) -> i64 {
        i64::MAX >> ((MAX_WIDTH - self.width) * 8)
    }

    /// Smallest value that survives a round trip, one above the two's
    /// complement minimum which is taken by NULL.
    #[inline]
    pub fn min_value(&self) -> i64 {
        -self.max_value()
    }

    /// Encode a decimal literal, or NULL if `input` is `None`, into
    /// `output[offset..offset + width]`.
    ///
    /// On error nothing is written.
    pub fn encode(&self, input: Option<&[u8]>, output: &mut [u8], offset: usize) -> Result<()> {
        let value = match input {
            Some(bytes) => Value::parse_literal(bytes)?,
            None => Value::Null,
        };

        self.encode_value(&value, output, offset)
    }

    /// Encode `value` into `output[offset..offset + width]`, no other byte is
    /// touched.
    pub fn encode_value(&self, value: &Value, output: &mut [u8], offset: usize) -> Result<()> {
        let width = self.width;
        let available = output.len().saturating_sub(offset);
        let window = match window_range(offset, width, output.len()) {
            Some(range) => &mut output[range],
            None => {
                return InsufficientSpace {
                    offset,
                    needed: width,
                    available,
                }
                .fail()
            }
        };

        match value {
            Value::Null => window.copy_from_slice(self.null_pattern()),
            Value::Integer(v) => {
                self.check_truncation(*v);
                let mut writer = window;
                writer.try_put_int(*v, width).context(EncodeValue)?;
            }
        }

        Ok(())
    }

    /// Decode the value in `buf[offset..offset + len]` to its decimal text,
    /// `None` for NULL.
    ///
    /// Only the first `width` bytes of the window are read.
    pub fn decode(&self, buf: &[u8], offset: usize, len: usize) -> Result<Option<String>> {
        self.decode_value(buf, offset, len).map(|v| v.to_literal())
    }

    pub fn decode_value(&self, buf: &[u8], offset: usize, len: usize) -> Result<Value> {
        let pattern = self.pattern_at(buf, offset, len)?;
        if is_null_pattern(pattern) {
            return Ok(Value::Null);
        }

        let mut reader = pattern;
        let v = reader.try_get_int(self.width).context(DecodeValue)?;
        Ok(Value::Integer(v))
    }

    /// Whether the first `width` bytes of `buf[offset..offset + len]` hold
    /// NULL. A window too small to hold a value is not NULL.
    pub fn is_null(&self, buf: &[u8], offset: usize, len: usize) -> bool {
        self.pattern(buf, offset, len).map_or(false, is_null_pattern)
    }

    /// Adapter over positioned buffers.
    pub fn as_serializer(&self) -> IntegerSerializer {
        IntegerSerializer::new(*self)
    }

    fn pattern<'a>(&self, buf: &'a [u8], offset: usize, len: usize) -> Option<&'a [u8]> {
        if len < self.width {
            return None;
        }
        window_range(offset, self.width, buf.len()).map(|range| &buf[range])
    }

    fn pattern_at<'a>(&self, buf: &'a [u8], offset: usize, len: usize) -> Result<&'a [u8]> {
        match self.pattern(buf, offset, len) {
            Some(pattern) => Ok(pattern),
            None => InsufficientSpace {
                offset,
                needed: self.width,
                available: len.min(buf.len().saturating_sub(offset)),
            }
            .fail(),
        }
    }

    fn truncates_to_null(&self, v: i64) -> bool {
        v.to_be_bytes()[MAX_WIDTH - self.width..] == *self.null_pattern()
    }

    fn check_truncation(&self, v: i64) {
        if (self.min_value()..=self.max_value()).contains(&v) {
            return;
        }

        let hits = TRUNCATE_HITS.fetch_add(1, Ordering::Relaxed);
        if hits % WARN_EVERY_HITS == 0 {
            warn!(
                "Integer does not fit into {} bytes and will be truncated, value:{}, hit times:{}",
                self.width,
                v,
                hits + 1
            );
        }

        if self.truncates_to_null(v) {
            let hits = NULL_COLLISION_HITS.fetch_add(1, Ordering::Relaxed);
            if hits % WARN_EVERY_HITS == 0 {
                warn!(
                    "Integer is truncated to the null pattern of {} bytes and will decode as null, value:{}, hit times:{}",
                    self.width,
                    v,
                    hits + 1
                );
            }
        }
    }
}

/// Range `offset..offset + width` if it fits into `len` bytes.
#[inline]
fn window_range(offset: usize, width: usize, len: usize) -> Option<std::ops::Range<usize>> {
    let end = offset.checked_add(width)?;
    (end <= len).then_some(offset..end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn round_trip(codec: &FixedWidthIntCodec, value: i64) -> Option<String> {
        let literal = value.to_string();
        let mut buf = vec![0u8; codec.length_of_encoding()];
        codec.encode(Some(literal.as_bytes()), &mut buf, 0).unwrap();
        codec.decode(&buf, 0, buf.len()).unwrap()
    }

    fn assert_round_trip(codec: &FixedWidthIntCodec, value: i64) {
        assert_eq!(
            Some(value.to_string()),
            round_trip(codec, value),
            "width:{}",
            codec.length_of_encoding()
        );
    }

    #[test]
    fn test_width_validation() {
        for width in MIN_WIDTH..=MAX_WIDTH {
            let codec = FixedWidthIntCodec::try_new(width).unwrap();
            assert_eq!(width, codec.length_of_encoding());
        }

        for width in [0, 9, 16, usize::MAX] {
            let err = FixedWidthIntCodec::try_new(width).unwrap_err();
            assert!(matches!(err, Error::InvalidWidth { .. }), "width:{width}");
            assert!(err.is_invalid_configuration());
        }
    }

    #[test]
    fn test_null() {
        for width in MIN_WIDTH..=MAX_WIDTH {
            let codec = FixedWidthIntCodec::try_new(width).unwrap();
            let mut buf = vec![0x11u8; width];
            codec.encode(None, &mut buf, 0).unwrap();

            assert_eq!(0x80, buf[0]);
            assert!(buf[1..].iter().all(|b| *b == 0));
            assert!(is_null_pattern(&buf));
            assert!(codec.is_null(&buf, 0, buf.len()));
            assert_eq!(None, codec.decode(&buf, 0, buf.len()).unwrap());
            assert_eq!(Value::Null, codec.decode_value(&buf, 0, buf.len()).unwrap());
        }
    }

    #[test]
    fn test_encode_decode_width_2() {
        let codec = FixedWidthIntCodec::try_new(2).unwrap();
        for v in [0, 100, 10000, 32767, -100, -10000, -32767] {
            assert_round_trip(&codec, v);
        }

        // Both truncate to 0x8000 which is the null sentinel.
        assert_eq!(None, round_trip(&codec, 32768));
        assert_eq!(None, round_trip(&codec, -32768));
    }

    #[test]
    fn test_encode_decode_width_8() {
        let codec = FixedWidthIntCodec::try_new(8).unwrap();
        for v in [0, 100, 10000, i64::MAX, -100, -10000, -i64::MAX] {
            assert_round_trip(&codec, v);
        }

        assert_eq!(None, round_trip(&codec, i64::MIN));
    }

    #[test]
    fn test_byte_layout() {
        let codec = FixedWidthIntCodec::try_new(3).unwrap();
        let mut buf = [0u8; 3];
        codec.encode(Some(&b"1"[..]), &mut buf, 0).unwrap();
        assert_eq!([0, 0, 1], buf);
        codec.encode(Some(&b"-1"[..]), &mut buf, 0).unwrap();
        assert_eq!([0xff, 0xff, 0xff], buf);
        codec.encode(Some(&b"8388607"[..]), &mut buf, 0).unwrap();
        assert_eq!([0x7f, 0xff, 0xff], buf);
        codec.encode(Some(&b"-8388607"[..]), &mut buf, 0).unwrap();
        assert_eq!([0x80, 0x00, 0x01], buf);
    }

    #[test]
    fn test_truncation_keeps_low_order_bytes() {
        let codec = FixedWidthIntCodec::try_new(1).unwrap();
        // 300 = 0x012c
        assert_eq!(Some("44".to_string()), round_trip(&codec, 300));
        // 200 = 0xc8
        assert_eq!(Some("-56".to_string()), round_trip(&codec, 200));
        // 384 = 0x0180
        assert_eq!(None, round_trip(&codec, 384));

        let codec = FixedWidthIntCodec::try_new(2).unwrap();
        assert_eq!(Some("5".to_string()), round_trip(&codec, 65541));
        assert_eq!(Some("32767".to_string()), round_trip(&codec, -32769));
        assert_eq!(None, round_trip(&codec, 3 * 65536 + 32768));
    }

    #[test]
    fn test_usable_domain() {
        for width in MIN_WIDTH..=MAX_WIDTH {
            let codec = FixedWidthIntCodec::try_new(width).unwrap();
            let max = codec.max_value();
            assert_eq!(-max, codec.min_value());
            assert_round_trip(&codec, max);
            assert_round_trip(&codec, codec.min_value());
            assert!(codec.truncates_to_null(codec.min_value() - 1));
            assert_eq!(None, round_trip(&codec, codec.min_value() - 1));
        }

        assert_eq!(127, FixedWidthIntCodec::try_new(1).unwrap().max_value());
        assert_eq!(32767, FixedWidthIntCodec::try_new(2).unwrap().max_value());
        assert_eq!(
            (1i64 << 39) - 1,
            FixedWidthIntCodec::try_new(5).unwrap().max_value()
        );
    }

    #[test]
    fn test_reencode_is_idempotent() {
        for width in MIN_WIDTH..=MAX_WIDTH {
            let codec = FixedWidthIntCodec::try_new(width).unwrap();
            for v in [0, 1, -1, 99, -99, 12345, i64::MAX, i64::MIN + 1, 1 << 20] {
                let mut first = vec![0u8; width];
                codec.encode(Some(v.to_string().as_bytes()), &mut first, 0).unwrap();
                let decoded = match codec.decode(&first, 0, width).unwrap() {
                    Some(text) => text,
                    None => continue,
                };

                let mut second = vec![0u8; width];
                codec.encode(Some(decoded.as_bytes()), &mut second, 0).unwrap();
                assert_eq!(first, second, "width:{width}, value:{v}");
            }
        }
    }

    #[test]
    fn test_offset_write_only_touches_window() {
        let codec = FixedWidthIntCodec::try_new(4).unwrap();
        let mut buf = [0xaau8; 10];
        codec.encode(Some(&b"-2"[..]), &mut buf, 3).unwrap();
        assert_eq!([0xaa, 0xaa, 0xaa], buf[..3]);
        assert_eq!([0xff, 0xff, 0xff, 0xfe], buf[3..7]);
        assert_eq!([0xaa, 0xaa, 0xaa], buf[7..]);

        assert_eq!(Some("-2".to_string()), codec.decode(&buf, 3, 7).unwrap());
        assert!(!codec.is_null(&buf, 3, 4));

        codec.encode(None, &mut buf, 6).unwrap();
        assert!(codec.is_null(&buf, 6, 4));
        assert_eq!([0xff, 0xff, 0xff], buf[3..6]);
    }

    #[test]
    fn test_malformed_literal() {
        for width in MIN_WIDTH..=MAX_WIDTH {
            let codec = FixedWidthIntCodec::try_new(width).unwrap();
            let mut buf = vec![0x5au8; width];
            for bad in [&b"abc"[..], &b"12x"[..], &b""[..]] {
                let err = codec.encode(Some(bad), &mut buf, 0).unwrap_err();
                assert!(err.is_malformed_literal(), "width:{width}, err:{err}");
            }
            assert!(buf.iter().all(|b| *b == 0x5a));
        }
    }

    #[test]
    fn test_insufficient_space() {
        let codec = FixedWidthIntCodec::try_new(4).unwrap();
        let mut buf = [0u8; 5];
        let err = codec.encode(Some(&b"1"[..]), &mut buf, 2).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientSpace {
                offset: 2,
                needed: 4,
                available: 3,
                ..
            }
        ));
        assert!(err.is_insufficient_space());
        assert_eq!([0u8; 5], buf);

        assert!(codec.encode(None, &mut buf, usize::MAX).is_err());

        let err = codec.decode(&buf, 0, 3).unwrap_err();
        assert!(err.is_insufficient_space());
        let err = codec.decode(&buf, 4, 4).unwrap_err();
        assert!(err.is_insufficient_space());
        assert!(!codec.is_null(&buf, 4, 4));
    }

    #[test]
    fn test_is_null_agrees_with_decode() {
        let codec = FixedWidthIntCodec::try_new(2).unwrap();
        let patterns: [[u8; 2]; 5] = [[0x80, 0x00], [0x80, 0x01], [0x00, 0x80], [0x00, 0x00], [0xff, 0xff]];
        for pattern in patterns {
            let decoded = codec.decode_value(&pattern, 0, 2).unwrap();
            assert_eq!(decoded.is_null(), codec.is_null(&pattern, 0, 2), "{pattern:?}");
        }
    }

    #[test]
    fn test_shared_null_pattern() {
        assert!(is_null_pattern(&[0x80]));
        assert!(is_null_pattern(&[0x80, 0, 0, 0, 0, 0, 0, 0]));
        assert!(!is_null_pattern(&[]));
        assert!(!is_null_pattern(&[0x80, 0, 0, 0, 0, 0, 0, 0, 0]));
        assert!(!is_null_pattern(&[0x80, 0, 1]));
        assert!(!is_null_pattern(&[0xff, 0xff]));
    }
}
