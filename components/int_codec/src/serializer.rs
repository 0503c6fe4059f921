// Copyright 2022-2023 CeresDB Project Authors. Licensed under Apache-2.0.

//! Positioned buffer adapter of [FixedWidthIntCodec].
//!
//! Every value, NULL included, advances the buffer by exactly
//! `length_of_encoding()` bytes, so a column of values packs into a flat
//! array of fixed size records.

use bytes_ext::{Buf, BufMut, SafeBuf, SafeBufMut};
use snafu::ResultExt;

use crate::{
    consts::MAX_WIDTH, integer::FixedWidthIntCodec, value::Value, DecodeTo, DecodeValue,
    Decoder, EncodeValue, Encoder, Error, Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntegerSerializer {
    codec: FixedWidthIntCodec,
}

impl IntegerSerializer {
    pub fn new(codec: FixedWidthIntCodec) -> Self {
        Self { codec }
    }

    #[inline]
    pub fn codec(&self) -> &FixedWidthIntCodec {
        &self.codec
    }

    /// Length of the value at the head of `buf`, always the codec width.
    #[inline]
    pub fn peek_length<B: Buf>(&self, _buf: &B) -> usize {
        self.codec.length_of_encoding()
    }

    #[inline]
    pub fn max_length(&self) -> usize {
        self.codec.length_of_encoding()
    }

    /// Parse the text form of a value.
    pub fn value_of(&self, text: &str) -> Result<Value> {
        text.parse()
    }
}

// Values are encoded into a scratch array first, so a failed encode never
// leaves a partial record in `buf`.
impl Encoder<Value> for IntegerSerializer {
    type Error = Error;

    fn encode<B: BufMut>(&self, buf: &mut B, value: &Value) -> Result<()> {
        let width = self.codec.length_of_encoding();
        let mut scratch = [0; MAX_WIDTH];
        self.codec.encode_value(value, &mut scratch[..width], 0)?;
        buf.try_put(&scratch[..width]).context(EncodeValue)
    }

    fn estimate_encoded_size(&self, _value: &Value) -> usize {
        self.codec.length_of_encoding()
    }
}

impl Encoder<str> for IntegerSerializer {
    type Error = Error;

    fn encode<B: BufMut>(&self, buf: &mut B, value: &str) -> Result<()> {
        let value = self.value_of(value)?;
        self.encode(buf, &value)
    }

    fn estimate_encoded_size(&self, _value: &str) -> usize {
        self.codec.length_of_encoding()
    }
}

impl<'a> Encoder<Option<&'a str>> for IntegerSerializer {
    type Error = Error;

    fn encode<B: BufMut>(&self, buf: &mut B, value: &Option<&'a str>) -> Result<()> {
        match value {
            Some(text) => self.encode(buf, *text),
            None => self.encode(buf, &Value::Null),
        }
    }

    fn estimate_encoded_size(&self, _value: &Option<&'a str>) -> usize {
        self.codec.length_of_encoding()
    }
}

impl Decoder<Value> for IntegerSerializer {
    type Error = Error;

    fn decode<B: Buf>(&self, buf: &mut B) -> Result<Value> {
        let width = self.codec.length_of_encoding();
        let mut scratch = [0; MAX_WIDTH];
        SafeBuf::try_copy_to_slice(buf, &mut scratch[..width])
            .context(DecodeValue)?;
        self.codec.decode_value(&scratch[..width], 0, width)
    }
}

/// Decodes to the decimal text of the value, `None` for NULL.
impl Decoder<Option<String>> for IntegerSerializer {
    type Error = Error;

    fn decode<B: Buf>(&self, buf: &mut B) -> Result<Option<String>> {
        Decoder::<Value>::decode(self, buf).map(|v| v.to_literal())
    }
}

impl DecodeTo<Value> for IntegerSerializer {
    type Error = Error;

    fn decode_to<B: Buf>(&self, buf: &mut B, value: &mut Value) -> Result<()> {
        *value = Decoder::<Value>::decode(self, buf)?;
        Ok(())
    }
}
