// Copyright 2022-2023 CeresDB Project Authors. Licensed under Apache-2.0.

//! Integer codec bench.

use bytes_ext::BytesMut;
use int_codec::{Decoder, Encoder, FixedWidthIntCodec, IntegerSerializer, Value};
use log::info;

use crate::{config::IntCodecBenchConfig, util};

pub struct IntCodecBench {
    codec: FixedWidthIntCodec,
    serializer: IntegerSerializer,
    literals: Vec<Option<String>>,
    values: Vec<Value>,
    /// Column encoded by the raw codec, `values.len() * width` bytes
    encoded: Vec<u8>,
}

impl IntCodecBench {
    pub fn new(config: IntCodecBenchConfig) -> int_codec::Result<Self> {
        let codec = config.encoding.build()?;
        let values = util::build_column(&codec, config.num_values, config.null_every);
        let literals = values.iter().map(|v| v.to_literal()).collect();

        let width = codec.length_of_encoding();
        let mut encoded = vec![0; values.len() * width];
        for (i, v) in values.iter().enumerate() {
            codec.encode_value(v, &mut encoded, i * width)?;
        }

        info!(
            "Int codec bench created, width:{}, num_values:{}",
            width,
            values.len()
        );

        Ok(Self {
            codec,
            serializer: codec.as_serializer(),
            literals,
            values,
            encoded,
        })
    }

    pub fn num_values(&self) -> usize {
        self.values.len()
    }

    /// Encode decimal literals with the raw codec.
    pub fn run_encode_literals(&mut self) {
        let width = self.codec.length_of_encoding();
        for (i, literal) in self.literals.iter().enumerate() {
            self.codec
                .encode(
                    literal.as_ref().map(|v| v.as_bytes()),
                    &mut self.encoded,
                    i * width,
                )
                .unwrap();
        }
    }

    /// Decode the column to decimal literals with the raw codec.
    pub fn run_decode_literals(&self) -> usize {
        let width = self.codec.length_of_encoding();
        (0..self.values.len())
            .filter_map(|i| self.codec.decode(&self.encoded, i * width, width).unwrap())
            .count()
    }

    /// Serialize typed values into a growing buffer.
    pub fn run_serialize(&self) -> usize {
        let mut buf = BytesMut::with_capacity(self.encoded.len());
        for v in &self.values {
            self.serializer.encode(&mut buf, v).unwrap();
        }
        buf.len()
    }

    /// Deserialize typed values from the encoded column.
    pub fn run_deserialize(&self) -> usize {
        let mut reader = &self.encoded[..];
        let mut non_null = 0;
        while !reader.is_empty() {
            let v: Value = self.serializer.decode(&mut reader).unwrap();
            if !v.is_null() {
                non_null += 1;
            }
        }
        non_null
    }
}
