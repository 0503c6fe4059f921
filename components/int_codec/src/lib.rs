// Copyright 2022-2023 CeresDB Project Authors. Licensed under Apache-2.0.

//! Fixed width integer encoding for dimension columns.
//!
//! An integer column value is stored as a configurable number of bytes
//! (1 to 8) of big-endian two's complement, with one reserved bit pattern
//! standing for NULL. See [integer] for the byte layout and [serializer] for
//! the positioned buffer adapter.

pub mod config;
pub mod consts;
pub mod integer;
pub mod serializer;
pub mod value;

use bytes_ext::{Buf, BufMut};
use snafu::{Backtrace, Snafu};

pub use crate::{
    config::{create_encoding, IntegerEncodingConfig},
    integer::{is_null_pattern, FixedWidthIntCodec},
    serializer::IntegerSerializer,
    value::Value,
};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display(
        "Integer encoding width must be in [{}, {}], width:{}.\nBacktrace:\n{}",
        consts::MIN_WIDTH,
        consts::MAX_WIDTH,
        width,
        backtrace
    ))]
    InvalidWidth { width: usize, backtrace: Backtrace },

    #[snafu(display("Unknown encoding, name:{}.\nBacktrace:\n{}", name, backtrace))]
    UnknownEncoding { name: String, backtrace: Backtrace },

    #[snafu(display(
        "Encoding expects exactly one argument, name:{}, num_args:{}.\nBacktrace:\n{}",
        name,
        num_args,
        backtrace
    ))]
    InvalidEncodingArgs {
        name: String,
        num_args: usize,
        backtrace: Backtrace,
    },

    #[snafu(display("Failed to parse encoding argument, arg:{}, err:{}", arg, source))]
    ParseEncodingArg {
        arg: String,
        source: std::num::ParseIntError,
    },

    #[snafu(display(
        "Failed to open config file, path:{}, err:{}.\nBacktrace:\n{}",
        path,
        source,
        backtrace
    ))]
    OpenConfig {
        path: String,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display(
        "Failed to read config file, path:{}, err:{}.\nBacktrace:\n{}",
        path,
        source,
        backtrace
    ))]
    ReadConfig {
        path: String,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Failed to parse toml config, err:{}.\nBacktrace:\n{}", source, backtrace))]
    ParseToml {
        source: toml::de::Error,
        backtrace: Backtrace,
    },

    #[snafu(display(
        "Malformed integer literal, literal:{:?}, err:{}.\nBacktrace:\n{}",
        literal,
        source,
        backtrace
    ))]
    MalformedLiteral {
        literal: String,
        source: std::num::ParseIntError,
        backtrace: Backtrace,
    },

    #[snafu(display("Integer literal is not utf8, err:{}.\nBacktrace:\n{}", source, backtrace))]
    NonUtf8Literal {
        source: std::str::Utf8Error,
        backtrace: Backtrace,
    },

    #[snafu(display(
        "Insufficient space for encoded integer, offset:{}, needed:{}, available:{}.\nBacktrace:\n{}",
        offset,
        needed,
        available,
        backtrace
    ))]
    InsufficientSpace {
        offset: usize,
        needed: usize,
        available: usize,
        backtrace: Backtrace,
    },

    #[snafu(display("Failed to encode value, err:{}", source))]
    EncodeValue { source: bytes_ext::Error },

    #[snafu(display("Failed to decode value, err:{}", source))]
    DecodeValue { source: bytes_ext::Error },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The encoding could not be configured, e.g. width out of range.
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidWidth { .. }
                | Error::UnknownEncoding { .. }
                | Error::InvalidEncodingArgs { .. }
                | Error::ParseEncodingArg { .. }
                | Error::OpenConfig { .. }
                | Error::ReadConfig { .. }
                | Error::ParseToml { .. }
        )
    }

    /// The input text is not a decimal integer literal.
    pub fn is_malformed_literal(&self) -> bool {
        matches!(
            self,
            Error::MalformedLiteral { .. } | Error::NonUtf8Literal { .. }
        )
    }

    /// The buffer is too small to hold or provide an encoded value.
    pub fn is_insufficient_space(&self) -> bool {
        match self {
            Error::InsufficientSpace { .. } => true,
            Error::EncodeValue { source } | Error::DecodeValue { source } => matches!(
                source,
                bytes_ext::Error::WouldOverflow { .. } | bytes_ext::Error::UnexpectedEof { .. }
            ),
            _ => false,
        }
    }
}

/// Data encode abstraction
pub trait Encoder<T: ?Sized> {
    type Error;

    /// Encode value into buf
    fn encode<B: BufMut>(&self, buf: &mut B, value: &T) -> std::result::Result<(), Self::Error>;

    /// Estimate the value size after encoded
    fn estimate_encoded_size(&self, value: &T) -> usize;
}

/// Data decode to target
pub trait DecodeTo<T> {
    type Error;

    /// Decode from `buf` to `value`
    fn decode_to<B: Buf>(&self, buf: &mut B, value: &mut T)
        -> std::result::Result<(), Self::Error>;
}

/// Data decode abstraction
pub trait Decoder<T> {
    type Error;

    /// Decode `value` from `buf`
    fn decode<B: Buf>(&self, buf: &mut B) -> std::result::Result<T, Self::Error>;
}
