// Copyright 2022-2023 CeresDB Project Authors. Licensed under Apache-2.0.

//! Logical value of an integer dimension and its decimal text form.

use std::{fmt, str, str::FromStr};

use snafu::ResultExt;

use crate::{Error, MalformedLiteral, NonUtf8Literal, Result};

/// Either NULL or a 64 bit signed integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Value {
    #[default]
    Null,
    Integer(i64),
}

impl Value {
    /// Parse a decimal integer literal given as utf8 bytes.
    ///
    /// A leading `-` or `+` is accepted, surrounding whitespace is not.
    pub fn parse_literal(bytes: &[u8]) -> Result<Self> {
        let text = str::from_utf8(bytes).context(NonUtf8Literal)?;
        text.parse()
    }

    /// Canonical decimal text of the value, `None` for NULL.
    pub fn to_literal(&self) -> Option<String> {
        self.as_i64().map(|v| v.to_string())
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Null => None,
            Value::Integer(v) => Some(*v),
        }
    }
}

impl FromStr for Value {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let v = s
            .parse::<i64>()
            .context(MalformedLiteral { literal: s })?;
        Ok(Value::Integer(v))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<Option<i64>> for Value {
    fn from(v: Option<i64>) -> Self {
        v.map_or(Value::Null, Value::Integer)
    }
}

impl From<Value> for Option<i64> {
    fn from(v: Value) -> Self {
        v.as_i64()
    }
}
