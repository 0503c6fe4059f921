// Copyright 2022-2023 CeresDB Project Authors. Licensed under Apache-2.0.

//! Integer encoding config and the encoding factory.

use std::{fs::File, io::Read, str::FromStr};

use log::debug;
use serde::{de, Deserialize, Serialize};
use snafu::{ensure, ResultExt};

use crate::{
    consts::{DEFAULT_WIDTH, ENCODING_NAME},
    integer::FixedWidthIntCodec,
    Error, InvalidEncodingArgs, OpenConfig, ParseEncodingArg, ParseToml, ReadConfig, Result,
    UnknownEncoding,
};

/// Config of an integer dimension column.
///
/// Example:
/// ```toml
/// width = 4
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntegerEncodingConfig {
    /// Bytes of every encoded value, in `[1, 8]`
    pub width: usize,
}

impl Default for IntegerEncodingConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
        }
    }
}

impl IntegerEncodingConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context(ParseToml)
    }

    /// Validate the config and create the codec.
    pub fn build(&self) -> Result<FixedWidthIntCodec> {
        let codec = FixedWidthIntCodec::try_new(self.width)?;
        debug!("Integer encoding created, width:{}", self.width);

        Ok(codec)
    }
}

impl From<FixedWidthIntCodec> for IntegerEncodingConfig {
    fn from(codec: FixedWidthIntCodec) -> Self {
        Self {
            width: codec.length_of_encoding(),
        }
    }
}

/// Read toml file from given `path` to `toml_buf`, then parsed it to `T` and
/// return.
pub fn parse_toml_from_path<T>(path: &str, toml_buf: &mut String) -> Result<T>
where
    T: de::DeserializeOwned,
{
    let mut file = File::open(path).context(OpenConfig { path })?;
    file.read_to_string(toml_buf).context(ReadConfig { path })?;

    toml::from_str(toml_buf).context(ParseToml)
}

/// Create an encoding by name, the only argument is the width.
///
/// Names are matched case-insensitively.
pub fn create_encoding(name: &str, args: &[&str]) -> Result<FixedWidthIntCodec> {
    ensure!(
        name.eq_ignore_ascii_case(ENCODING_NAME),
        UnknownEncoding { name }
    );
    ensure!(
        args.len() == 1,
        InvalidEncodingArgs {
            name,
            num_args: args.len(),
        }
    );

    let arg = args[0].trim();
    let width = arg
        .parse::<usize>()
        .context(ParseEncodingArg { arg })?;

    IntegerEncodingConfig { width }.build()
}

/// Parse descriptors like `integer:4` or `integer(4)`.
impl FromStr for FixedWidthIntCodec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some((name, arg)) = s.split_once(':') {
            return create_encoding(name.trim(), &[arg]);
        }

        match s.strip_suffix(')').and_then(|v| v.split_once('(')) {
            Some((name, arg)) => create_encoding(name.trim(), &[arg]),
            None => create_encoding(s, &[]),
        }
    }
}
