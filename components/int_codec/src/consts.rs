// Copyright 2022-2023 CeresDB Project Authors. Licensed under Apache-2.0.

//! Constants used in integer encoding

/// Name used to look up the encoding from a descriptor like `integer:4`.
pub const ENCODING_NAME: &str = "integer";

pub const MIN_WIDTH: usize = 1;
pub const MAX_WIDTH: usize = 8;

/// Width used when a config omits it.
pub const DEFAULT_WIDTH: usize = MAX_WIDTH;

/// First byte of the null sentinel, the remaining bytes are zero.
pub const NULL_HEAD: u8 = 0x80;

pub(crate) const NULL_PATTERN: [u8; MAX_WIDTH] = [NULL_HEAD, 0, 0, 0, 0, 0, 0, 0];

/// Truncation warnings are logged once per this many hits.
pub(crate) const WARN_EVERY_HITS: u64 = 10_000;
