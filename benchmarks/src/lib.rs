// Copyright 2022-2023 CeresDB Project Authors. Licensed under Apache-2.0.

//! Benchmarks

pub mod config;
pub mod int_codec_bench;
pub mod util;
