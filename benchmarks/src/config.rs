// Copyright 2022-2023 CeresDB Project Authors. Licensed under Apache-2.0.

//! Benchmark configs.

use int_codec::IntegerEncodingConfig;
use serde::Deserialize;

const BENCH_CONFIG_PATH_KEY: &str = "INT_CODEC_BENCH_CONFIG_PATH";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub int_codec_bench: IntCodecBenchConfig,
}

/// Load the config from the path in env `INT_CODEC_BENCH_CONFIG_PATH`, or
/// use the default config if the env is not set.
pub fn bench_config_from_env() -> BenchConfig {
    let path = match std::env::var(BENCH_CONFIG_PATH_KEY) {
        Ok(v) => v,
        Err(_) => return BenchConfig::default(),
    };

    let mut toml_buf = String::new();
    int_codec::config::parse_toml_from_path(&path, &mut toml_buf)
        .unwrap_or_else(|e| panic!("Failed to load bench config, path:{path}, err:{e}"))
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct IntCodecBenchConfig {
    pub encoding: IntegerEncodingConfig,
    /// Number of values in one column
    pub num_values: usize,
    /// Every `null_every`-th value is NULL, 0 means no NULL
    pub null_every: usize,
}

impl Default for IntCodecBenchConfig {
    fn default() -> Self {
        Self {
            encoding: IntegerEncodingConfig::default(),
            num_values: 64 * 1024,
            null_every: 16,
        }
    }
}
