// Copyright 2022-2023 CeresDB Project Authors. Licensed under Apache-2.0.

//! Utilities for benchmarks.

use int_codec::{FixedWidthIntCodec, Value};

/// Build a column of `num` values spread over the usable domain of `codec`.
///
/// Values are deterministic so runs are comparable.
pub fn build_column(codec: &FixedWidthIntCodec, num: usize, null_every: usize) -> Vec<Value> {
    let max = codec.max_value();
    // Odd multiplier so consecutive values land far apart.
    let step = (max / 7919).max(1) | 1;

    (0..num)
        .map(|i| {
            if null_every > 0 && i % null_every == 0 {
                return Value::Null;
            }

            let v = (i as i64).wrapping_mul(step) % max;
            if i % 2 == 0 {
                Value::Integer(-v)
            } else {
                Value::Integer(v)
            }
        })
        .collect()
}

pub fn init_env_logger() {
    let _ = env_logger::Builder::from_default_env()
        .is_test(true)
        .try_init();
}
