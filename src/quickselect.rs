// File: quickselect.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use rand::Rng;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("selection rank {rank} out of range for {len} samples")]
    InvalidRank { rank: usize, len: usize },
    #[error("selection over an empty sample set")]
    EmptyInput,
}

/// Returns the value holding 1-indexed rank `rank` in ascending order,
/// in expected linear time. Reorders `values` while narrowing in on the
/// rank; callers that need the original order must pass a copy.
pub fn quick_select<T: Ord + Copy>(values: &mut [T], rank: usize) -> Result<T, SelectError> {
    if values.is_empty() {
        return Err(SelectError::EmptyInput);
    }
    if rank < 1 || rank > values.len() {
        return Err(SelectError::InvalidRank {
            rank,
            len: values.len(),
        });
    }
    let mut rng = rand::thread_rng();
    let right = values.len() - 1;
    Ok(select_in(values, 0, right, rank - 1, &mut rng))
}

/// Median of the sample set: the middle value for an odd count, the
/// average of the two middle values for an even count.
pub fn median(values: &mut [Duration]) -> Result<Duration, SelectError> {
    let n = values.len();
    if n == 0 {
        return Err(SelectError::EmptyInput);
    }
    if n % 2 == 1 {
        quick_select(values, n / 2 + 1)
    } else {
        let lower = quick_select(values, n / 2)?;
        let upper = quick_select(values, n / 2 + 1)?;
        Ok((lower + upper) / 2)
    }
}

fn select_in<T: Ord + Copy>(
    values: &mut [T],
    left: usize,
    right: usize,
    k: usize,
    rng: &mut impl Rng,
) -> T {
    if left == right {
        return values[left];
    }
    let pivot = rng.gen_range(left..=right);
    let pivot = partition(values, left, right, pivot);
    if k == pivot {
        values[k]
    } else if k < pivot {
        select_in(values, left, pivot - 1, k, rng)
    } else {
        select_in(values, pivot + 1, right, k, rng)
    }
}

/// Moves every element smaller than the pivot value below it and returns
/// the pivot's final index.
fn partition<T: Ord + Copy>(values: &mut [T], left: usize, right: usize, pivot: usize) -> usize {
    let pivot_value = values[pivot];
    values.swap(pivot, right);
    let mut store = left;
    for i in left..right {
        if values[i] < pivot_value {
            values.swap(store, i);
            store += 1;
        }
    }
    values.swap(store, right);
    store
}
