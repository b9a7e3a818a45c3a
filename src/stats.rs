//! Numeric and hashing kernels shared by the cleaning actions and the profiler.
//!
//! Every statistic here works on non-null values only. `NaN` floats (produced e.g. by
//! normalizing a constant column) are treated like nulls by [`numeric_values`].

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use crate::types::{DataSet, Value};

/// Multiplier applied to the interquartile range for Tukey's fences.
pub const TUKEY_K: f64 = 1.5;

/// Collect the non-null numeric values of the column at `idx`, in row order.
pub fn numeric_values(dataset: &DataSet, idx: usize) -> Vec<f64> {
    dataset
        .column_values(idx)
        .filter_map(Value::as_f64)
        .filter(|v| !v.is_nan())
        .collect()
}

/// Arithmetic mean. `None` when `values` is empty.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (`n - 1` denominator). `None` when `values` is empty.
///
/// A single value yields `NaN`, the same as dividing zero by zero.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let n = values.len() as f64;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (n - 1.0)).sqrt())
}

/// Minimum and maximum. `None` when `values` is empty.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// Quantile `q` in `[0, 1]` of already sorted values, interpolating linearly between the
/// two closest ranks. `None` when `sorted` is empty.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Sort a copy of `values` ascending.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// Median (50th percentile). `None` when `values` is empty.
pub fn median(values: &[f64]) -> Option<f64> {
    quantile_sorted(&sorted(values), 0.5)
}

/// Tukey's fences computed from the 25th and 75th percentiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TukeyFences {
    /// 25th percentile.
    pub q1: f64,
    /// 75th percentile.
    pub q3: f64,
    /// `q1 - 1.5 * iqr`.
    pub lower: f64,
    /// `q3 + 1.5 * iqr`.
    pub upper: f64,
}

impl TukeyFences {
    /// Compute the fences for `values`. `None` when `values` is empty.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let s = sorted(values);
        let q1 = quantile_sorted(&s, 0.25)?;
        let q3 = quantile_sorted(&s, 0.75)?;
        let iqr = q3 - q1;
        Some(Self {
            q1,
            q3,
            lower: q1 - TUKEY_K * iqr,
            upper: q3 + TUKEY_K * iqr,
        })
    }

    /// Interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// `true` when `v` lies strictly outside the fences.
    pub fn is_outlier(&self, v: f64) -> bool {
        v < self.lower || v > self.upper
    }

    /// Outlier flag for a cell. Nulls and non-numeric values are never outliers.
    pub fn flags(&self, value: &Value) -> bool {
        value.as_f64().is_some_and(|v| self.is_outlier(v))
    }
}

/// Borrowed [`Value`] with total equality and hashing, usable as a map key.
///
/// Floats compare by bit pattern after folding `-0.0` into `0.0` and every `NaN` into one.
#[derive(Debug, Clone, Copy)]
pub struct ValueKey<'a>(pub &'a Value);

fn canonical_bits(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        0.0f64.to_bits()
    } else {
        v.to_bits()
    }
}

impl PartialEq for ValueKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self.0, other.0) {
            (Value::Float64(a), Value::Float64(b)) => canonical_bits(*a) == canonical_bits(*b),
            (a, b) => a == b,
        }
    }
}

impl Eq for ValueKey<'_> {}

impl Hash for ValueKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self.0).hash(state);
        match self.0 {
            Value::Null => {}
            Value::Int64(v) => v.hash(state),
            Value::Float64(v) => canonical_bits(*v).hash(state),
            Value::Bool(v) => v.hash(state),
            Value::Utf8(v) => v.hash(state),
            Value::Timestamp(v) => v.hash(state),
        }
    }
}

/// Borrowed row compared cell by cell through [`ValueKey`].
struct RowKey<'a>(&'a [Value]);

impl PartialEq for RowKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(other.0)
                .all(|(a, b)| ValueKey(a) == ValueKey(b))
    }
}

impl Eq for RowKey<'_> {}

impl Hash for RowKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.len().hash(state);
        for v in self.0 {
            ValueKey(v).hash(state);
        }
    }
}

/// For each row, `true` when an identical row (across all columns) appears earlier.
pub fn duplicate_mask(dataset: &DataSet) -> Vec<bool> {
    let mut seen: HashSet<RowKey<'_>> = HashSet::with_capacity(dataset.row_count());
    dataset
        .rows
        .iter()
        .map(|row| !seen.insert(RowKey(row.as_slice())))
        .collect()
}

/// Number of distinct non-missing values in the column at `idx`.
pub fn distinct_count(dataset: &DataSet, idx: usize) -> usize {
    dataset
        .column_values(idx)
        .filter(|v| !v.is_missing())
        .map(ValueKey)
        .collect::<HashSet<_>>()
        .len()
}

/// Most frequent non-missing value. Ties resolve to the smallest value,
/// and an integer wins over an equal float.
///
/// Returns `None` when there are no non-missing values.
pub fn mode<'a>(values: impl IntoIterator<Item = &'a Value>) -> Option<Value> {
    let mut counts: HashMap<ValueKey<'a>, usize> = HashMap::new();
    for v in values.into_iter().filter(|v| !v.is_missing()) {
        *counts.entry(ValueKey(v)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|(a, ca), (b, cb)| {
            ca.cmp(cb)
                .then_with(|| compare_values(b.0, a.0))
                .then_with(|| variant_rank(b.0).cmp(&variant_rank(a.0)))
        })
        .map(|(k, _)| k.0.clone())
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Int64(_) | Value::Float64(_) => 2,
        Value::Timestamp(_) => 3,
        Value::Utf8(_) => 4,
    }
}

fn variant_rank(v: &Value) -> u8 {
    match v {
        Value::Float64(_) => type_rank(v) * 2 + 1,
        other => type_rank(other) * 2,
    }
}

/// Total order over values: nulls first, then booleans, numbers, timestamps and text.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Utf8(x), Value::Utf8(y)) => x.cmp(y),
        (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
        (Value::Int64(x), Value::Int64(y)) => x.cmp(y),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => type_rank(a).cmp(&type_rank(b)),
        },
    }
}
