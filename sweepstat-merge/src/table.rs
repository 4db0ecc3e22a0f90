use std::cmp::Ordering;
use std::collections::BTreeMap;
use thiserror::Error;

/// A histogram bucket value as reported by the load generator (latency in the
/// tool's unit). Always finite and non-negative, so `total_cmp` gives the
/// natural numeric order.
#[derive(Debug, Clone, Copy)]
pub struct LatencyValue(f64);

impl LatencyValue {
    /// Returns `None` for NaN, infinities and negative values.
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && value >= 0.0 {
            // Fold -0.0 into 0.0 so both land in the same bucket.
            Some(LatencyValue(value + 0.0))
        } else {
            None
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl PartialEq for LatencyValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LatencyValue {}

impl PartialOrd for LatencyValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LatencyValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Adding counts would push the table past `u64::MAX` observations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("sample count overflows u64")]
pub struct CountOverflow;

/// How many observations fell exactly at each value.
///
/// The running total is kept alongside the buckets and every addition is
/// checked against it, so no bucket or partial sum can overflow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<LatencyValue, u64>,
    total: u64,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(value, count)` pairs.
    pub fn from_counts(
        pairs: impl IntoIterator<Item = (LatencyValue, u64)>,
    ) -> Result<Self, CountOverflow> {
        let mut table = FrequencyTable::new();
        for (value, count) in pairs {
            table.add(value, count)?;
        }
        Ok(table)
    }

    /// Add `count` observations at `value`. Zero counts still register the
    /// value so a reconstructed table keeps every bucket it saw. On overflow
    /// the table is left unchanged.
    pub fn add(&mut self, value: LatencyValue, count: u64) -> Result<(), CountOverflow> {
        self.total = self.total.checked_add(count).ok_or(CountOverflow)?;
        // Every bucket is bounded by the total, which just fit.
        *self.counts.entry(value).or_insert(0) += count;
        Ok(())
    }

    /// Value-wise sum of `other` into `self`. Either all of `other` is added
    /// or, on overflow, nothing is.
    pub fn merge(&mut self, other: &FrequencyTable) -> Result<(), CountOverflow> {
        self.total.checked_add(other.total).ok_or(CountOverflow)?;
        for (&value, &count) in &other.counts {
            self.add(value, count)?;
        }
        Ok(())
    }

    pub fn count_at(&self, value: f64) -> u64 {
        LatencyValue::new(value)
            .and_then(|v| self.counts.get(&v).copied())
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// `(value, count)` pairs in ascending value order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, u64)> + '_ {
        self.counts.iter().map(|(v, c)| (v.get(), *c))
    }

    pub fn max_value(&self) -> Option<f64> {
        self.counts.keys().next_back().map(|v| v.get())
    }

    /// Count-weighted order statistic: the smallest value whose cumulative
    /// count reaches `ceil(q * total)`. `q` is a fraction in `(0, 1]`.
    ///
    /// Returns `None` when the table holds no observations.
    pub fn quantile(&self, q: f64) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        let target = quantile_target(q, self.total);
        let mut running: u64 = 0;
        for (value, count) in self.iter() {
            running += count;
            if running >= target {
                return Some(value);
            }
        }
        self.max_value()
    }

    /// Count-weighted mean, `None` when the table holds no observations.
    pub fn mean(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        let weighted: f64 = self.iter().map(|(v, c)| v * c as f64).sum();
        Some(weighted / self.total as f64)
    }
}

/// Resolution of `q` in [`quantile_target`]: fractions are fixed to 12 decimal
/// places, enough for percentiles such as 99.9999999.
const FRACTION_SCALE: u128 = 1_000_000_000_000;

/// `ceil(q * total)`, clamped to `1..=total` (0 for an empty table).
///
/// `q` is fixed to [`FRACTION_SCALE`] parts before multiplying, so a percent
/// like 99.9 that has no exact binary form still yields an exact integer
/// target at any total.
pub fn quantile_target(q: f64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    let parts = (q.clamp(0.0, 1.0) * FRACTION_SCALE as f64).round() as u128;
    let target = (parts * total as u128).div_ceil(FRACTION_SCALE);
    (target as u64).clamp(1, total)
}
