//! Exact-decimal running statistics for a single bucket
//!
//! Internal state is never rounded. Scale and rounding are applied only by the
//! read accessors, so combining many buckets does not accumulate rounding error.

use super::error::AccumulatorOverflow;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

/// Fraction digits of every rendered statistic
pub const OUTPUT_SCALE: u32 = 2;

/// Running count/sum/min/max over exact decimals
///
/// An accumulator with `count == 0` is empty: its sum, min and max are zero
/// placeholders, not a real zero observation.
///
/// Every stored sum, min and max fits in a decimal with [`OUTPUT_SCALE`]
/// fraction digits. Updates that would break this fail and change nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecimalAccumulator {
    count: u64,
    sum: Decimal,
    min: Decimal,
    max: Decimal,
}

impl DecimalAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Incorporate one value
    ///
    /// Fails with [`AccumulatorOverflow`] when the value or the new running
    /// sum cannot be rendered at [`OUTPUT_SCALE`]. The accumulator is left as
    /// it was.
    pub fn accept(&mut self, value: Decimal) -> Result<(), AccumulatorOverflow> {
        if self.count == 0 {
            if !fits_output_scale(value) {
                return Err(AccumulatorOverflow);
            }
            self.count = 1;
            self.sum = value;
            self.min = value;
            self.max = value;
            return Ok(());
        }

        let sum = checked_sum(self.sum, value)?;
        if !fits_output_scale(value) {
            return Err(AccumulatorOverflow);
        }

        self.sum = sum;
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
        self.count += 1;
        Ok(())
    }

    /// Merge another accumulator's state into this one
    ///
    /// Fails without changing `self` when the combined sum overflows.
    pub fn combine(
        &mut self,
        other: &DecimalAccumulator,
    ) -> Result<&mut Self, AccumulatorOverflow> {
        if other.count == 0 {
            return Ok(self);
        }

        if self.count == 0 {
            self.clone_from(other);
            return Ok(self);
        }

        self.sum = checked_sum(self.sum, other.sum)?;
        if other.min < self.min {
            self.min = other.min;
        }
        if other.max > self.max {
            self.max = other.max;
        }
        self.count += other.count;
        Ok(self)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> Decimal {
        to_output_scale(self.sum)
    }

    /// Mean of the accepted values
    ///
    /// With fewer than two values this is the rounded sum (zero when empty).
    pub fn avg(&self) -> Decimal {
        if self.count < 2 {
            return to_output_scale(self.sum);
        }
        to_output_scale(self.sum / Decimal::from(self.count))
    }

    pub fn min(&self) -> Decimal {
        to_output_scale(self.min)
    }

    pub fn max(&self) -> Decimal {
        to_output_scale(self.max)
    }
}

impl fmt::Display for DecimalAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            return write!(f, "empty");
        }
        write!(
            f,
            "{} elements between {} and {}, sum={}",
            self.count, self.min, self.max, self.sum
        )
    }
}

/// Add two in-range decimals, failing if the result leaves the output range
fn checked_sum(left: Decimal, right: Decimal) -> Result<Decimal, AccumulatorOverflow> {
    left.checked_add(right)
        .filter(|sum| fits_output_scale(*sum))
        .ok_or(AccumulatorOverflow)
}

/// Whether `value` can carry exactly [`OUTPUT_SCALE`] fraction digits
fn fits_output_scale(value: Decimal) -> bool {
    value.abs() <= Decimal::MAX / Decimal::from(10_u64.pow(OUTPUT_SCALE))
}

/// Round half away from zero to [`OUTPUT_SCALE`] and pad to exactly that many digits
///
/// `value` must satisfy [`fits_output_scale`], otherwise the padding is lost.
fn to_output_scale(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(OUTPUT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(OUTPUT_SCALE);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}
