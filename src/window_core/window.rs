//! Bucketed 60-second sliding window
//!
//! Events land in one of 60 buckets chosen by the second-of-minute of their
//! own timestamp. Each bucket carries the timestamp of the last write it
//! received; a bucket whose marker is 60s or more behind the clock is stale
//! and is treated as empty. Stale buckets are cleared lazily, just before the
//! next event lands in them. There is no background eviction.
//!
//! Every bucket has its own lock. Writes to different buckets never contend,
//! and a snapshot takes the bucket locks one at a time, so it is not an
//! atomic view of the whole window.

use super::accumulator::DecimalAccumulator;
use super::error::IngestError;
use chrono::{DateTime, Timelike, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;

/// One bucket per second of a minute
pub const BUCKET_COUNT: usize = 60;

/// Trailing window length in milliseconds
pub const WINDOW_MS: i64 = 60_000;

/// Integer digits an event amount may carry
///
/// Amounts stay below 10^15 in magnitude, so a bucket's sum overflows only
/// after tens of trillions of events within one second.
pub const MAX_AMOUNT_INTEGER_DIGITS: u32 = 15;

/// Whether `value` is small enough to be recorded
pub fn amount_in_range(value: Decimal) -> bool {
    value.abs() < Decimal::from(10_i64.pow(MAX_AMOUNT_INTEGER_DIGITS))
}

#[derive(Debug, Default)]
struct Bucket {
    stats: DecimalAccumulator,
    /// Timestamp (epoch ms) of the last event written here, 0 when empty
    last_effective_ms: i64,
}

impl Bucket {
    fn is_live(&self, now_ms: i64) -> bool {
        self.last_effective_ms > 0 && now_ms - self.last_effective_ms < WINDOW_MS
    }

    fn is_stale(&self, now_ms: i64) -> bool {
        self.last_effective_ms > 0 && now_ms - self.last_effective_ms >= WINDOW_MS
    }

    fn reset(&mut self) {
        self.stats.reset();
        self.last_effective_ms = 0;
    }
}

/// Concurrent 60-second window of decimal statistics
///
/// All methods take `&self`; share it between threads with an `Arc`.
pub struct BucketedWindow {
    buckets: [Mutex<Bucket>; BUCKET_COUNT],

    /// Current time in epoch milliseconds (mockable for tests)
    now_fn: Box<dyn Fn() -> i64 + Send + Sync>,
}

impl BucketedWindow {
    /// Create an empty window driven by the system clock
    pub fn new() -> Self {
        Self::new_with_clock(Box::new(|| Utc::now().timestamp_millis()))
    }

    /// Create an empty window with a custom clock
    ///
    /// # Arguments
    /// * `now_fn` - Function returning the current epoch time in milliseconds
    pub fn new_with_clock(now_fn: Box<dyn Fn() -> i64 + Send + Sync>) -> Self {
        Self {
            buckets: std::array::from_fn(|_| Mutex::new(Bucket::default())),
            now_fn,
        }
    }

    /// Record one event
    ///
    /// Rejects events from the future, events 60s old or older and amounts
    /// outside [`amount_in_range`] without touching any bucket. An event whose
    /// amount would overflow the bucket sum is rejected the same way. The
    /// bucket marker is set to the event's own
    /// timestamp; when two writers race on one bucket, the one that takes the
    /// lock last decides the marker.
    pub fn ingest(&self, value: Decimal, timestamp: DateTime<Utc>) -> Result<(), IngestError> {
        let now_ms = (self.now_fn)();
        let timestamp_ms = timestamp.timestamp_millis();

        log::trace!("Event received at {}ms: amount={} timestamp={}", now_ms, value, timestamp);

        if timestamp_ms > now_ms {
            return Err(IngestError::FutureEvent { timestamp_ms, now_ms });
        }
        if now_ms - timestamp_ms >= WINDOW_MS {
            return Err(IngestError::TooOld { timestamp_ms, now_ms });
        }
        if !amount_in_range(value) {
            return Err(IngestError::AmountOutOfRange { timestamp_ms, now_ms });
        }

        let index = timestamp.second() as usize;
        let mut bucket = self.buckets[index].lock();

        let before = log::log_enabled!(log::Level::Trace).then(|| bucket.stats.to_string());

        if bucket.is_stale(now_ms) {
            bucket.reset();
        }
        // Only a non-empty bucket can overflow, and the reset above left it alone
        bucket
            .stats
            .accept(value)
            .map_err(|_| IngestError::AmountOutOfRange { timestamp_ms, now_ms })?;
        bucket.last_effective_ms = timestamp_ms;

        if let Some(before) = before {
            log::trace!(
                "Bucket {} updated at {}ms: before [{}], after [{}]",
                index,
                now_ms,
                before,
                bucket.stats
            );
        }

        Ok(())
    }

    /// Aggregate every live bucket into a caller-owned accumulator
    pub fn snapshot(&self) -> DecimalAccumulator {
        let now_ms = (self.now_fn)();
        let mut result = DecimalAccumulator::new();

        for (index, slot) in self.buckets.iter().enumerate() {
            let bucket = slot.lock();
            if !bucket.is_live(now_ms) {
                continue;
            }
            if let Err(err) = result.combine(&bucket.stats) {
                log::error!("❌ Bucket {} left out of snapshot: {}", index, err);
            }
        }

        result
    }

    /// Clear every bucket
    pub fn reset_all(&self) {
        for slot in &self.buckets {
            slot.lock().reset();
        }
        log::debug!("All {} buckets reset", BUCKET_COUNT);
    }
}

impl Default for BucketedWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    // 2024-01-01T00:00:30Z
    const T0_MS: i64 = 1_704_067_230_000;

    fn mock_window(start_ms: i64) -> (BucketedWindow, Arc<AtomicI64>) {
        let clock = Arc::new(AtomicI64::new(start_ms));
        let reader = clock.clone();
        let window =
            BucketedWindow::new_with_clock(Box::new(move || reader.load(Ordering::SeqCst)));
        (window, clock)
    }

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn test_empty_snapshot() {
        let (window, _) = mock_window(T0_MS);
        let snapshot = window.snapshot();

        assert_eq!(snapshot.count(), 0);
        assert_eq!(snapshot.sum().to_string(), "0.00");
        assert_eq!(snapshot.avg().to_string(), "0.00");
    }

    #[test]
    fn test_three_events_in_different_seconds() {
        let (window, _) = mock_window(T0_MS);

        window.ingest(dec!(200.50), at(T0_MS)).unwrap();
        window.ingest(dec!(100.25), at(T0_MS - 1_000)).unwrap();
        window.ingest(dec!(50.25), at(T0_MS - 2_000)).unwrap();

        let snapshot = window.snapshot();
        assert_eq!(snapshot.count(), 3);
        assert_eq!(snapshot.sum().to_string(), "351.00");
        assert_eq!(snapshot.min().to_string(), "50.25");
        assert_eq!(snapshot.max().to_string(), "200.50");
        assert_eq!(snapshot.avg().to_string(), "117.00");
    }

    #[test]
    fn test_future_event_rejected() {
        let (window, _) = mock_window(T0_MS);

        let result = window.ingest(dec!(1), at(T0_MS + 1));

        assert_eq!(
            result,
            Err(IngestError::FutureEvent { timestamp_ms: T0_MS + 1, now_ms: T0_MS })
        );
        assert_eq!(window.snapshot().count(), 0);
    }

    #[test]
    fn test_age_boundary_is_exclusive() {
        let (window, _) = mock_window(T0_MS);

        assert!(matches!(
            window.ingest(dec!(1), at(T0_MS - 60_000)),
            Err(IngestError::TooOld { .. })
        ));
        assert!(window.ingest(dec!(2), at(T0_MS - 59_999)).is_ok());

        let snapshot = window.snapshot();
        assert_eq!(snapshot.count(), 1);
        assert_eq!(snapshot.sum().to_string(), "2.00");
    }

    #[test]
    fn test_old_event_leaves_state_unchanged() {
        let (window, _) = mock_window(T0_MS);
        window.ingest(dec!(10), at(T0_MS - 500)).unwrap();

        let result = window.ingest(dec!(99), at(T0_MS - 61_000));

        assert!(matches!(result, Err(IngestError::TooOld { .. })));
        let snapshot = window.snapshot();
        assert_eq!(snapshot.count(), 1);
        assert_eq!(snapshot.max().to_string(), "10.00");
    }

    #[test]
    fn test_out_of_range_amount_leaves_state_unchanged() {
        let (window, _) = mock_window(T0_MS);
        window.ingest(dec!(999999999999999.99), at(T0_MS)).unwrap();
        window.ingest(dec!(-999999999999999.99), at(T0_MS - 1_000)).unwrap();

        for amount in [dec!(1000000000000000), dec!(-1000000000000000), Decimal::MAX] {
            let result = window.ingest(amount, at(T0_MS - 2_000));
            assert_eq!(
                result,
                Err(IngestError::AmountOutOfRange { timestamp_ms: T0_MS - 2_000, now_ms: T0_MS })
            );
        }

        let snapshot = window.snapshot();
        assert_eq!(snapshot.count(), 2);
        assert_eq!(snapshot.sum().to_string(), "0.00");
        assert_eq!(snapshot.max().to_string(), "999999999999999.99");
    }

    #[test]
    fn test_amount_range() {
        assert!(amount_in_range(dec!(0)));
        assert!(amount_in_range(dec!(-999999999999999.999999)));
        assert!(!amount_in_range(dec!(1000000000000000)));
        assert!(!amount_in_range(dec!(50000000000000000000000000000)));
    }

    #[test]
    fn test_lazy_expiry_without_reset() {
        let (window, clock) = mock_window(T0_MS);
        window.ingest(dec!(5), at(T0_MS)).unwrap();
        assert_eq!(window.snapshot().count(), 1);

        clock.store(T0_MS + 60_001, Ordering::SeqCst);

        assert_eq!(window.snapshot().count(), 0);
    }

    #[test]
    fn test_bucket_expires_exactly_at_window_length() {
        let (window, clock) = mock_window(T0_MS);
        window.ingest(dec!(5), at(T0_MS)).unwrap();

        clock.store(T0_MS + 59_999, Ordering::SeqCst);
        assert_eq!(window.snapshot().count(), 1);

        clock.store(T0_MS + 60_000, Ordering::SeqCst);
        assert_eq!(window.snapshot().count(), 0);
    }

    #[test]
    fn test_stale_bucket_reset_before_reuse() {
        let (window, clock) = mock_window(T0_MS);
        window.ingest(dec!(100.5), at(T0_MS)).unwrap();

        // Same second-of-minute one minute later
        clock.store(T0_MS + 60_000, Ordering::SeqCst);
        window.ingest(dec!(7), at(T0_MS + 60_000)).unwrap();

        let snapshot = window.snapshot();
        assert_eq!(snapshot.count(), 1);
        assert_eq!(snapshot.sum().to_string(), "7.00");
        assert_eq!(snapshot.max().to_string(), "7.00");
    }

    #[test]
    fn test_partial_expiry() {
        let (window, clock) = mock_window(T0_MS);
        window.ingest(dec!(200.5), at(T0_MS)).unwrap();
        window.ingest(dec!(100.5), at(T0_MS - 59_000)).unwrap();

        clock.store(T0_MS + 1_000, Ordering::SeqCst);

        let snapshot = window.snapshot();
        assert_eq!(snapshot.count(), 1);
        assert_eq!(snapshot.sum().to_string(), "200.50");
    }

    #[test]
    fn test_unordered_events_within_same_second() {
        let (window, _) = mock_window(T0_MS + 500);
        window.ingest(dec!(200.5), at(T0_MS + 500)).unwrap();
        window.ingest(dec!(100.5), at(T0_MS + 490)).unwrap();

        let snapshot = window.snapshot();
        assert_eq!(snapshot.count(), 2);
        assert_eq!(snapshot.avg().to_string(), "150.50");
    }

    #[test]
    fn test_marker_is_last_writer() {
        let (window, clock) = mock_window(T0_MS + 900);
        window.ingest(dec!(1), at(T0_MS + 900)).unwrap();
        // Earlier timestamp in the same second writes last and owns the marker
        window.ingest(dec!(2), at(T0_MS + 100)).unwrap();

        // Alive for the later event, expired for the marker
        clock.store(T0_MS + 60_100, Ordering::SeqCst);
        assert_eq!(window.snapshot().count(), 0);
    }

    #[test]
    fn test_reset_all() {
        let (window, _) = mock_window(T0_MS);
        for offset in 0..10 {
            window.ingest(dec!(1.1), at(T0_MS - offset * 1_000)).unwrap();
        }
        assert_eq!(window.snapshot().count(), 10);

        window.reset_all();

        assert_eq!(window.snapshot().count(), 0);
        window.reset_all();
        assert_eq!(window.snapshot().count(), 0);
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let (window, _) = mock_window(T0_MS);
        window.ingest(dec!(3), at(T0_MS)).unwrap();

        let snapshot = window.snapshot();
        window.ingest(dec!(4), at(T0_MS)).unwrap();
        window.reset_all();

        assert_eq!(snapshot.count(), 1);
        assert_eq!(snapshot.sum().to_string(), "3.00");
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let (window, _) = mock_window(T0_MS);
        window.ingest(dec!(200), at(T0_MS)).unwrap();

        assert_eq!(window.snapshot(), window.snapshot());
    }
}
