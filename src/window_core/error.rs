//! Expected ingest outcomes that reject an event
//!
//! These are business results, not faults. A rejected event leaves the window
//! untouched.

/// Why an event was not recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestError {
    /// Event timestamp is ahead of processing time
    FutureEvent { timestamp_ms: i64, now_ms: i64 },
    /// Event is 60 seconds old or older
    TooOld { timestamp_ms: i64, now_ms: i64 },
    /// Amount is too large in magnitude, or would overflow its bucket's sum
    AmountOutOfRange { timestamp_ms: i64, now_ms: i64 },
}

impl IngestError {
    /// Milliseconds between processing time and the event (negative for future events)
    pub fn age_ms(&self) -> i64 {
        match self {
            IngestError::FutureEvent { timestamp_ms, now_ms }
            | IngestError::TooOld { timestamp_ms, now_ms }
            | IngestError::AmountOutOfRange { timestamp_ms, now_ms } => now_ms - timestamp_ms,
        }
    }
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::FutureEvent { .. } => {
                write!(f, "Event is {}ms in the future", -self.age_ms())
            }
            IngestError::TooOld { .. } => {
                write!(f, "Event is {}ms old, outside the window", self.age_ms())
            }
            IngestError::AmountOutOfRange { .. } => {
                write!(f, "Event amount is out of range for its bucket")
            }
        }
    }
}

impl std::error::Error for IngestError {}

/// A running sum or value left the range renderable with two fraction digits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccumulatorOverflow;

impl std::fmt::Display for AccumulatorOverflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Decimal accumulator overflow")
    }
}

impl std::error::Error for AccumulatorOverflow {}
