//! Window Core - 60-second sliding-window statistics
//!
//! # Architecture
//!
//! ```text
//! ingest(amount, timestamp)
//!     ↓
//! BucketedWindow (60 per-second buckets, one lock each)
//!     ↓
//! DecimalAccumulator (count / sum / min / max, exact decimals)
//!     ↓
//! snapshot() → combined DecimalAccumulator
//! ```
//!
//! Memory and time per call are constant: events are folded into the bucket
//! for their second-of-minute and never stored individually.

pub mod accumulator;
pub mod error;
pub mod window;

pub use accumulator::{DecimalAccumulator, OUTPUT_SCALE};
pub use error::{AccumulatorOverflow, IngestError};
pub use window::{
    amount_in_range, BucketedWindow, BUCKET_COUNT, MAX_AMOUNT_INTEGER_DIGITS, WINDOW_MS,
};
