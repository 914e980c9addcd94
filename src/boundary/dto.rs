//! Wire-format transaction payloads
//!
//! The window never sees string literals. Everything is parsed here and parse
//! failures become [`ProcessingError::UnparseableTransaction`]. Amounts with
//! more than [`MAX_AMOUNT_INTEGER_DIGITS`] integer digits are rejected the same
//! way.

use super::outcome::ProcessingError;
use crate::window_core::{amount_in_range, MAX_AMOUNT_INTEGER_DIGITS};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Request body of `POST /transactions`
///
/// - `amount`: decimal literal, plain or scientific notation, below 10^15 in magnitude
/// - `timestamp`: ISO 8601 instant, e.g. `2024-01-01T00:00:30.123Z`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDto {
    pub amount: String,
    pub timestamp: String,
}

/// A parsed transaction ready for the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl TransactionDto {
    pub fn new(amount: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            timestamp: timestamp.into(),
        }
    }

    pub fn parse(&self) -> Result<Event, ProcessingError> {
        let amount =
            parse_amount(&self.amount).ok_or(ProcessingError::UnparseableTransaction)?;
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map_err(|_| ProcessingError::UnparseableTransaction)?
            .with_timezone(&Utc);

        Ok(Event { amount, timestamp })
    }
}

fn parse_amount(literal: &str) -> Option<Decimal> {
    let amount = Decimal::from_str_exact(literal)
        .or_else(|_| Decimal::from_scientific(literal))
        .ok()?;
    amount_in_range(amount).then_some(amount)
}
