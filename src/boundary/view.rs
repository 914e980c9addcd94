use crate::window_core::DecimalAccumulator;
use serde::{Deserialize, Serialize};

/// Response body of `GET /statistics`
///
/// Decimal fields are rendered with exactly two fraction digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsView {
    pub count: u64,
    pub sum: String,
    pub avg: String,
    pub min: String,
    pub max: String,
}

impl From<&DecimalAccumulator> for StatisticsView {
    fn from(stats: &DecimalAccumulator) -> Self {
        Self {
            count: stats.count(),
            sum: stats.sum().to_string(),
            avg: stats.avg().to_string(),
            min: stats.min().to_string(),
            max: stats.max().to_string(),
        }
    }
}
