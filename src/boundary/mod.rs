//! Boundary Layer - wire formats and HTTP routes around the window core
//!
//! Parsing, status mapping and routing live here so the window never handles
//! string literals or transport concerns.

pub mod dto;
pub mod outcome;
pub mod routes;
pub mod view;

pub use dto::{Event, TransactionDto};
pub use outcome::ProcessingError;
pub use routes::routes;
pub use view::StatisticsView;
