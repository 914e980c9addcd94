//! In-memory transaction statistics over a trailing 60-second window.
//!
//! - [`window_core`]: the bucketed window and its decimal accumulator
//! - [`boundary`]: request parsing, status mapping and warp routes
//! - [`config`]: environment-driven server configuration

pub mod boundary;
pub mod config;
pub mod window_core;

pub use config::ServerConfig;
pub use window_core::{BucketedWindow, DecimalAccumulator, IngestError};
