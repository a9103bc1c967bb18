//! # strata-core
//!
//! Core primitives for the Strata partition engine.
//!
//! This crate provides the foundational types used across all Strata
//! components:
//!
//! - **Time Windows**: Half-open, timezone-aware instant intervals
//! - **Heartbeat Contract**: The daemon liveness gate consumed by schedulers
//! - **Error Types**: Shared error definitions and result types
//! - **Observability**: Structured logging initialization helpers
//!
//! ## Crate Boundary
//!
//! `strata-core` is the only crate allowed to define shared primitives.
//! Domain logic (partition definitions, subsets, serialization) lives in
//! `strata-partitions`.
//!
//! ## Example
//!
//! ```rust
//! use chrono::TimeZone;
//! use chrono_tz::UTC;
//! use strata_core::TimeWindow;
//!
//! let start = UTC.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
//! let end = UTC.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
//! let window = TimeWindow::new(start, end).unwrap();
//! assert!(window.contains(&start));
//! assert!(!window.contains(&end));
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod heartbeat;
pub mod observability;
pub mod time_window;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use strata_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::heartbeat::{all_daemons_live, HeartbeatPolicy};
    pub use crate::time_window::TimeWindow;
}

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use heartbeat::{
    all_daemons_live, HeartbeatPolicy, DEFAULT_HEARTBEAT_INTERVAL_SECONDS,
    DEFAULT_HEARTBEAT_TOLERANCE_SECONDS,
};
pub use observability::{init_logging, LogFormat};
pub use time_window::TimeWindow;
