//! # strata-partitions
//!
//! Partition space definitions and subset tracking for the Strata
//! scheduler.
//!
//! This crate implements the partition engine domain:
//!
//! - **Definitions**: the addressable key space of a pipeline — static key
//!   lists, cron-driven time windows, and multi-dimensional cross-products
//! - **Subsets**: compact, immutable selections of partitions, mutated
//!   functionally and shared freely across evaluation threads
//! - **Serdes**: a versioned wire format with strict rejection of unknown
//!   future versions and tolerant acceptance of recognized legacy formats
//!
//! ## Guarantees
//!
//! - **Deterministic**: equal subsets serialize to identical payloads,
//!   regardless of construction order
//! - **Round-trippable**: `deserialize(serialize(s), def) == s`, including
//!   per-window timezone identity
//! - **Fail-fast**: invalid keys and unknown format versions surface as
//!   errors at the call site, never as silently empty subsets
//!
//! ## Example
//!
//! ```rust
//! use chrono_tz::UTC;
//! use strata_partitions::prelude::*;
//!
//! # fn main() -> strata_partitions::error::Result<()> {
//! let definition = PartitionsDefinition::TimeWindow(
//!     TimeWindowPartitionsDefinition::daily("2023-01-01", None, UTC)?,
//! );
//!
//! let subset = definition
//!     .empty_subset()
//!     .with_partition_keys(["2023-01-02", "2023-01-03"])?;
//! assert_eq!(subset.partitions_count(), 2);
//!
//! let persisted = serialize_subset(&subset)?;
//! let restored = deserialize_subset(&persisted, &definition)?;
//! assert_eq!(restored, subset);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod definition;
pub mod error;
pub mod serdes;
pub mod subset;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::definition::{
        MultiPartitionsDefinition, PartitionDimension, PartitionsDefinition,
        StaticPartitionsDefinition, TimeWindowPartitionsDefinition, MULTI_KEY_DELIMITER,
    };
    pub use crate::error::{Error, Result};
    pub use crate::serdes::{deserialize_subset, serialize_subset};
    pub use crate::subset::{
        KeySetPartitionsSubset, PartitionsSubset, TimeWindowPartitionsSubset,
    };
}

// Re-export key types at crate root for ergonomics
pub use definition::{
    MultiPartitionsDefinition, PartitionDimension, PartitionsDefinition,
    StaticPartitionsDefinition, TimeWindowPartitionsDefinition, MULTI_KEY_DELIMITER,
};
pub use error::{Error, Result};
pub use serdes::{
    deserialize_subset, serialize_subset, KEY_SET_SERIALIZATION_VERSION,
    TIME_WINDOW_SERIALIZATION_VERSION,
};
pub use subset::{KeySetPartitionsSubset, PartitionsSubset, TimeWindowPartitionsSubset};
