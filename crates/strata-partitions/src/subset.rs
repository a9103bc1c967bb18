//! Partition subsets: which partitions of a definition are selected.
//!
//! Subsets are pure, immutable value types. Every mutation is functional:
//! [`PartitionsSubset::with_partition_keys`] returns a new subset and never
//! mutates in place, which makes subsets safe to share freely across
//! concurrent scheduler evaluation threads.
//!
//! Two representations exist:
//!
//! - [`KeySetPartitionsSubset`]: an explicit key set, used for static and
//!   multi-dimensional spaces
//! - [`TimeWindowPartitionsSubset`]: a sorted list of coalesced time
//!   windows plus a cached partition count, compact for time-window spaces
//!   regardless of how many partitions are selected

use std::collections::BTreeSet;

use strata_core::TimeWindow;

use crate::definition::{PartitionsDefinition, TimeWindowPartitionsDefinition};
use crate::error::{Error, Result};

/// A concrete selection of partitions from a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionsSubset {
    /// An explicit key set (static and multi-dimensional spaces).
    KeySet(KeySetPartitionsSubset),
    /// A coalesced window list (time-window spaces).
    TimeWindows(TimeWindowPartitionsSubset),
}

impl PartitionsSubset {
    /// Returns a new subset containing the union of the existing keys and
    /// `keys`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPartitionKey`] if any key is not addressable
    /// under the subset's definition; invalid keys are never silently
    /// dropped.
    pub fn with_partition_keys<I, S>(&self, keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match self {
            Self::KeySet(subset) => Ok(Self::KeySet(subset.with_partition_keys(keys)?)),
            Self::TimeWindows(subset) => Ok(Self::TimeWindows(subset.with_partition_keys(keys)?)),
        }
    }

    /// Materializes all contained partition keys.
    ///
    /// For window-list subsets the cost is proportional to the number of
    /// contained partitions, not to the representation size; callers that
    /// only need cardinality must use [`Self::partitions_count`].
    #[must_use]
    pub fn partition_keys(&self) -> Vec<String> {
        match self {
            Self::KeySet(subset) => subset.partition_keys(),
            Self::TimeWindows(subset) => subset.partition_keys(),
        }
    }

    /// The number of selected partitions, without materializing keys.
    #[must_use]
    pub fn partitions_count(&self) -> usize {
        match self {
            Self::KeySet(subset) => subset.partitions_count(),
            Self::TimeWindows(subset) => subset.partitions_count(),
        }
    }

    /// Returns true if no partitions are selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.partitions_count() == 0
    }

    /// Returns true if `key` is selected.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        match self {
            Self::KeySet(subset) => subset.contains(key),
            Self::TimeWindows(subset) => subset.contains(key),
        }
    }

    /// The definition this subset selects from.
    #[must_use]
    pub fn definition(&self) -> PartitionsDefinition {
        match self {
            Self::KeySet(subset) => subset.definition().clone(),
            Self::TimeWindows(subset) => {
                PartitionsDefinition::TimeWindow(subset.definition().clone())
            }
        }
    }
}

/// An explicit key-set selection over a static or multi-dimensional space.
///
/// Keys are held in a `BTreeSet` so materialization order, equality, and
/// serialization are deterministic regardless of insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySetPartitionsSubset {
    definition: PartitionsDefinition,
    keys: BTreeSet<String>,
}

impl KeySetPartitionsSubset {
    /// Creates an empty subset over `definition`.
    #[must_use]
    pub fn empty(definition: PartitionsDefinition) -> Self {
        Self {
            definition,
            keys: BTreeSet::new(),
        }
    }

    /// Returns a new subset with `keys` added.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPartitionKey`] if any key is not a member of
    /// the definition's key space.
    pub fn with_partition_keys<I, S>(&self, keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut merged = self.keys.clone();
        for key in keys {
            let key = key.as_ref();
            if !self.definition.has_partition_key(key) {
                return Err(Error::invalid_partition_key(
                    key,
                    format!(
                        "not a member of the {} partition space",
                        self.definition.kind()
                    ),
                ));
            }
            merged.insert(key.to_string());
        }
        Ok(Self {
            definition: self.definition.clone(),
            keys: merged,
        })
    }

    /// The selected keys in sorted order.
    #[must_use]
    pub fn partition_keys(&self) -> Vec<String> {
        self.keys.iter().cloned().collect()
    }

    /// The number of selected keys.
    #[must_use]
    pub fn partitions_count(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if `key` is selected.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// The definition this subset selects from.
    #[must_use]
    pub fn definition(&self) -> &PartitionsDefinition {
        &self.definition
    }
}

/// A compact window-list selection over a time-window space.
///
/// Invariants: windows are sorted ascending by start; no two windows touch
/// or overlap (adjacent windows are always merged into one); the cached
/// count, when present, equals the total number of schedule ticks covered
/// and is maintained by delta on every mutation.
#[derive(Debug, Clone)]
pub struct TimeWindowPartitionsSubset {
    definition: TimeWindowPartitionsDefinition,
    included_windows: Vec<TimeWindow>,
    num_partitions: Option<usize>,
}

impl PartialEq for TimeWindowPartitionsSubset {
    fn eq(&self, other: &Self) -> bool {
        // The cached count is derived state and excluded from identity.
        self.definition == other.definition && self.included_windows == other.included_windows
    }
}

impl Eq for TimeWindowPartitionsSubset {}

impl TimeWindowPartitionsSubset {
    /// Creates an empty subset over `definition`.
    #[must_use]
    pub fn empty(definition: TimeWindowPartitionsDefinition) -> Self {
        Self {
            definition,
            included_windows: Vec::new(),
            num_partitions: Some(0),
        }
    }

    /// Creates a subset from an explicit window list.
    ///
    /// When `num_partitions` is `None` the count is recomputed from the
    /// windows, so a constructed subset always reports a resolved count.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDefinition`] if the windows are not sorted,
    /// overlap, or touch; construction is atomic and never produces a
    /// half-valid subset.
    pub fn new(
        definition: TimeWindowPartitionsDefinition,
        included_windows: Vec<TimeWindow>,
        num_partitions: Option<usize>,
    ) -> Result<Self> {
        for pair in included_windows.windows(2) {
            if pair[0].end() >= pair[1].start() {
                return Err(Error::invalid_definition(format!(
                    "subset windows must be sorted, disjoint, and coalesced; found {} before {}",
                    pair[0], pair[1]
                )));
            }
        }
        let mut subset = Self {
            definition,
            included_windows,
            num_partitions,
        };
        if subset.num_partitions.is_none() {
            subset.num_partitions = Some(subset.computed_count());
        }
        Ok(subset)
    }

    /// Returns a new subset with the windows for `keys` merged in.
    ///
    /// Each key resolves to its containing schedule tick window, which is
    /// located by binary search and coalesced with any touching neighbors.
    /// Adding an already-included key changes nothing.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPartitionKey`] if any key does not resolve
    /// under the definition.
    pub fn with_partition_keys<I, S>(&self, keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let base_count = match self.num_partitions {
            Some(count) => count,
            None => self.computed_count(),
        };

        let mut windows = self.included_windows.clone();
        let mut added = 0usize;
        for key in keys {
            let window = self
                .definition
                .time_window_for_partition_key(key.as_ref())?;
            if insert_window(&mut windows, window)? {
                added += 1;
            }
        }

        Ok(Self {
            definition: self.definition.clone(),
            included_windows: windows,
            num_partitions: Some(base_count + added),
        })
    }

    /// The coalesced windows, sorted ascending by start.
    #[must_use]
    pub fn included_windows(&self) -> &[TimeWindow] {
        &self.included_windows
    }

    /// Materializes every selected key by re-expanding each window.
    #[must_use]
    pub fn partition_keys(&self) -> Vec<String> {
        self.included_windows
            .iter()
            .flat_map(|window| self.definition.partition_keys_in_range(window))
            .collect()
    }

    /// The number of selected partitions.
    ///
    /// Prefers the cached count; falls back to summing the ticks covered
    /// by each window, without rendering any keys.
    #[must_use]
    pub fn partitions_count(&self) -> usize {
        match self.num_partitions {
            Some(count) => count,
            None => self.computed_count(),
        }
    }

    /// Returns true if `key` resolves to a window covered by this subset.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        let Ok(window) = self.definition.time_window_for_partition_key(key) else {
            return false;
        };
        let insert_at = self
            .included_windows
            .partition_point(|w| w.end() < window.start());
        self.included_windows
            .get(insert_at)
            .is_some_and(|w| w.start() <= window.start() && w.end() >= window.end())
    }

    /// The time-window definition this subset selects from.
    #[must_use]
    pub fn definition(&self) -> &TimeWindowPartitionsDefinition {
        &self.definition
    }

    fn computed_count(&self) -> usize {
        self.included_windows
            .iter()
            .map(|window| self.definition.ticks_in_window(window))
            .sum()
    }
}

/// Inserts a single-tick `window` into a sorted, coalesced window list,
/// merging touching neighbors. Returns true if coverage grew.
fn insert_window(windows: &mut Vec<TimeWindow>, window: TimeWindow) -> Result<bool> {
    // `lo..hi` is the contiguous run of windows that overlap or touch the
    // new window.
    let lo = windows.partition_point(|w| w.end() < window.start());
    let hi = windows.partition_point(|w| w.start() <= window.end());

    if lo == hi {
        windows.insert(lo, window);
        return Ok(true);
    }
    if hi - lo == 1 && windows[lo].start() <= window.start() && windows[lo].end() >= window.end() {
        return Ok(false);
    }

    let merged = windows
        .drain(lo..hi)
        .try_fold(window, |acc, neighbor| acc.merge_with(&neighbor))?;
    windows.insert(lo, merged);
    Ok(true)
}
