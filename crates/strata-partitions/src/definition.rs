//! Partition space definitions.
//!
//! A [`PartitionsDefinition`] describes the full, possibly infinite,
//! addressable key space for a pipeline. Definitions are constructed once
//! from pipeline configuration, are immutable value types, and live for the
//! process lifetime. Three shapes are supported:
//!
//! - [`StaticPartitionsDefinition`]: an explicit ordered list of keys
//! - [`TimeWindowPartitionsDefinition`]: one partition per schedule tick of
//!   a cron expression, rendered with a chrono format string
//! - [`MultiPartitionsDefinition`]: a named cross-product of the above

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::offset::LocalResult;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use cron::Schedule;

use strata_core::TimeWindow;

use crate::error::{Error, Result};
use crate::subset::{KeySetPartitionsSubset, PartitionsSubset, TimeWindowPartitionsSubset};

/// Delimiter joining per-dimension keys into a multi-dimensional key.
pub const MULTI_KEY_DELIMITER: char = '|';

/// Cron expression for one partition per day at midnight.
const DAILY_CRON: &str = "0 0 0 * * *";

/// Render format for daily partition keys.
const DAILY_FMT: &str = "%Y-%m-%d";

/// A description of a partition key space.
///
/// Closed over its three shapes; every operation matches exhaustively so
/// the dispatch table stays centralized and auditable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionsDefinition {
    /// An explicit ordered list of unique string keys.
    Static(StaticPartitionsDefinition),
    /// A cron-driven sequence of time windows.
    TimeWindow(TimeWindowPartitionsDefinition),
    /// A named cross-product of child definitions.
    Multi(MultiPartitionsDefinition),
}

impl PartitionsDefinition {
    /// Returns an empty subset of the appropriate representation for this
    /// definition: key-set based for static and multi spaces, window-list
    /// based for time-window spaces.
    #[must_use]
    pub fn empty_subset(&self) -> PartitionsSubset {
        match self {
            Self::Static(_) | Self::Multi(_) => {
                PartitionsSubset::KeySet(KeySetPartitionsSubset::empty(self.clone()))
            }
            Self::TimeWindow(def) => PartitionsSubset::TimeWindows(def.empty_subset()),
        }
    }

    /// Returns true if `key` addresses a partition in this space.
    #[must_use]
    pub fn has_partition_key(&self, key: &str) -> bool {
        match self {
            Self::Static(def) => def.has_partition_key(key),
            Self::TimeWindow(def) => def.has_partition_key(key),
            Self::Multi(def) => def.has_partition_key(key),
        }
    }

    /// Materializes every partition key in this space, in definition order.
    ///
    /// # Errors
    /// Returns [`Error::UnboundedPartitionSpace`] if the space (or any
    /// dimension of it) has no resolved end.
    pub fn partition_keys(&self) -> Result<Vec<String>> {
        match self {
            Self::Static(def) => Ok(def.partition_keys().to_vec()),
            Self::TimeWindow(def) => def.partition_keys(),
            Self::Multi(def) => def.partition_keys(),
        }
    }

    /// Counts the partitions in this space without rendering keys.
    ///
    /// # Errors
    /// Returns [`Error::UnboundedPartitionSpace`] if the space is unbounded.
    pub fn partitions_count(&self) -> Result<usize> {
        match self {
            Self::Static(def) => Ok(def.partitions_count()),
            Self::TimeWindow(def) => def.partitions_count(),
            Self::Multi(def) => def.partitions_count(),
        }
    }

    /// Returns true if full materialization of this space is permitted.
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        match self {
            Self::Static(_) => true,
            Self::TimeWindow(def) => def.is_bounded(),
            Self::Multi(def) => def.dimensions().iter().all(|d| d.definition().is_bounded()),
        }
    }

    /// A short tag naming the definition shape, for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Static(_) => "static",
            Self::TimeWindow(_) => "time_window",
            Self::Multi(_) => "multi",
        }
    }
}

impl From<StaticPartitionsDefinition> for PartitionsDefinition {
    fn from(def: StaticPartitionsDefinition) -> Self {
        Self::Static(def)
    }
}

impl From<TimeWindowPartitionsDefinition> for PartitionsDefinition {
    fn from(def: TimeWindowPartitionsDefinition) -> Self {
        Self::TimeWindow(def)
    }
}

impl From<MultiPartitionsDefinition> for PartitionsDefinition {
    fn from(def: MultiPartitionsDefinition) -> Self {
        Self::Multi(def)
    }
}

/// An explicit, ordered list of unique partition keys.
///
/// Order is significant for display only; membership is order-independent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticPartitionsDefinition {
    keys: Vec<String>,
}

impl StaticPartitionsDefinition {
    /// Creates a static definition from an ordered key list.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDefinition`] if any key is duplicated or
    /// empty.
    pub fn new<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        let mut seen = BTreeSet::new();
        for key in &keys {
            if key.is_empty() {
                return Err(Error::invalid_definition(
                    "static partition keys must be non-empty",
                ));
            }
            if !seen.insert(key.as_str()) {
                return Err(Error::invalid_definition(format!(
                    "duplicate static partition key '{key}'"
                )));
            }
        }
        Ok(Self { keys })
    }

    /// The keys in definition order.
    #[must_use]
    pub fn partition_keys(&self) -> &[String] {
        &self.keys
    }

    /// Returns true if `key` is a member of this space.
    #[must_use]
    pub fn has_partition_key(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// The number of partitions in this space.
    #[must_use]
    pub fn partitions_count(&self) -> usize {
        self.keys.len()
    }

    /// Returns an empty key-set subset over this definition.
    #[must_use]
    pub fn empty_subset(&self) -> KeySetPartitionsSubset {
        KeySetPartitionsSubset::empty(PartitionsDefinition::Static(self.clone()))
    }
}

/// A partition space with one partition per schedule tick.
///
/// Each partition is a half-open [`TimeWindow`] between consecutive ticks
/// of `cron_schedule`, keyed by the window's start rendered with `fmt` in
/// `timezone`. The start is tick-aligned by construction (snapped forward
/// to the first tick at or after the configured start). Keys generate
/// lazily as a monotonic, ascending sequence.
#[derive(Debug, Clone)]
pub struct TimeWindowPartitionsDefinition {
    schedule: Schedule,
    cron_schedule: String,
    start: DateTime<Tz>,
    end: Option<DateTime<Tz>>,
    fmt: String,
    timezone: Tz,
    end_offset: i32,
}

impl PartialEq for TimeWindowPartitionsDefinition {
    fn eq(&self, other: &Self) -> bool {
        // The parsed schedule is derived state; the expression string is
        // the identity.
        self.cron_schedule == other.cron_schedule
            && self.start == other.start
            && self.end == other.end
            && self.fmt == other.fmt
            && self.timezone == other.timezone
            && self.end_offset == other.end_offset
    }
}

impl Eq for TimeWindowPartitionsDefinition {}

impl TimeWindowPartitionsDefinition {
    /// Creates a time-window definition.
    ///
    /// `start` and `end` are rendered partition boundaries, parsed with
    /// `fmt` in `timezone`. `end_offset` shifts the final generated
    /// boundary by that many schedule ticks; a positive offset includes
    /// partially-elapsed in-progress windows.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDefinition`] if the cron expression or
    /// either boundary does not parse, or if `end` precedes `start`.
    pub fn new(
        start: &str,
        end: Option<&str>,
        cron_schedule: &str,
        fmt: &str,
        timezone: Tz,
        end_offset: i32,
    ) -> Result<Self> {
        let schedule = Schedule::from_str(cron_schedule).map_err(|e| {
            Error::invalid_definition(format!("invalid cron schedule '{cron_schedule}': {e}"))
        })?;

        let raw_start = parse_local(start, fmt, timezone)
            .map_err(|e| Error::invalid_definition(format!("invalid start '{start}': {e}")))?;
        // Snap forward so the start is always tick-aligned.
        let aligned_start = next_boundary_at_or_after(&schedule, &raw_start).ok_or_else(|| {
            Error::invalid_definition(format!(
                "cron schedule '{cron_schedule}' produces no tick at or after start '{start}'"
            ))
        })?;

        let end = end
            .map(|e| {
                parse_local(e, fmt, timezone)
                    .map_err(|err| Error::invalid_definition(format!("invalid end '{e}': {err}")))
            })
            .transpose()?;
        if let Some(end) = end {
            if end < aligned_start {
                return Err(Error::invalid_definition(format!(
                    "end '{end}' precedes the tick-aligned start '{aligned_start}'"
                )));
            }
        }

        Ok(Self {
            schedule,
            cron_schedule: cron_schedule.to_string(),
            start: aligned_start,
            end,
            fmt: fmt.to_string(),
            timezone,
            end_offset,
        })
    }

    /// Creates a daily definition: one partition per calendar day at
    /// midnight in `timezone`, keyed as `YYYY-MM-DD`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDefinition`] if either date does not parse.
    pub fn daily(start_date: &str, end_date: Option<&str>, timezone: Tz) -> Result<Self> {
        Self::new(start_date, end_date, DAILY_CRON, DAILY_FMT, timezone, 0)
    }

    /// The tick-aligned start boundary.
    #[must_use]
    pub fn start(&self) -> DateTime<Tz> {
        self.start
    }

    /// The configured end boundary, if any.
    #[must_use]
    pub fn end(&self) -> Option<DateTime<Tz>> {
        self.end
    }

    /// The cron expression driving the schedule ticks.
    #[must_use]
    pub fn cron_schedule(&self) -> &str {
        &self.cron_schedule
    }

    /// The chrono format string rendering a window's start as a key.
    #[must_use]
    pub fn fmt(&self) -> &str {
        &self.fmt
    }

    /// The IANA timezone of the partition space.
    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// The configured end offset in schedule ticks.
    #[must_use]
    pub fn end_offset(&self) -> i32 {
        self.end_offset
    }

    /// Returns true if the space has a resolved end and may be fully
    /// materialized.
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        self.end.is_some()
    }

    /// The final generated boundary, with `end_offset` applied in ticks.
    ///
    /// Returns `None` for open-ended spaces.
    #[must_use]
    pub fn bounded_end(&self) -> Option<DateTime<Tz>> {
        let end = self.end?;
        match self.end_offset {
            0 => Some(end),
            offset if offset > 0 => {
                let mut boundary = end;
                for _ in 0..offset {
                    boundary = self.schedule.after(&boundary).next()?;
                }
                Some(boundary)
            }
            offset => {
                let drop = offset.unsigned_abs() as usize;
                let boundaries: Vec<_> = self
                    .boundaries_from(self.start)
                    .take_while(|t| *t <= end)
                    .collect();
                if boundaries.len() <= drop {
                    Some(self.start)
                } else {
                    Some(boundaries[boundaries.len() - 1 - drop])
                }
            }
        }
    }

    /// Returns an empty window-list subset over this definition.
    #[must_use]
    pub fn empty_subset(&self) -> TimeWindowPartitionsSubset {
        TimeWindowPartitionsSubset::empty(self.clone())
    }

    /// Resolves a partition key to the schedule tick window containing it.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPartitionKey`] if the key does not parse
    /// with `fmt`, does not align to a schedule tick, or falls outside
    /// `[start, bounded_end)`.
    pub fn time_window_for_partition_key(&self, key: &str) -> Result<TimeWindow> {
        let start = parse_local(key, &self.fmt, self.timezone)
            .map_err(|e| Error::invalid_partition_key(key, e))?;

        if start < self.start {
            return Err(Error::invalid_partition_key(
                key,
                format!("precedes the partition space start {}", self.start),
            ));
        }
        if self.boundaries_from(start).next() != Some(start) {
            return Err(Error::invalid_partition_key(
                key,
                format!(
                    "does not align to a tick of cron schedule '{}'",
                    self.cron_schedule
                ),
            ));
        }

        let end = self.schedule.after(&start).next().ok_or_else(|| {
            Error::invalid_partition_key(
                key,
                format!("no tick of '{}' follows {start}", self.cron_schedule),
            )
        })?;
        if let Some(bound) = self.bounded_end() {
            if end > bound {
                return Err(Error::invalid_partition_key(
                    key,
                    format!("window extends past the partition space end {bound}"),
                ));
            }
        }

        TimeWindow::new(start, end).map_err(Error::from)
    }

    /// Returns true if `key` addresses a partition in this space.
    #[must_use]
    pub fn has_partition_key(&self, key: &str) -> bool {
        self.time_window_for_partition_key(key).is_ok()
    }

    /// Renders every partition key inside `window`, ascending.
    ///
    /// The sequence is a pure function of its inputs: finite, restartable,
    /// and lexicographically non-decreasing for date-like formats.
    pub fn partition_keys_in_range<'a>(
        &'a self,
        window: &TimeWindow,
    ) -> impl Iterator<Item = String> + 'a {
        let end = window.end();
        self.boundaries_from(window.start())
            .take_while(move |tick| *tick < end)
            .map(|tick| self.render_key(&tick))
    }

    /// Counts the schedule ticks inside `window` without rendering keys.
    #[must_use]
    pub fn ticks_in_window(&self, window: &TimeWindow) -> usize {
        let end = window.end();
        self.boundaries_from(window.start())
            .take_while(move |tick| *tick < end)
            .count()
    }

    /// Materializes every partition key in the space, ascending.
    ///
    /// # Errors
    /// Returns [`Error::UnboundedPartitionSpace`] if no end is resolved;
    /// open-ended spaces must never be fully expanded.
    pub fn partition_keys(&self) -> Result<Vec<String>> {
        let bound = self.require_bounded_end()?;
        Ok(self
            .window_starts_until(bound)
            .map(|tick| self.render_key(&tick))
            .collect())
    }

    /// Counts the partitions in the space without rendering keys.
    ///
    /// # Errors
    /// Returns [`Error::UnboundedPartitionSpace`] if no end is resolved.
    pub fn partitions_count(&self) -> Result<usize> {
        let bound = self.require_bounded_end()?;
        Ok(self.window_starts_until(bound).count())
    }

    fn require_bounded_end(&self) -> Result<DateTime<Tz>> {
        self.bounded_end().ok_or_else(|| {
            Error::unbounded(format!(
                "partition space starting at {} has no resolved end",
                self.start
            ))
        })
    }

    fn render_key(&self, tick: &DateTime<Tz>) -> String {
        tick.format(&self.fmt).to_string()
    }

    /// Schedule ticks at or after `t`, ascending.
    fn boundaries_from(&self, t: DateTime<Tz>) -> impl Iterator<Item = DateTime<Tz>> + '_ {
        self.schedule.after(&(t - Duration::seconds(1)))
    }

    /// Start ticks of every complete window in `[start, bound]`.
    fn window_starts_until(&self, bound: DateTime<Tz>) -> impl Iterator<Item = DateTime<Tz>> + '_ {
        let mut boundaries = self.boundaries_from(self.start).peekable();
        std::iter::from_fn(move || {
            let tick = boundaries.next()?;
            if tick >= bound {
                return None;
            }
            match boundaries.peek() {
                Some(next) if *next <= bound => Some(tick),
                _ => None,
            }
        })
    }
}

/// One named dimension of a multi-dimensional partition space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionDimension {
    name: String,
    definition: PartitionsDefinition,
}

impl PartitionDimension {
    /// The dimension name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The child definition for this dimension.
    #[must_use]
    pub fn definition(&self) -> &PartitionsDefinition {
        &self.definition
    }
}

/// A named cross-product of child partition definitions.
///
/// A partition key in this space is the `|`-joined tuple of per-dimension
/// keys, in sorted dimension-name order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiPartitionsDefinition {
    dimensions: Vec<PartitionDimension>,
}

impl MultiPartitionsDefinition {
    /// Creates a multi-dimensional definition from named child definitions.
    ///
    /// Dimensions are ordered by name. Children may not themselves be
    /// multi-dimensional, and static child keys may not contain the tuple
    /// delimiter.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDefinition`] on empty/duplicate dimension
    /// names, nested multi definitions, or delimiter-bearing child keys.
    pub fn new<I, S>(dimensions: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, PartitionsDefinition)>,
        S: Into<String>,
    {
        let mut dimensions: Vec<PartitionDimension> = dimensions
            .into_iter()
            .map(|(name, definition)| PartitionDimension {
                name: name.into(),
                definition,
            })
            .collect();

        if dimensions.is_empty() {
            return Err(Error::invalid_definition(
                "multi-partition definitions require at least one dimension",
            ));
        }

        let mut names = BTreeSet::new();
        for dim in &dimensions {
            if dim.name.is_empty() {
                return Err(Error::invalid_definition(
                    "dimension names must be non-empty",
                ));
            }
            if dim.name.contains(MULTI_KEY_DELIMITER) {
                return Err(Error::invalid_definition(format!(
                    "dimension name '{}' contains the tuple delimiter '{MULTI_KEY_DELIMITER}'",
                    dim.name
                )));
            }
            if !names.insert(dim.name.clone()) {
                return Err(Error::invalid_definition(format!(
                    "duplicate dimension name '{}'",
                    dim.name
                )));
            }
            match &dim.definition {
                PartitionsDefinition::Multi(_) => {
                    return Err(Error::invalid_definition(format!(
                        "dimension '{}' nests a multi-partition definition",
                        dim.name
                    )));
                }
                PartitionsDefinition::Static(def) => {
                    if let Some(bad) = def
                        .partition_keys()
                        .iter()
                        .find(|k| k.contains(MULTI_KEY_DELIMITER))
                    {
                        return Err(Error::invalid_definition(format!(
                            "key '{bad}' in dimension '{}' contains the tuple delimiter '{MULTI_KEY_DELIMITER}'",
                            dim.name
                        )));
                    }
                }
                PartitionsDefinition::TimeWindow(_) => {}
            }
        }

        dimensions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self { dimensions })
    }

    /// The dimensions in sorted name order.
    #[must_use]
    pub fn dimensions(&self) -> &[PartitionDimension] {
        &self.dimensions
    }

    /// Returns true if `key` is a well-formed tuple whose every component
    /// is a member of its dimension.
    #[must_use]
    pub fn has_partition_key(&self, key: &str) -> bool {
        let components: Vec<&str> = key.split(MULTI_KEY_DELIMITER).collect();
        components.len() == self.dimensions.len()
            && components
                .iter()
                .zip(&self.dimensions)
                .all(|(component, dim)| dim.definition.has_partition_key(component))
    }

    /// Materializes the full cross-product of tuple keys, with the first
    /// dimension most significant.
    ///
    /// # Errors
    /// Returns [`Error::UnboundedPartitionSpace`] if any dimension is
    /// unbounded.
    pub fn partition_keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = Vec::new();
        for (i, dim) in self.dimensions.iter().enumerate() {
            let dim_keys = dim.definition.partition_keys()?;
            if i == 0 {
                keys = dim_keys;
            } else {
                keys = keys
                    .iter()
                    .flat_map(|prefix| {
                        dim_keys
                            .iter()
                            .map(move |k| format!("{prefix}{MULTI_KEY_DELIMITER}{k}"))
                    })
                    .collect();
            }
        }
        Ok(keys)
    }

    /// The size of the full key space: the product of dimension sizes.
    ///
    /// # Errors
    /// Returns [`Error::UnboundedPartitionSpace`] if any dimension is
    /// unbounded.
    pub fn partitions_count(&self) -> Result<usize> {
        let mut count = 1usize;
        for dim in &self.dimensions {
            count = count.saturating_mul(dim.definition.partitions_count()?);
        }
        Ok(count)
    }

    /// Returns an empty key-set subset over the tuple key space.
    #[must_use]
    pub fn empty_subset(&self) -> KeySetPartitionsSubset {
        KeySetPartitionsSubset::empty(PartitionsDefinition::Multi(self.clone()))
    }
}

/// Parses `value` with `fmt` in `timezone`, accepting either a full
/// datetime format or a date-only format (interpreted at local midnight).
fn parse_local(value: &str, fmt: &str, timezone: Tz) -> std::result::Result<DateTime<Tz>, String> {
    let naive = NaiveDateTime::parse_from_str(value, fmt)
        .or_else(|_| NaiveDate::parse_from_str(value, fmt).map(|d| d.and_time(NaiveTime::MIN)))
        .map_err(|_| format!("does not parse with format '{fmt}'"))?;

    match timezone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        // During a fall-back transition take the earlier wall clock.
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(format!(
            "local time {naive} does not exist in timezone {timezone}"
        )),
    }
}

/// First tick of `schedule` at or after `t`.
fn next_boundary_at_or_after(schedule: &Schedule, t: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    schedule.after(&(*t - Duration::seconds(1))).next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::{America::New_York, UTC};

    fn daily_utc(start: &str, end: Option<&str>) -> TimeWindowPartitionsDefinition {
        TimeWindowPartitionsDefinition::daily(start, end, UTC).unwrap()
    }

    #[test]
    fn static_definition_rejects_duplicates() {
        let err = StaticPartitionsDefinition::new(["a", "b", "a"]).unwrap_err();
        assert!(matches!(err, Error::InvalidDefinition { .. }));
        assert!(err.to_string().contains('a'));
    }

    #[test]
    fn static_definition_preserves_order() {
        let def = StaticPartitionsDefinition::new(["c", "a", "b"]).unwrap();
        assert_eq!(def.partition_keys(), &["c", "a", "b"]);
        assert!(def.has_partition_key("a"));
        assert!(!def.has_partition_key("d"));
        assert_eq!(def.partitions_count(), 3);
    }

    #[test]
    fn daily_definition_enumerates_complete_windows_only() {
        let def = daily_utc("2023-01-01", Some("2023-01-04"));
        assert_eq!(
            def.partition_keys().unwrap(),
            vec!["2023-01-01", "2023-01-02", "2023-01-03"]
        );
        assert_eq!(def.partitions_count().unwrap(), 3);
    }

    #[test]
    fn start_snaps_forward_to_next_tick() {
        // Noon start snaps to the next midnight.
        let def = TimeWindowPartitionsDefinition::new(
            "2023-01-01 12:00:00",
            None,
            DAILY_CRON,
            "%Y-%m-%d %H:%M:%S",
            UTC,
            0,
        )
        .unwrap();
        assert_eq!(def.start(), UTC.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn window_for_key_spans_one_tick() {
        let def = daily_utc("2023-01-01", None);
        let window = def.time_window_for_partition_key("2023-01-02").unwrap();
        assert_eq!(window.start(), UTC.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap());
        assert_eq!(window.end(), UTC.with_ymd_and_hms(2023, 1, 3, 0, 0, 0).unwrap());
    }

    #[test]
    fn misaligned_and_malformed_keys_are_rejected() {
        let def = daily_utc("2023-01-01", None);
        assert!(matches!(
            def.time_window_for_partition_key("not-a-date"),
            Err(Error::InvalidPartitionKey { .. })
        ));
        // Before the space start.
        assert!(matches!(
            def.time_window_for_partition_key("2022-12-25"),
            Err(Error::InvalidPartitionKey { .. })
        ));

        // A weekly schedule rejects keys on non-tick days.
        let weekly = TimeWindowPartitionsDefinition::new(
            "2023-01-01",
            None,
            "0 0 0 * * SUN",
            DAILY_FMT,
            UTC,
            0,
        )
        .unwrap();
        // 2023-01-03 is a Tuesday.
        let err = weekly.time_window_for_partition_key("2023-01-03").unwrap_err();
        assert!(matches!(err, Error::InvalidPartitionKey { .. }));
        assert!(err.to_string().contains("does not align"));
    }

    #[test]
    fn keys_past_the_bounded_end_are_rejected() {
        let def = daily_utc("2023-01-01", Some("2023-01-04"));
        assert!(def.has_partition_key("2023-01-03"));
        assert!(!def.has_partition_key("2023-01-04"));
    }

    #[test]
    fn unbounded_space_refuses_full_materialization() {
        let def = daily_utc("2023-01-01", None);
        assert!(!def.is_bounded());
        assert!(matches!(
            def.partition_keys(),
            Err(Error::UnboundedPartitionSpace { .. })
        ));
        assert!(matches!(
            def.partitions_count(),
            Err(Error::UnboundedPartitionSpace { .. })
        ));
    }

    #[test]
    fn positive_end_offset_extends_by_ticks() {
        let def = TimeWindowPartitionsDefinition::new(
            "2023-01-01",
            Some("2023-01-04"),
            DAILY_CRON,
            DAILY_FMT,
            UTC,
            1,
        )
        .unwrap();
        assert_eq!(
            def.partition_keys().unwrap(),
            vec!["2023-01-01", "2023-01-02", "2023-01-03", "2023-01-04"]
        );
    }

    #[test]
    fn negative_end_offset_drops_trailing_ticks() {
        let def = TimeWindowPartitionsDefinition::new(
            "2023-01-01",
            Some("2023-01-04"),
            DAILY_CRON,
            DAILY_FMT,
            UTC,
            -1,
        )
        .unwrap();
        assert_eq!(
            def.partition_keys().unwrap(),
            vec!["2023-01-01", "2023-01-02"]
        );
    }

    #[test]
    fn partition_keys_in_range_is_restartable() {
        let def = daily_utc("2023-01-01", None);
        let window = TimeWindow::new(
            UTC.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            UTC.with_ymd_and_hms(2023, 1, 4, 0, 0, 0).unwrap(),
        )
        .unwrap();
        let first: Vec<_> = def.partition_keys_in_range(&window).collect();
        let second: Vec<_> = def.partition_keys_in_range(&window).collect();
        assert_eq!(first, vec!["2023-01-01", "2023-01-02", "2023-01-03"]);
        assert_eq!(first, second);
        assert_eq!(def.ticks_in_window(&window), 3);
    }

    #[test]
    fn timezone_definition_renders_local_wall_clock() {
        let def = TimeWindowPartitionsDefinition::daily("2023-01-01", None, New_York).unwrap();
        let window = def.time_window_for_partition_key("2023-01-01").unwrap();
        assert_eq!(window.start().timezone(), New_York);
        assert_eq!(
            window.start(),
            New_York.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn multi_definition_sorts_and_validates_dimensions() {
        let date = daily_utc("2021-05-05", Some("2021-05-10"));
        let abc = StaticPartitionsDefinition::new(["a", "b", "c"]).unwrap();
        let multi = MultiPartitionsDefinition::new([
            ("date".to_string(), PartitionsDefinition::TimeWindow(date)),
            ("abc".to_string(), PartitionsDefinition::Static(abc)),
        ])
        .unwrap();

        let names: Vec<_> = multi.dimensions().iter().map(PartitionDimension::name).collect();
        assert_eq!(names, vec!["abc", "date"]);
        assert_eq!(multi.partitions_count().unwrap(), 3 * 5);
        assert!(multi.has_partition_key("a|2021-05-06"));
        assert!(!multi.has_partition_key("d|2021-05-06"));
        assert!(!multi.has_partition_key("a|2021-05-06|extra"));
    }

    #[test]
    fn multi_definition_rejects_nested_multi_and_delimiter_keys() {
        let abc = StaticPartitionsDefinition::new(["a", "b"]).unwrap();
        let inner = MultiPartitionsDefinition::new([(
            "x",
            PartitionsDefinition::Static(abc.clone()),
        )])
        .unwrap();
        assert!(MultiPartitionsDefinition::new([
            ("outer", PartitionsDefinition::Multi(inner)),
        ])
        .is_err());

        let bad = StaticPartitionsDefinition::new(["a|b"]).unwrap();
        assert!(MultiPartitionsDefinition::new([
            ("dim", PartitionsDefinition::Static(bad)),
        ])
        .is_err());

        assert!(MultiPartitionsDefinition::new([
            ("", PartitionsDefinition::Static(abc)),
        ])
        .is_err());
    }

    #[test]
    fn multi_cross_product_ordering() {
        let ab = StaticPartitionsDefinition::new(["a", "b"]).unwrap();
        let xy = StaticPartitionsDefinition::new(["x", "y"]).unwrap();
        let multi = MultiPartitionsDefinition::new([
            ("first", PartitionsDefinition::Static(ab)),
            ("second", PartitionsDefinition::Static(xy)),
        ])
        .unwrap();
        assert_eq!(
            multi.partition_keys().unwrap(),
            vec!["a|x", "a|y", "b|x", "b|y"]
        );
    }

    #[test]
    fn definitions_are_value_equal() {
        let a = daily_utc("2023-01-01", Some("2023-01-05"));
        let b = daily_utc("2023-01-01", Some("2023-01-05"));
        assert_eq!(a, b);

        let c = TimeWindowPartitionsDefinition::daily("2023-01-01", Some("2023-01-05"), New_York)
            .unwrap();
        assert_ne!(a, c);
    }
}
