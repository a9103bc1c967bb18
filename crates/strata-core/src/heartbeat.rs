//! Daemon liveness contract.
//!
//! Schedulers built on the partition engine must not trust persisted subset
//! state as "current" unless the daemons feeding it are alive. Liveness for
//! a daemon type holds iff `now - last_heartbeat <= interval + tolerance`;
//! overall health is the conjunction across all expected daemon types.
//!
//! Interval and tolerance are injected through [`HeartbeatPolicy`] rather
//! than read from process-wide globals, so tests can tighten or relax them
//! without mutating shared state.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

/// Production default for the heartbeat emission interval, in seconds.
pub const DEFAULT_HEARTBEAT_INTERVAL_SECONDS: i64 = 30;

/// Production default for the allowed heartbeat lateness, in seconds.
pub const DEFAULT_HEARTBEAT_TOLERANCE_SECONDS: i64 = 60;

/// Heartbeat interval and tolerance for the liveness comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatPolicy {
    /// Expected interval between heartbeats.
    pub interval: Duration,
    /// Allowed lateness beyond the interval before a daemon is unhealthy.
    pub tolerance: Duration,
}

impl Default for HeartbeatPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::seconds(DEFAULT_HEARTBEAT_INTERVAL_SECONDS),
            tolerance: Duration::seconds(DEFAULT_HEARTBEAT_TOLERANCE_SECONDS),
        }
    }
}

impl HeartbeatPolicy {
    /// Returns true if a daemon that last heartbeat at `last_heartbeat`
    /// is still considered live at `now`.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>, last_heartbeat: DateTime<Utc>) -> bool {
        now - last_heartbeat <= self.interval + self.tolerance
    }
}

/// Returns true if every expected daemon type has a live heartbeat.
///
/// A daemon type with no recorded heartbeat is not live.
#[must_use]
pub fn all_daemons_live(
    policy: HeartbeatPolicy,
    now: DateTime<Utc>,
    expected_daemon_types: &[&str],
    last_heartbeats: &HashMap<String, DateTime<Utc>>,
) -> bool {
    expected_daemon_types.iter().all(|daemon_type| {
        last_heartbeats
            .get(*daemon_type)
            .is_some_and(|last| policy.is_live(now, *last))
    })
}
