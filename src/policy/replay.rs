//! Replay rejection for accepted message IDs.
//!
//! The replay cache is the only shared mutable state in the validation core.
//! Check-and-insert runs under one mutex so that concurrent submissions of
//! the same message ID yield exactly one acceptance.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{ConsumerError, ConsumerResult};
use crate::policy::SecurityPolicyContext;

/// Time-bounded set of previously accepted message identifiers.
///
/// Constructed once at startup; entries self-expire after the retention
/// duration. Expired entries are logically absent and are pruned
/// opportunistically on each check.
pub struct ReplayCache {
    entries: Mutex<HashMap<String, DateTime<Utc>>>,
    retention: Duration,
}

impl ReplayCache {
    pub fn new(retention_millis: i64) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            retention: Duration::milliseconds(retention_millis),
        }
    }

    /// Atomically check for a live entry and insert one if absent.
    ///
    /// Rejects with [`ConsumerError::ReplayedMessage`] if the ID was accepted
    /// within the retention window; otherwise records it and accepts.
    pub fn check_and_insert(&self, message_id: &str) -> ConsumerResult<()> {
        self.check_and_insert_at(message_id, Utc::now())
    }

    fn check_and_insert_at(&self, message_id: &str, now: DateTime<Utc>) -> ConsumerResult<()> {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            // A panic while holding the lock cannot leave the map in a
            // partial state; check-and-insert is a single map operation.
            Err(poisoned) => poisoned.into_inner(),
        };

        entries.retain(|_, expiry| *expiry > now);

        if entries.contains_key(message_id) {
            warn!(message_id = %message_id, "Replayed message rejected");
            return Err(ConsumerError::ReplayedMessage(message_id.to_string()));
        }

        entries.insert(message_id.to_string(), now + self.retention);
        debug!(message_id = %message_id, live_entries = entries.len(), "Message ID recorded");
        Ok(())
    }

    /// Drop expired entries. Returns how many were removed.
    ///
    /// Pruning also happens on every check; this is for callers that want to
    /// reclaim memory during idle periods.
    pub fn purge_expired(&self) -> usize {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = Utc::now();
        let before = entries.len();
        entries.retain(|_, expiry| *expiry > now);
        before - entries.len()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = Utc::now();
        entries.values().filter(|expiry| **expiry > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Policy rule wrapping the cache: keys replay rejection on the response ID.
pub struct ReplayRule {
    cache: ReplayCache,
}

impl ReplayRule {
    pub fn new(cache: ReplayCache) -> Self {
        Self { cache }
    }

    pub fn evaluate(&self, ctx: &SecurityPolicyContext<'_>) -> ConsumerResult<()> {
        self.cache.check_and_insert(&ctx.response.id)
    }
}
