//! Issue-instant freshness rule.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::error::{ConsumerError, ConsumerResult};
use crate::policy::SecurityPolicyContext;

/// Bounds the acceptable age of a message relative to the evaluator's clock.
///
/// A message is fresh iff its issue instant lies in
/// `[now - skew - validity, now + skew]`, both ends inclusive.
#[derive(Debug)]
pub struct FreshnessRule {
    clock_skew: Duration,
    validity: Duration,
}

impl FreshnessRule {
    pub fn new(clock_skew_secs: i64, validity_secs: i64) -> Self {
        Self {
            clock_skew: Duration::seconds(clock_skew_secs),
            validity: Duration::seconds(validity_secs),
        }
    }

    pub fn evaluate(&self, ctx: &SecurityPolicyContext<'_>) -> ConsumerResult<()> {
        self.evaluate_at(ctx.response.issue_instant, Utc::now())
    }

    /// Pure decision over an explicit `now`, so the window bounds are exact.
    fn evaluate_at(&self, issue_instant: DateTime<Utc>, now: DateTime<Utc>) -> ConsumerResult<()> {
        let earliest = now - self.clock_skew - self.validity;
        let latest = now + self.clock_skew;

        if issue_instant < earliest {
            warn!(
                issue_instant = %issue_instant,
                earliest = %earliest,
                "Message issue instant is stale"
            );
            return Err(ConsumerError::StaleOrFutureIssueInstant(format!(
                "issue instant {issue_instant} is before the earliest accepted instant {earliest}"
            )));
        }

        if issue_instant > latest {
            warn!(
                issue_instant = %issue_instant,
                latest = %latest,
                "Message issue instant is in the future"
            );
            return Err(ConsumerError::StaleOrFutureIssueInstant(format!(
                "issue instant {issue_instant} is after the latest accepted instant {latest}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> FreshnessRule {
        // Default deployment values: 90s skew, 300s validity.
        FreshnessRule::new(90, 300)
    }

    #[test]
    fn test_current_instant_passes() {
        let now = Utc::now();
        assert!(rule().evaluate_at(now, now).is_ok());
    }

    #[test]
    fn test_stale_instant_rejected() {
        let now = Utc::now();
        let result = rule().evaluate_at(now - Duration::seconds(600), now);
        assert!(matches!(
            result,
            Err(ConsumerError::StaleOrFutureIssueInstant(_))
        ));
    }

    #[test]
    fn test_lower_bound_is_inclusive() {
        let now = Utc::now();
        // 90 + 300 = 390s is exactly the oldest accepted age.
        assert!(rule().evaluate_at(now - Duration::seconds(390), now).is_ok());
        assert!(rule()
            .evaluate_at(now - Duration::seconds(391), now)
            .is_err());
    }

    #[test]
    fn test_upper_bound_is_inclusive() {
        let now = Utc::now();
        assert!(rule().evaluate_at(now + Duration::seconds(90), now).is_ok());
        assert!(rule()
            .evaluate_at(now + Duration::seconds(91), now)
            .is_err());
    }

    #[test]
    fn test_rejection_names_the_violated_bound() {
        let now = Utc::now();

        let stale = rule()
            .evaluate_at(now - Duration::seconds(600), now)
            .unwrap_err();
        assert!(stale.to_string().contains("before the earliest"));

        let future = rule()
            .evaluate_at(now + Duration::seconds(600), now)
            .unwrap_err();
        assert!(future.to_string().contains("after the latest"));
    }
}
