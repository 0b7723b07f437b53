//! Service-provider configuration.
//!
//! All values are process-wide, set once at startup and immutable afterwards.
//! A configuration error is fatal: the consumer refuses to construct rather
//! than start with a check silently disabled.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for the assertion consumer and its security policy chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsumerConfig {
    /// Clock skew tolerance for the issue-instant check, in seconds.
    #[serde(default = "default_clock_skew")]
    pub clock_skew_secs: i64,

    /// How long after issuance a message remains acceptable, in seconds
    /// (on top of the clock skew).
    #[serde(default = "default_issue_instant_validity")]
    pub issue_instant_validity_secs: i64,

    /// How long an accepted message ID is retained for replay rejection,
    /// in milliseconds.
    #[serde(default = "default_replay_cache_duration")]
    pub replay_cache_duration_millis: i64,

    /// Trusted IdP signing certificates: entity ID alias -> PEM body.
    /// The `-----BEGIN/END CERTIFICATE-----` markers are optional.
    #[serde(default)]
    pub trusted_certificates: HashMap<String, String>,
}

fn default_clock_skew() -> i64 {
    90
}

fn default_issue_instant_validity() -> i64 {
    300
}

fn default_replay_cache_duration() -> i64 {
    14_400_000 // 4 hours
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            clock_skew_secs: default_clock_skew(),
            issue_instant_validity_secs: default_issue_instant_validity(),
            replay_cache_duration_millis: default_replay_cache_duration(),
            trusted_certificates: HashMap::new(),
        }
    }
}

impl ConsumerConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.clock_skew_secs < 0 {
            return Err("clock_skew_secs must not be negative".to_string());
        }

        if self.issue_instant_validity_secs <= 0 {
            return Err("issue_instant_validity_secs must be positive".to_string());
        }

        if self.replay_cache_duration_millis <= 0 {
            return Err("replay_cache_duration_millis must be positive".to_string());
        }

        if self.trusted_certificates.is_empty() {
            return Err(
                "at least one trusted certificate is required; refusing to start without signature trust"
                    .to_string(),
            );
        }

        Ok(())
    }
}
