//! Security policy chain.
//!
//! An ordered, fail-fast composition of the signature trust, freshness, and
//! replay rules. The order is load-bearing: the replay cache records a
//! message ID only after every preceding rule has accepted the message, so a
//! forged or stale message never occupies a replay slot.

pub mod freshness;
pub mod replay;
pub mod signature;

pub use freshness::FreshnessRule;
pub use replay::{ReplayCache, ReplayRule};
pub use signature::SignatureTrustRule;

use std::sync::Arc;

use crate::config::ConsumerConfig;
use crate::credential::CredentialResolver;
use crate::error::ConsumerResult;
use crate::model::Response;

/// Per-message validation context. Created for one evaluation and discarded.
#[derive(Debug)]
pub struct SecurityPolicyContext<'a> {
    pub response: &'a Response,
    /// Entity ID claimed as the inbound message issuer.
    pub inbound_issuer: Option<&'a str>,
}

impl<'a> SecurityPolicyContext<'a> {
    /// Build a context for a decoded response. The inbound issuer is the
    /// response issuer, falling back to the first assertion's issuer when
    /// the response-level element is absent.
    pub fn for_response(response: &'a Response) -> Self {
        let inbound_issuer = response
            .issuer
            .as_deref()
            .or_else(|| response.assertions.first().map(|a| a.issuer.as_str()));
        Self {
            response,
            inbound_issuer,
        }
    }
}

/// The closed set of security policy rules.
pub enum PolicyRule {
    SignatureTrust(SignatureTrustRule),
    Freshness(FreshnessRule),
    Replay(ReplayRule),
}

impl PolicyRule {
    pub fn evaluate(&self, ctx: &SecurityPolicyContext<'_>) -> ConsumerResult<()> {
        match self {
            PolicyRule::SignatureTrust(rule) => rule.evaluate(ctx),
            PolicyRule::Freshness(rule) => rule.evaluate(ctx),
            PolicyRule::Replay(rule) => rule.evaluate(ctx),
        }
    }
}

/// Fixed-order rule chain: signature trust, freshness, replay.
pub struct SecurityPolicyChain {
    rules: Vec<PolicyRule>,
}

impl SecurityPolicyChain {
    /// Assemble the chain in its declared order from configuration and a
    /// credential resolver. The replay cache is owned by its rule and lives
    /// as long as the chain.
    pub fn new(config: &ConsumerConfig, resolver: Arc<dyn CredentialResolver>) -> Self {
        Self {
            rules: vec![
                PolicyRule::SignatureTrust(SignatureTrustRule::new(resolver)),
                PolicyRule::Freshness(FreshnessRule::new(
                    config.clock_skew_secs,
                    config.issue_instant_validity_secs,
                )),
                PolicyRule::Replay(ReplayRule::new(ReplayCache::new(
                    config.replay_cache_duration_millis,
                ))),
            ],
        }
    }

    /// Evaluate every rule in order, aborting at the first rejection.
    pub fn evaluate(&self, ctx: &SecurityPolicyContext<'_>) -> ConsumerResult<()> {
        for rule in &self.rules {
            rule.evaluate(ctx)?;
        }
        Ok(())
    }
}
