//! Assertion consumer.
//!
//! Top-level orchestration: security policy chain, response validation,
//! authority extraction, and delegation to the provisioning collaborator.

pub mod validator;

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ConsumerConfig;
use crate::credential::{CertificateStore, CredentialResolver};
use crate::error::{ConsumerError, ConsumerResult};
use crate::model::{Assertion, AttributeValue, GrantedAuthoritySet, Response};
use crate::policy::{SecurityPolicyChain, SecurityPolicyContext};
use crate::provision::{Provisioner, UserIdentity};

/// Attribute name marking granted-authority values in an assertion.
/// Matched case-insensitively.
pub const GRANTED_AUTHORITY_ATTRIBUTE: &str = "org.springframework.security.core.GrantedAuthority";

/// Role granted when the assertion carries no authority attribute.
pub const DEFAULT_AUTHORITY: &str = "ROLE_USER";

/// Converts a decoded, untrusted SAML response into an authenticated
/// identity, or rejects it with a specific [`ConsumerError`].
pub struct AssertionConsumer {
    chain: SecurityPolicyChain,
    provisioner: Arc<dyn Provisioner>,
}

impl AssertionConsumer {
    /// Build a consumer from configuration, a credential resolver, and a
    /// provisioner. Validates the configuration up front; an invalid
    /// configuration is fatal rather than a silently weakened pipeline.
    pub fn new(
        config: &ConsumerConfig,
        resolver: Arc<dyn CredentialResolver>,
        provisioner: Arc<dyn Provisioner>,
    ) -> anyhow::Result<Self> {
        config.validate().map_err(|e| anyhow::anyhow!(e))?;

        Ok(Self {
            chain: SecurityPolicyChain::new(config, resolver),
            provisioner,
        })
    }

    /// Build a consumer whose credentials come from the configuration's
    /// trusted-certificate map.
    pub fn with_certificate_store(
        config: &ConsumerConfig,
        provisioner: Arc<dyn Provisioner>,
    ) -> anyhow::Result<Self> {
        let store = CertificateStore::from_pem_map(&config.trusted_certificates)?;
        Self::new(config, Arc::new(store), provisioner)
    }

    /// Validate the response and produce an identity.
    ///
    /// Security policy rejections and validator rejections propagate
    /// unchanged; the provisioner's result passes through as-is.
    pub fn consume(&self, response: &Response) -> ConsumerResult<UserIdentity> {
        let ctx = SecurityPolicyContext::for_response(response);
        self.chain.evaluate(&ctx)?;

        validator::validate(response)?;

        // The validator guarantees the assertion sequence is non-empty.
        let Some(assertion) = response.assertions.first() else {
            return Err(ConsumerError::MissingAssertionData("any assertions"));
        };

        debug!(
            response_id = %response.id,
            issuer = ?response.issuer,
            assertion_id = %assertion.id,
            subject = ?assertion.subject,
            "Response passed security policy and validation"
        );

        if let Some(statement) = assertion.authn_statements.first() {
            debug!(authn_instant = %statement.authn_instant, "Authentication statement");
        }

        let authorities = extract_authorities(assertion);
        debug!(?authorities, "Granted authorities");

        let identity = self
            .provisioner
            .provision_user(assertion, &authorities)
            .map_err(ConsumerError::Provisioning)?;

        info!(
            subject = %identity.subject,
            issuer = ?response.issuer,
            "SAML authentication accepted"
        );

        Ok(identity)
    }
}

/// Collect granted authorities from the assertion's attribute statements.
///
/// The first attribute (statement order, then attribute order) whose name
/// matches the marker contributes all of its string-typed values, and the
/// scan stops there: later matching attributes never contribute. With no
/// match anywhere, the default role is granted.
fn extract_authorities(assertion: &Assertion) -> GrantedAuthoritySet {
    let mut authorities = GrantedAuthoritySet::new();

    for statement in &assertion.attribute_statements {
        for attribute in &statement.attributes {
            if attribute.name.eq_ignore_ascii_case(GRANTED_AUTHORITY_ATTRIBUTE) {
                debug!(attribute = %attribute.name, "Found granted-authority attribute");
                for value in &attribute.values {
                    if let AttributeValue::Text(role) = value {
                        authorities.insert(role.clone());
                    }
                }
                return authorities;
            }
        }
    }

    authorities.insert(DEFAULT_AUTHORITY.to_string());
    authorities
}
