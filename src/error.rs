//! Rejection kinds surfaced by the assertion consumer.
//!
//! Every check in the security policy chain and the response validator maps
//! to exactly one variant here. None of these are retried and none are
//! downgraded to a permissive outcome; the caller decides what (if anything)
//! to show the end user, the `Display` text is for logs.

use thiserror::Error;

/// Result type for validation and consumption operations.
pub type ConsumerResult<T> = Result<T, ConsumerError>;

/// Why a SAML response was rejected.
#[derive(Debug, Error)]
pub enum ConsumerError {
    /// The message failed upstream structural/schema validation. Raised by
    /// the decoding front-end, not by this crate; carried here so callers
    /// see a single error surface.
    #[error("invalid SAML message: {0}")]
    InvalidMessage(String),

    /// Neither the response nor its first assertion carried a signature.
    #[error("the SAML message was not signed")]
    UnsignedMessage,

    /// A signature was present but did not conform to the SAML signature
    /// profile (reference count, transforms, algorithms, extraneous content).
    #[error("signature did not conform to the SAML signature profile: {0}")]
    SignatureProfileViolation(String),

    /// The signature was cryptographically invalid, or no trusted signing
    /// credential could be established for the issuer.
    #[error("signature was either invalid or the signing key could not be established as trusted: {0}")]
    UntrustedSignature(String),

    /// The message issue instant fell outside the accepted window.
    #[error("message issue instant outside the accepted window: {0}")]
    StaleOrFutureIssueInstant(String),

    /// The message ID was already accepted within the replay retention window.
    #[error("message has already been accepted: {0}")]
    ReplayedMessage(String),

    /// The identity provider returned a non-success status.
    #[error("identity provider has failed the authentication{}", fmt_detail(.detail))]
    IdentityProviderFailure {
        /// Secondary status code and/or status message, when the IdP sent them.
        /// Confidential diagnostic, for logs only.
        detail: Option<String>,
    },

    /// A success-status response was structurally incomplete. Names the
    /// first missing element.
    #[error("successful response did not contain {0}")]
    MissingAssertionData(&'static str),

    /// The provisioning collaborator failed; its error passes through
    /// unmodified.
    #[error("user provisioning failed")]
    Provisioning(#[source] anyhow::Error),
}

fn fmt_detail(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(": {d}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idp_failure_display_includes_detail_when_present() {
        let with = ConsumerError::IdentityProviderFailure {
            detail: Some("urn:oasis:names:tc:SAML:2.0:status:AuthnFailed".to_string()),
        };
        assert!(with.to_string().contains("AuthnFailed"));

        let without = ConsumerError::IdentityProviderFailure { detail: None };
        assert_eq!(
            without.to_string(),
            "identity provider has failed the authentication"
        );
    }

    #[test]
    fn untrusted_signature_display_is_generic_about_the_cause() {
        // Don't reveal whether the key was unknown or the bytes were bad.
        let err = ConsumerError::UntrustedSignature("no candidate matched".to_string());
        assert!(err.to_string().starts_with("signature was either invalid"));
    }
}
