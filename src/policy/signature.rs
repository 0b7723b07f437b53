//! Signature trust rule.
//!
//! Two-stage check on every signature the message carries: first the
//! signature must conform to the SAML signature profile (structural), then it
//! must verify against a signing credential resolved for the inbound issuer.
//! An unsigned message is rejected outright; this rule does not rely on a
//! separate authentication flag.

use openssl::hash::MessageDigest;
use openssl::sign::Verifier;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::credential::{Credential, CredentialResolver, CredentialUsage};
use crate::error::{ConsumerError, ConsumerResult};
use crate::model::Signature;
use crate::policy::SecurityPolicyContext;

/// XML-DSig signature algorithm URIs accepted by the profile.
pub const ALG_RSA_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#rsa-sha1";
pub const ALG_RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";
pub const ALG_RSA_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha384";
pub const ALG_RSA_SHA512: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512";

/// Digest algorithm URIs accepted by the profile.
pub const DIGEST_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#sha1";
pub const DIGEST_SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";
pub const DIGEST_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#sha384";
pub const DIGEST_SHA512: &str = "http://www.w3.org/2001/04/xmlenc#sha512";

/// Transform URIs allowed on the single reference.
pub const TRANSFORM_ENVELOPED: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";
pub const TRANSFORM_EXC_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";

/// Verifies that the inbound message was signed by the claimed issuer.
pub struct SignatureTrustRule {
    resolver: Arc<dyn CredentialResolver>,
}

impl SignatureTrustRule {
    pub fn new(resolver: Arc<dyn CredentialResolver>) -> Self {
        Self { resolver }
    }

    pub fn evaluate(&self, ctx: &SecurityPolicyContext<'_>) -> ConsumerResult<()> {
        let response = ctx.response;
        let assertion = response.assertions.first();

        let response_signed = response.signature.is_some();
        let assertion_signed = assertion.and_then(|a| a.signature.as_ref()).is_some();

        if !response_signed && !assertion_signed {
            warn!(response_id = %response.id, "Message carried no signature");
            return Err(ConsumerError::UnsignedMessage);
        }

        // Every signature that is present must validate; presence of either
        // the response-level or the assertion-level signature satisfies the
        // rule.
        if let Some(signature) = response.signature.as_ref() {
            validate_profile(signature, &response.id)?;
            self.check_trust(signature, ctx.inbound_issuer)?;
            debug!(response_id = %response.id, "Response signature verified");
        }

        if let Some(assertion) = assertion {
            if let Some(signature) = assertion.signature.as_ref() {
                validate_profile(signature, &assertion.id)?;
                self.check_trust(signature, ctx.inbound_issuer)?;
                debug!(assertion_id = %assertion.id, "Assertion signature verified");
            }
        }

        Ok(())
    }

    /// Resolve signing credentials for the inbound issuer and accept if any
    /// of them verifies the signature.
    fn check_trust(&self, signature: &Signature, issuer: Option<&str>) -> ConsumerResult<()> {
        let Some(entity_id) = issuer else {
            return Err(ConsumerError::UntrustedSignature(
                "message carried no issuer to resolve credentials for".to_string(),
            ));
        };

        let credentials = self
            .resolver
            .resolve(entity_id, CredentialUsage::Signing)
            .map_err(|e| {
                ConsumerError::UntrustedSignature(format!(
                    "credential resolution for {entity_id} failed: {e:#}"
                ))
            })?;

        if credentials.is_empty() {
            warn!(entity_id = %entity_id, "No signing credential registered");
            return Err(ConsumerError::UntrustedSignature(format!(
                "no signing credential registered for {entity_id}"
            )));
        }

        for credential in &credentials {
            if verify_with(credential, signature) {
                return Ok(());
            }
        }

        warn!(
            entity_id = %entity_id,
            candidates = credentials.len(),
            "Signature did not verify against any trusted credential"
        );
        Err(ConsumerError::UntrustedSignature(format!(
            "signature did not verify against any credential of {entity_id}"
        )))
    }
}

/// Verify the signature octets over the canonical SignedInfo with one
/// candidate key. Any OpenSSL-level failure counts as a non-match.
fn verify_with(credential: &Credential, signature: &Signature) -> bool {
    let Some(digest) = signature_digest(&signature.algorithm) else {
        return false;
    };

    let Ok(mut verifier) = Verifier::new(digest, credential.public_key()) else {
        return false;
    };

    if verifier.update(&signature.signed_info).is_err() {
        return false;
    }

    verifier.verify(&signature.value).unwrap_or(false)
}

/// Check conformance with the SAML signature profile.
///
/// `signed_element_id` is the ID of the element enclosing the signature; the
/// single reference must point at it (or be the empty same-document URI).
pub fn validate_profile(signature: &Signature, signed_element_id: &str) -> ConsumerResult<()> {
    if signature.references.len() != 1 {
        return Err(ConsumerError::SignatureProfileViolation(format!(
            "expected exactly one reference, found {}",
            signature.references.len()
        )));
    }

    let reference = &signature.references[0];

    if !reference.uri.is_empty() && reference.uri != format!("#{signed_element_id}") {
        return Err(ConsumerError::SignatureProfileViolation(format!(
            "reference URI {:?} does not point at the signed element {:?}",
            reference.uri, signed_element_id
        )));
    }

    if reference.transforms.len() > 2 {
        return Err(ConsumerError::SignatureProfileViolation(format!(
            "too many transforms: {}",
            reference.transforms.len()
        )));
    }

    if !reference
        .transforms
        .iter()
        .any(|t| t == TRANSFORM_ENVELOPED)
    {
        return Err(ConsumerError::SignatureProfileViolation(
            "enveloped-signature transform is required".to_string(),
        ));
    }

    for transform in &reference.transforms {
        if transform != TRANSFORM_ENVELOPED && transform != TRANSFORM_EXC_C14N {
            return Err(ConsumerError::SignatureProfileViolation(format!(
                "transform {transform:?} is not allowed"
            )));
        }
    }

    if !digest_supported(&reference.digest_algorithm) {
        return Err(ConsumerError::SignatureProfileViolation(format!(
            "digest algorithm {:?} is not supported",
            reference.digest_algorithm
        )));
    }

    if signature_digest(&signature.algorithm).is_none() {
        return Err(ConsumerError::SignatureProfileViolation(format!(
            "signature algorithm {:?} is not supported",
            signature.algorithm
        )));
    }

    if !signature.object_elements.is_empty() {
        return Err(ConsumerError::SignatureProfileViolation(
            "ds:Object content is not allowed".to_string(),
        ));
    }

    Ok(())
}

/// Map a signature algorithm URI to the digest used for verification.
fn signature_digest(algorithm: &str) -> Option<MessageDigest> {
    match algorithm {
        ALG_RSA_SHA1 => Some(MessageDigest::sha1()),
        ALG_RSA_SHA256 => Some(MessageDigest::sha256()),
        ALG_RSA_SHA384 => Some(MessageDigest::sha384()),
        ALG_RSA_SHA512 => Some(MessageDigest::sha512()),
        _ => None,
    }
}

fn digest_supported(algorithm: &str) -> bool {
    matches!(
        algorithm,
        DIGEST_SHA1 | DIGEST_SHA256 | DIGEST_SHA384 | DIGEST_SHA512
    )
}
