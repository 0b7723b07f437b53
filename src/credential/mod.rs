//! Trusted key material and its resolution.
//!
//! The policy chain never constructs credentials; it resolves them through
//! [`CredentialResolver`] by entity ID and usage. The default resolver is the
//! PEM-backed [`CertificateStore`] loaded once at startup.

pub mod store;

pub use store::CertificateStore;

use anyhow::Result;
use openssl::pkey::{PKey, PKeyRef, Public};
use std::fmt;

/// What a credential's key material is trusted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialUsage {
    Signing,
    Encryption,
}

/// Trusted key material bound to an entity ID and a usage.
#[derive(Clone)]
pub struct Credential {
    entity_id: String,
    usage: CredentialUsage,
    key: PKey<Public>,
}

impl Credential {
    pub fn new(entity_id: impl Into<String>, usage: CredentialUsage, key: PKey<Public>) -> Self {
        Self {
            entity_id: entity_id.into(),
            usage,
            key,
        }
    }

    /// Entity ID this credential is bound to.
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn usage(&self) -> CredentialUsage {
        self.usage
    }

    /// Public key used for signature verification.
    pub fn public_key(&self) -> &PKeyRef<Public> {
        &self.key
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("entity_id", &self.entity_id)
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}

/// Resolves trusted credentials for a protocol participant.
///
/// An empty result set is a valid answer and makes signature trust
/// unsatisfiable for that entity; it is never treated as "no check needed".
pub trait CredentialResolver: Send + Sync {
    fn resolve(&self, entity_id: &str, usage: CredentialUsage) -> Result<Vec<Credential>>;
}
