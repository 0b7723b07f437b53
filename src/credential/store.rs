//! Certificate store backing credential resolution.
//!
//! Loads trusted IdP certificates from an alias -> PEM-text map at startup.
//! A malformed certificate fails construction; the store is immutable after
//! that.

use anyhow::{Context, Result};
use openssl::x509::X509;
use std::collections::HashMap;
use tracing::debug;

use super::{Credential, CredentialResolver, CredentialUsage};

/// In-memory store of trusted signing certificates, keyed by entity ID.
#[derive(Debug)]
pub struct CertificateStore {
    credentials: HashMap<String, Credential>,
}

impl CertificateStore {
    /// Build a store from an alias -> PEM map. Aliases are entity IDs; the
    /// PEM body may carry the `BEGIN/END CERTIFICATE` markers or not.
    pub fn from_pem_map(certificates: &HashMap<String, String>) -> Result<Self> {
        let mut credentials = HashMap::new();

        for (alias, pem) in certificates {
            let cert = parse_certificate(pem)
                .with_context(|| format!("trusted certificate for {alias:?} could not be loaded"))?;
            let key = cert
                .public_key()
                .with_context(|| format!("trusted certificate for {alias:?} has an unusable public key"))?;

            credentials.insert(
                alias.clone(),
                Credential::new(alias.clone(), CredentialUsage::Signing, key),
            );
        }

        debug!(trusted = credentials.len(), "Loaded certificate store");

        Ok(Self { credentials })
    }

    /// Number of trusted certificates.
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

impl CredentialResolver for CertificateStore {
    fn resolve(&self, entity_id: &str, usage: CredentialUsage) -> Result<Vec<Credential>> {
        // Stored certificates are trusted for signing only.
        if usage != CredentialUsage::Signing {
            return Ok(Vec::new());
        }

        Ok(self
            .credentials
            .get(entity_id)
            .cloned()
            .into_iter()
            .collect())
    }
}

/// Parse an X.509 certificate from PEM text, with or without markers.
fn parse_certificate(pem: &str) -> Result<X509> {
    let pem_data = if pem.contains("-----BEGIN CERTIFICATE-----") {
        pem.to_string()
    } else {
        format!(
            "-----BEGIN CERTIFICATE-----\n{}\n-----END CERTIFICATE-----",
            pem.trim()
        )
    };

    X509::from_pem(pem_data.as_bytes()).context("invalid X.509 certificate")
}
