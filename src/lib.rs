//! SAML 2.0 service-provider assertion consumption.
//!
//! This crate is the trust boundary between an untrusted, already-decoded
//! SAML response and an application's authentication layer. It evaluates a
//! fail-fast security policy chain (signature trust, issue-instant
//! freshness, replay rejection), validates protocol status and structural
//! completeness, extracts granted authorities, and delegates identity
//! creation to an application-provided provisioner.
//!
//! XML parsing/canonicalization, HTTP bindings, and user storage are
//! external collaborators: the decoder supplies a [`model::Response`], the
//! application supplies a [`Provisioner`], and trusted IdP certificates come
//! from the configuration.

pub mod config;
pub mod consumer;
pub mod credential;
pub mod error;
pub mod model;
pub mod policy;
pub mod provision;

pub use config::ConsumerConfig;
pub use consumer::{AssertionConsumer, DEFAULT_AUTHORITY, GRANTED_AUTHORITY_ATTRIBUTE};
pub use credential::{CertificateStore, Credential, CredentialResolver, CredentialUsage};
pub use error::{ConsumerError, ConsumerResult};
pub use model::{
    Assertion, Attribute, AttributeStatement, AttributeValue, AuthnStatement,
    GrantedAuthoritySet, Response, Signature, SignatureReference, Status, STATUS_SUCCESS,
};
pub use policy::{ReplayCache, SecurityPolicyChain, SecurityPolicyContext};
pub use provision::{Provisioner, UserIdentity};
