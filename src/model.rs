//! Decoded SAML 2.0 protocol data model.
//!
//! These types are produced by an external message decoder (XML parsing and
//! canonicalization are not this crate's concern) and consumed read-only by
//! the security policy chain and the response validator. Sequences preserve
//! wire order; the first assertion of a response is authoritative.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Primary status code of a successful authentication response.
pub const STATUS_SUCCESS: &str = "urn:oasis:names:tc:SAML:2.0:status:Success";

/// Role strings granted to an authenticated identity.
pub type GrantedAuthoritySet = BTreeSet<String>;

/// A decoded `samlp:Response`.
#[derive(Debug, Clone)]
pub struct Response {
    /// Message identifier, unique per message. Keyed by the replay cache.
    pub id: String,
    /// When the identity provider issued this message.
    pub issue_instant: DateTime<Utc>,
    /// Intended recipient endpoint, when present on the wire.
    pub destination: Option<String>,
    pub status: Status,
    /// Entity ID of the issuing identity provider.
    pub issuer: Option<String>,
    /// Assertions in wire order. The first one is authoritative.
    pub assertions: Vec<Assertion>,
    /// Response-level enveloped signature.
    pub signature: Option<Signature>,
}

/// Protocol status of a response.
#[derive(Debug, Clone)]
pub struct Status {
    /// Primary status code URI.
    pub code: String,
    /// Secondary status code URI, if the IdP sent one.
    pub sub_code: Option<String>,
    /// Human-readable status message, if the IdP sent one.
    pub message: Option<String>,
}

impl Status {
    /// Whether the primary code is the well-known success URI.
    pub fn is_success(&self) -> bool {
        self.code.trim() == STATUS_SUCCESS
    }

    /// A success status with no secondary code or message.
    pub fn success() -> Self {
        Self {
            code: STATUS_SUCCESS.to_string(),
            sub_code: None,
            message: None,
        }
    }
}

/// A decoded `saml:Assertion`.
#[derive(Debug, Clone)]
pub struct Assertion {
    pub id: String,
    /// Entity ID of the asserting party.
    pub issuer: String,
    /// Subject NameID value.
    pub subject: Option<String>,
    pub authn_statements: Vec<AuthnStatement>,
    pub attribute_statements: Vec<AttributeStatement>,
    /// Assertion-level enveloped signature.
    pub signature: Option<Signature>,
}

/// A decoded `saml:AuthnStatement`.
#[derive(Debug, Clone)]
pub struct AuthnStatement {
    pub authn_instant: DateTime<Utc>,
    pub session_index: Option<String>,
}

/// A decoded `saml:AttributeStatement`.
#[derive(Debug, Clone)]
pub struct AttributeStatement {
    /// Attributes in wire order.
    pub attributes: Vec<Attribute>,
}

/// A decoded `saml:Attribute` with its values in wire order.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub values: Vec<AttributeValue>,
}

/// A typed attribute value. Only `Text` (xs:string) values are interpreted;
/// anything else is carried through for diagnostics but never mapped to an
/// authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Text(String),
    /// Lexical content of a non-string-typed value.
    Other(String),
}

/// A decoded `ds:Signature` over a response or assertion.
///
/// The decoder has already canonicalized `SignedInfo`; `signed_info` holds
/// its exclusive-C14N octets, which is what the signature value covers.
#[derive(Debug, Clone)]
pub struct Signature {
    /// Signature algorithm URI from `ds:SignatureMethod`.
    pub algorithm: String,
    /// Exclusive-C14N octets of the `ds:SignedInfo` element.
    pub signed_info: Vec<u8>,
    /// Raw signature octets from `ds:SignatureValue`.
    pub value: Vec<u8>,
    /// References in wire order. The SAML profile allows exactly one.
    pub references: Vec<SignatureReference>,
    /// Lexical content of any `ds:Object` children. The SAML profile
    /// forbids these.
    pub object_elements: Vec<String>,
}

/// A decoded `ds:Reference` within a signature.
#[derive(Debug, Clone)]
pub struct SignatureReference {
    /// Reference URI; empty or `#` + the ID of the enclosing signed element.
    pub uri: String,
    /// Transform algorithm URIs in wire order.
    pub transforms: Vec<String>,
    /// Digest algorithm URI.
    pub digest_algorithm: String,
    /// Raw digest octets.
    pub digest_value: Vec<u8>,
}
