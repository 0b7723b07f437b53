//! Identity materialization.
//!
//! Mapping a validated assertion onto an application user record is the
//! application's business; the consumer only defines the seam.

use anyhow::Result;
use std::collections::HashMap;

use crate::model::{Assertion, GrantedAuthoritySet};

/// An authenticated identity produced from a validated assertion.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    /// Subject identifier, typically the assertion's NameID value.
    pub subject: String,
    /// Roles granted for this authentication.
    pub authorities: GrantedAuthoritySet,
    /// Application-defined attributes carried over from the assertion.
    pub attributes: HashMap<String, Vec<String>>,
}

/// Maps a validated assertion to an application user record.
///
/// Called exactly once per accepted response, with the authoritative (first)
/// assertion. Failures propagate unchanged to the consumer's caller.
pub trait Provisioner: Send + Sync {
    fn provision_user(
        &self,
        assertion: &Assertion,
        authorities: &GrantedAuthoritySet,
    ) -> Result<UserIdentity>;
}
