//! Protocol-level response validation.
//!
//! Complementary to the security policy chain: the chain decides whether the
//! message is authentic and fresh, this validator decides whether a
//! "successful" response actually carries what a success must carry.

use tracing::warn;

use crate::error::{ConsumerError, ConsumerResult};
use crate::model::{Response, Status};

/// Separator between the secondary status code and the status message in the
/// failure diagnostic.
const DIAGNOSTIC_SEPARATOR: &str = "  -  ";

/// Validate protocol status and structural completeness.
pub fn validate(response: &Response) -> ConsumerResult<()> {
    if !response.status.is_success() {
        let detail = failure_diagnostic(&response.status);
        warn!(
            response_id = %response.id,
            status = %response.status.code,
            detail = ?detail,
            "Identity provider reported authentication failure"
        );
        return Err(ConsumerError::IdentityProviderFailure { detail });
    }

    // The upstream schema validation does not require these on a success,
    // so they are checked here.
    let Some(assertion) = response.assertions.first() else {
        return Err(ConsumerError::MissingAssertionData("any assertions"));
    };

    if assertion.authn_statements.is_empty() {
        return Err(ConsumerError::MissingAssertionData(
            "an assertion with an AuthnStatement",
        ));
    }

    if assertion.attribute_statements.is_empty() {
        return Err(ConsumerError::MissingAssertionData(
            "an assertion with an AttributeStatement",
        ));
    }

    if response.issuer.is_none() {
        return Err(ConsumerError::MissingAssertionData("any Issuer"));
    }

    Ok(())
}

/// Join the secondary status code and status message, when present, into a
/// log-friendly diagnostic.
fn failure_diagnostic(status: &Status) -> Option<String> {
    let mut diagnostic = String::new();

    if let Some(sub_code) = status.sub_code.as_deref() {
        diagnostic.push_str(sub_code);
    }

    if let Some(message) = status.message.as_deref() {
        if !diagnostic.is_empty() {
            diagnostic.push_str(DIAGNOSTIC_SEPARATOR);
        }
        diagnostic.push_str(message);
    }

    if diagnostic.is_empty() {
        None
    } else {
        Some(diagnostic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Assertion, AttributeStatement, AuthnStatement};
    use chrono::Utc;

    const AUTHN_FAILED: &str = "urn:oasis:names:tc:SAML:2.0:status:AuthnFailed";

    fn complete_response() -> Response {
        Response {
            id: "_resp1".to_string(),
            issue_instant: Utc::now(),
            destination: None,
            status: Status::success(),
            issuer: Some("https://idp.example.com".to_string()),
            assertions: vec![Assertion {
                id: "_asrt1".to_string(),
                issuer: "https://idp.example.com".to_string(),
                subject: Some("user@example.com".to_string()),
                authn_statements: vec![AuthnStatement {
                    authn_instant: Utc::now(),
                    session_index: None,
                }],
                attribute_statements: vec![AttributeStatement {
                    attributes: Vec::new(),
                }],
                signature: None,
            }],
            signature: None,
        }
    }

    fn failed_response(sub_code: Option<&str>, message: Option<&str>) -> Response {
        let mut response = complete_response();
        response.status = Status {
            code: "urn:oasis:names:tc:SAML:2.0:status:Responder".to_string(),
            sub_code: sub_code.map(String::from),
            message: message.map(String::from),
        };
        response
    }

    fn idp_failure_detail(response: &Response) -> Option<String> {
        match validate(response) {
            Err(ConsumerError::IdentityProviderFailure { detail }) => detail,
            other => panic!("expected IdentityProviderFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_complete_success_accepted() {
        assert!(validate(&complete_response()).is_ok());
    }

    #[test]
    fn test_failure_diagnostic_with_both_parts() {
        let response = failed_response(Some(AUTHN_FAILED), Some("wrong password"));
        assert_eq!(
            idp_failure_detail(&response).unwrap(),
            format!("{AUTHN_FAILED}  -  wrong password")
        );
    }

    #[test]
    fn test_failure_diagnostic_with_one_part() {
        let response = failed_response(Some(AUTHN_FAILED), None);
        assert_eq!(idp_failure_detail(&response).unwrap(), AUTHN_FAILED);

        let response = failed_response(None, Some("wrong password"));
        assert_eq!(idp_failure_detail(&response).unwrap(), "wrong password");
    }

    #[test]
    fn test_failure_diagnostic_absent_when_idp_sent_nothing() {
        let response = failed_response(None, None);
        assert_eq!(idp_failure_detail(&response), None);
    }

    #[test]
    fn test_success_without_assertions_rejected() {
        let mut response = complete_response();
        response.assertions.clear();

        let result = validate(&response);
        assert!(
            matches!(result, Err(ConsumerError::MissingAssertionData(what)) if what.contains("assertions"))
        );
    }

    #[test]
    fn test_success_without_authn_statement_rejected() {
        let mut response = complete_response();
        response.assertions[0].authn_statements.clear();

        let result = validate(&response);
        assert!(
            matches!(result, Err(ConsumerError::MissingAssertionData(what)) if what.contains("AuthnStatement"))
        );
    }

    #[test]
    fn test_success_without_attribute_statement_rejected() {
        let mut response = complete_response();
        response.assertions[0].attribute_statements.clear();

        let result = validate(&response);
        assert!(
            matches!(result, Err(ConsumerError::MissingAssertionData(what)) if what.contains("AttributeStatement"))
        );
    }

    #[test]
    fn test_success_without_issuer_rejected() {
        let mut response = complete_response();
        response.issuer = None;

        let result = validate(&response);
        assert!(
            matches!(result, Err(ConsumerError::MissingAssertionData(what)) if what.contains("Issuer"))
        );
    }

    #[test]
    fn test_missing_elements_reported_in_declared_order() {
        // Everything missing at once: assertions win.
        let mut response = complete_response();
        response.assertions.clear();
        response.issuer = None;

        let result = validate(&response);
        assert!(
            matches!(result, Err(ConsumerError::MissingAssertionData(what)) if what.contains("assertions"))
        );
    }
}
