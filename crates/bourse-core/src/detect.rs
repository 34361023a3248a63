//! Auth-failure detection.
//!
//! Each platform signals an expired or invalid session differently. The
//! executor asks an [`AuthFailureDetector`] rather than hardcoding a status.

use std::fmt;

use reqwest::StatusCode;

use crate::request::ApiResponse;

/// Decides whether a response means "credentials no longer valid".
pub trait AuthFailureDetector: Send + Sync {
    fn is_auth_failure(&self, response: &ApiResponse) -> bool;
}

impl<F> AuthFailureDetector for F
where
    F: Fn(&ApiResponse) -> bool + Send + Sync,
{
    fn is_auth_failure(&self, response: &ApiResponse) -> bool {
        self(response)
    }
}

/// A configurable rule matching status codes and/or embedded error codes.
///
/// A response is an auth failure if its status is one of `statuses`, or if the
/// JSON body carries one of `error_codes` in `error_field` (at any status,
/// which covers APIs that answer 200 with an error body).
///
/// # Example
///
/// ```
/// use bourse_core::AuthFailureRule;
///
/// let rule = AuthFailureRule::unauthorized()
///     .with_error_field("errorCode")
///     .with_error_code("error.invalid.session.token");
/// # let _ = rule;
/// ```
#[derive(Clone, Default)]
pub struct AuthFailureRule {
    statuses: Vec<StatusCode>,
    error_field: Option<String>,
    error_codes: Vec<String>,
}

impl AuthFailureRule {
    /// A rule that matches nothing until configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Matches HTTP 401.
    pub fn unauthorized() -> Self {
        Self::new().with_status(StatusCode::UNAUTHORIZED)
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.statuses.push(status);
        self
    }

    /// JSON body field that carries the platform's error code.
    pub fn with_error_field(mut self, field: impl Into<String>) -> Self {
        self.error_field = Some(field.into());
        self
    }

    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.error_codes.push(code.into());
        self
    }
}

impl AuthFailureDetector for AuthFailureRule {
    fn is_auth_failure(&self, response: &ApiResponse) -> bool {
        if self.statuses.contains(&response.status()) {
            return true;
        }
        match &self.error_field {
            Some(field) if !self.error_codes.is_empty() => response
                .json_field(field)
                .is_some_and(|code| self.error_codes.iter().any(|c| *c == code)),
            _ => false,
        }
    }
}

impl fmt::Debug for AuthFailureRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let statuses: Vec<u16> = self.statuses.iter().map(StatusCode::as_u16).collect();
        f.debug_struct("AuthFailureRule")
            .field("statuses", &statuses)
            .field("error_field", &self.error_field)
            .field("error_codes", &self.error_codes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn matches_status() {
        let rule = AuthFailureRule::unauthorized();
        assert!(rule.is_auth_failure(&ApiResponse::json_body(StatusCode::UNAUTHORIZED, &json!({}))));
        assert!(!rule.is_auth_failure(&ApiResponse::json_body(StatusCode::FORBIDDEN, &json!({}))));
    }

    #[test]
    fn matches_embedded_error_code_on_success_status() {
        let rule = AuthFailureRule::new()
            .with_error_field("errorCode")
            .with_error_code("error.null.client.token");
        let expired = ApiResponse::json_body(
            StatusCode::OK,
            &json!({"errorCode": "error.null.client.token"}),
        );
        let other = ApiResponse::json_body(
            StatusCode::BAD_REQUEST,
            &json!({"errorCode": "error.invalid.size"}),
        );
        assert!(rule.is_auth_failure(&expired));
        assert!(!rule.is_auth_failure(&other));
    }

    #[test]
    fn empty_rule_matches_nothing() {
        let rule = AuthFailureRule::new().with_error_field("errorCode");
        assert!(!rule.is_auth_failure(&ApiResponse::json_body(
            StatusCode::UNAUTHORIZED,
            &json!({"errorCode": "anything"})
        )));
    }

    #[test]
    fn closures_are_detectors() {
        let detector = |r: &ApiResponse| r.status() == StatusCode::FORBIDDEN;
        assert!(detector.is_auth_failure(&ApiResponse::json_body(StatusCode::FORBIDDEN, &json!(null))));
    }
}
