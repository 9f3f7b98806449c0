//! Authorization response parameters carried by a redirect URL.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{FlowError, Result};

/// Authorization response carried by a redirect URL.
///
/// Parameters are read from the query string first, then from the fragment
/// (implicit-grant providers put `access_token` there). A query value wins
/// over a fragment value with the same name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl RedirectResponse {
    pub fn parse(url: &Url) -> Self {
        let mut response = Self::default();
        let query = url.query_pairs();
        let fragment = url
            .fragment()
            .map(|f| url::form_urlencoded::parse(f.as_bytes()))
            .into_iter()
            .flatten();

        for (key, value) in query.chain(fragment) {
            let slot = match key.as_ref() {
                "code" => &mut response.code,
                "state" => &mut response.state,
                "access_token" => &mut response.access_token,
                "error" => &mut response.error,
                "error_description" => &mut response.error_description,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        response
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Check the returned `state` against the one sent with the request.
    pub fn verify_state(&self, expected: &str) -> Result<()> {
        match self.state.as_deref() {
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => Err(FlowError::StateMismatch {
                expected: expected.to_string(),
                actual: actual.to_string(),
            }),
            None => Err(FlowError::MissingParameter("state")),
        }
    }

    /// Extract the authorization code, surfacing a provider `error` first.
    pub fn into_code(self) -> Result<String> {
        if let Some(error) = self.error {
            return Err(FlowError::AuthorizationDenied {
                error,
                description: self.error_description,
            });
        }
        self.code.ok_or(FlowError::MissingParameter("code"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(s: &str) -> RedirectResponse {
        RedirectResponse::parse(&Url::parse(s).unwrap())
    }

    #[test]
    fn reads_code_and_state_from_query() {
        let response = parse("http://localhost/callback?code=abc&state=xyz");
        assert_eq!(response.code.as_deref(), Some("abc"));
        assert_eq!(response.state.as_deref(), Some("xyz"));
        assert!(response.verify_state("xyz").is_ok());
        assert_eq!(response.into_code().unwrap(), "abc");
    }

    #[test]
    fn reads_implicit_token_from_fragment() {
        let response = parse("com.example.app:/cb#access_token=t%2B1&state=s");
        assert_eq!(response.access_token.as_deref(), Some("t+1"));
        assert_eq!(response.state.as_deref(), Some("s"));
    }

    #[test]
    fn query_wins_over_fragment() {
        let response = parse("http://localhost/cb?state=query#state=fragment");
        assert_eq!(response.state.as_deref(), Some("query"));
    }

    #[test]
    fn state_mismatch_is_reported() {
        let err = parse("http://localhost/cb?code=1&state=evil")
            .verify_state("good")
            .unwrap_err();
        assert!(matches!(err, FlowError::StateMismatch { .. }));
    }

    #[test]
    fn provider_error_takes_precedence_over_code() {
        let err = parse("http://localhost/cb?error=access_denied&error_description=User+said+no")
            .into_code()
            .unwrap_err();
        match err {
            FlowError::AuthorizationDenied { error, description } => {
                assert_eq!(error, "access_denied");
                assert_eq!(description.as_deref(), Some("User said no"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_code_is_reported() {
        let err = parse("http://localhost/cb").into_code().unwrap_err();
        assert!(matches!(err, FlowError::MissingParameter("code")));
    }
}
