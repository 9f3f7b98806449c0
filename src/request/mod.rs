//! Authorization request construction (the URL a flow is launched against).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

use crate::config::RequestConfig;
use crate::error::{FlowError, Result};
use crate::redirect::RedirectResponse;

/// Authorize URL plus the secrets needed to validate the redirect.
///
/// # Example
/// ```
/// use webauth_flow::config::RequestConfig;
/// use webauth_flow::request::AuthorizationRequest;
///
/// let config = RequestConfig {
///     authorize_url: "https://idp.example.com/authorize".to_string(),
///     client_id: "my-client".to_string(),
///     redirect_uri: "http://localhost/callback".to_string(),
///     scopes: vec!["openid".to_string()],
///     ..Default::default()
/// };
/// let request = AuthorizationRequest::new(&config)?;
/// assert!(request.url.as_str().starts_with("https://idp.example.com/authorize?"));
/// # Ok::<(), webauth_flow::error::FlowError>(())
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    pub url: Url,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_verifier: Option<String>,
}

impl AuthorizationRequest {
    pub fn new(config: &RequestConfig) -> Result<Self> {
        let state = random_hex(16);
        let code_verifier = config.pkce.then(generate_code_verifier);
        Self::build(config, state, code_verifier)
    }

    /// Build with caller-supplied `state` and verifier.
    pub fn build(
        config: &RequestConfig,
        state: String,
        code_verifier: Option<String>,
    ) -> Result<Self> {
        if config.client_id.trim().is_empty() {
            return Err(FlowError::Configuration("request.client_id is empty".to_string()));
        }
        if config.redirect_uri.trim().is_empty() {
            return Err(FlowError::Configuration("request.redirect_uri is empty".to_string()));
        }
        let redirect_uri = config.redirect_uri.trim();
        Url::parse(redirect_uri).map_err(|e| FlowError::invalid_url(redirect_uri, e))?;
        let mut url = Url::parse(config.authorize_url.trim())
            .map_err(|e| FlowError::invalid_url(config.authorize_url.as_str(), e))?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", config.client_id.trim())
                .append_pair("redirect_uri", redirect_uri);
            if !config.scopes.is_empty() {
                query.append_pair("scope", &config.scopes.join(" "));
            }
            query.append_pair("state", &state);
            if let Some(verifier) = &code_verifier {
                query
                    .append_pair("code_challenge", &compute_code_challenge(verifier))
                    .append_pair("code_challenge_method", "S256");
            }
            for (key, value) in &config.extra_params {
                query.append_pair(key, value);
            }
        }

        Ok(Self {
            url,
            state,
            code_verifier,
        })
    }

    /// Validate a final redirect against this request and return the code.
    pub fn authorization_code(&self, redirect: &Url) -> Result<String> {
        let response = RedirectResponse::parse(redirect);
        if let Some(error) = response.error {
            return Err(FlowError::AuthorizationDenied {
                error,
                description: response.error_description,
            });
        }
        response.verify_state(&self.state)?;
        response.into_code()
    }
}

fn random_hex(byte_count: usize) -> String {
    let mut buf = vec![0u8; byte_count];
    fill_random(&mut buf);
    buf.iter().map(|byte| format!("{byte:02x}")).collect()
}

fn generate_code_verifier() -> String {
    let mut buf = [0u8; 32];
    fill_random(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

fn fill_random(buf: &mut [u8]) {
    for chunk in buf.chunks_mut(16) {
        let id = uuid::Uuid::new_v4();
        let len = chunk.len();
        chunk.copy_from_slice(&id.as_bytes()[..len]);
    }
}

/// S256 challenge for a PKCE verifier.
pub fn compute_code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}
