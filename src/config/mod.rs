//! Configuration system (layered: defaults < config file < environment).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::classify::{ErrorClassifier, IgnoreRule};
use crate::error::{FlowError, Result};
use crate::policy::NavigationPolicy;
use crate::redirect::{RedirectMatcher, RedirectTarget};
use crate::request::AuthorizationRequest;

/// Environment variables read by [`FlowConfig::apply_env`].
pub const ENV_VARS: [&str; 7] = [
    "WEBAUTH_AUTHORIZE_URL",
    "WEBAUTH_CLIENT_ID",
    "WEBAUTH_REDIRECT_URI",
    "WEBAUTH_SCOPES",
    "WEBAUTH_REDIRECT_HOSTS",
    "WEBAUTH_REDIRECT_SCHEMES",
    "WEBAUTH_LOOPBACK",
];

/// Top-level configuration.
///
/// ```toml
/// [redirect]
/// loopback = true
/// hosts = ["auth-done.example.com"]
/// schemes = ["com.example.app"]
///
/// [errors]
/// ignore = [{ domain = "NSPOSIXErrorDomain", code = 53 }]
///
/// [request]
/// authorize_url = "https://idp.example.com/authorize"
/// client_id = "my-client"
/// redirect_uri = "http://localhost/callback"
/// scopes = ["openid", "profile"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlowConfig {
    pub redirect: RedirectConfig,
    pub errors: ErrorConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestConfig>,
}

/// Redirect targets recognized as the end of the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RedirectConfig {
    /// Treat `localhost`, `127.0.0.1` and `::1` as redirect targets.
    pub loopback: bool,
    pub hosts: Vec<String>,
    pub schemes: Vec<String>,
    pub uris: Vec<String>,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            loopback: true,
            hosts: Vec::new(),
            schemes: Vec::new(),
            uris: Vec::new(),
        }
    }
}

/// Platform errors that do not fail the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ErrorConfig {
    /// Keep the built-in WebKit policy / URL cancellation rules.
    pub include_defaults: bool,
    pub ignore: Vec<IgnoreRule>,
}

impl Default for ErrorConfig {
    fn default() -> Self {
        Self {
            include_defaults: true,
            ignore: Vec::new(),
        }
    }
}

/// Parameters of the authorization request the flow is launched with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequestConfig {
    pub authorize_url: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    /// Send an S256 PKCE challenge.
    pub pkce: bool,
    /// Provider-specific extra query parameters.
    pub extra_params: BTreeMap<String, String>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            authorize_url: String::new(),
            client_id: String::new(),
            redirect_uri: String::new(),
            scopes: Vec::new(),
            pkce: true,
            extra_params: BTreeMap::new(),
        }
    }
}

impl FlowConfig {
    /// Default config file path (~/.webauth/config.toml).
    pub fn default_config_path() -> PathBuf {
        directories::UserDirs::new()
            .map(|dirs| dirs.home_dir().join(".webauth"))
            .unwrap_or_else(|| PathBuf::from(".webauth"))
            .join("config.toml")
    }

    /// Load the default config file, then apply the environment.
    pub fn load_default() -> Result<Self> {
        Self::load(None)
    }

    /// Load `path` and overlay environment variables.
    ///
    /// An explicit `path` must exist; without one the default config file
    /// is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::read_from_path(path)?,
            None => Self::load_from_path(Self::default_config_path())?,
        };
        let _ = dotenvy::dotenv();
        Ok(config.apply_env(|key| std::env::var(key).ok()))
    }

    /// Load from environment variables only.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::default().apply_env(|key| std::env::var(key).ok())
    }

    /// Load a TOML (or `.json`) config file.
    ///
    /// Returns the defaults if the file does not exist.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        match Self::read_from_path(path) {
            Err(FlowError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Read a TOML (or `.json`) config file that must exist.
    pub fn read_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let config = if is_json(path) {
            serde_json::from_str(&raw)?
        } else {
            toml::from_str(&raw)?
        };
        tracing::debug!(path = %path.display(), "loaded webauth config");
        Ok(config)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let serialized = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };
        fs::write(path, serialized)?;
        Ok(())
    }

    /// Overlay values from `lookup` (normally the process environment).
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let request_vars = [
            lookup("WEBAUTH_AUTHORIZE_URL"),
            lookup("WEBAUTH_CLIENT_ID"),
            lookup("WEBAUTH_REDIRECT_URI"),
            lookup("WEBAUTH_SCOPES"),
        ];
        if request_vars.iter().any(Option::is_some) {
            let [authorize_url, client_id, redirect_uri, scopes] = request_vars;
            let request = self.request.get_or_insert_with(RequestConfig::default);
            if let Some(value) = authorize_url {
                request.authorize_url = value;
            }
            if let Some(value) = client_id {
                request.client_id = value;
            }
            if let Some(value) = redirect_uri {
                request.redirect_uri = value;
            }
            if let Some(value) = scopes {
                request.scopes = split_list(&value);
            }
        }

        if let Some(value) = lookup("WEBAUTH_REDIRECT_HOSTS") {
            self.redirect.hosts.extend(split_list(&value));
        }
        if let Some(value) = lookup("WEBAUTH_REDIRECT_SCHEMES") {
            self.redirect.schemes.extend(split_list(&value));
        }
        if let Some(value) = lookup("WEBAUTH_LOOPBACK") {
            self.redirect.loopback = !matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            );
        }
        self
    }

    /// Build the redirect matcher. The request's `redirect_uri`, when set,
    /// is always one of the targets.
    pub fn matcher(&self) -> Result<RedirectMatcher> {
        let mut matcher = RedirectMatcher::new().with_loopback(self.redirect.loopback);
        for host in &self.redirect.hosts {
            matcher.push(RedirectTarget::host(non_empty("redirect.hosts", host)?));
        }
        for scheme in &self.redirect.schemes {
            matcher.push(RedirectTarget::scheme(non_empty("redirect.schemes", scheme)?));
        }
        for uri in &self.redirect.uris {
            matcher.push(RedirectTarget::uri(uri)?);
        }
        if let Some(request) = &self.request {
            if !request.redirect_uri.trim().is_empty() {
                matcher.push(RedirectTarget::uri(request.redirect_uri.trim())?);
            }
        }
        Ok(matcher)
    }

    pub fn classifier(&self) -> ErrorClassifier {
        let base = if self.errors.include_defaults {
            ErrorClassifier::new()
        } else {
            ErrorClassifier::strict()
        };
        self.errors
            .ignore
            .iter()
            .cloned()
            .fold(base, ErrorClassifier::with_rule)
    }

    pub fn policy(&self) -> Result<NavigationPolicy> {
        Ok(NavigationPolicy::new(self.matcher()?))
    }

    /// Build a fresh authorization request (new `state` / PKCE verifier).
    pub fn authorization_request(&self) -> Result<AuthorizationRequest> {
        let request = self.request.as_ref().ok_or_else(|| {
            FlowError::Configuration("no [request] section configured".to_string())
        })?;
        AuthorizationRequest::new(request)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn non_empty<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FlowError::Configuration(format!("{field} contains an empty entry")));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_creates_request_section() {
        let config = FlowConfig::default().apply_env(lookup(&[
            ("WEBAUTH_AUTHORIZE_URL", "https://idp.example.com/authorize"),
            ("WEBAUTH_CLIENT_ID", "client"),
            ("WEBAUTH_SCOPES", "openid, profile email"),
        ]));
        let request = config.request.unwrap();
        assert_eq!(request.client_id, "client");
        assert_eq!(request.scopes, vec!["openid", "profile", "email"]);
        assert!(request.pkce);
    }

    #[test]
    fn env_extends_targets_and_toggles_loopback() {
        let config = FlowConfig::default().apply_env(lookup(&[
            ("WEBAUTH_REDIRECT_HOSTS", "a.example,b.example"),
            ("WEBAUTH_LOOPBACK", "off"),
        ]));
        assert_eq!(config.redirect.hosts, vec!["a.example", "b.example"]);
        assert!(!config.redirect.loopback);
        assert!(config.request.is_none());
    }

    #[test]
    fn empty_host_is_configuration_error() {
        let mut config = FlowConfig::default();
        config.redirect.hosts.push("  ".to_string());
        assert!(matches!(config.matcher(), Err(FlowError::Configuration(_))));
    }

    #[test]
    fn request_redirect_uri_becomes_target() {
        let config = FlowConfig {
            request: Some(RequestConfig {
                redirect_uri: "https://app.example.com/cb".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let matcher = config.matcher().unwrap();
        assert!(matcher.matches_str("https://app.example.com/cb?code=1"));
    }

    #[test]
    fn missing_request_section_is_reported() {
        let err = FlowConfig::default().authorization_request().unwrap_err();
        assert!(matches!(err, FlowError::Configuration(_)));
    }
}
