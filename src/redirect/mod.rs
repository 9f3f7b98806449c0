//! Redirect target matching.
//!
//! A [`RedirectMatcher`] answers one question: does this URL mark the end of
//! the authentication flow? Built-in loopback aliases always count (unless
//! disabled); configured hosts, schemes and full redirect URIs extend the set.

pub mod response;

pub use response::RedirectResponse;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::{Host, Url};

use crate::error::{FlowError, Result};

/// Local-host addresses used as redirect targets by flows without a remote
/// callback endpoint.
pub const LOOPBACK_ALIASES: [&str; 3] = ["localhost", "127.0.0.1", "::1"];

/// A configured pattern identifying flow completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    /// Exact host, compared case-insensitively.
    Host(String),
    /// URL scheme such as `com.example.app`.
    Scheme(String),
    /// Full redirect URI: scheme, host, port and path must agree.
    Uri(Url),
}

impl RedirectTarget {
    pub fn host(host: &str) -> Self {
        Self::Host(host.trim().to_ascii_lowercase())
    }

    /// URL parsing canonicalizes schemes to lowercase, so targets are stored
    /// in the same form.
    pub fn scheme(scheme: &str) -> Self {
        Self::Scheme(scheme.trim().trim_end_matches(':').to_ascii_lowercase())
    }

    pub fn uri(uri: &str) -> Result<Self> {
        Url::parse(uri)
            .map(Self::Uri)
            .map_err(|e| FlowError::invalid_url(uri, e))
    }

    fn matches(&self, url: &Url, host: Option<&str>) -> bool {
        match self {
            Self::Host(expected) => host == Some(expected.as_str()),
            Self::Scheme(expected) => url.scheme() == expected,
            Self::Uri(target) => {
                if target.scheme() != url.scheme()
                    || normalized_host(target).as_deref() != host
                    || target.port_or_known_default() != url.port_or_known_default()
                {
                    return false;
                }
                let target_path = target.path().trim_end_matches('/');
                target_path.is_empty() || target_path == url.path().trim_end_matches('/')
            }
        }
    }

    fn kind(&self) -> RedirectMatch {
        match self {
            Self::Host(_) => RedirectMatch::Host,
            Self::Scheme(_) => RedirectMatch::Scheme,
            Self::Uri(_) => RedirectMatch::Uri,
        }
    }
}

/// Which rule matched a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RedirectMatch {
    Loopback,
    Host,
    Scheme,
    Uri,
}

/// Classifies observed URLs against loopback aliases and configured targets.
#[derive(Debug, Clone)]
pub struct RedirectMatcher {
    targets: Vec<RedirectTarget>,
    loopback: bool,
}

impl Default for RedirectMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RedirectMatcher {
    /// Matcher that recognizes only the loopback aliases.
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            loopback: true,
        }
    }

    pub fn with_loopback(mut self, enabled: bool) -> Self {
        self.loopback = enabled;
        self
    }

    pub fn with_target(mut self, target: RedirectTarget) -> Self {
        self.push(target);
        self
    }

    pub fn push(&mut self, target: RedirectTarget) {
        if !self.targets.contains(&target) {
            self.targets.push(target);
        }
    }

    pub fn targets(&self) -> &[RedirectTarget] {
        &self.targets
    }

    pub fn loopback_enabled(&self) -> bool {
        self.loopback
    }

    /// Return the first rule matching `url`, loopback aliases first.
    pub fn match_url(&self, url: &Url) -> Option<RedirectMatch> {
        let host = normalized_host(url);
        if self.loopback && host.as_deref().is_some_and(is_loopback_host) {
            return Some(RedirectMatch::Loopback);
        }
        self.targets
            .iter()
            .find(|target| target.matches(url, host.as_deref()))
            .map(RedirectTarget::kind)
    }

    pub fn matches(&self, url: &Url) -> bool {
        self.match_url(url).is_some()
    }

    /// String form of [`matches`](Self::matches); unparsable input never matches.
    pub fn matches_str(&self, url: &str) -> bool {
        Url::parse(url).is_ok_and(|url| self.matches(&url))
    }
}

/// Whether a lowercase host is one of [`LOOPBACK_ALIASES`].
pub fn is_loopback_host(host: &str) -> bool {
    LOOPBACK_ALIASES.contains(&host)
}

/// Lowercase host of `url`, with IPv6 literals rendered without brackets.
pub fn normalized_host(url: &Url) -> Option<String> {
    Some(match url.host()? {
        Host::Domain(domain) => domain.to_ascii_lowercase(),
        Host::Ipv4(addr) => addr.to_string(),
        Host::Ipv6(addr) => addr.to_string(),
    })
}
