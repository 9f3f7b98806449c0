//! Per-navigation load policy.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;

use crate::flow::AuthFlowStateMachine;
use crate::redirect::RedirectMatcher;

/// Answer returned to the hosting view for a navigation intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NavigationDecision {
    /// Let the view load the URL.
    Allow,
    /// Stop the load; the URL is a redirect target.
    Intercept,
}

impl NavigationDecision {
    /// Boolean the hosting view hands back to its platform callback.
    pub fn should_load(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decides whether the hosting view may load an observed URL.
#[derive(Debug, Clone, Default)]
pub struct NavigationPolicy {
    matcher: RedirectMatcher,
}

impl NavigationPolicy {
    pub fn new(matcher: RedirectMatcher) -> Self {
        Self { matcher }
    }

    pub fn matcher(&self) -> &RedirectMatcher {
        &self.matcher
    }

    /// Pure decision. Unparsable or relative URLs are left to the platform.
    pub fn decide(&self, observed: &str) -> NavigationDecision {
        match Url::parse(observed) {
            Ok(url) => self.decide_url(&url),
            Err(_) => NavigationDecision::Allow,
        }
    }

    pub fn decide_url(&self, url: &Url) -> NavigationDecision {
        if self.matcher.matches(url) {
            NavigationDecision::Intercept
        } else {
            NavigationDecision::Allow
        }
    }

    /// Decide and forward the observation to `flow`.
    ///
    /// Every parsed URL is reported as page loading; intercepted URLs also
    /// complete the flow. Once the flow is terminal the machine drops both,
    /// while the decision itself stays the same.
    pub fn evaluate(&self, observed: &str, flow: &mut AuthFlowStateMachine) -> NavigationDecision {
        let url = match Url::parse(observed) {
            Ok(url) => url,
            Err(_) => {
                flow.observe_unparsable(observed);
                return NavigationDecision::Allow;
            }
        };

        let decision = self.decide_url(&url);
        flow.on_page_loading(&url);
        if decision == NavigationDecision::Intercept {
            flow.on_redirect_intercepted(&url);
        }
        decision
    }
}
