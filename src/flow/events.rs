//! Flow event stream types and the observability hook.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::classify::PlatformError;
use crate::redirect::RedirectMatch;

use super::state::{FlowResult, FlowState, SuppressReason};

/// Unique flow identifier.
pub type FlowId = Uuid;

/// Concrete event payloads emitted by the state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowEventPayload {
    Started {
        request_url: Url,
    },
    PageLoading {
        url: Url,
    },
    PageLoaded {
        url: Url,
    },
    RedirectMatched {
        url: Url,
        rule: RedirectMatch,
    },
    RedirectIntercepted {
        url: Url,
    },
    UnparsableUrl {
        raw: String,
    },
    ErrorIgnored {
        error: PlatformError,
    },
    Suppressed {
        event: String,
        reason: SuppressReason,
    },
    Dismissed,
    Finished {
        result: FlowResult,
    },
}

/// Envelope handed to every [`FlowObserver`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEvent {
    pub flow_id: FlowId,
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    /// State after the event was applied.
    pub state: FlowState,
    pub payload: FlowEventPayload,
}

/// Structured log sink invoked at each transition.
pub trait FlowObserver: Send {
    fn on_event(&self, event: &FlowEvent);
}

impl<F> FlowObserver for F
where
    F: Fn(&FlowEvent) + Send,
{
    fn on_event(&self, event: &FlowEvent) {
        self(event)
    }
}

/// Default observer: forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl FlowObserver for TracingObserver {
    fn on_event(&self, event: &FlowEvent) {
        let flow_id = event.flow_id;
        match &event.payload {
            FlowEventPayload::Started { request_url } => {
                tracing::debug!(flow_id = %flow_id, url = %request_url, "webauth flow started");
            }
            FlowEventPayload::PageLoading { url } => {
                tracing::debug!(flow_id = %flow_id, url = %url, "page loading");
            }
            FlowEventPayload::PageLoaded { url } => {
                tracing::debug!(flow_id = %flow_id, url = %url, "page loaded");
            }
            FlowEventPayload::RedirectMatched { url, rule } => {
                tracing::debug!(flow_id = %flow_id, url = %url, rule = %rule, "redirect target reached");
            }
            FlowEventPayload::RedirectIntercepted { url } => {
                tracing::debug!(flow_id = %flow_id, url = %url, "redirect intercepted");
            }
            FlowEventPayload::UnparsableUrl { raw } => {
                tracing::debug!(flow_id = %flow_id, raw = %raw, "ignoring unparsable url");
            }
            FlowEventPayload::ErrorIgnored { error } => {
                tracing::debug!(
                    flow_id = %flow_id,
                    domain = %error.domain,
                    code = error.code,
                    "ignorable platform error"
                );
            }
            FlowEventPayload::Suppressed { event: name, reason } => {
                tracing::debug!(flow_id = %flow_id, event = %name, reason = %reason, "event suppressed");
            }
            FlowEventPayload::Dismissed => {
                tracing::debug!(flow_id = %flow_id, "webauth view dismissed");
            }
            FlowEventPayload::Finished { result } => match result {
                FlowResult::Success(url) => {
                    tracing::debug!(flow_id = %flow_id, url = %url, "webauth flow completed");
                }
                FlowResult::Failure(reason) => {
                    tracing::warn!(flow_id = %flow_id, reason = %reason, "webauth flow failed");
                }
            },
        }
    }
}
