//! Recorded host events and their replay results.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::flow::FlowState;
use crate::policy::NavigationDecision;

/// Host callback, as recorded from (or scripted for) a web view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    Navigate {
        url: String,
    },
    LoadStarted,
    LoadFinished {
        url: String,
    },
    Error {
        domain: String,
        code: i64,
        #[serde(default)]
        message: String,
    },
    Dismiss,
}

/// Ordered host events for one flow.
///
/// ```json
/// {
///   "request_url": "https://idp.example.com/authorize",
///   "events": [
///     { "event": "navigate", "url": "https://idp.example.com/authorize" },
///     { "event": "load_started" },
///     { "event": "load_finished", "url": "https://idp.example.com/authorize" },
///     { "event": "navigate", "url": "http://localhost/callback?code=abc" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationTrace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_url: Option<String>,
    #[serde(default)]
    pub events: Vec<HostEvent>,
}

impl NavigationTrace {
    /// Read a trace from a `.json` or `.toml` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Ok(toml::from_str(&raw)?)
        } else {
            Ok(serde_json::from_str(&raw)?)
        }
    }
}

/// Outcome of replaying one [`HostEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayEntry {
    pub index: usize,
    pub event: HostEvent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<NavigationDecision>,
    /// Flow state after the event.
    pub state: FlowState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_json_events() {
        let trace: NavigationTrace = serde_json::from_str(
            r#"{"events":[
                {"event":"navigate","url":"https://idp.example.com/"},
                {"event":"error","domain":"NSURLErrorDomain","code":-999},
                {"event":"dismiss"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            trace.events,
            vec![
                HostEvent::Navigate {
                    url: "https://idp.example.com/".to_string()
                },
                HostEvent::Error {
                    domain: "NSURLErrorDomain".to_string(),
                    code: -999,
                    message: String::new(),
                },
                HostEvent::Dismiss,
            ]
        );
    }

    #[test]
    fn parses_toml_events() {
        let trace: NavigationTrace = toml::from_str(
            r#"
            request_url = "https://idp.example.com/authorize"

            [[events]]
            event = "load_started"

            [[events]]
            event = "load_finished"
            url = "https://idp.example.com/authorize"
            "#,
        )
        .unwrap();
        assert_eq!(trace.events.len(), 2);
        assert_eq!(trace.events[0], HostEvent::LoadStarted);
    }
}
